use aho_corasick::AhoCorasick;
use indexmap::IndexMap;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Mobile-indicating headers
// ---------------------------------------------------------------------------

pub(crate) struct MobileHeader {
    pub name: &'static str,
    /// Literal substrings, one of which the value must contain. Empty means
    /// the header's presence alone is a mobile signal.
    pub required: &'static [&'static str],
}

/// Scan order matters: only the first header present is consulted.
pub(crate) const MOBILE_HEADERS: [MobileHeader; 14] = [
    MobileHeader {
        name: "HTTP_ACCEPT",
        required: &[
            "application/x-obml2d",
            "application/vnd.rim.html",
            "text/vnd.wap.wml",
            "application/vnd.wap.xhtml+xml",
        ],
    },
    MobileHeader { name: "HTTP_X_WAP_PROFILE", required: &[] },
    MobileHeader { name: "HTTP_X_WAP_CLIENTID", required: &[] },
    MobileHeader { name: "HTTP_WAP_CONNECTION", required: &[] },
    MobileHeader { name: "HTTP_PROFILE", required: &[] },
    MobileHeader { name: "HTTP_X_OPERAMINI_PHONE_UA", required: &[] },
    MobileHeader { name: "HTTP_X_NOKIA_GATEWAY_ID", required: &[] },
    MobileHeader { name: "HTTP_X_ORANGE_ID", required: &[] },
    MobileHeader { name: "HTTP_X_VODAFONE_3GPDPCONTEXT", required: &[] },
    MobileHeader { name: "HTTP_X_HUAWEI_USERID", required: &[] },
    MobileHeader { name: "HTTP_UA_OS", required: &[] },
    MobileHeader { name: "HTTP_X_MOBILE_GATEWAY", required: &[] },
    MobileHeader { name: "HTTP_X_ATT_DEVICEID", required: &[] },
    MobileHeader { name: "HTTP_UA_CPU", required: &["ARM"] },
];

/// The logical request headers captured by [`HttpHeaders::snapshot`], in
/// CGI naming.
pub(crate) const SNAPSHOT_HEADERS: [&str; 16] = [
    "SERVER_SOFTWARE",
    "REQUEST_METHOD",
    "HTTP_HOST",
    "HTTP_X_REAL_IP",
    "HTTP_X_FORWARDED_FOR",
    "HTTP_CONNECTION",
    "HTTP_USER_AGENT",
    "HTTP_ACCEPT",
    "HTTP_ACCEPT_LANGUAGE",
    "HTTP_ACCEPT_ENCODING",
    "HTTP_X_REQUESTED_WITH",
    "HTTP_REFERER",
    "HTTP_PRAGMA",
    "HTTP_CACHE_CONTROL",
    "REMOTE_ADDR",
    "REQUEST_TIME",
];

/// CGI meta-variables that are not request headers and so carry no `HTTP_`
/// prefix.
const CGI_VARIABLES: [&str; 4] = ["SERVER_SOFTWARE", "REQUEST_METHOD", "REMOTE_ADDR", "REQUEST_TIME"];

/// `Accept` → `HTTP_ACCEPT`, `x-wap-profile` → `HTTP_X_WAP_PROFILE`.
/// Names already in CGI form are returned unchanged.
pub(crate) fn cgi_name(name: &str) -> String {
    let upper = name.trim().to_ascii_uppercase().replace('-', "_");
    if upper.starts_with("HTTP_") || CGI_VARIABLES.contains(&upper.as_str()) {
        upper
    } else {
        format!("HTTP_{}", upper)
    }
}

// ---------------------------------------------------------------------------
// HttpHeaders
// ---------------------------------------------------------------------------

/// Request header values keyed by CGI-style name.
///
/// Every name going in or out is normalised with the same rule, so
/// `insert("Accept", ..)` and `get("HTTP_ACCEPT")` address the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    values: IndexMap<String, String>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the logical request headers plus any mobile-indicating ones,
    /// dropping everything else.
    pub fn snapshot<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            let name = cgi_name(name.as_ref());
            let wanted = SNAPSHOT_HEADERS.contains(&name.as_str())
                || MOBILE_HEADERS.iter().any(|h| h.name == name);
            if wanted {
                headers.values.insert(name, value.into());
            }
        }
        headers
    }

    /// Set a header, returning the previous value under the same normalised
    /// name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.values.insert(cgi_name(name.as_ref()), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_exact(&cgi_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The `User-Agent` header, if captured.
    pub fn user_agent(&self) -> Option<&str> {
        self.get_exact("HTTP_USER_AGENT")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(cgi_name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Lookup by an already-normalised name.
    pub(crate) fn get_exact(&self, cgi_name: &str) -> Option<&str> {
        self.values.get(cgi_name).map(String::as_str)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HttpHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        headers.extend(iter);
        headers
    }
}

impl<K: AsRef<str>, V: Into<String>> Extend<(K, V)> for HttpHeaders {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

// ---------------------------------------------------------------------------
// HeaderClassifier
// ---------------------------------------------------------------------------

struct HeaderRule {
    name: &'static str,
    /// `None` when presence alone indicates mobile.
    required: Option<AhoCorasick>,
}

/// Decides "mobile" from request headers alone.
pub(crate) struct HeaderClassifier {
    rules: Vec<HeaderRule>,
}

impl HeaderClassifier {
    pub fn build() -> Result<Self> {
        let rules = MOBILE_HEADERS
            .iter()
            .map(|header| -> Result<HeaderRule> {
                let required = if header.required.is_empty() {
                    None
                } else {
                    Some(AhoCorasick::new(header.required)?)
                };
                Ok(HeaderRule {
                    name: header.name,
                    required,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// The first mobile-indicating header present decides; later ones are
    /// never looked at, even if the first one's value does not qualify.
    pub fn is_mobile(&self, headers: &HttpHeaders) -> bool {
        for rule in &self.rules {
            if let Some(value) = headers.get_exact(rule.name) {
                return match &rule.required {
                    Some(substrings) => substrings.is_match(value),
                    None => true,
                };
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(pairs: &[(&str, &str)]) -> bool {
        let headers: HttpHeaders = pairs.iter().copied().collect();
        HeaderClassifier::build().unwrap().is_mobile(&headers)
    }

    #[test]
    fn cgi_names() {
        assert_eq!(cgi_name("Accept"), "HTTP_ACCEPT");
        assert_eq!(cgi_name("x-wap-profile"), "HTTP_X_WAP_PROFILE");
        assert_eq!(cgi_name("HTTP_UA_CPU"), "HTTP_UA_CPU");
        assert_eq!(cgi_name("Request-Method"), "REQUEST_METHOD");
        assert_eq!(cgi_name("remote_addr"), "REMOTE_ADDR");
    }

    #[test]
    fn insert_and_get_share_normalisation() {
        let mut h = HttpHeaders::new();
        assert_eq!(h.insert("Accept", "text/html"), None);
        assert_eq!(h.insert("HTTP_ACCEPT", "text/vnd.wap.wml"), Some("text/html".to_string()));
        assert_eq!(h.get("accept"), Some("text/vnd.wap.wml"));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn snapshot_keeps_logical_and_mobile_headers() {
        let h = HttpHeaders::snapshot([
            ("User-Agent", "Mozilla/5.0"),
            ("Host", "example.org"),
            ("X-Wap-Profile", "http://wap.example/uaprof.xml"),
            ("Cookie", "session=1"),
            ("Via", "1.1 proxy"),
        ]);
        assert_eq!(h.user_agent(), Some("Mozilla/5.0"));
        assert_eq!(h.get("HTTP_HOST"), Some("example.org"));
        assert!(h.contains("x-wap-profile"));
        assert!(!h.contains("Cookie"));
        assert!(!h.contains("Via"));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn accept_needs_a_wap_content_type() {
        assert!(classify(&[("HTTP_ACCEPT", "text/vnd.wap.wml")]));
        assert!(classify(&[("HTTP_ACCEPT", "text/*; q=0.1, application/vnd.rim.html")]));
        assert!(!classify(&[("HTTP_ACCEPT", "text/html,application/xhtml+xml")]));
    }

    #[test]
    fn presence_alone_is_enough() {
        assert!(classify(&[("HTTP_X_WAP_CLIENTID", "")]));
        assert!(classify(&[("HTTP_X_ATT_DEVICEID", "")]));
    }

    #[test]
    fn substring_match_is_case_sensitive() {
        assert!(classify(&[("HTTP_UA_CPU", "ARM")]));
        assert!(!classify(&[("HTTP_UA_CPU", "arm")]));
        assert!(!classify(&[("HTTP_UA_CPU", "AMD64")]));
    }

    #[test]
    fn first_present_header_decides() {
        assert!(!classify(&[("HTTP_ACCEPT", "text/html"), ("HTTP_UA_CPU", "ARM")]));
        assert!(classify(&[("HTTP_UA_CPU", "ARM"), ("HTTP_VIA", "proxy")]));
    }

    #[test]
    fn unrelated_headers_are_not_mobile() {
        assert!(!classify(&[]));
        assert!(!classify(&[("REQUEST_METHOD", "DELETE"), ("HTTP_VIA", "1.1 proxy")]));
    }
}
