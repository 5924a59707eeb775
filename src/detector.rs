use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::headers::HttpHeaders;
use crate::helpers::version_to_float;
use crate::matcher::Matcher;
use crate::properties::Property;
use crate::rules::{RuleKey, RuleSet};
use crate::types::*;

/// Classifies one client from its User-Agent and request headers.
///
/// A detector is meant to live for a single request. The rule tables behind
/// it are shared and immutable; the compiled-pattern cache is its own, which
/// makes a `Detector` `Send` but not `Sync`. Build one per thread (or per
/// request) rather than sharing one behind a reference.
///
/// Every query is total: an unknown name, key or property simply yields
/// `false`, an empty string or `0.0`.
#[derive(Debug)]
pub struct Detector {
    rules: Arc<RuleSet>,
    user_agent: String,
    headers: HttpHeaders,
    matcher: Matcher,
}

impl Detector {
    /// A detector over the built-in rule database.
    pub fn new(user_agent: impl Into<String>, headers: HttpHeaders) -> Self {
        Self::with_rules(user_agent, headers, RuleSet::shared())
    }

    pub fn with_rules(user_agent: impl Into<String>, headers: HttpHeaders, rules: Arc<RuleSet>) -> Self {
        Self {
            rules,
            user_agent: user_agent.into(),
            headers,
            matcher: Matcher::new(),
        }
    }

    /// Take the User-Agent from the captured `User-Agent` header, or the empty
    /// string if there is none.
    pub fn from_headers(headers: HttpHeaders) -> Self {
        let user_agent = headers.user_agent().unwrap_or_default().to_owned();
        Self::new(user_agent, headers)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn http_headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Replace the User-Agent. Compiled patterns stay cached.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace the header snapshot wholesale.
    pub fn set_http_headers(&mut self, headers: HttpHeaders) -> &mut Self {
        self.headers = headers;
        self
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    pub fn check_http_headers_for_mobile(&self) -> bool {
        self.rules.header_classifier().is_mobile(&self.headers)
    }

    /// Mobile by headers, or by any rule of the combined detection table.
    pub fn is_mobile(&self) -> bool {
        if self.check_http_headers_for_mobile() {
            return true;
        }
        self.rules
            .combined()
            .any(|(_, _, pattern)| !pattern.is_empty() && self.matches(pattern))
    }

    /// Any tablet rule matches. Headers are not consulted and the result is
    /// independent of [`Detector::is_mobile`].
    pub fn is_tablet(&self) -> bool {
        self.rules
            .tablet_devices()
            .values()
            .any(|pattern| self.matches(pattern))
    }

    /// Match the keyed rule called `name`, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        match self.rules.key(name) {
            Some(key) => self.is_keyed(key),
            None => false,
        }
    }

    pub fn is_keyed(&self, key: RuleKey) -> bool {
        match self.rules.pattern(key) {
            Some(pattern) if !pattern.is_empty() => self.matches(pattern),
            _ => false,
        }
    }

    /// `is_named` or `is_keyed`, depending on what the caller holds.
    ///
    /// ```
    /// use mobile_detect::{Detector, HttpHeaders};
    ///
    /// let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 6_0_1 like Mac OS X) Mobile/10A523";
    /// let detector = Detector::new(ua, HttpHeaders::new());
    /// assert!(detector.is("iphone"));
    /// let key = detector.rules().key("iPhone").unwrap();
    /// assert!(detector.is(key));
    /// ```
    pub fn is<'a>(&self, rule: impl Into<NameOrKey<'a>>) -> bool {
        match rule.into() {
            NameOrKey::Name(name) => self.is_named(name),
            NameOrKey::Key(key) => self.is_keyed(key),
        }
    }

    /// Tablet first, then mobile, otherwise desktop.
    pub fn device_class(&self) -> DeviceClass {
        if self.is_tablet() {
            DeviceClass::Tablet
        } else if self.is_mobile() {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    /// Run an arbitrary pattern against the User-Agent, with the same flags
    /// and cache as the rule tables.
    pub fn match_pattern(&self, pattern: &str) -> Result<bool> {
        self.matcher.is_match(pattern, &self.user_agent)
    }

    // -----------------------------------------------------------------------
    // Versions
    // -----------------------------------------------------------------------

    /// Version token for the property called `name` (ignoring case), or the
    /// empty string.
    pub fn version(&self, name: &str) -> String {
        match Property::from_name(name) {
            Some(property) => self.version_of(property),
            None => String::new(),
        }
    }

    /// First capture of the first template that matches.
    pub fn version_of(&self, property: Property) -> String {
        for pattern in property.patterns() {
            match self.matcher.capture(&pattern, &self.user_agent) {
                Ok(Some(version)) => return version,
                Ok(None) => {}
                Err(err) => warn!(%pattern, %err, "version template failed to compile"),
            }
        }
        String::new()
    }

    pub fn version_float(&self, name: &str) -> f64 {
        version_to_float(&self.version(name))
    }

    pub fn version_float_of(&self, property: Property) -> f64 {
        version_to_float(&self.version_of(property))
    }

    // -----------------------------------------------------------------------
    // Mobile grade
    // -----------------------------------------------------------------------

    pub fn mobile_grade(&self) -> MobileGrade {
        let is_mobile = self.is_mobile();
        if self.is_mobile_grade_a(is_mobile) {
            MobileGrade::A
        } else if self.is_mobile_grade_b() {
            MobileGrade::B
        } else {
            MobileGrade::C
        }
    }

    fn is_mobile_grade_a(&self, is_mobile: bool) -> bool {
        let ver = |name: &str| self.version_float(name);
        let is = |name: &str| self.is_named(name);
        let raw = |pattern: &str| self.matches(pattern);
        let tablet = |name: &str| self.matches_tablet_rule(name);

        ver("iPad") >= 4.3
            || ver("iPhone") >= 3.1
            || ver("iPod") >= 3.1
            || (ver("Android") > 2.1 && is("Webkit"))
            || ver("Windows Phone OS") >= 7.0
            || (is("BlackBerry") && ver("BlackBerry") >= 6.0)
            || raw("Playbook.*Tablet")
            || (ver("webOS") >= 1.4 && raw("Palm|Pre|Pixi"))
            || raw("hp.*TouchPad")
            || (is("Firefox") && ver("Firefox") >= 12.0)
            || (is("Chrome") && is("AndroidOS") && ver("Android") >= 4.0)
            || (is("Skyfire") && ver("Skyfire") >= 4.1 && is("AndroidOS") && ver("Android") >= 2.3)
            || (is("Opera") && ver("Opera Mobi") > 11.0 && is("AndroidOS"))
            || is("MeeGoOS")
            || is("Tizen")
            || (is("Dolfin") && ver("Bada") >= 2.0)
            || ((is("UC Browser") || is("Dolfin")) && ver("Android") >= 2.3)
            || raw("Kindle Fire")
            || (tablet("Kindle") && ver("Kindle") >= 3.0)
            || (is("AndroidOS") && tablet("NookTablet"))
            || (ver("Chrome") >= 11.0 && is_mobile)
            || (ver("Safari") >= 5.0 && is_mobile)
            || (ver("Firefox") >= 4.0 && is_mobile)
            || (ver("MSIE") >= 7.0 && is_mobile)
            || (ver("Opera") >= 10.0 && is_mobile)
    }

    fn is_mobile_grade_b(&self) -> bool {
        let ver = |name: &str| self.version_float(name);
        let is = |name: &str| self.is_named(name);

        (is("Blackberry") && ver("BlackBerry") >= 5.0 && ver("BlackBerry") < 6.0)
            || (ver("Opera Mini") >= 5.0
                && ver("Opera Mini") <= 6.5
                && (ver("Android") >= 2.3 || is("iOS")))
            || self.matches("NokiaN8|NokiaC7|N97.*Series60|Symbian/3")
            || (ver("Opera Mobi") >= 11.0 && is("SymbianOS"))
    }

    // -----------------------------------------------------------------------
    // Pattern cache
    // -----------------------------------------------------------------------

    /// Compile every pattern of the combined detection table up front.
    pub fn precompile(&self) -> Result<()> {
        let before = self.matcher.len();
        self.matcher
            .precompile(self.rules.combined().map(|(_, _, pattern)| pattern))?;
        debug!(compiled = self.matcher.len() - before, cached = self.matcher.len(), "patterns precompiled");
        Ok(())
    }

    /// Number of distinct patterns compiled so far.
    pub fn cached_patterns(&self) -> usize {
        self.matcher.len()
    }

    /// Device-family checks in the grade heuristic name tablet rules, which
    /// carry no key and so are not reachable through `is_named`.
    fn matches_tablet_rule(&self, name: &str) -> bool {
        self.rules
            .tablet_devices()
            .iter()
            .find(|(rule, _)| rule.eq_ignore_ascii_case(name))
            .is_some_and(|(_, pattern)| !pattern.is_empty() && self.matches(pattern))
    }

    /// Rule-table patterns are validated when the rule set loads, so a failure
    /// here can only come from a hand-written pattern in this file.
    fn matches(&self, pattern: &str) -> bool {
        self.matcher
            .is_match(pattern, &self.user_agent)
            .unwrap_or_else(|err| {
                warn!(%pattern, %err, "pattern failed to compile");
                false
            })
    }
}
