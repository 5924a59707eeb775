use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::warn;

use crate::error::Result;

/// Case-insensitive, and `.` also matches `\n`.
const PATTERN_FLAGS: &str = "(?is)";

/// Build the flag-wrapped regex string. This exact string is the cache key.
pub(crate) fn full_pattern(pattern: &str) -> String {
    format!("{}{}", PATTERN_FLAGS, pattern)
}

/// Compile an already flag-wrapped pattern.
///
/// The `regex` crate is tried first; patterns it rejects (look-around) are
/// handed to fancy_regex, which reports the error if it cannot take them either.
pub(crate) fn compile_full(full: &str) -> Result<CompiledPattern> {
    match regex::Regex::new(full) {
        Ok(re) => Ok(CompiledPattern::Standard(re)),
        Err(_) => Ok(CompiledPattern::Fancy(fancy_regex::Regex::new(full)?)),
    }
}

// ---------------------------------------------------------------------------
// CompiledPattern / Captures
// ---------------------------------------------------------------------------

pub(crate) enum CompiledPattern {
    Standard(regex::Regex),
    Fancy(fancy_regex::Regex),
}

impl CompiledPattern {
    /// Unanchored search. A fallback-engine runtime error (backtrack limit)
    /// counts as no match.
    pub fn is_match(&self, subject: &str) -> bool {
        match self {
            Self::Standard(re) => re.is_match(subject),
            Self::Fancy(re) => re.is_match(subject).unwrap_or_else(|err| {
                warn!(pattern = re.as_str(), %err, "regex evaluation failed");
                false
            }),
        }
    }

    pub fn captures<'t>(&self, subject: &'t str) -> Option<Captures<'t>> {
        match self {
            Self::Standard(re) => re.captures(subject).map(Captures::Standard),
            Self::Fancy(re) => match re.captures(subject) {
                Ok(caps) => caps.map(Captures::Fancy),
                Err(err) => {
                    warn!(pattern = re.as_str(), %err, "regex evaluation failed");
                    None
                }
            },
        }
    }

    pub fn is_fancy(&self) -> bool {
        matches!(self, Self::Fancy(_))
    }
}

/// Lightweight wrapper so callers don't need to know which regex engine
/// produced the match.
pub(crate) enum Captures<'a> {
    Standard(regex::Captures<'a>),
    Fancy(fancy_regex::Captures<'a>),
}

impl<'a> Captures<'a> {
    /// Get the matched text for capture group `i`, or `None` if the group
    /// didn't participate in the match.
    pub fn get_str(&self, i: usize) -> Option<&'a str> {
        match self {
            Captures::Standard(c) => c.get(i).map(|m| m.as_str()),
            Captures::Fancy(c) => c.get(i).map(|m| m.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Compiles patterns on first use and keeps them for its own lifetime.
///
/// Entries are keyed by the flag-wrapped pattern string and never evicted;
/// the rule tables bound the size in practice. The cache sits in a `RefCell`,
/// so a `Matcher` (and anything owning one) is `Send` but not `Sync`: share
/// the rule data between threads, not the matcher.
#[derive(Default)]
pub struct Matcher {
    cache: RefCell<HashMap<String, Arc<CompiledPattern>>>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Does `pattern` occur anywhere in `subject`?
    pub fn is_match(&self, pattern: &str, subject: &str) -> Result<bool> {
        Ok(self.compiled(pattern)?.is_match(subject))
    }

    /// Text of the first capture group of the first match of `pattern`.
    pub fn capture(&self, pattern: &str, subject: &str) -> Result<Option<String>> {
        let compiled = self.compiled(pattern)?;
        let captured = compiled
            .captures(subject)
            .and_then(|caps| caps.get_str(1).map(str::to_owned));
        Ok(captured)
    }

    /// Compile every pattern that is not cached yet. Compilation runs in
    /// parallel; the cache is only touched once all of it succeeded.
    pub fn precompile<'p>(&self, patterns: impl IntoIterator<Item = &'p str>) -> Result<()> {
        let mut missing: Vec<String> = {
            let cache = self.cache.borrow();
            patterns
                .into_iter()
                .map(full_pattern)
                .filter(|key| !cache.contains_key(key))
                .collect()
        };
        missing.sort_unstable();
        missing.dedup();

        let compiled: Vec<(String, CompiledPattern)> = missing
            .into_par_iter()
            .map(|key| {
                let pattern = compile_full(&key)?;
                Ok((key, pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut cache = self.cache.borrow_mut();
        for (key, pattern) in compiled {
            cache.insert(key, Arc::new(pattern));
        }
        Ok(())
    }

    /// Whether `pattern` (unwrapped) has a compiled entry.
    pub fn is_cached(&self, pattern: &str) -> bool {
        self.cache.borrow().contains_key(&full_pattern(pattern))
    }

    /// Number of compiled patterns held.
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    fn compiled(&self, pattern: &str) -> Result<Arc<CompiledPattern>> {
        let key = full_pattern(pattern);
        if let Some(hit) = self.cache.borrow().get(&key) {
            return Ok(Arc::clone(hit));
        }
        let compiled = Arc::new(compile_full(&key)?);
        self.cache.borrow_mut().insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("cached", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_with_flags() {
        assert_eq!(full_pattern("iPhone"), "(?is)iPhone");
    }

    #[test]
    fn case_insensitive_unanchored_search() {
        let m = Matcher::new();
        assert!(m.is_match("iphone", "Mozilla/5.0 (IPHONE; CPU)").unwrap());
        assert!(!m.is_match("^iPhone", "Mozilla/5.0 (iPhone)").unwrap());
    }

    #[test]
    fn dot_matches_newline() {
        let m = Matcher::new();
        assert!(m.is_match("Android.*Mobile", "Android 4.0\nMobile Safari").unwrap());
    }

    #[test]
    fn caches_by_pattern_not_subject() {
        let m = Matcher::new();
        assert!(m.is_empty());
        m.is_match("Kindle", "a").unwrap();
        m.is_match("Kindle", "b").unwrap();
        m.is_match("kindle", "c").unwrap();
        assert_eq!(m.len(), 2);
        assert!(m.is_cached("Kindle"));
        assert!(!m.is_cached("Nook"));
    }

    #[test]
    fn lookaround_falls_back_to_fancy() {
        let compiled = compile_full(&full_pattern("Tablet(?!.*PC)")).unwrap();
        assert!(compiled.is_fancy());
        assert!(compiled.is_match("ME Tablet U1"));
        assert!(!compiled.is_match("Tablet PC 2.0"));

        let plain = compile_full(&full_pattern("Tablet")).unwrap();
        assert!(!plain.is_fancy());
    }

    #[test]
    fn capture_first_group() {
        let m = Matcher::new();
        let v = m.capture(r"Android ([\w._\+]+)", "Linux; Android 4.0.4; ARCHOS").unwrap();
        assert_eq!(v.as_deref(), Some("4.0.4"));
        assert_eq!(m.capture(r"Android ([\w._\+]+)", "Windows NT").unwrap(), None);
    }

    #[test]
    fn malformed_pattern_is_an_error() {
        let m = Matcher::new();
        assert!(m.is_match("(unclosed", "x").is_err());
        assert!(m.is_empty());
    }

    #[test]
    fn precompile_dedupes_and_skips_cached() {
        let m = Matcher::new();
        m.is_match("iPad", "x").unwrap();
        m.precompile(["iPad", "iPod", "iPod", "Kindle"]).unwrap();
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn precompile_failure_leaves_cache_untouched() {
        let m = Matcher::new();
        assert!(m.precompile(["iPad", "(bad"]).is_err());
        assert!(m.is_empty());
    }
}
