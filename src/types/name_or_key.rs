use crate::rules::RuleKey;

/// Addresses a keyed rule either by its name or by its integer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameOrKey<'a> {
    Name(&'a str),
    Key(RuleKey),
}

impl<'a> From<&'a str> for NameOrKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for NameOrKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

impl From<RuleKey> for NameOrKey<'_> {
    fn from(key: RuleKey) -> Self {
        Self::Key(key)
    }
}
