#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    YAML(#[from] serde_yaml::Error),
    #[error(transparent)]
    Regex(#[from] fancy_regex::Error),
    #[error(transparent)]
    AhoCorasick(#[from] aho_corasick::BuildError),
    /// A rule in a loaded rule set has a pattern neither regex engine accepts.
    #[error("invalid pattern for rule {name:?}: {source}")]
    InvalidRule {
        name: String,
        #[source]
        source: fancy_regex::Error,
    },
    #[error("{0} keyed rules exceed the key space")]
    TooManyRules(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
