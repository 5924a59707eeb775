mod db;
mod detector;
mod error;
mod headers;
mod helpers;
mod matcher;
mod properties;
mod rules;
mod types;

pub use detector::Detector;
pub use error::{Error, Result};
pub use headers::HttpHeaders;
pub use matcher::Matcher;
pub use properties::Property;
pub use rules::{RuleGroup, RuleKey, RuleSet};
pub use types::*;
