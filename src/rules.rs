use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

use crate::db::{RuleFile, RuleMap};
use crate::error::{Error, Result};
use crate::headers::HeaderClassifier;
use crate::matcher::{compile_full, full_pattern};

/// The rule database shipped with the crate.
const DEFAULT_RULES: &str = include_str!("../regexes/rules.yml");

static DEFAULT_RULE_SET: OnceLock<Arc<RuleSet>> = OnceLock::new();

/// Small integer identifier of a keyed rule, for lookups that skip the
/// case-insensitive name match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleKey(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleGroup {
    PhoneDevices,
    TabletDevices,
    OperatingSystems,
    Browsers,
    Utilities,
}

impl RuleGroup {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "phone_devices" | "phone devices" => Some(Self::PhoneDevices),
            "tablet_devices" | "tablet devices" => Some(Self::TabletDevices),
            "operating_systems" | "operating systems" => Some(Self::OperatingSystems),
            "browsers" => Some(Self::Browsers),
            "utilities" => Some(Self::Utilities),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhoneDevices => "phone_devices",
            Self::TabletDevices => "tablet_devices",
            Self::OperatingSystems => "operating_systems",
            Self::Browsers => "browsers",
            Self::Utilities => "utilities",
        }
    }
}

/// A rule that can be reached by name or key.
#[derive(Debug)]
struct KeyedRule {
    name: String,
    pattern: String,
    group: RuleGroup,
}

/// Immutable, ordered rule tables.
///
/// Keys are assigned in scan order over the combined detection table (phone
/// devices, operating systems, browsers) and then over `utilities`. Tablet
/// rules are only ever scanned as a group, so they carry no key.
pub struct RuleSet {
    phone_devices: RuleMap,
    tablet_devices: RuleMap,
    operating_systems: RuleMap,
    browsers: RuleMap,
    utilities: RuleMap,
    keyed: Vec<KeyedRule>,
    /// Number of leading `keyed` entries that form the combined detection table.
    combined_len: usize,
    /// Lower-cased name → key. First occurrence wins.
    by_name: HashMap<String, RuleKey>,
    headers: HeaderClassifier,
}

impl RuleSet {
    /// The built-in rule database, parsed and validated once per process.
    ///
    /// # Panics
    ///
    /// If the embedded database does not load, which means the crate itself
    /// was built with corrupt rule data.
    pub fn shared() -> Arc<RuleSet> {
        DEFAULT_RULE_SET
            .get_or_init(|| match RuleSet::from_yaml_str(DEFAULT_RULES) {
                Ok(rules) => Arc::new(rules),
                Err(err) => panic!("embedded rule database failed to load: {}", err),
            })
            .clone()
    }

    /// Load a rule database document from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: RuleFile = serde_yaml::from_str(yaml)?;
        Self::build(file)
    }

    /// Load a rule database document from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(load_yaml(path.as_ref())?)
    }

    fn build(file: RuleFile) -> Result<Self> {
        let t = Instant::now();
        let RuleFile {
            phone_devices,
            tablet_devices,
            operating_systems,
            browsers,
            utilities,
        } = file;

        // Every pattern must compile now so that queries never have to fail.
        let all: Vec<(&String, &String)> = phone_devices
            .iter()
            .chain(tablet_devices.iter())
            .chain(operating_systems.iter())
            .chain(browsers.iter())
            .chain(utilities.iter())
            .collect();
        let fancy = all
            .par_iter()
            .map(|(name, pattern)| {
                compile_full(&full_pattern(pattern))
                    .map(|compiled| compiled.is_fancy())
                    .map_err(|err| match err {
                        Error::Regex(source) => Error::InvalidRule {
                            name: name.to_string(),
                            source,
                        },
                        other => other,
                    })
            })
            .collect::<Result<Vec<bool>>>()?
            .into_iter()
            .filter(|&is_fancy| is_fancy)
            .count();

        let mut keyed = Vec::new();
        for (group, map) in [
            (RuleGroup::PhoneDevices, &phone_devices),
            (RuleGroup::OperatingSystems, &operating_systems),
            (RuleGroup::Browsers, &browsers),
            (RuleGroup::Utilities, &utilities),
        ] {
            keyed.extend(map.iter().map(|(name, pattern)| KeyedRule {
                name: name.clone(),
                pattern: pattern.clone(),
                group,
            }));
        }
        let combined_len = phone_devices.len() + operating_systems.len() + browsers.len();

        let mut by_name = HashMap::with_capacity(keyed.len());
        for (idx, rule) in keyed.iter().enumerate() {
            let key = u16::try_from(idx)
                .map(RuleKey)
                .map_err(|_| Error::TooManyRules(keyed.len()))?;
            by_name.entry(rule.name.to_lowercase()).or_insert(key);
        }

        debug!(
            phone_devices = phone_devices.len(),
            tablet_devices = tablet_devices.len(),
            operating_systems = operating_systems.len(),
            browsers = browsers.len(),
            utilities = utilities.len(),
            fancy,
            elapsed = ?t.elapsed(),
            "rule set loaded"
        );

        Ok(Self {
            phone_devices,
            tablet_devices,
            operating_systems,
            browsers,
            utilities,
            keyed,
            combined_len,
            by_name,
            headers: HeaderClassifier::build()?,
        })
    }

    pub fn group(&self, group: RuleGroup) -> &IndexMap<String, String> {
        match group {
            RuleGroup::PhoneDevices => &self.phone_devices,
            RuleGroup::TabletDevices => &self.tablet_devices,
            RuleGroup::OperatingSystems => &self.operating_systems,
            RuleGroup::Browsers => &self.browsers,
            RuleGroup::Utilities => &self.utilities,
        }
    }

    pub fn phone_devices(&self) -> &IndexMap<String, String> {
        &self.phone_devices
    }

    pub fn tablet_devices(&self) -> &IndexMap<String, String> {
        &self.tablet_devices
    }

    pub fn operating_systems(&self) -> &IndexMap<String, String> {
        &self.operating_systems
    }

    pub fn browsers(&self) -> &IndexMap<String, String> {
        &self.browsers
    }

    pub fn utilities(&self) -> &IndexMap<String, String> {
        &self.utilities
    }

    /// The combined detection table in scan order: phone devices, then
    /// operating systems, then browsers.
    pub fn combined(&self) -> impl Iterator<Item = (RuleKey, &str, &str)> + '_ {
        self.keyed[..self.combined_len]
            .iter()
            .enumerate()
            .map(|(idx, rule)| (RuleKey(idx as u16), rule.name.as_str(), rule.pattern.as_str()))
    }

    pub fn combined_len(&self) -> usize {
        self.combined_len
    }

    /// Resolve a rule name, ignoring case.
    pub fn key(&self, name: &str) -> Option<RuleKey> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    pub fn name(&self, key: RuleKey) -> Option<&str> {
        self.keyed.get(key.0 as usize).map(|rule| rule.name.as_str())
    }

    pub fn pattern(&self, key: RuleKey) -> Option<&str> {
        self.keyed.get(key.0 as usize).map(|rule| rule.pattern.as_str())
    }

    /// Which group a key belongs to.
    pub fn key_group(&self, key: RuleKey) -> Option<RuleGroup> {
        self.keyed.get(key.0 as usize).map(|rule| rule.group)
    }

    pub(crate) fn header_classifier(&self) -> &HeaderClassifier {
        &self.headers
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("phone_devices", &self.phone_devices.len())
            .field("tablet_devices", &self.tablet_devices.len())
            .field("operating_systems", &self.operating_systems.len())
            .field("browsers", &self.browsers.len())
            .field("utilities", &self.utilities.len())
            .finish()
    }
}

fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}
