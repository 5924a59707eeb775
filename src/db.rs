use indexmap::IndexMap;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Rule database  (regexes/rules.yml)
//
// Format: one top-level mapping per group,  rule_name → regex_fragment
// ---------------------------------------------------------------------------

/// One rule group. Uses IndexMap to preserve YAML insertion order, which is
/// both the scan order and the key-assignment order.
pub(crate) type RuleMap = IndexMap<String, String>;

/// Raw deserialization target for a rule database document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RuleFile {
    pub phone_devices: RuleMap,
    pub tablet_devices: RuleMap,
    pub operating_systems: RuleMap,
    pub browsers: RuleMap,
    #[serde(default)]
    pub utilities: RuleMap,
}
