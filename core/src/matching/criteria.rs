//! Match criteria: what an entity must look like to count for an objective

use std::fmt;
use std::sync::Arc;

use hashbrown::HashSet;
use markers_types::CriteriaConfig;

/// Case-insensitive classification name ("container", "npc", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormKind(Arc<str>);

impl FormKind {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name.trim().to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FormKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Required entity properties. Empty sets and unset flags match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCriteria {
    /// Allowed entity classifications
    pub form_kinds: HashSet<FormKind>,
    /// Entity must hold at least one visible item
    pub non_empty_inventory: bool,
    /// Entity must be dead
    pub is_dead: bool,
    /// Allowed base template classifications
    pub base_form_kinds: HashSet<FormKind>,
}

impl MatchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form_kinds<'a>(mut self, kinds: impl IntoIterator<Item = &'a str>) -> Self {
        self.form_kinds.extend(kinds.into_iter().map(FormKind::new));
        self
    }

    pub fn with_base_form_kinds<'a>(mut self, kinds: impl IntoIterator<Item = &'a str>) -> Self {
        self.base_form_kinds.extend(kinds.into_iter().map(FormKind::new));
        self
    }

    pub fn requiring_inventory(mut self) -> Self {
        self.non_empty_inventory = true;
        self
    }

    pub fn requiring_dead(mut self) -> Self {
        self.is_dead = true;
        self
    }

    /// True when no field constrains anything
    pub fn is_wildcard(&self) -> bool {
        self.form_kinds.is_empty()
            && self.base_form_kinds.is_empty()
            && !self.non_empty_inventory
            && !self.is_dead
    }

    pub fn allows_kind(&self, kind: Option<&FormKind>) -> bool {
        self.form_kinds.is_empty() || kind.is_some_and(|k| self.form_kinds.contains(k))
    }

    pub fn allows_base_kind(&self, kind: Option<&FormKind>) -> bool {
        self.base_form_kinds.is_empty() || kind.is_some_and(|k| self.base_form_kinds.contains(k))
    }
}

impl From<&CriteriaConfig> for MatchCriteria {
    fn from(config: &CriteriaConfig) -> Self {
        Self {
            form_kinds: config.form_types.iter().map(|s| FormKind::new(s)).collect(),
            non_empty_inventory: config.non_empty_inventory,
            is_dead: config.is_dead,
            base_form_kinds: config.base_form_types.iter().map(|s| FormKind::new(s)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_kind_is_case_insensitive() {
        assert_eq!(FormKind::new("Container"), FormKind::new(" CONTAINER "));
        assert_eq!(FormKind::from("NPC_").as_str(), "npc_");
    }

    #[test]
    fn test_empty_sets_are_wildcards() {
        let criteria = MatchCriteria::new();
        assert!(criteria.is_wildcard());
        assert!(criteria.allows_kind(None));
        assert!(criteria.allows_base_kind(Some(&FormKind::new("anything"))));
    }

    #[test]
    fn test_non_empty_set_requires_membership() {
        let criteria = MatchCriteria::new().with_form_kinds(["container"]);
        assert!(!criteria.is_wildcard());
        assert!(criteria.allows_kind(Some(&FormKind::new("Container"))));
        assert!(!criteria.allows_kind(Some(&FormKind::new("npc"))));
        assert!(!criteria.allows_kind(None));
    }

    #[test]
    fn test_from_config() {
        let config = CriteriaConfig {
            form_types: vec!["NPC".to_string()],
            base_form_types: vec![],
            non_empty_inventory: true,
            is_dead: true,
        };
        let criteria = MatchCriteria::from(&config);
        assert!(criteria.form_kinds.contains(&FormKind::new("npc")));
        assert!(criteria.base_form_kinds.is_empty());
        assert!(criteria.non_empty_inventory);
        assert!(criteria.is_dead);
    }
}
