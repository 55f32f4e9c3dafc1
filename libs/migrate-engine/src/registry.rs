use std::collections::BTreeMap;

use migrate_api::{MigrationRule, Version};

use crate::chain::RuleChain;
use crate::error::EngineError;

/// Every migration rule known to the process, keyed by version.
///
/// Built once at startup and passed by reference to whatever selects or
/// applies chains. Immutable after construction.
pub struct RuleRegistry {
    rules: BTreeMap<Version, Box<dyn MigrationRule>>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.rules.iter().map(|(v, r)| (v, r.name())))
            .finish()
    }
}

impl RuleRegistry {
    /// Build a registry. Fails if two rules share a version or a rule
    /// declares version 0.
    pub fn new<I>(rules: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = Box<dyn MigrationRule>>,
    {
        let mut map: BTreeMap<Version, Box<dyn MigrationRule>> = BTreeMap::new();
        for rule in rules {
            let version = rule.version();
            if version == 0 {
                return Err(EngineError::InvalidVersion {
                    name: rule.name().to_string(),
                });
            }
            if let Some(existing) = map.get(&version) {
                return Err(EngineError::DuplicateVersion {
                    version,
                    first: existing.name().to_string(),
                    second: rule.name().to_string(),
                });
            }
            map.insert(version, rule);
        }
        tracing::debug!(rules = map.len(), "rule registry built");
        Ok(Self { rules: map })
    }

    /// All registered versions, ascending.
    pub fn versions(&self) -> Vec<Version> {
        self.rules.keys().copied().collect()
    }

    pub fn rule_for(&self, version: Version) -> Option<&dyn MigrationRule> {
        self.rules.get(&version).map(|r| r.as_ref())
    }

    /// Highest registered version.
    pub fn latest(&self) -> Option<Version> {
        self.rules.keys().next_back().copied()
    }

    /// Rules in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn MigrationRule> + '_ {
        self.rules.values().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules with `from < version <= to`, ascending.
    ///
    /// An empty chain means the stream needs no migration. `to < from`
    /// is an error.
    pub fn select_chain(&self, from: Version, to: Version) -> Result<RuleChain<'_>, EngineError> {
        if to < from {
            return Err(EngineError::InvalidRange { from, to });
        }
        let rules = if from == to {
            Vec::new()
        } else {
            self.rules
                .range(from + 1..=to)
                .map(|(_, r)| r.as_ref())
                .collect()
        };
        Ok(RuleChain::new(from, to, rules))
    }
}
