use migrate_api::{MigrationRule, Version};

/// Ordered rules applicable between two versions, ascending by version.
///
/// Borrowed from a [`RuleRegistry`](crate::RuleRegistry); immutable once
/// selected.
#[derive(Clone)]
pub struct RuleChain<'a> {
    from: Version,
    to: Version,
    rules: Vec<&'a dyn MigrationRule>,
}

impl std::fmt::Debug for RuleChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleChain")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("versions", &self.versions())
            .finish()
    }
}

impl<'a> RuleChain<'a> {
    pub(crate) fn new(from: Version, to: Version, rules: Vec<&'a dyn MigrationRule>) -> Self {
        Self { from, to, rules }
    }

    /// Chain made of exactly `rules`, in the given order.
    ///
    /// Useful for applying hand-picked rules; callers are responsible for
    /// passing them in ascending version order.
    pub fn from_rules(rules: Vec<&'a dyn MigrationRule>) -> Self {
        let from = rules.first().map(|r| r.version().saturating_sub(1)).unwrap_or(0);
        let to = rules.last().map(|r| r.version()).unwrap_or(from);
        Self { from, to, rules }
    }

    pub fn from_version(&self) -> Version {
        self.from
    }

    pub fn to_version(&self) -> Version {
        self.to
    }

    pub fn versions(&self) -> Vec<Version> {
        self.rules.iter().map(|r| r.version()).collect()
    }

    pub fn rules(&self) -> &[&'a dyn MigrationRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
