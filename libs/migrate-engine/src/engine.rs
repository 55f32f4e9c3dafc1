use indexmap::IndexMap;

use migrate_api::{Message, MigrationRule, Record, RuleOutput};

use crate::chain::RuleChain;
use crate::error::EngineError;

// ═══════════════════════════════════════════════════════════════
//  WorkingSet
// ═══════════════════════════════════════════════════════════════

/// Topics that exist for one record while its rule chain is applied.
///
/// Insertion-ordered; the order is the order outputs are written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingSet {
    entries: IndexMap<String, Message>,
}

impl WorkingSet {
    /// Working set holding only the input topic.
    pub fn seed(topic: impl Into<String>, message: Message) -> Self {
        let mut entries = IndexMap::with_capacity(1);
        entries.insert(topic.into(), message);
        Self { entries }
    }

    pub fn get(&self, topic: &str) -> Option<&Message> {
        self.entries.get(topic)
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.entries.contains_key(topic)
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Message)> + '_ {
        self.entries.iter().map(|(t, m)| (t.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pair every entry with `ts_ns`, in working-set order.
    pub fn into_records(self, ts_ns: i64) -> Vec<Record> {
        self.entries
            .into_iter()
            .map(|(topic, message)| Record { ts_ns, topic, message })
            .collect()
    }

    /// Apply one rule to every topic present when the rule starts.
    ///
    /// Topics the rule creates are not fed back into the same rule; the
    /// next rule in the chain sees them.
    pub fn apply(&mut self, rule: &dyn MigrationRule) -> Result<(), EngineError> {
        let snapshot: Vec<(String, Message)> = self
            .entries
            .iter()
            .map(|(t, m)| (t.clone(), m.clone()))
            .collect();

        for (topic, message) in snapshot {
            let output = rule
                .migrate(&topic, &message)
                .map_err(|cause| EngineError::RuleFailure {
                    version: rule.version(),
                    topic: topic.clone(),
                    cause,
                })?;

            if !output.contains_key(&topic) {
                tracing::trace!(
                    rule = rule.name(),
                    version = rule.version(),
                    topic = %topic,
                    outputs = output.len(),
                    "topic replaced"
                );
            }
            self.merge(&topic, output);
        }
        Ok(())
    }

    /// The rule's output for `source_topic` wins: it decides every key it
    /// contains. Every other existing topic is carried forward after it;
    /// `source_topic` itself survives only if the output re-emits it.
    ///
    /// Output entries go first, so a visited topic moves to the front.
    fn merge(&mut self, source_topic: &str, output: RuleOutput) {
        let mut merged = output;
        for (topic, message) in self.entries.drain(..) {
            if topic != source_topic && !merged.contains_key(&topic) {
                merged.insert(topic, message);
            }
        }
        self.entries = merged;
    }
}

// ═══════════════════════════════════════════════════════════════
//  MigrationEngine
// ═══════════════════════════════════════════════════════════════

/// Applies one rule chain to records, one record at a time.
///
/// Holds no state between records.
#[derive(Debug, Clone)]
pub struct MigrationEngine<'a> {
    chain: RuleChain<'a>,
}

impl<'a> MigrationEngine<'a> {
    pub fn new(chain: RuleChain<'a>) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &RuleChain<'a> {
        &self.chain
    }

    /// Run the chain over a single (topic, message) and return the final
    /// working set.
    pub fn migrate_message(&self, topic: &str, message: &Message) -> Result<WorkingSet, EngineError> {
        let mut working = WorkingSet::seed(topic, message.clone());
        for rule in self.chain.rules() {
            working.apply(*rule)?;
        }
        Ok(working)
    }

    /// Every output record of `record`, stamped with its timestamp.
    ///
    /// The full output is computed before anything is returned, so a rule
    /// failure never yields a partial set.
    pub fn migrate(&self, record: &Record) -> Result<Vec<Record>, EngineError> {
        let working = self.migrate_message(&record.topic, &record.message)?;
        Ok(working.into_records(record.ts_ns))
    }
}
