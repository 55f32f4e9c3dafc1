//! Правила миграции, поставляемые с `migrate-bag`, и типы сообщений,
//! которые они выдают.

pub mod geometry;
pub mod rules;

use migrate_api::MigrationRule;
use migrate_engine::{EngineError, RuleRegistry};

pub use rules::ExampleRule;

/// Реестр со всеми поставляемыми правилами.
pub fn registry() -> Result<RuleRegistry, EngineError> {
    RuleRegistry::new(
        ExampleRule::ALL
            .into_iter()
            .map(|r| Box::new(r) as Box<dyn MigrationRule>),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrate_api::{Message, Record};
    use migrate_engine::MigrationEngine;
    use serde_json::json;

    fn legacy(ts_ns: i64, topic: &str) -> Record {
        let inner = json!({
            "pose": {"x": 1.0, "y": 2.0, "z": 3.0},
            "orient": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0},
        });
        Record::new(topic, Message::from_json(&json!({"data": inner.to_string()})).unwrap(), ts_ns)
    }

    #[test]
    fn registry_holds_all_versions() {
        let reg = registry().unwrap();
        assert_eq!(reg.versions(), vec![1, 2, 3]);
    }

    #[test]
    fn full_chain_over_shipped_rules() {
        let reg = registry().unwrap();
        let engine = MigrationEngine::new(reg.select_chain(0, 3).unwrap());

        let out = engine.migrate(&legacy(9, "/test/split")).unwrap();
        let topics: Vec<&str> = out.iter().map(|r| r.topic.as_str()).collect();
        assert_eq!(topics, vec!["/test/split/pose", "/test/split/orient"]);
        assert!(out.iter().all(|r| r.ts_ns == 9));

        let out = engine.migrate(&legacy(1, "/test/topic")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].topic, "/rename/topic");
    }

    #[test]
    fn chain_from_v2_skips_rename() {
        let reg = registry().unwrap();
        let engine = MigrationEngine::new(reg.select_chain(2, 3).unwrap());
        assert_eq!(engine.chain().versions(), vec![3]);

        let out = engine.migrate(&legacy(1, "/test/topic")).unwrap();
        assert_eq!(out[0].topic, "/test/topic");
    }
}
