use migrate_api::{keep, single, Message, MigrationRule, RuleError, RuleOutput, Version};

use crate::geometry::{LegacyPose, StringMsg};

/// Топики, которые переименовывает [`ExampleRule::Rename`]: (старый, новый).
pub const RENAMED_TOPICS: &[(&str, &str)] = &[("/test/topic", "/rename/topic")];

/// Топики, чей строковый payload [`ExampleRule::UpdateMsg`] превращает в позу.
pub const UPDATED_TOPICS: &[&str] = &["/test/upd_msg"];

/// Топики, которые [`ExampleRule::SplitMsg`] делит на `<topic>/pose` и `<topic>/orient`.
pub const SPLIT_TOPICS: &[&str] = &["/test/split"];

/// Поставляемые правила, по одному на версию схемы.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleRule {
    /// v1: переименование топиков из [`RENAMED_TOPICS`].
    Rename,
    /// v2: JSON внутри строки заменяется на `Pose` в том же топике.
    UpdateMsg,
    /// v3: JSON внутри строки делится на `Point` и `Quaternion`.
    SplitMsg,
}

impl ExampleRule {
    pub const ALL: [ExampleRule; 3] = [ExampleRule::Rename, ExampleRule::UpdateMsg, ExampleRule::SplitMsg];

    /// Описание в одну строку для `rules`.
    pub fn describe(&self) -> &'static str {
        match self {
            ExampleRule::Rename => "rename /test/topic to /rename/topic",
            ExampleRule::UpdateMsg => "convert /test/upd_msg string payload to Pose",
            ExampleRule::SplitMsg => "split /test/split into /pose (Point) and /orient (Quaternion)",
        }
    }
}

impl MigrationRule for ExampleRule {
    fn version(&self) -> Version {
        match self {
            ExampleRule::Rename => 1,
            ExampleRule::UpdateMsg => 2,
            ExampleRule::SplitMsg => 3,
        }
    }

    fn name(&self) -> &str {
        match self {
            ExampleRule::Rename => "example-rename",
            ExampleRule::UpdateMsg => "example-update-msg",
            ExampleRule::SplitMsg => "example-split-msg",
        }
    }

    fn migrate(&self, topic: &str, message: &Message) -> Result<RuleOutput, RuleError> {
        match self {
            ExampleRule::Rename => {
                let target = RENAMED_TOPICS
                    .iter()
                    .find(|(from, _)| *from == topic)
                    .map(|(_, to)| *to)
                    .unwrap_or(topic);
                Ok(single(target, message.clone()))
            }
            ExampleRule::UpdateMsg => {
                if !UPDATED_TOPICS.contains(&topic) {
                    return Ok(keep(topic, message));
                }
                let legacy = legacy_pose(message).map_err(|e| e.with_context(topic))?;
                Ok(single(topic, Message::encode(&legacy.to_pose())?))
            }
            ExampleRule::SplitMsg => {
                if !SPLIT_TOPICS.contains(&topic) {
                    return Ok(keep(topic, message));
                }
                let legacy = legacy_pose(message).map_err(|e| e.with_context(topic))?;
                let mut out = RuleOutput::with_capacity(2);
                out.insert(format!("{topic}/pose"), Message::encode(&legacy.pose)?);
                out.insert(format!("{topic}/orient"), Message::encode(&legacy.orient)?);
                Ok(out)
            }
        }
    }
}

/// Разобрать `{"data": "<json>"}` и документ позы внутри.
fn legacy_pose(message: &Message) -> Result<LegacyPose, RuleError> {
    let wrapper: StringMsg = message.decode()?;
    Ok(serde_json::from_str(&wrapper.data)?)
}
