use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Одна запись потока.
///
/// `ts_ns` проходит миграцию без изменений: все сообщения, полученные из
/// записи, пишутся с тем же временем.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Время в наносекундах (Unix epoch).
    pub ts_ns: i64,
    pub topic: String,
    pub message: Message,
}

impl Record {
    pub fn new(topic: impl Into<String>, message: Message, ts_ns: i64) -> Self {
        Self {
            ts_ns,
            topic: topic.into(),
            message,
        }
    }
}
