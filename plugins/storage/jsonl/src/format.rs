use migrate_api::{Message, Record};

// ════════════════════════════════════════════════════════════════
//  On-disk record format
// ════════════════════════════════════════════════════════════════

/// Одна строка контейнера: `{"ts_ns":..,"topic":"..","message":{..}}`.
#[derive(serde::Deserialize)]
pub(crate) struct DiskRecord {
    pub ts_ns: i64,
    pub topic: String,
    pub message: Message,
}

impl From<DiskRecord> for Record {
    fn from(d: DiskRecord) -> Self {
        Record {
            ts_ns: d.ts_ns,
            topic: d.topic,
            message: d.message,
        }
    }
}

/// Заимствующая форма для записи, без клонирования сообщений.
#[derive(serde::Serialize)]
pub(crate) struct DiskRecordRef<'a> {
    pub ts_ns: i64,
    pub topic: &'a str,
    pub message: &'a Message,
}
