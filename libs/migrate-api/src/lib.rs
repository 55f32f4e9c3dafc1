//! Общие типы миграции записанных потоков: сообщения, записи и контракт
//! правила, которое вызывает движок.

pub mod error;
pub mod message;
pub mod record;
pub mod rule;

pub use error::{ErrorKind, RuleError};
pub use message::{DataFormat, Message};
pub use record::Record;
pub use rule::{keep, single, MigrationRule, RuleOutput, Version};
