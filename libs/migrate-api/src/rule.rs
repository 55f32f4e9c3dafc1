use indexmap::IndexMap;

use crate::error::RuleError;
use crate::message::Message;

/// Версия схемы, *в которую* переводит правило. Только положительные.
pub type Version = u32;

/// Результат одного вызова правила: топик → сообщение, в порядке выдачи.
pub type RuleOutput = IndexMap<String, Message>;

/// Правило миграции для одной версии схемы.
///
/// Движок вызывает [`migrate`](MigrationRule::migrate) по одному разу для
/// каждого топика, который был в рабочем наборе записи на момент старта
/// правила. Результат целиком решает судьбу топика:
///
/// - `{topic: message}` без изменений оставляет топик как есть. Для всех
///   топиков, которые правило не мигрирует, нужно вернуть именно это.
/// - `{other: message}` переименовывает топик.
/// - `{a: .., b: ..}` расщепляет его; оба топика видны следующим правилам.
/// - Результат без `topic` удаляет топик. Это не ошибка: правило, которое
///   не вернуло входной топик, убирает его из выхода.
///
/// Правила чистые: один и тот же `(topic, message)` всегда даёт один и тот
/// же результат, независимо от предыдущих вызовов.
pub trait MigrationRule: Send + Sync {
    /// Версия, в которую переводит правило. Уникальна в реестре.
    fn version(&self) -> Version;

    /// Короткое имя для логов.
    fn name(&self) -> &str;

    fn migrate(&self, topic: &str, message: &Message) -> Result<RuleOutput, RuleError>;
}

/// Результат, оставляющий `topic` с `message` без изменений.
pub fn keep(topic: &str, message: &Message) -> RuleOutput {
    single(topic, message.clone())
}

/// Результат ровно из одной пары.
pub fn single(topic: impl Into<String>, message: Message) -> RuleOutput {
    let mut out = RuleOutput::with_capacity(1);
    out.insert(topic.into(), message);
    out
}
