/// Почему правило не смогло обработать сообщение.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Payload не разбирается: битый JSON или формат не `json`.
    Format,
    /// JSON разобран, но в нём нет полей, которых ждёт правило.
    Schema,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Format => f.write_str("malformed payload"),
            ErrorKind::Schema => f.write_str("unexpected schema"),
        }
    }
}

/// Ошибка [`MigrationRule::migrate`](crate::MigrationRule::migrate).
///
/// Топик и версию правила добавляет движок, сюда кладётся только суть.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleError {
    kind: ErrorKind,
    message: String,
}

impl RuleError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Format, message: msg.into() }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Schema, message: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Префикс `"{ctx}: "` к сообщению, вид ошибки сохраняется.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl std::fmt::Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RuleError {}

impl From<serde_json::Error> for RuleError {
    fn from(e: serde_json::Error) -> Self {
        // is_data: синтаксис верный, не совпала структура.
        if e.is_data() {
            Self::schema(e.to_string())
        } else {
            Self::malformed(e.to_string())
        }
    }
}
