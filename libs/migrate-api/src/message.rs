use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::RuleError;

/// Заявленная кодировка payload в [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    #[default]
    Json,
    Raw,
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Json => write!(f, "json"),
            DataFormat::Raw => write!(f, "raw"),
        }
    }
}

/// Непрозрачный payload сообщения с заявленным форматом.
///
/// Движок переносит сообщения между топиками, не заглядывая внутрь.
/// Декодируют их только правила и только для своих топиков.
/// JSON хранится байт в байт: порядок ключей и запись чисел сохраняются.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    bytes: Vec<u8>,
    format: DataFormat,
}

impl Message {
    pub fn new(bytes: Vec<u8>, format: DataFormat) -> Self {
        Self { bytes, format }
    }

    /// Бинарный (не JSON) payload.
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes.into(), DataFormat::Raw)
    }

    /// JSON-сообщение из `serde_json::Value`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, RuleError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self { bytes, format: DataFormat::Json })
    }

    /// JSON-сообщение из любого сериализуемого значения.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, RuleError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self { bytes, format: DataFormat::Json })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Разобрать как JSON. Ошибка, если формат не `json`.
    pub fn as_json(&self) -> Result<serde_json::Value, RuleError> {
        self.decode()
    }

    /// Десериализовать JSON payload в `T`.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, RuleError> {
        if self.format != DataFormat::Json {
            return Err(RuleError::malformed(format!(
                "message format is {}, not json",
                self.format
            )));
        }
        Ok(serde_json::from_slice(&self.bytes)?)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Serialize for Message {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Message", 2)?;
        s.serialize_field("format", &self.format)?;
        match self.format {
            DataFormat::Json => {
                // Байты пишутся как есть: порядок ключей и запись чисел не меняются.
                let raw: &RawValue =
                    serde_json::from_slice(&self.bytes).map_err(serde::ser::Error::custom)?;
                s.serialize_field("data", raw)?;
            }
            DataFormat::Raw => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
                s.serialize_field("data", &encoded)?;
            }
        }
        s.end()
    }
}

/// Конверт `{"format": .., "data": ..}` без разбора содержимого.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    format: Box<RawValue>,
    data: Box<RawValue>,
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Допустимые формы:
        // 1. {"format":"json","data":{...}}  inline JSON
        // 2. {"format":"raw","data":"base64..."}
        // 3. любое другое JSON-значение целиком
        let raw = Box::<RawValue>::deserialize(deserializer)?;

        let Ok(envelope) = serde_json::from_str::<Envelope>(raw.get()) else {
            return Ok(Message::new(raw.get().as_bytes().to_vec(), DataFormat::Json));
        };

        let format: DataFormat =
            serde_json::from_str(envelope.format.get()).map_err(serde::de::Error::custom)?;
        match format {
            DataFormat::Json => Ok(Message::new(
                envelope.data.get().as_bytes().to_vec(),
                DataFormat::Json,
            )),
            DataFormat::Raw => {
                let b64: String = serde_json::from_str(envelope.data.get()).map_err(|_| {
                    serde::de::Error::custom("expected base64 string for raw message")
                })?;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(b64)
                    .map_err(serde::de::Error::custom)?;
                Ok(Message::new(bytes, DataFormat::Raw))
            }
        }
    }
}
