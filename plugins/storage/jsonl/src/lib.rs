//! Контейнер записанного потока в формате JSONL.
//!
//! Каждая строка хранит одну запись: `ts_ns`, `topic` и конверт сообщения
//! (`{"format":"json","data":..}` или `{"format":"raw","data":"<base64>"}`).

mod container;
mod error;
mod format;

pub use container::{JsonlReader, JsonlWriter};
pub use error::ContainerError;
