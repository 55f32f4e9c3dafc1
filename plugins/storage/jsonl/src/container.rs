use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use migrate_api::{Message, Record};
use migrate_engine::{BoxError, RecordSink};

use crate::error::ContainerError;
use crate::format::{DiskRecord, DiskRecordRef};

// ════════════════════════════════════════════════════════════════
//  JsonlReader
// ════════════════════════════════════════════════════════════════

/// Ленивое чтение JSONL-контейнера.
///
/// Записи отдаются в порядке файла. Пустые строки пропускаются; битая
/// строка даёт ошибку с номером строки (с 1).
pub struct JsonlReader {
    path: PathBuf,
    lines: std::io::Lines<BufReader<File>>,
    line_no: u64,
}

impl JsonlReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
        let path = path.as_ref().to_path_buf();
        let f = File::open(&path).map_err(|source| ContainerError::Io {
            context: "open",
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            lines: BufReader::new(f).lines(),
            line_no: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_line(&self, line: &str) -> Result<Record, ContainerError> {
        let dr: DiskRecord = serde_json::from_str(line).map_err(|source| ContainerError::Parse {
            path: self.path.clone(),
            line: self.line_no,
            source,
        })?;
        Ok(dr.into())
    }
}

impl Iterator for JsonlReader {
    type Item = Result<Record, ContainerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(ContainerError::Io {
                        context: "read line from",
                        path: self.path.clone(),
                        source,
                    }));
                }
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_line(&line));
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  JsonlWriter
// ════════════════════════════════════════════════════════════════

/// Запись JSONL-контейнера, только дописывание.
///
/// Записи идут в порядке вызовов. Чтобы сбросить буфер и сделать fsync,
/// нужно вызвать [`finish`](JsonlWriter::finish).
pub struct JsonlWriter {
    path: PathBuf,
    out: BufWriter<File>,
    written: u64,
}

impl JsonlWriter {
    /// Создать (или обнулить) контейнер по `path`, создав родительские
    /// каталоги при необходимости.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ContainerError::Io {
                context: "create directory for",
                path: path.clone(),
                source,
            })?;
        }
        let f = File::create(&path).map_err(|source| ContainerError::Io {
            context: "create",
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            out: BufWriter::new(f),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Сколько записей уже записано.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn append(&mut self, topic: &str, message: &Message, ts_ns: i64) -> Result<(), ContainerError> {
        let line = serde_json::to_string(&DiskRecordRef { ts_ns, topic, message }).map_err(|source| {
            ContainerError::Encode {
                path: self.path.clone(),
                source,
            }
        })?;
        writeln!(self.out, "{line}").map_err(|source| ContainerError::Io {
            context: "write",
            path: self.path.clone(),
            source,
        })?;
        self.written += 1;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), ContainerError> {
        self.out.flush().map_err(|source| ContainerError::Io {
            context: "flush",
            path: self.path.clone(),
            source,
        })?;
        self.out.get_ref().sync_all().map_err(|source| ContainerError::Io {
            context: "sync",
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), records = self.written, "container finished");
        Ok(())
    }
}

impl RecordSink for JsonlWriter {
    fn write(&mut self, topic: &str, message: &Message, ts_ns: i64) -> Result<(), BoxError> {
        Ok(self.append(topic, message, ts_ns)?)
    }

    fn finish(&mut self) -> Result<(), BoxError> {
        Ok(JsonlWriter::finish(self)?)
    }
}
