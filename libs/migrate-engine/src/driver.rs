use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use migrate_api::{Message, Record};

use crate::engine::MigrationEngine;
use crate::error::{BoxError, DriverError};

// ═══════════════════════════════════════════════════════════════
//  Collaborator traits
// ═══════════════════════════════════════════════════════════════

/// Упорядоченная конечная последовательность записей, читается один раз.
///
/// Любой итератор `Result<Record, E>` подходит как источник.
pub trait RecordSource {
    fn next_record(&mut self) -> Option<Result<Record, BoxError>>;
}

impl<I, E> RecordSource for I
where
    I: Iterator<Item = Result<Record, E>>,
    E: Into<BoxError>,
{
    fn next_record(&mut self) -> Option<Result<Record, BoxError>> {
        self.next().map(|r| r.map_err(Into::into))
    }
}

/// Приёмник мигрированных сообщений. Порядок вызовов `write` сохраняется.
pub trait RecordSink {
    fn write(&mut self, topic: &str, message: &Message, ts_ns: i64) -> Result<(), BoxError>;

    /// Сбросить буферы и завершить. Вызывает владелец один раз после конца
    /// потока; драйвер его не вызывает.
    fn finish(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl RecordSink for Vec<Record> {
    fn write(&mut self, topic: &str, message: &Message, ts_ns: i64) -> Result<(), BoxError> {
        self.push(Record::new(topic, message.clone(), ts_ns));
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Failure policy
// ═══════════════════════════════════════════════════════════════

/// Что делать, если правило упало на записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Остановить текущий поток; остальные продолжают.
    #[default]
    AbortContainer,
    /// Залогировать и ничего не писать для этой записи.
    SkipRecord,
    /// Остановить текущий поток и все последующие.
    AbortRun,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::AbortContainer => f.write_str("abort-container"),
            FailurePolicy::SkipRecord => f.write_str("skip-record"),
            FailurePolicy::AbortRun => f.write_str("abort-run"),
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort-container" => Ok(FailurePolicy::AbortContainer),
            "skip-record" => Ok(FailurePolicy::SkipRecord),
            "abort-run" => Ok(FailurePolicy::AbortRun),
            other => Err(format!(
                "unknown failure policy '{other}' (expected abort-container, skip-record or abort-run)"
            )),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  StreamDriver
// ═══════════════════════════════════════════════════════════════

/// Счётчики одного потока.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveStats {
    pub records_in: u64,
    pub records_out: u64,
    pub skipped: u64,
}

/// Читает записи из источника, мигрирует каждую и пишет результат.
///
/// Записи обрабатываются строго по порядку. Весь выход записи вычисляется
/// до первой записи в приёмник; отмена проверяется только между записями.
#[derive(Debug)]
pub struct StreamDriver<'a> {
    engine: MigrationEngine<'a>,
    policy: FailurePolicy,
    token: Option<CancellationToken>,
}

impl<'a> StreamDriver<'a> {
    pub fn new(engine: MigrationEngine<'a>) -> Self {
        Self {
            engine,
            policy: FailurePolicy::default(),
            token: None,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn engine(&self) -> &MigrationEngine<'a> {
        &self.engine
    }

    pub fn run<S, W>(&self, source: &mut S, sink: &mut W) -> Result<DriveStats, DriverError>
    where
        S: RecordSource + ?Sized,
        W: RecordSink + ?Sized,
    {
        let mut stats = DriveStats::default();
        let mut index: u64 = 0;

        loop {
            if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
                return Err(DriverError::Cancelled { index });
            }

            let record = match source.next_record() {
                None => break,
                Some(Ok(record)) => record,
                Some(Err(cause)) => return Err(DriverError::Source { index, cause }),
            };
            stats.records_in += 1;

            let outputs = match self.engine.migrate(&record) {
                Ok(outputs) => outputs,
                Err(cause) => match self.policy {
                    FailurePolicy::SkipRecord => {
                        tracing::warn!(
                            index,
                            ts_ns = record.ts_ns,
                            topic = %record.topic,
                            error = %cause,
                            "skipping record"
                        );
                        stats.skipped += 1;
                        index += 1;
                        continue;
                    }
                    FailurePolicy::AbortContainer | FailurePolicy::AbortRun => {
                        return Err(DriverError::Rule {
                            index,
                            ts_ns: record.ts_ns,
                            cause,
                        });
                    }
                },
            };

            for out in &outputs {
                sink.write(&out.topic, &out.message, out.ts_ns)
                    .map_err(|cause| DriverError::Sink {
                        index,
                        ts_ns: record.ts_ns,
                        cause,
                    })?;
            }
            stats.records_out += outputs.len() as u64;
            index += 1;
        }

        Ok(stats)
    }
}
