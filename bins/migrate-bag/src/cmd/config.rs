use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use migrate_engine::FailurePolicy;

use super::error::MigrateBagError;

// ═══════════════════════════════════════════════════════════════
//  CLI
// ═══════════════════════════════════════════════════════════════

#[derive(Parser)]
#[command(name = "migrate-bag", version, about = "Миграция записанных потоков между версиями схемы")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Мигрировать все контейнеры из указанных источников
    Migrate(MigrateArgs),
    /// Список правил или цепочка для диапазона версий
    Rules(RulesArgs),
}

#[derive(Args, Clone, Debug)]
pub struct MigrateArgs {
    /// Каталоги с контейнерами или файлы контейнеров
    pub sources: Vec<PathBuf>,

    /// Каталог для мигрированных контейнеров
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Каталог для исходных контейнеров (`<name>.bak`)
    #[arg(long)]
    pub output_backup: Option<PathBuf>,

    /// Временный каталог, где контейнер пишется до завершения
    #[arg(long)]
    pub tmp_dir: Option<PathBuf>,

    /// Версия схемы исходных контейнеров, например 1
    #[arg(long)]
    pub bag_version: Option<u32>,

    /// Целевая версия схемы, например 3
    #[arg(long)]
    pub migrate_version: Option<u32>,

    /// Сколько контейнеров мигрировать параллельно
    #[arg(long)]
    pub jobs: Option<usize>,

    /// abort-container, skip-record или abort-run
    #[arg(long)]
    pub on_rule_failure: Option<FailurePolicy>,

    /// Расширение файлов контейнеров
    #[arg(long)]
    pub extension: Option<String>,

    /// Путь к необязательному TOML-конфигу
    #[arg(long, default_value = "migrate-bag.toml", env = "MIGRATE_BAG_CONFIG")]
    pub config: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct RulesArgs {
    /// Цепочка, начиная после этой версии
    #[arg(long)]
    pub from: Option<u32>,

    /// Цепочка до этой версии (по умолчанию последняя)
    #[arg(long)]
    pub to: Option<u32>,
}

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub output_backup: Option<PathBuf>,
    pub tmp_dir: Option<PathBuf>,
    pub bag_version: Option<u32>,
    pub migrate_version: Option<u32>,
    pub jobs: Option<usize>,
    pub on_rule_failure: Option<FailurePolicy>,
    pub extension: Option<String>,
}

impl FileConfig {
    pub fn load(path: &std::path::Path) -> Result<Self, MigrateBagError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MigrateBagError::config("read", format!("'{}': {e}", path.display())))?;
        Self::parse(&content)
            .map_err(|e| MigrateBagError::config("parse", format!("'{}': {e}", path.display())))
    }

    pub fn parse(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Effective (merged config)
// ═══════════════════════════════════════════════════════════════

fn default_extension() -> String {
    "jsonl".into()
}

/// Итоговые настройки после слияния: config file < env/CLI.
#[derive(Debug, Clone)]
pub struct Effective {
    pub sources: Vec<PathBuf>,
    pub output: PathBuf,
    pub output_backup: PathBuf,
    pub tmp_dir: PathBuf,
    pub bag_version: u32,
    pub migrate_version: u32,
    pub jobs: usize,
    pub on_rule_failure: FailurePolicy,
    pub extension: String,
}

impl Effective {
    pub fn new(args: &MigrateArgs) -> Result<Self, MigrateBagError> {
        // Отсутствующий конфиг допустим, битый нет.
        let cfg = if args.config.exists() {
            FileConfig::load(&args.config)?
        } else {
            FileConfig::default()
        };
        Self::merge(args, cfg)
    }

    pub fn merge(args: &MigrateArgs, cfg: FileConfig) -> Result<Self, MigrateBagError> {
        let sources = if args.sources.is_empty() { cfg.sources } else { args.sources.clone() };
        if sources.is_empty() {
            return Err(MigrateBagError::config("args", "at least one source is required"));
        }

        let jobs = args.jobs.or(cfg.jobs).unwrap_or(1);
        if jobs == 0 {
            return Err(MigrateBagError::config("args", "--jobs must be at least 1"));
        }

        let extension = args
            .extension
            .clone()
            .or(cfg.extension)
            .unwrap_or_else(default_extension)
            .trim_start_matches('.')
            .to_string();

        Ok(Self {
            sources,
            output: required(args.output.clone().or(cfg.output), "--output")?,
            output_backup: required(args.output_backup.clone().or(cfg.output_backup), "--output-backup")?,
            tmp_dir: required(args.tmp_dir.clone().or(cfg.tmp_dir), "--tmp-dir")?,
            bag_version: required(args.bag_version.or(cfg.bag_version), "--bag-version")?,
            migrate_version: required(args.migrate_version.or(cfg.migrate_version), "--migrate-version")?,
            jobs,
            on_rule_failure: args.on_rule_failure.or(cfg.on_rule_failure).unwrap_or_default(),
            extension,
        })
    }
}

fn required<T>(value: Option<T>, flag: &'static str) -> Result<T, MigrateBagError> {
    value.ok_or_else(|| MigrateBagError::config("args", format!("{flag} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MigrateArgs {
        MigrateArgs {
            sources: vec![PathBuf::from("in")],
            output: Some("out".into()),
            output_backup: Some("bak".into()),
            tmp_dir: Some("tmp".into()),
            bag_version: Some(1),
            migrate_version: Some(3),
            jobs: None,
            on_rule_failure: None,
            extension: None,
            config: "missing.toml".into(),
        }
    }

    #[test]
    fn cli_only_uses_defaults() {
        let eff = Effective::merge(&args(), FileConfig::default()).unwrap();
        assert_eq!(eff.jobs, 1);
        assert_eq!(eff.extension, "jsonl");
        assert_eq!(eff.on_rule_failure, FailurePolicy::AbortContainer);
        assert_eq!(eff.bag_version, 1);
        assert_eq!(eff.migrate_version, 3);
    }

    #[test]
    fn cli_overrides_file() {
        let cfg = FileConfig::parse(
            r#"
            sources = ["from-file"]
            output = "file-out"
            bag_version = 2
            jobs = 4
            on_rule_failure = "skip-record"
            extension = ".bag"
            "#,
        )
        .unwrap();

        let eff = Effective::merge(&args(), cfg).unwrap();
        assert_eq!(eff.sources, vec![PathBuf::from("in")]);
        assert_eq!(eff.output, PathBuf::from("out"));
        assert_eq!(eff.bag_version, 1);
        assert_eq!(eff.jobs, 4);
        assert_eq!(eff.on_rule_failure, FailurePolicy::SkipRecord);
        assert_eq!(eff.extension, "bag");
    }

    #[test]
    fn file_fills_missing_cli_values() {
        let mut a = args();
        a.sources.clear();
        a.tmp_dir = None;
        let cfg = FileConfig::parse("sources = [\"a\", \"b\"]\ntmp_dir = \"/scratch\"\n").unwrap();

        let eff = Effective::merge(&a, cfg).unwrap();
        assert_eq!(eff.sources.len(), 2);
        assert_eq!(eff.tmp_dir, PathBuf::from("/scratch"));
    }

    #[test]
    fn missing_required_value_is_reported() {
        let mut a = args();
        a.migrate_version = None;
        let err = Effective::merge(&a, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--migrate-version is required"));
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let mut a = args();
        a.jobs = Some(0);
        assert!(Effective::merge(&a, FileConfig::default()).is_err());
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        assert!(FileConfig::parse("outptu = \"typo\"").is_err());
    }
}
