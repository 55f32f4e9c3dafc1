use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use migrate_engine::{
    DriveStats, DriverError, FailurePolicy, MigrationEngine, RecordSink, RuleRegistry, StreamDriver,
};
use migrate_storage_jsonl::{JsonlReader, JsonlWriter};

use super::config::Effective;
use super::error::MigrateBagError;
use super::layout::{discover, ensure_dirs, plan_all, relocate, ContainerPlan};

// ═══════════════════════════════════════════════════════════════
//  Main dispatch
// ═══════════════════════════════════════════════════════════════

pub async fn run(args: &Effective) -> Result<(), MigrateBagError> {
    let registry = Arc::new(migrate_rules::registry()?);

    // Reject a reversed range before touching any container.
    let chain = registry.select_chain(args.bag_version, args.migrate_version)?;
    let containers = discover(&args.sources, &args.extension)?;

    if containers.is_empty() {
        tracing::warn!(extension = %args.extension, "no containers found");
        return Ok(());
    }

    if chain.is_empty() {
        for path in &containers {
            tracing::warn!(
                path = %path.display(),
                from = args.bag_version,
                to = args.migrate_version,
                "container does not need migration, skipping"
            );
        }
        return Ok(());
    }

    let plans = plan_all(
        &containers,
        args.bag_version,
        args.migrate_version,
        &args.tmp_dir,
        &args.output,
        &args.output_backup,
    )?;

    tracing::info!(
        containers = plans.len(),
        from = args.bag_version,
        to = args.migrate_version,
        rules = ?chain.versions(),
        jobs = args.jobs,
        policy = %args.on_rule_failure,
        "starting migration"
    );

    ensure_dirs(&[&args.output, &args.output_backup, &args.tmp_dir])?;

    let token = CancellationToken::new();
    let signal = tokio::spawn({
        let token = token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, stopping after the current record");
                token.cancel();
            }
        }
    });

    let outcome = run_containers(args, registry, plans, token.clone()).await;
    signal.abort();

    let Summary { total, migrated, failed } = outcome?;
    if token.is_cancelled() {
        return Err(MigrateBagError::Interrupted { remaining: total - migrated });
    }
    if failed > 0 {
        return Err(MigrateBagError::Failed { failed, total });
    }

    tracing::info!(migrated, "migration complete");
    Ok(())
}

struct Summary {
    total: usize,
    migrated: usize,
    failed: usize,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduling
// ═══════════════════════════════════════════════════════════════

async fn run_containers(
    args: &Effective,
    registry: Arc<RuleRegistry>,
    plans: Vec<ContainerPlan>,
    token: CancellationToken,
) -> Result<Summary, MigrateBagError> {
    let total = plans.len();
    let semaphore = Arc::new(Semaphore::new(args.jobs));
    // Cancelled on an abort-run failure; stops new launches only.
    let halt = token.child_token();
    let mut tasks: JoinSet<(PathBuf, Result<DriveStats, MigrateBagError>)> = JoinSet::new();

    for plan in plans {
        let permit = tokio::select! {
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => break,
            },
            _ = halt.cancelled() => break,
        };
        if halt.is_cancelled() {
            break;
        }

        let job = Job {
            registry: registry.clone(),
            from: args.bag_version,
            to: args.migrate_version,
            policy: args.on_rule_failure,
            token: token.clone(),
        };
        let halt = halt.clone();

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let result = job.migrate_container(&plan);
            if job.policy == FailurePolicy::AbortRun
                && matches!(result, Err(MigrateBagError::Driver { source: DriverError::Rule { .. }, .. }))
            {
                halt.cancel();
            }
            (plan.source, result)
        });
    }

    let mut migrated = 0;
    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        let (path, result) = joined?;
        match result {
            Ok(stats) => {
                migrated += 1;
                tracing::info!(
                    path = %path.display(),
                    records_in = stats.records_in,
                    records_out = stats.records_out,
                    skipped = stats.skipped,
                    "container migrated"
                );
            }
            Err(e) => {
                failed += 1;
                tracing::error!(path = %path.display(), error = %e, "container failed");
            }
        }
    }

    if halt.is_cancelled() && !token.is_cancelled() {
        let skipped = total - migrated - failed;
        if skipped > 0 {
            tracing::error!(skipped, "run aborted after rule failure");
            failed += skipped;
        }
    }

    Ok(Summary { total, migrated, failed })
}

// ═══════════════════════════════════════════════════════════════
//  One container
// ═══════════════════════════════════════════════════════════════

struct Job {
    registry: Arc<RuleRegistry>,
    from: u32,
    to: u32,
    policy: FailurePolicy,
    token: CancellationToken,
}

impl Job {
    /// Прочитать источник, записать scratch, опубликовать его и перенести
    /// источник в backup. При ошибке источник не трогается.
    fn migrate_container(&self, plan: &ContainerPlan) -> Result<DriveStats, MigrateBagError> {
        tracing::debug!(
            source = %plan.source.display(),
            scratch = %plan.scratch.display(),
            "migrating container"
        );
        if plan.backup.exists() {
            return Err(MigrateBagError::BackupExists { path: plan.backup.clone() });
        }

        let stats = match self.write_scratch(plan) {
            Ok(stats) => stats,
            Err(e) => {
                if let Err(rm) = std::fs::remove_file(&plan.scratch) {
                    tracing::debug!(path = %plan.scratch.display(), error = %rm, "scratch not removed");
                }
                return Err(e);
            }
        };

        relocate(&plan.scratch, &plan.output)?;
        relocate(&plan.source, &plan.backup)?;
        Ok(stats)
    }

    fn write_scratch(&self, plan: &ContainerPlan) -> Result<DriveStats, MigrateBagError> {
        let chain = self.registry.select_chain(self.from, self.to)?;
        let driver = StreamDriver::new(MigrationEngine::new(chain))
            .with_policy(self.policy)
            .with_cancellation(self.token.clone());

        let container_err = |source| MigrateBagError::Container {
            path: plan.source.clone(),
            source,
        };
        let mut reader = JsonlReader::open(&plan.source).map_err(container_err)?;
        let mut writer = JsonlWriter::create(&plan.scratch).map_err(container_err)?;

        let stats = driver
            .run(&mut reader, &mut writer)
            .map_err(|source| MigrateBagError::Driver {
                path: plan.source.clone(),
                source,
            })?;
        RecordSink::finish(&mut writer).map_err(|source| MigrateBagError::Finish {
            path: plan.scratch.clone(),
            source,
        })?;
        Ok(stats)
    }
}
