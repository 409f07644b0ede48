//! `migrate`: run the migration against the configured platform

use crate::config::token_from_env;
use anyhow::{Context, Result};
use rbac_core::{
    CsvAuditSink, DirectoryService, HierarchyWalker, IdentityResolver, MigrationConfig,
    ResourceApi, RunSummary,
};
use rbac_effects::{GraphDirectory, HttpResourceApi};
use tracing::info;

/// Build the HTTP collaborators from `config` and run the migration
pub async fn run(config: &MigrationConfig) -> Result<RunSummary> {
    let token = token_from_env(config.platform.token_env.as_deref())?;
    let api = HttpResourceApi::new(&config.platform.url, token)
        .context("Failed to create platform client")?;

    let directory = if config.directory.enabled {
        let token = token_from_env(config.directory.token_env.as_deref())?;
        let directory = GraphDirectory::new(&config.directory.url, token)
            .context("Failed to create directory client")?;
        Some(directory)
    } else {
        None
    };

    execute(&api, directory, config).await
}

/// Run the migration over the given collaborators, writing the CSV report
/// configured in `config.report.path`
pub async fn execute<A, D>(
    api: A,
    directory: Option<D>,
    config: &MigrationConfig,
) -> Result<RunSummary>
where
    A: ResourceApi,
    D: DirectoryService,
{
    info!(
        platform = %config.platform.url,
        directory = config.directory.enabled,
        mapped_identities = config.mapping.len(),
        "Starting migration"
    );

    let mut resolver = IdentityResolver::new(
        config.seed_mapping(),
        directory,
        config.options.fallback_admin.clone(),
    );
    let report = &config.report.path;
    let sink = CsvAuditSink::create(report)
        .with_context(|| format!("Failed to create report {}", report.display()))?;

    let summary = HierarchyWalker::new(api, &mut resolver, sink)
        .with_trace_documents(config.options.trace_documents)
        .run(&config.selection())
        .await
        .context("Migration aborted")?;

    info!(report = %report.display(), "Audit report written");
    Ok(summary)
}
