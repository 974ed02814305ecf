//! `unify` command: read source files, run the engine, write the catalog.
//!
//! Files are read concurrently but handed to the engine in argument order,
//! since clustering depends on input order. A file that cannot be read is
//! logged and skipped like a malformed one; only a run with no usable source
//! at all is an error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use basar_core::{AppConfig, Catalog, Knowledge};
use basar_engine::{Engine, EngineError, EngineSettings, SourceDocument, UnifyOutcome};
use futures::stream::{self, StreamExt};

/// Exit code for a run that succeeded but produced no products.
pub(crate) const EXIT_EMPTY_CATALOG: u8 = 2;

#[derive(Debug, Clone)]
pub(crate) struct UnifyArgs {
    pub(crate) inputs: Vec<PathBuf>,
    pub(crate) output: Option<PathBuf>,
    pub(crate) knowledge: Option<PathBuf>,
    pub(crate) compact: bool,
}

/// Knowledge tables from the CLI flag, else `BASAR_KNOWLEDGE_PATH`, else the
/// bundled defaults.
pub(crate) fn resolve_knowledge(
    cli_path: Option<&Path>,
    config: &AppConfig,
) -> anyhow::Result<Knowledge> {
    match cli_path.or(config.knowledge_path.as_deref()) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading knowledge file");
            basar_core::load_knowledge(path)
                .with_context(|| format!("loading knowledge file {}", path.display()))
        }
        None => Knowledge::bundled().context("loading bundled knowledge"),
    }
}

/// Reads every path, at most `max_concurrent` at a time, preserving the
/// order of `paths` in the result. Unreadable files are logged and dropped.
pub(crate) async fn load_sources(paths: &[PathBuf], max_concurrent: usize) -> Vec<SourceDocument> {
    let results: Vec<(&PathBuf, std::io::Result<String>)> = stream::iter(paths)
        .map(|path| async move { (path, tokio::fs::read_to_string(path).await) })
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    results
        .into_iter()
        .filter_map(|(path, result)| match result {
            Ok(content) => Some(SourceDocument::new(source_name(path), content)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable source file");
                None
            }
        })
        .collect()
}

/// File name used as the source's name; network resolution may match on it.
fn source_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

pub(crate) fn render_catalog(catalog: &Catalog, compact: bool) -> anyhow::Result<String> {
    let json = if compact {
        serde_json::to_string(catalog)?
    } else {
        serde_json::to_string_pretty(catalog)?
    };
    Ok(json)
}

/// Runs the `unify` command.
///
/// # Errors
///
/// Returns an error if the knowledge tables or settings are invalid, if no
/// input file yields a usable source, or if the catalog cannot be written.
pub(crate) async fn run_unify(config: &AppConfig, args: &UnifyArgs) -> anyhow::Result<ExitCode> {
    let knowledge = resolve_knowledge(args.knowledge.as_deref(), config)?;
    let engine = Engine::new(&knowledge, &EngineSettings::from(config))?;

    let documents = load_sources(&args.inputs, config.max_concurrent_sources).await;
    let unreadable = args.inputs.len() - documents.len();
    if documents.is_empty() {
        return Err(EngineError::NoUsableSources {
            attempted: args.inputs.len(),
        }
        .into());
    }

    let outcome = engine.unify_documents(&documents)?;
    let stats = outcome.stats();
    tracing::info!(
        files = args.inputs.len(),
        unreadable,
        skipped = stats.sources_skipped,
        products = stats.products_emitted,
        "unify finished"
    );

    match outcome {
        UnifyOutcome::Catalog { catalog, .. } => {
            let rendered = render_catalog(&catalog, args.compact)?;
            match &args.output {
                Some(path) => {
                    tokio::fs::write(path, rendered)
                        .await
                        .with_context(|| format!("writing catalog to {}", path.display()))?;
                    tracing::info!(path = %path.display(), "catalog written");
                }
                None => println!("{rendered}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        UnifyOutcome::Empty { .. } => {
            eprintln!("no unified products could be built from the given sources");
            Ok(ExitCode::from(EXIT_EMPTY_CATALOG))
        }
    }
}

#[cfg(test)]
#[path = "unify_test.rs"]
mod tests;
