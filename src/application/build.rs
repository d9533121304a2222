//! Build orchestration: entries in, rebuilt document out.
//!
//! Everything that can be checked up front (template markers, entry fields)
//! is checked before the cache is consulted, so a failing build leaves both
//! the store and the output untouched.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use metrics::histogram;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    cache::{CacheStats, DirectoryStore, FragmentStore, RenderCache},
    config::BuildSettings,
    domain::{entries::ErrorEntry, template::TemplateDocument},
    infra::files,
};

use super::error::BuildError;

const BUILD_MS: &str = "errata_build_ms";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub document: String,
    pub stats: CacheStats,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub entries: usize,
    pub stats: CacheStats,
    pub output: PathBuf,
    pub elapsed: Duration,
}

/// Render `entries` in order through the cache and splice them into `template`.
pub fn build<S: FragmentStore + ?Sized>(
    entries: &[ErrorEntry],
    template: &str,
    store: &mut S,
) -> Result<BuildOutput, BuildError> {
    let template = TemplateDocument::parse(template)?;

    for (index, entry) in entries.iter().enumerate() {
        entry
            .validate()
            .map_err(|source| BuildError::malformed_entry(index, source))?;
    }

    let total = entries.len();
    let mut cache = RenderCache::new(store);
    let mut body = String::new();

    for (index, entry) in entries.iter().enumerate() {
        debug!(
            target = "errata::build",
            op = "build::render_entry",
            position = index + 1,
            total,
            title = %entry.title,
            "Processing entry"
        );
        let fragment = cache
            .get_or_render(entry)
            .map_err(|err| BuildError::from_cache(index, err))?;
        body.push_str(fragment.as_str());
    }

    Ok(BuildOutput {
        document: template.splice(&body),
        stats: cache.stats(),
    })
}

/// Decode raw records, tagging failures with their position.
pub fn decode_entries(records: Vec<Value>) -> Result<Vec<ErrorEntry>, BuildError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            ErrorEntry::from_value(record)
                .map_err(|source| BuildError::malformed_entry(index, source))
        })
        .collect()
}

/// Full build against the file system described by `settings`.
pub fn build_site(settings: &BuildSettings) -> Result<BuildReport, BuildError> {
    let started_at = Instant::now();

    files::ensure_output_directory(&settings.output)
        .map_err(|err| BuildError::setup("output directory", err))?;
    let mut store = DirectoryStore::open(&settings.cache_dir)
        .map_err(|err| BuildError::setup("cache directory", err))?;
    let template = files::read_template(&settings.template)
        .map_err(|err| BuildError::setup("template", err))?;
    let records = files::read_entry_records(&settings.entries)
        .map_err(|err| BuildError::setup("entries document", err))?;

    let entries = decode_entries(records)?;
    info!(
        target = "errata::build",
        op = "build::load_entries",
        entries = entries.len(),
        source = %settings.entries.display(),
        "Found {} entries",
        entries.len()
    );

    let output = build(&entries, &template, &mut store)?;

    files::write_output(&settings.output, &output.document).map_err(BuildError::Output)?;

    let elapsed = started_at.elapsed();
    histogram!(BUILD_MS).record(elapsed.as_secs_f64() * 1000.0);
    info!(
        target = "errata::build",
        op = "build::write_output",
        result = "ok",
        elapsed_ms = elapsed.as_millis() as u64,
        cache_hits = output.stats.hits,
        cache_misses = output.stats.misses,
        output = %settings.output.display(),
        "Wrote rebuilt document"
    );

    Ok(BuildReport {
        entries: entries.len(),
        stats: output.stats,
        output: settings.output.clone(),
        elapsed,
    })
}
