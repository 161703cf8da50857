mod cache;
mod config;
mod derive;
mod enrichment;
mod errors;
mod fields;
mod key;
mod places;
mod providers;
mod record;
mod report;
mod table;
mod website;
mod wikidata;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::OnceCell;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use cache::{ProviderCache, ProviderStats};
pub use config::{AppConfig, PublicAppConfig};
pub use derive::{extract_domain, extract_tld, sanitize_cell, with_scheme};
pub use enrichment::{
    attempt_fill, Enricher, EnrichmentProgress, EnrichmentStats, ProgressObserver,
};
pub use errors::{AppError, AppResult};
pub use fields::{CanonicalField, FieldResolution, IdentityField};
pub use key::EntityKey;
pub use places::{address_component, record_from_place, HttpPlacesClient, NameForm};
pub use providers::{
    GeoLookup, GeoQuery, KnowledgeLookup, ProviderKind, Providers, WebContactLookup,
};
pub use record::{Attribute, FieldValue, LookupOutcome, PartialRecord};
pub use report::RunReport;
pub use table::{parse_csv, read_table, write_csv, write_table, Row, Table};
pub use website::{extract_contacts, WebsiteScraper};
pub use wikidata::WikidataClient;

const PROGRESS_LOG_EVERY: usize = 25;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: Option<PathBuf>,
}

/// Reads the input table, enriches it and writes it once to the output path.
pub async fn run_enrichment(
    config: &AppConfig,
    options: &RunOptions,
) -> AppResult<EnrichmentStats> {
    let started_at = Utc::now();
    table::ensure_distinct(&options.input, &options.output)?;
    info!(
        input = %options.input.display(),
        output = %options.output.display(),
        config = ?config.public_profile(),
        "enrichment run configured"
    );

    let mut table = read_table(&options.input)?;
    let observer: ProgressObserver = Arc::new(|progress: EnrichmentProgress| {
        if progress.processed % PROGRESS_LOG_EVERY == 0 || progress.processed == progress.total_rows
        {
            info!(
                processed = progress.processed,
                total = progress.total_rows,
                cells_filled = progress.cells_filled,
                "enrichment progress"
            );
        }
    });
    let mut enricher = Enricher::from_config(config)?.with_observer(observer);
    let stats = enricher.enrich_table(&mut table).await;

    write_table(&table, &options.input, &options.output)?;

    if let Some(report_path) = &options.report {
        let report = RunReport::new(
            started_at,
            &options.input,
            &options.output,
            config.public_profile(),
            stats.clone(),
        );
        write_report(&report, report_path);
    }
    Ok(stats)
}

fn write_report(report: &RunReport, path: &Path) {
    match report.persist(path) {
        Ok(()) => info!(path = %path.display(), "run report written"),
        Err(err) => warn!(?err, path = %path.display(), "failed to write run report"),
    }
}

/// Installs the global subscriber once. `RUST_LOG` wins over `default_directive`.
pub fn init_tracing(default_directive: &str) {
    static INIT: OnceCell<()> = OnceCell::new();
    let _ = INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    });
}
