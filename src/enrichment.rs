use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::cache::{ProviderCache, ProviderStats};
use crate::config::AppConfig;
use crate::derive::{extract_domain, extract_tld, sanitize_cell};
use crate::errors::AppResult;
use crate::fields::{CanonicalField, FieldResolution, IdentityField};
use crate::key::EntityKey;
use crate::providers::{GeoQuery, ProviderKind, Providers};
use crate::record::{Attribute, FieldValue, PartialRecord};
use crate::table::{Row, Table};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentStats {
    pub total_rows: usize,
    pub processed_rows: usize,
    pub skipped_rows: usize,
    pub cells_filled: usize,
    pub places: ProviderStats,
    pub wikidata: ProviderStats,
    pub website: ProviderStats,
}

#[derive(Debug, Clone)]
pub struct EnrichmentProgress {
    pub total_rows: usize,
    pub processed: usize,
    pub cells_filled: usize,
}

pub type ProgressObserver = Arc<dyn Fn(EnrichmentProgress) + Send + Sync>;

/// Writes `candidate` into `column` only when the column exists, the
/// candidate is non-empty and the current cell is empty.
pub fn attempt_fill(row: &mut Row, column: Option<usize>, candidate: &FieldValue) -> bool {
    let Some(column) = column else {
        return false;
    };
    if candidate.is_empty() || !row.is_empty_at(column) {
        return false;
    }
    let value = sanitize_cell(&candidate.to_string());
    if value.is_empty() {
        return false;
    }
    row.set(column, value);
    true
}

const DESCRIPTION_SLOTS: [CanonicalField; 2] =
    [CanonicalField::ShortDescription, CanonicalField::LongDescription];

/// Short description slot first, then the long one. A description already
/// sitting in either slot is not written again.
fn place_description(row: &mut Row, fields: &FieldResolution, description: &FieldValue) -> bool {
    let value = sanitize_cell(&description.to_string());
    let already_placed = DESCRIPTION_SLOTS
        .iter()
        .any(|slot| row.text(fields.column(*slot)) == Some(value.trim()));
    if already_placed {
        return false;
    }
    DESCRIPTION_SLOTS
        .iter()
        .any(|slot| attempt_fill(row, fields.column(*slot), description))
}

/// Fills every attribute that maps straight onto a column.
fn fill_record(row: &mut Row, fields: &FieldResolution, record: &PartialRecord) -> usize {
    record
        .iter()
        .filter_map(|(attribute, value)| {
            CanonicalField::for_attribute(attribute).map(|field| (field, value))
        })
        .filter(|(field, value)| attempt_fill(row, fields.column(*field), value))
        .count()
}

/// Domain and TLD follow whatever website the row holds now.
fn fill_website_derivatives(row: &mut Row, fields: &FieldResolution) -> usize {
    let Some(domain) = row
        .text(fields.column(CanonicalField::Website))
        .and_then(extract_domain)
    else {
        return 0;
    };
    let tld = extract_tld(&domain);
    let mut filled = usize::from(attempt_fill(
        row,
        fields.column(CanonicalField::Domain),
        &FieldValue::Text(domain),
    ));
    if let Some(tld) = tld {
        filled += usize::from(attempt_fill(
            row,
            fields.column(CanonicalField::Tld),
            &FieldValue::Text(tld),
        ));
    }
    filled
}

fn owned_text(row: &Row, column: Option<usize>) -> Option<String> {
    row.text(column).map(str::to_string)
}

pub struct Enricher {
    providers: Providers,
    geo_cache: ProviderCache<EntityKey>,
    knowledge_cache: ProviderCache<EntityKey>,
    web_cache: ProviderCache<String>,
    observer: Option<ProgressObserver>,
}

impl Enricher {
    pub fn new(providers: Providers, config: &AppConfig) -> Self {
        let delay = config.api_sleep();
        Self {
            providers,
            geo_cache: ProviderCache::new(ProviderKind::Places, delay),
            knowledge_cache: ProviderCache::new(ProviderKind::Wikidata, delay),
            web_cache: ProviderCache::new(ProviderKind::Website, delay),
            observer: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self::new(Providers::from_config(config)?, config))
    }

    pub fn with_observer(mut self, observer: ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Enriches every row in source order. Columns are resolved once up front.
    pub async fn enrich_table(&mut self, table: &mut Table) -> EnrichmentStats {
        let fields = FieldResolution::resolve(table.headers());
        if fields.identity(IdentityField::Name).is_none()
            && fields.identity(IdentityField::CountryCode).is_none()
        {
            warn!(
                "neither {} nor {} present; every row will be skipped",
                IdentityField::Name.column(),
                IdentityField::CountryCode.column()
            );
        }
        info!(
            rows = table.len(),
            resolved_columns = fields.resolved_count(),
            providers = ?self.providers.enabled(),
            "starting enrichment"
        );

        let mut stats = EnrichmentStats {
            total_rows: table.len(),
            ..EnrichmentStats::default()
        };
        for (index, row) in table.rows_mut().iter_mut().enumerate() {
            match self.enrich_row(row, &fields).await {
                Some(filled) => {
                    stats.processed_rows += 1;
                    stats.cells_filled += filled;
                    trace!(row = index, filled, "row enriched");
                }
                None => stats.skipped_rows += 1,
            }
            if let Some(observer) = &self.observer {
                observer(EnrichmentProgress {
                    total_rows: stats.total_rows,
                    processed: index + 1,
                    cells_filled: stats.cells_filled,
                });
            }
        }

        stats.places = self.geo_cache.stats();
        stats.wikidata = self.knowledge_cache.stats();
        stats.website = self.web_cache.stats();
        info!(
            processed = stats.processed_rows,
            skipped = stats.skipped_rows,
            cells_filled = stats.cells_filled,
            "enrichment finished"
        );
        stats
    }

    /// Returns the number of cells written, or `None` when the row has no
    /// usable identity and was left untouched.
    pub async fn enrich_row(&mut self, row: &mut Row, fields: &FieldResolution) -> Option<usize> {
        let name = owned_text(row, fields.identity(IdentityField::Name));
        let jurisdiction = owned_text(row, fields.identity(IdentityField::CountryCode));
        let key = EntityKey::normalize(name.as_deref(), jurisdiction.as_deref());
        if key.is_degenerate() {
            debug!("skipping row without company name or country code");
            return None;
        }

        let mut filled = 0;

        if let Some(geo) = self.providers.geo.clone() {
            let query = GeoQuery {
                name: name.clone(),
                city: owned_text(row, fields.identity(IdentityField::City)),
                country: owned_text(row, fields.identity(IdentityField::Country)),
            };
            let outcome = self
                .geo_cache
                .get_or_compute(key.clone(), || async move { geo.lookup(&query).await })
                .await;
            filled += fill_record(row, fields, outcome.record());
        }

        filled += fill_website_derivatives(row, fields);

        let mut description_claimed = false;
        if let Some(knowledge) = self.providers.knowledge.clone() {
            let company_name = name.clone().unwrap_or_default();
            let outcome = self
                .knowledge_cache
                .get_or_compute(key.clone(), || async move {
                    knowledge.lookup(&company_name).await
                })
                .await;
            let record = outcome.record();
            filled += fill_record(row, fields, record);
            // A knowledge-base description blocks the web one even when both
            // slots were already full, so reruns stay no-ops.
            if let Some(description) = record.get(Attribute::Description) {
                description_claimed = true;
                filled += usize::from(place_description(row, fields, description));
            }
        }

        let website = owned_text(row, fields.column(CanonicalField::Website));
        if let (Some(web), Some(website)) = (self.providers.web.clone(), website) {
            let cache_key = extract_domain(&website).unwrap_or_else(|| website.clone());
            let outcome = self
                .web_cache
                .get_or_compute(cache_key, || async move { web.lookup(&website).await })
                .await;
            let record = outcome.record();
            filled += fill_record(row, fields, record);
            if !description_claimed {
                if let Some(description) = record.get(Attribute::Description) {
                    filled += usize::from(place_description(row, fields, description));
                }
            }
        }

        debug!(entity = %key, filled, "row merged");
        Some(filled)
    }
}
