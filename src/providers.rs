use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::AppResult;
use crate::places::HttpPlacesClient;
use crate::record::LookupOutcome;
use crate::website::WebsiteScraper;
use crate::wikidata::WikidataClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Places,
    Wikidata,
    Website,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Places => "places",
            ProviderKind::Wikidata => "wikidata",
            ProviderKind::Website => "website",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text identity used for the geo/contact search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoQuery {
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl GeoQuery {
    /// Non-blank parts joined as `name, city, country`; `None` when all are blank.
    pub fn text(&self) -> Option<String> {
        let parts = [&self.name, &self.city, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, query: &GeoQuery) -> LookupOutcome;
}

#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    async fn lookup(&self, company_name: &str) -> LookupOutcome;
}

#[async_trait]
pub trait WebContactLookup: Send + Sync {
    async fn lookup(&self, url: &str) -> LookupOutcome;
}

/// The enabled adapters. A `None` slot is never called.
#[derive(Clone, Default)]
pub struct Providers {
    pub geo: Option<Arc<dyn GeoLookup>>,
    pub knowledge: Option<Arc<dyn KnowledgeLookup>>,
    pub web: Option<Arc<dyn WebContactLookup>>,
}

impl Providers {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let geo: Option<Arc<dyn GeoLookup>> = match &config.google_places_api_key {
            Some(key) if config.google_active() => {
                Some(Arc::new(HttpPlacesClient::new(config, key.clone())?))
            }
            _ => {
                if config.enable_google {
                    info!("GOOGLE_PLACES_API_KEY not set; places lookups disabled");
                }
                None
            }
        };

        let knowledge: Option<Arc<dyn KnowledgeLookup>> = if config.enable_wikidata {
            Some(Arc::new(WikidataClient::new(config)?))
        } else {
            None
        };

        let web: Option<Arc<dyn WebContactLookup>> = if config.enable_website_scraping {
            Some(Arc::new(WebsiteScraper::new(config)?))
        } else {
            None
        };

        Ok(Self {
            geo,
            knowledge,
            web,
        })
    }

    pub fn enabled(&self) -> Vec<ProviderKind> {
        let mut kinds = Vec::new();
        if self.geo.is_some() {
            kinds.push(ProviderKind::Places);
        }
        if self.knowledge.is_some() {
            kinds.push(ProviderKind::Wikidata);
        }
        if self.web.is_some() {
            kinds.push(ProviderKind::Website);
        }
        kinds
    }
}

/// Idle pooling is off so every provider call is its own request.
pub(crate) fn build_http_client(
    config: &AppConfig,
    timeout: std::time::Duration,
) -> AppResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .pool_max_idle_per_host(0)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}
