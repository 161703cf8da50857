use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::providers::{build_http_client, KnowledgeLookup};
use crate::record::{Attribute, LookupOutcome, PartialRecord};

const INCEPTION: &str = "P571";
const EMPLOYEES: &str = "P1128";
const LANGUAGE: &str = "en";

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    error: Option<ApiError>,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    error: Option<ApiError>,
    #[serde(default)]
    entities: HashMap<String, Entity>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub claims: HashMap<String, Vec<Value>>,
    #[serde(default)]
    pub descriptions: HashMap<String, LanguageValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguageValue {
    pub value: Option<String>,
}

impl ApiError {
    fn into_error(self, action: &str) -> AppError {
        AppError::Parse(format!(
            "wikidata {action} error {}: {}",
            self.code.as_deref().unwrap_or("unknown"),
            self.info.as_deref().unwrap_or("no details")
        ))
    }
}

impl Entity {
    fn first_claim(&self, property: &str) -> Option<&Value> {
        self.claims
            .get(property)?
            .first()?
            .pointer("/mainsnak/datavalue/value")
    }

    /// Each claim is parsed on its own; one bad claim leaves the others intact.
    pub fn to_record(&self) -> PartialRecord {
        let mut record = PartialRecord::new();
        record.set(
            Attribute::YearFounded,
            self.first_claim(INCEPTION)
                .and_then(|value| value.get("time"))
                .and_then(Value::as_str)
                .and_then(year_from_time),
        );
        record.set(
            Attribute::EmployeeCount,
            self.first_claim(EMPLOYEES)
                .and_then(|value| value.get("amount"))
                .and_then(Value::as_str)
                .and_then(amount_to_integer),
        );
        record.set(
            Attribute::Description,
            self.descriptions
                .get(LANGUAGE)
                .and_then(|description| description.value.clone()),
        );
        record
    }
}

/// `+1976-04-01T00:00:00Z` → 1976. The year must be four digits after the sign.
pub fn year_from_time(time: &str) -> Option<i64> {
    let year = time.get(1..5)?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

/// Quantity amounts arrive as signed decimal strings such as `+164000`.
pub fn amount_to_integer(amount: &str) -> Option<i64> {
    let value = amount.trim().parse::<f64>().ok()?;
    if value.is_finite() {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

pub struct WikidataClient {
    http: reqwest::Client,
    api_url: String,
}

impl WikidataClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            http: build_http_client(config, config.api_timeout())?,
            api_url: config.wikidata_api_url.clone(),
        })
    }

    async fn search(&self, company_name: &str) -> AppResult<Option<String>> {
        let response: SearchResponse = self
            .http
            .get(&self.api_url)
            .query(&[
                ("action", "wbsearchentities"),
                ("search", company_name),
                ("language", LANGUAGE),
                ("format", "json"),
                ("type", "item"),
                ("limit", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(error) = response.error {
            return Err(error.into_error("wbsearchentities"));
        }
        Ok(response
            .search
            .into_iter()
            .next()
            .and_then(|hit| hit.id)
            .filter(|id| !id.is_empty()))
    }

    async fn entity(&self, entity_id: &str) -> AppResult<Option<Entity>> {
        let response: EntitiesResponse = self
            .http
            .get(&self.api_url)
            .query(&[
                ("action", "wbgetentities"),
                ("ids", entity_id),
                ("format", "json"),
                ("languages", LANGUAGE),
                ("props", "descriptions|claims"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(error) = response.error {
            return Err(error.into_error("wbgetentities"));
        }
        let mut entities = response.entities;
        Ok(entities.remove(entity_id))
    }

    pub async fn fetch(&self, company_name: &str) -> AppResult<Option<PartialRecord>> {
        let Some(entity_id) = self.search(company_name).await? else {
            debug!(company_name, "wikidata search returned no entity");
            return Ok(None);
        };
        let Some(entity) = self.entity(&entity_id).await? else {
            debug!(company_name, entity_id = %entity_id, "wikidata entity missing from response");
            return Ok(None);
        };
        Ok(Some(entity.to_record()))
    }
}

#[async_trait]
impl KnowledgeLookup for WikidataClient {
    async fn lookup(&self, company_name: &str) -> LookupOutcome {
        let company_name = company_name.trim();
        if company_name.is_empty() {
            return LookupOutcome::NoMatch;
        }
        match self.fetch(company_name).await {
            Ok(Some(record)) => LookupOutcome::Found(record),
            Ok(None) => LookupOutcome::NoMatch,
            Err(err) => {
                warn!(?err, company_name, "wikidata lookup failed");
                LookupOutcome::failed(err)
            }
        }
    }
}
