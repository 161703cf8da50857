use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::providers::{build_http_client, GeoLookup, GeoQuery};
use crate::record::{Attribute, LookupOutcome, PartialRecord};

const DETAIL_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,website,address_components,geometry";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceResult {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub formatted_phone_number: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressComponent {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Geometry {
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatLng {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: Option<String>,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: Option<String>,
    error_message: Option<String>,
    result: Option<PlaceResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameForm {
    Long,
    Short,
}

/// First component tagged with `type_name`, in the requested form.
pub fn address_component<'a>(
    components: &'a [AddressComponent],
    type_name: &str,
    form: NameForm,
) -> Option<&'a str> {
    let component = components
        .iter()
        .find(|component| component.types.iter().any(|t| t == type_name))?;
    match form {
        NameForm::Long => component.long_name.as_deref(),
        NameForm::Short => component.short_name.as_deref(),
    }
}

/// Merges the search candidate with whatever the details call produced.
pub fn record_from_place(search: &SearchResult, details: Option<&PlaceResult>) -> PartialRecord {
    let mut record = PartialRecord::new();
    record.set(Attribute::Name, search.name.clone());
    record.set(Attribute::FormattedAddress, search.formatted_address.clone());

    let Some(details) = details else {
        return record;
    };

    // set() ignores blanks, so the search name survives an empty details name
    record.set(Attribute::Name, details.name.clone());
    if record.get(Attribute::FormattedAddress).is_none() {
        record.set(Attribute::FormattedAddress, details.formatted_address.clone());
    }
    record.set(Attribute::Website, details.website.clone());
    record.set(Attribute::Phone, details.formatted_phone_number.clone());

    let components = details.address_components.as_slice();
    record.set(
        Attribute::Country,
        address_component(components, "country", NameForm::Long),
    );
    record.set(
        Attribute::CountryCode,
        address_component(components, "country", NameForm::Short),
    );
    record.set(
        Attribute::Region,
        address_component(components, "administrative_area_level_1", NameForm::Long),
    );
    record.set(
        Attribute::City,
        address_component(components, "locality", NameForm::Long)
            .filter(|city| !city.is_empty())
            .or_else(|| address_component(components, "postal_town", NameForm::Long)),
    );
    record.set(
        Attribute::Postcode,
        address_component(components, "postal_code", NameForm::Long),
    );
    record.set(
        Attribute::Street,
        address_component(components, "route", NameForm::Long),
    );
    record.set(
        Attribute::StreetNumber,
        address_component(components, "street_number", NameForm::Long),
    );

    if let Some(location) = details.geometry.as_ref().and_then(|g| g.location.as_ref()) {
        record.set(Attribute::Latitude, location.lat);
        record.set(Attribute::Longitude, location.lng);
    }
    record
}

fn check_status(endpoint: &str, status: Option<&str>, message: Option<&str>) -> AppResult<()> {
    match status {
        None | Some("OK") | Some("ZERO_RESULTS") => Ok(()),
        Some(other) => Err(AppError::Parse(format!(
            "places {endpoint} returned {other}: {}",
            message.unwrap_or("no error message")
        ))),
    }
}

/// The key travels in the query string, so request URLs never reach errors.
fn without_key(err: reqwest::Error) -> AppError {
    AppError::Http(err.without_url())
}

pub struct HttpPlacesClient {
    http: reqwest::Client,
    api_key: SecretString,
    text_search_url: String,
    details_url: String,
}

impl HttpPlacesClient {
    pub fn new(config: &AppConfig, api_key: SecretString) -> AppResult<Self> {
        Ok(Self {
            http: build_http_client(config, config.api_timeout())?,
            api_key,
            text_search_url: config.places_text_search_url.clone(),
            details_url: config.places_details_url.clone(),
        })
    }

    async fn search(&self, query: &str) -> AppResult<Option<SearchResult>> {
        let response: TextSearchResponse = self
            .http
            .get(&self.text_search_url)
            .query(&[("query", query), ("key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(without_key)?
            .error_for_status()
            .map_err(without_key)?
            .json()
            .await
            .map_err(without_key)?;
        check_status(
            "text search",
            response.status.as_deref(),
            response.error_message.as_deref(),
        )?;
        Ok(response.results.into_iter().next())
    }

    async fn details(&self, place_id: &str) -> AppResult<Option<PlaceResult>> {
        let response: DetailsResponse = self
            .http
            .get(&self.details_url)
            .query(&[
                ("place_id", place_id),
                ("key", self.api_key.expose_secret()),
                ("fields", DETAIL_FIELDS),
            ])
            .send()
            .await
            .map_err(without_key)?
            .error_for_status()
            .map_err(without_key)?
            .json()
            .await
            .map_err(without_key)?;
        check_status(
            "details",
            response.status.as_deref(),
            response.error_message.as_deref(),
        )?;
        Ok(response.result)
    }

    /// Search, then details. A failed details call keeps the search data.
    pub async fn fetch(&self, query: &str) -> AppResult<Option<PartialRecord>> {
        let Some(candidate) = self.search(query).await? else {
            debug!(query, "places search returned no candidates");
            return Ok(None);
        };

        let Some(place_id) = candidate.place_id.as_deref().filter(|id| !id.is_empty()) else {
            return Ok(Some(record_from_place(&candidate, None)));
        };

        let details = match self.details(place_id).await {
            Ok(details) => details,
            Err(err) => {
                warn!(?err, place_id, "places details failed; keeping search result");
                None
            }
        };
        let record = record_from_place(&candidate, details.as_ref());
        trace!(place_id, attributes = record.len(), "places lookup assembled");
        Ok(Some(record))
    }
}

#[async_trait]
impl GeoLookup for HttpPlacesClient {
    async fn lookup(&self, query: &GeoQuery) -> LookupOutcome {
        let Some(text) = query.text() else {
            return LookupOutcome::NoMatch;
        };
        match self.fetch(&text).await {
            Ok(Some(record)) => LookupOutcome::Found(record),
            Ok(None) => LookupOutcome::NoMatch,
            Err(err) => {
                warn!(?err, query = %text, "places request failed");
                LookupOutcome::failed(err)
            }
        }
    }
}
