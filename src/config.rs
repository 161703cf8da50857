use std::time::Duration;
use std::{env, io};

use secrecy::SecretString;
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_API_SLEEP_MS: u64 = 300;
pub const DEFAULT_PLACES_TEXT_SEARCH_URL: &str =
    "https://maps.googleapis.com/maps/api/place/textsearch/json";
pub const DEFAULT_PLACES_DETAILS_URL: &str =
    "https://maps.googleapis.com/maps/api/place/details/json";
pub const DEFAULT_WIKIDATA_API_URL: &str = "https://www.wikidata.org/w/api.php";
const DEFAULT_API_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub enable_google: bool,
    pub enable_wikidata: bool,
    pub enable_website_scraping: bool,
    pub api_sleep_ms: u64,
    pub google_places_api_key: Option<SecretString>,
    pub places_text_search_url: String,
    pub places_details_url: String,
    pub wikidata_api_url: String,
    pub user_agent: String,
    pub api_timeout_secs: u64,
    pub scrape_timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PublicAppConfig {
    pub enable_google: bool,
    pub enable_wikidata: bool,
    pub enable_website_scraping: bool,
    pub api_sleep_ms: u64,
    pub places_text_search_url: String,
    pub places_details_url: String,
    pub wikidata_api_url: String,
    pub user_agent: String,
    pub api_timeout_secs: u64,
    pub scrape_timeout_secs: u64,
    pub has_google_places_key: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enable_google: true,
            enable_wikidata: true,
            enable_website_scraping: true,
            api_sleep_ms: DEFAULT_API_SLEEP_MS,
            google_places_api_key: None,
            places_text_search_url: DEFAULT_PLACES_TEXT_SEARCH_URL.to_string(),
            places_details_url: DEFAULT_PLACES_DETAILS_URL.to_string(),
            wikidata_api_url: DEFAULT_WIKIDATA_API_URL.to_string(),
            user_agent: default_user_agent(),
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            scrape_timeout_secs: DEFAULT_SCRAPE_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        load_dotenv_if_applicable();
        Self {
            enable_google: parse_bool("ENABLE_GOOGLE", true),
            enable_wikidata: parse_bool("ENABLE_WIKIDATA", true),
            enable_website_scraping: parse_bool("ENABLE_WEBSITE_SCRAPING", true),
            api_sleep_ms: parse_u64("API_SLEEP_MS", DEFAULT_API_SLEEP_MS),
            google_places_api_key: env::var("GOOGLE_PLACES_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from),
            places_text_search_url: parse_string(
                "PLACES_TEXT_SEARCH_URL",
                DEFAULT_PLACES_TEXT_SEARCH_URL,
            ),
            places_details_url: parse_string("PLACES_DETAILS_URL", DEFAULT_PLACES_DETAILS_URL),
            wikidata_api_url: parse_string("WIKIDATA_API_URL", DEFAULT_WIKIDATA_API_URL),
            user_agent: env::var("HTTP_USER_AGENT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(default_user_agent),
            api_timeout_secs: parse_u64("API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS).max(1),
            scrape_timeout_secs: parse_u64("SCRAPE_TIMEOUT_SECS", DEFAULT_SCRAPE_TIMEOUT_SECS)
                .max(1),
        }
    }

    /// Geo/contact lookups need both the feature flag and a key.
    pub fn google_active(&self) -> bool {
        self.enable_google && self.google_places_api_key.is_some()
    }

    pub fn api_sleep(&self) -> Duration {
        Duration::from_millis(self.api_sleep_ms)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }

    pub fn public_profile(&self) -> PublicAppConfig {
        PublicAppConfig {
            enable_google: self.enable_google,
            enable_wikidata: self.enable_wikidata,
            enable_website_scraping: self.enable_website_scraping,
            api_sleep_ms: self.api_sleep_ms,
            places_text_search_url: self.places_text_search_url.clone(),
            places_details_url: self.places_details_url.clone(),
            wikidata_api_url: self.wikidata_api_url.clone(),
            user_agent: self.user_agent.clone(),
            api_timeout_secs: self.api_timeout_secs,
            scrape_timeout_secs: self.scrape_timeout_secs,
            has_google_places_key: self.google_places_api_key.is_some(),
        }
    }
}

fn default_user_agent() -> String {
    format!("company-enrichment/{}", env!("CARGO_PKG_VERSION"))
}

fn load_dotenv_if_applicable() {
    if !should_load_dotenv() {
        debug!("skipping .env load outside dev mode");
        return;
    }

    if let Err(err) = dotenvy::dotenv() {
        match &err {
            dotenvy::Error::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {}
            _ => debug!(?err, "unable to load .env file"),
        }
    }
}

fn should_load_dotenv() -> bool {
    cfg!(debug_assertions) || parse_bool("ALLOW_DOTENV", false)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| match v.trim() {
            "1" | "true" | "TRUE" | "True" | "yes" => true,
            "0" | "false" | "FALSE" | "False" | "no" => false,
            _ => default,
        })
        .unwrap_or(default)
}

fn parse_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
