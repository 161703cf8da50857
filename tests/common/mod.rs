use httptest::Server;

use company_enrichment::AppConfig;

/// Every endpoint pointed at `server`, no throttling.
pub fn mock_config(server: &Server) -> AppConfig {
    AppConfig {
        api_sleep_ms: 0,
        google_places_api_key: Some("test-key".to_string().into()),
        places_text_search_url: server.url("/place/textsearch/json").to_string(),
        places_details_url: server.url("/place/details/json").to_string(),
        wikidata_api_url: server.url("/w/api.php").to_string(),
        api_timeout_secs: 2,
        scrape_timeout_secs: 2,
        ..AppConfig::default()
    }
}
