mod common;

use httptest::matchers::{all_of, contains, request, url_decoded};
use httptest::responders::{json_encoded, status_code};
use httptest::{Expectation, Server};
use serde_json::json;

use company_enrichment::{
    Attribute, FieldValue, GeoLookup, GeoQuery, HttpPlacesClient, KnowledgeLookup,
    LookupOutcome, WebContactLookup, WebsiteScraper, WikidataClient,
};

use common::mock_config;

fn acme_query() -> GeoQuery {
    GeoQuery {
        name: Some("Acme Ltd".into()),
        city: Some("Guildford".into()),
        country: Some("United Kingdom".into()),
    }
}

fn places_client(server: &Server) -> HttpPlacesClient {
    let config = mock_config(server);
    let key = config.google_places_api_key.clone().unwrap();
    HttpPlacesClient::new(&config, key).unwrap()
}

fn text(outcome: &LookupOutcome, attribute: Attribute) -> Option<String> {
    outcome.record().get(attribute).map(FieldValue::to_string)
}

#[tokio::test]
async fn places_search_then_details() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of!(
            request::method_path("GET", "/place/textsearch/json"),
            request::query(url_decoded(contains((
                "query",
                "Acme Ltd, Guildford, United Kingdom"
            )))),
            request::query(url_decoded(contains(("key", "test-key")))),
        ))
        .respond_with(json_encoded(json!({
            "status": "OK",
            "results": [
                { "place_id": "place-1", "name": "Acme Ltd", "formatted_address": "1 High St, Guildford GU1 3AA, UK" },
                { "place_id": "place-2", "name": "Acme Holdings" }
            ]
        }))),
    );
    server.expect(
        Expectation::matching(all_of!(
            request::method_path("GET", "/place/details/json"),
            request::query(url_decoded(contains(("place_id", "place-1")))),
        ))
        .respond_with(json_encoded(json!({
            "status": "OK",
            "result": {
                "name": "Acme Ltd",
                "formatted_phone_number": "01483 000000",
                "website": "https://www.acme.co.uk/",
                "address_components": [
                    { "long_name": "1", "short_name": "1", "types": ["street_number"] },
                    { "long_name": "High Street", "short_name": "High St", "types": ["route"] },
                    { "long_name": "Guildford", "short_name": "Guildford", "types": ["postal_town"] },
                    { "long_name": "England", "short_name": "England", "types": ["administrative_area_level_1", "political"] },
                    { "long_name": "United Kingdom", "short_name": "GB", "types": ["country", "political"] },
                    { "long_name": "GU1 3AA", "short_name": "GU1 3AA", "types": ["postal_code"] }
                ],
                "geometry": { "location": { "lat": 51.2362, "lng": -0.5704 } }
            }
        }))),
    );

    let outcome = places_client(&server).lookup(&acme_query()).await;

    assert!(matches!(outcome, LookupOutcome::Found(_)));
    assert_eq!(
        text(&outcome, Attribute::FormattedAddress).as_deref(),
        Some("1 High St, Guildford GU1 3AA, UK")
    );
    assert_eq!(text(&outcome, Attribute::City).as_deref(), Some("Guildford"));
    assert_eq!(text(&outcome, Attribute::CountryCode).as_deref(), Some("GB"));
    assert_eq!(text(&outcome, Attribute::Region).as_deref(), Some("England"));
    assert_eq!(text(&outcome, Attribute::Postcode).as_deref(), Some("GU1 3AA"));
    assert_eq!(text(&outcome, Attribute::Street).as_deref(), Some("High Street"));
    assert_eq!(
        text(&outcome, Attribute::Website).as_deref(),
        Some("https://www.acme.co.uk/")
    );
    assert_eq!(
        outcome.record().get(Attribute::Latitude),
        Some(&FieldValue::Float(51.2362))
    );
}

#[tokio::test]
async fn places_details_failure_keeps_search_data() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/place/textsearch/json")).respond_with(
            json_encoded(json!({
                "status": "OK",
                "results": [{ "place_id": "place-1", "name": "Acme Ltd", "formatted_address": "1 High St" }]
            })),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/place/details/json"))
            .respond_with(status_code(500)),
    );

    let outcome = places_client(&server).lookup(&acme_query()).await;

    assert!(matches!(outcome, LookupOutcome::Found(_)));
    assert_eq!(outcome.record().len(), 2);
    assert_eq!(text(&outcome, Attribute::Name).as_deref(), Some("Acme Ltd"));
    assert_eq!(
        text(&outcome, Attribute::FormattedAddress).as_deref(),
        Some("1 High St")
    );
}

#[tokio::test]
async fn places_zero_results_is_no_match() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/place/textsearch/json"))
            .respond_with(json_encoded(json!({ "status": "ZERO_RESULTS", "results": [] }))),
    );

    let outcome = places_client(&server).lookup(&acme_query()).await;
    assert_eq!(outcome, LookupOutcome::NoMatch);
}

#[tokio::test]
async fn places_denied_request_is_a_failure() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/place/textsearch/json"))
            .respond_with(json_encoded(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "results": []
            }))),
    );

    let outcome = places_client(&server).lookup(&acme_query()).await;
    assert!(outcome.is_failure());
    assert!(outcome.record().is_empty());
}

#[tokio::test]
async fn places_http_error_keeps_api_key_out_of_the_reason() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/place/textsearch/json"))
            .respond_with(status_code(500)),
    );

    let outcome = places_client(&server).lookup(&acme_query()).await;

    let LookupOutcome::Failed(reason) = &outcome else {
        panic!("expected a failure, got {outcome:?}");
    };
    assert!(reason.contains("500"));
    assert!(!reason.contains("test-key"));
    assert!(!reason.contains("textsearch"));
}

#[tokio::test]
async fn wikidata_search_then_entity() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of!(
            request::method_path("GET", "/w/api.php"),
            request::query(url_decoded(contains(("action", "wbsearchentities")))),
            request::query(url_decoded(contains(("search", "Acme Ltd")))),
        ))
        .respond_with(json_encoded(json!({
            "search": [{ "id": "Q42", "label": "Acme Ltd" }]
        }))),
    );
    server.expect(
        Expectation::matching(all_of!(
            request::method_path("GET", "/w/api.php"),
            request::query(url_decoded(contains(("action", "wbgetentities")))),
            request::query(url_decoded(contains(("ids", "Q42")))),
        ))
        .respond_with(json_encoded(json!({
            "entities": {
                "Q42": {
                    "claims": {
                        "P571": [{ "mainsnak": { "datavalue": { "value": { "time": "+1976-04-01T00:00:00Z" } } } }],
                        "P1128": [{ "mainsnak": { "datavalue": { "value": { "amount": "+1250" } } } }]
                    },
                    "descriptions": { "en": { "language": "en", "value": "British engineering firm" } }
                }
            }
        }))),
    );

    let client = WikidataClient::new(&mock_config(&server)).unwrap();
    let outcome = client.lookup("Acme Ltd").await;

    assert_eq!(
        outcome.record().get(Attribute::YearFounded),
        Some(&FieldValue::Integer(1976))
    );
    assert_eq!(
        outcome.record().get(Attribute::EmployeeCount),
        Some(&FieldValue::Integer(1250))
    );
    assert_eq!(
        text(&outcome, Attribute::Description).as_deref(),
        Some("British engineering firm")
    );
}

#[tokio::test]
async fn wikidata_without_hits_skips_entity_call() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of!(
            request::method_path("GET", "/w/api.php"),
            request::query(url_decoded(contains(("action", "wbsearchentities")))),
        ))
        .respond_with(json_encoded(json!({ "search": [] }))),
    );

    let client = WikidataClient::new(&mock_config(&server)).unwrap();
    assert_eq!(client.lookup("Nobody Inc").await, LookupOutcome::NoMatch);
}

#[tokio::test]
async fn wikidata_api_error_is_a_failure() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/w/api.php")).respond_with(
            json_encoded(json!({
                "error": { "code": "maxlag", "info": "Waiting for replicas" }
            })),
        ),
    );

    let client = WikidataClient::new(&mock_config(&server)).unwrap();
    assert!(client.lookup("Acme Ltd").await.is_failure());
}

#[tokio::test]
async fn website_contacts_are_scraped_from_the_landing_page() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/home")).respond_with(
            status_code(200)
                .append_header("Content-Type", "text/html; charset=utf-8")
                .body(
                    r#"<html><head><meta name="description" content="We make anvils."></head>
                    <body>
                      <a href="https://www.dropbox.com/s/brochure">Brochure</a>
                      <a href="mailto:hello@acme.co.uk?subject=Hi">Mail</a>
                      <a href="https://x.com/acme">X</a>
                      <a href="https://www.linkedin.com/company/acme">LinkedIn</a>
                    </body></html>"#,
                ),
        ),
    );

    let scraper = WebsiteScraper::new(&mock_config(&server)).unwrap();
    let url = server.url("/home").to_string();
    let without_scheme = url.trim_start_matches("http://").to_string();
    let outcome = scraper.lookup(&without_scheme).await;

    assert!(matches!(outcome, LookupOutcome::Found(_)));
    assert_eq!(
        text(&outcome, Attribute::Email).as_deref(),
        Some("hello@acme.co.uk")
    );
    assert_eq!(
        text(&outcome, Attribute::Twitter).as_deref(),
        Some("https://x.com/acme")
    );
    assert_eq!(
        text(&outcome, Attribute::Linkedin).as_deref(),
        Some("https://www.linkedin.com/company/acme")
    );
    assert_eq!(
        text(&outcome, Attribute::Description).as_deref(),
        Some("We make anvils.")
    );
    assert!(outcome.record().get(Attribute::Facebook).is_none());
}

#[tokio::test]
async fn website_error_status_is_a_failure() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/missing"))
            .respond_with(status_code(404)),
    );

    let scraper = WebsiteScraper::new(&mock_config(&server)).unwrap();
    let outcome = scraper.lookup(&server.url("/missing").to_string()).await;

    assert!(outcome.is_failure());
    assert!(outcome.record().is_empty());
}
