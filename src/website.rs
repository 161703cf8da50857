//! Contact scraping from a company's own web page.
//!
//! Only the landing page is fetched. Links are taken in document order:
//! the first `mailto:` becomes the email and the first link to each social
//! platform fills that platform.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::derive::with_scheme;
use crate::errors::{AppError, AppResult};
use crate::providers::{build_http_client, WebContactLookup};
use crate::record::{Attribute, LookupOutcome, PartialRecord};

static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).expect("static selector"));
static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// Checked in this order; one link fills at most one platform.
static SOCIAL_PLATFORMS: [(Attribute, &[&str]); 5] = [
    (Attribute::Facebook, &["facebook.com"]),
    (Attribute::Linkedin, &["linkedin.com"]),
    (Attribute::Twitter, &["twitter.com", "x.com"]),
    (Attribute::Instagram, &["instagram.com"]),
    (Attribute::Youtube, &["youtube.com"]),
];

/// Pulls email, social profile links and the meta description out of a page.
pub fn extract_contacts(html: &str) -> PartialRecord {
    let document = Html::parse_document(html);
    let mut record = PartialRecord::new();

    let description = document
        .select(&META_DESCRIPTION)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::trim);
    record.set(Attribute::Description, description);

    for anchor in document.select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };

        if !record.contains(Attribute::Email) {
            record.set(Attribute::Email, mailto_address(href));
        }

        let platform = SOCIAL_PLATFORMS.iter().find(|(attribute, domains)| {
            !record.contains(*attribute)
                && domains.iter().any(|domain| links_to_domain(href, domain))
        });
        if let Some((attribute, _)) = platform {
            record.set(*attribute, Some(href));
        }
    }
    record
}

/// Address part of a `mailto:` link, without any `?subject=` suffix.
pub fn mailto_address(href: &str) -> Option<&str> {
    let prefix = href.get(..7)?;
    if !prefix.eq_ignore_ascii_case("mailto:") {
        return None;
    }
    let address = href[7..].split('?').next().unwrap_or_default().trim();
    if address.is_empty() {
        None
    } else {
        Some(address)
    }
}

/// Substring match that only counts when `domain` starts at a host boundary,
/// so `x.com` is not found inside `dropbox.com`.
pub fn links_to_domain(href: &str, domain: &str) -> bool {
    let href = href.to_ascii_lowercase();
    href.match_indices(domain).any(|(index, _)| {
        href[..index]
            .chars()
            .next_back()
            .map_or(true, |previous| matches!(previous, '/' | '.' | '@'))
    })
}

pub struct WebsiteScraper {
    http: reqwest::Client,
}

impl WebsiteScraper {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            http: build_http_client(config, config.scrape_timeout())?,
        })
    }

    /// Any status from 400 up counts as a failed fetch.
    pub async fn fetch_page(&self, url: &str) -> AppResult<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(AppError::Parse(format!("HTTP {status} from {url}")));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl WebContactLookup for WebsiteScraper {
    async fn lookup(&self, url: &str) -> LookupOutcome {
        if url.trim().is_empty() {
            return LookupOutcome::NoMatch;
        }
        let url = with_scheme(url);
        match self.fetch_page(&url).await {
            Ok(html) => {
                let record = extract_contacts(&html);
                debug!(url = %url, attributes = record.len(), "website scraped");
                LookupOutcome::Found(record)
            }
            Err(err) => {
                warn!(?err, url = %url, "website scrape failed");
                LookupOutcome::failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    const PAGE: &str = r#"<!doctype html>
    <html><head>
      <meta name="description" content="  We make widgets.  ">
    </head><body>
      <a href="/about">About</a>
      <a href="mailto:hello@acme.co?subject=Hi">Mail</a>
      <a href="mailto:sales@acme.co">Sales</a>
      <a href="https://www.facebook.com/acme">fb</a>
      <a href="https://facebook.com/acme-second">fb again</a>
      <a href="https://www.dropbox.com/s/brochure.pdf">brochure</a>
      <a href="https://x.com/acme">x</a>
      <a href="https://twitter.com/acme_old">twitter</a>
      <a href="https://www.linkedin.com/company/acme">in</a>
      <a href="https://youtube.com/@acme">yt</a>
    </body></html>"#;

    fn text(record: &PartialRecord, attribute: Attribute) -> Option<String> {
        record.get(attribute).map(FieldValue::to_string)
    }

    #[test]
    fn first_match_per_platform_wins() {
        let record = extract_contacts(PAGE);
        assert_eq!(text(&record, Attribute::Email).as_deref(), Some("hello@acme.co"));
        assert_eq!(
            text(&record, Attribute::Facebook).as_deref(),
            Some("https://www.facebook.com/acme")
        );
        assert_eq!(
            text(&record, Attribute::Twitter).as_deref(),
            Some("https://x.com/acme")
        );
        assert_eq!(
            text(&record, Attribute::Linkedin).as_deref(),
            Some("https://www.linkedin.com/company/acme")
        );
        assert_eq!(
            text(&record, Attribute::Youtube).as_deref(),
            Some("https://youtube.com/@acme")
        );
        assert!(!record.contains(Attribute::Instagram));
        assert_eq!(
            text(&record, Attribute::Description).as_deref(),
            Some("We make widgets.")
        );
    }

    #[test]
    fn parses_mailto_links() {
        assert_eq!(mailto_address("mailto:a@b.co?cc=c@d.co"), Some("a@b.co"));
        assert_eq!(mailto_address("MAILTO:a@b.co"), Some("a@b.co"));
        assert_eq!(mailto_address("mailto:"), None);
        assert_eq!(mailto_address("https://a.co"), None);
    }

    #[test]
    fn domain_match_requires_host_boundary() {
        assert!(links_to_domain("https://x.com/acme", "x.com"));
        assert!(links_to_domain("https://mobile.x.com/acme", "x.com"));
        assert!(links_to_domain("x.com/acme", "x.com"));
        assert!(!links_to_domain("https://www.dropbox.com/x", "x.com"));
        assert!(!links_to_domain("https://netflix.com", "x.com"));
    }

    #[test]
    fn platform_named_only_in_query_is_not_a_profile_link() {
        assert!(!links_to_domain("https://acme.co/share?u=facebook.com", "facebook.com"));
        assert!(links_to_domain(
            "https://acme.co/out?to=https://facebook.com/acme",
            "facebook.com"
        ));

        let record = extract_contacts(
            r#"<a href="https://acme.co/share?u=facebook.com">Share</a>
               <a href="https://www.facebook.com/acme">Facebook</a>"#,
        );
        assert_eq!(
            text(&record, Attribute::Facebook).as_deref(),
            Some("https://www.facebook.com/acme")
        );
    }

    #[test]
    fn page_without_contacts_yields_empty_record() {
        assert!(extract_contacts("<html><body><p>hi</p></body></html>").is_empty());
    }
}
