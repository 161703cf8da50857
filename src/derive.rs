use url::{Host, Url};

/// Adds an `http://` scheme to bare hosts such as `acme.co/about`.
pub fn with_scheme(url: &str) -> String {
    let url = url.trim();
    let lowered = url.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

/// Host of `url` without a leading `www.`, lowercased by URL parsing.
/// IP literals have no domain.
pub fn extract_domain(url: &str) -> Option<String> {
    if url.trim().is_empty() {
        return None;
    }
    let parsed = Url::parse(&with_scheme(url)).ok()?;
    let Some(Host::Domain(host)) = parsed.host() else {
        return None;
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Label after the last dot; `None` for single-label hosts.
pub fn extract_tld(domain: &str) -> Option<String> {
    let (_, tld) = domain.rsplit_once('.')?;
    if tld.is_empty() {
        None
    } else {
        Some(tld.to_string())
    }
}

/// Drops control characters below U+0020 except tab, newline and carriage return.
pub fn sanitize_cell(value: &str) -> String {
    value
        .chars()
        .filter(|ch| matches!(ch, '\t' | '\n' | '\r') || u32::from(*ch) >= 32)
        .collect()
}
