use url::Url;

/// Turn an `href` from a challenge description into an absolute URL Notion
/// will accept, or `None` if it should be rendered as plain text.
///
/// - `//host/x` gets an `https:` scheme
/// - relative paths resolve against the platform origin
/// - `http(s)://` and `mailto:` pass through when they parse
/// - a bare `host.tld/x` gets an `https://` prefix
pub fn sanitize_url(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let candidate = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with('/') || href.starts_with("./") || href.starts_with("../") {
        return base.join(href).ok().filter(is_web_url).map(String::from);
    } else if has_scheme(href) {
        href.to_string()
    } else if href.contains('.') {
        format!("https://{}", href)
    } else {
        return None;
    };

    let url = Url::parse(&candidate).ok()?;
    if url.scheme() == "mailto" {
        return (!url.path().is_empty()).then(|| url.to_string());
    }
    is_web_url(&url).then(|| url.to_string())
}

fn has_scheme(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:")
}

fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|h| !h.is_empty() && (h.contains('.') || h == "localhost" || url.port().is_some()))
}
