//! Where a requested specification lives.

/// Path prefix of the documentation route.
pub const DOCS_PREFIX: &str = "/docs/";

/// Split a raw request path of the form `/docs/{type}/{specURL...}` into the
/// type segment and the spec URL.
///
/// Both parts are returned exactly as they appear on the wire. Percent
/// escapes are not decoded, so `%2F` or `%3F` in the spec URL reach the spec
/// host unchanged.
pub fn split_docs_path(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix(DOCS_PREFIX)?;
    let (spec_type, spec_url) = rest.split_once('/')?;
    if spec_url.is_empty() {
        return None;
    }
    Some((spec_type, spec_url))
}

/// A spec URL taken from the request path, plus the query string of the
/// inbound request.
///
/// Format detection looks at [`SpecLocation::url`] only. The document is
/// fetched from [`SpecLocation::fetch_url`], which re-attaches the query
/// verbatim so signed or tokenized URLs keep working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLocation {
    url: String,
    query: Option<String>,
}

impl SpecLocation {
    /// Create a location. An empty query is treated as no query at all.
    pub fn new(url: impl Into<String>, query: Option<String>) -> Self {
        Self {
            url: url.into(),
            query: query.filter(|q| !q.is_empty()),
        }
    }

    /// The URL as captured from the request path, without any query.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The URL the document is actually retrieved from.
    pub fn fetch_url(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.url, query),
            None => self.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_percent_escapes() {
        let (spec_type, spec_url) = split_docs_path(
            "/docs/asyncapi/https://example.com/files/group%2Fproject/spec%3Fv%3D1.json",
        )
        .unwrap();
        assert_eq!(spec_type, "asyncapi");
        assert_eq!(
            spec_url,
            "https://example.com/files/group%2Fproject/spec%3Fv%3D1.json"
        );
    }

    #[test]
    fn split_rejects_paths_outside_the_docs_route() {
        assert_eq!(split_docs_path("/health"), None);
        assert_eq!(split_docs_path("/docs/openapi"), None);
        assert_eq!(split_docs_path("/docs/openapi/"), None);
    }

    #[test]
    fn fetch_url_appends_query_verbatim() {
        let location = SpecLocation::new(
            "https://example.com/spec.yaml",
            Some("token=abc&sig=a%2Fb".to_string()),
        );
        assert_eq!(location.url(), "https://example.com/spec.yaml");
        assert_eq!(
            location.fetch_url(),
            "https://example.com/spec.yaml?token=abc&sig=a%2Fb"
        );
    }

    #[test]
    fn no_query_fetches_bare_url() {
        let location = SpecLocation::new("https://example.com/spec.json", None);
        assert_eq!(location.query(), None);
        assert_eq!(location.fetch_url(), "https://example.com/spec.json");
    }

    #[test]
    fn empty_query_is_dropped() {
        let location = SpecLocation::new("https://example.com/spec.json", Some(String::new()));
        assert_eq!(location.query(), None);
        assert_eq!(location.fetch_url(), "https://example.com/spec.json");
    }
}
