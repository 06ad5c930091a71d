use crate::models::book::PAGE_SIZE;
use crate::models::filter::FilterState;
use reqwest::Url;

/// A fully resolved upstream GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub endpoint: Url,
    pub params: Vec<(&'static str, String)>,
    pub page: u32,
}

impl RequestSpec {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())));
        url
    }
}

pub fn build_request(endpoint: &Url, filters: &FilterState) -> RequestSpec {
    let mut params = Vec::with_capacity(6);

    params.push((filters.mode().param(), filters.query().to_string()));

    if let Some(start) = filters.year_start() {
        let end = filters.year_end().map(|y| y.to_string()).unwrap_or_default();
        params.push(("first_publish_year", format!("{}-{}", start, end)));
    }
    if let Some(language) = filters.language() {
        params.push(("language", language.to_lowercase()));
    }
    if filters.ebooks_only() {
        params.push(("has_fulltext", "true".to_string()));
    }

    params.push(("page", filters.page().to_string()));
    params.push(("limit", PAGE_SIZE.to_string()));

    RequestSpec {
        endpoint: endpoint.clone(),
        params,
        page: filters.page(),
    }
}
