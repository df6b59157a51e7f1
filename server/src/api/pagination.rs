use crate::api::ApiError;
use axum::http::Uri;
use foodgram_core::PageRequest;
use serde::Serialize;
use url::Url;
use utoipa::ToSchema;

/// Page envelope shared by every list endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Reject pages past the end before running the page query.
pub fn check_page(page: &PageRequest, total: i64) -> Result<(), ApiError> {
    if page.is_valid_for(total) {
        Ok(())
    } else {
        Err(ApiError::not_found("Invalid page"))
    }
}

impl<T> Paginated<T> {
    pub fn new(results: Vec<T>, total: i64, page: &PageRequest, base_url: &str, uri: &Uri) -> Self {
        let next = page
            .next_page(total)
            .and_then(|n| page_url(base_url, uri, n));
        let previous = page
            .previous_page()
            .and_then(|p| page_url(base_url, uri, p));

        Self {
            count: total,
            next,
            previous,
            results,
        }
    }
}

/// Absolute URL of the same request with `page` replaced. Page 1 drops the
/// parameter entirely.
fn page_url(base_url: &str, uri: &Uri, page: i64) -> Option<String> {
    let mut url = match Url::parse(&format!("{}{}", base_url, uri.path())) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Cannot build pagination link from {}: {}", base_url, e);
            return None;
        }
    };

    let kept: Vec<(String, String)> = url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(kept.iter());
        if page > 1 {
            pairs.append_pair("page", &page.to_string());
        }
    }

    if url.query() == Some("") {
        url.set_query(None);
    }

    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodgram_core::PageParams;

    fn request(page: i64, limit: i64) -> PageRequest {
        PageRequest::from_params(
            PageParams {
                page: Some(page),
                limit: Some(limit),
            },
            6,
        )
    }

    #[test]
    fn test_first_page_links() {
        let uri: Uri = "/api/recipes/?limit=2".parse().unwrap();
        let page = Paginated::new(vec![1, 2], 5, &request(1, 2), "http://localhost:3000", &uri);
        assert_eq!(page.count, 5);
        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:3000/api/recipes/?limit=2&page=2")
        );
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_previous_to_first_page_drops_page_param() {
        let uri: Uri = "/api/users/?page=2&limit=2".parse().unwrap();
        let page = Paginated::new(vec![3, 4], 4, &request(2, 2), "http://localhost:3000", &uri);
        assert_eq!(page.next, None);
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost:3000/api/users/?limit=2")
        );
    }

    #[test]
    fn test_repeated_params_are_kept() {
        let uri: Uri = "/api/recipes/?tags=lunch&tags=dinner&page=2".parse().unwrap();
        let page = Paginated::new(vec![0], 20, &request(2, 6), "https://foodgram.example", &uri);
        assert_eq!(
            page.next.as_deref(),
            Some("https://foodgram.example/api/recipes/?tags=lunch&tags=dinner&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("https://foodgram.example/api/recipes/?tags=lunch&tags=dinner")
        );
    }

    #[test]
    fn test_page_past_end_is_not_found() {
        assert!(check_page(&request(1, 6), 0).is_ok());
        assert!(check_page(&request(2, 6), 6).is_err());
        assert!(check_page(&request(2, 6), 7).is_ok());
    }
}
