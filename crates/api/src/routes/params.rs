//! Query parameters shared by the feed and timeline routes
//!
//! `channel` may repeat (`?channel=UC1&channel=UC2`), which the stock
//! `Query` extractor cannot collect, so the raw query string is parsed here.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Channel filter and display timezone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedParams {
    /// YouTube channel IDs, deduplicated, in request order. Empty means all.
    pub channels: Vec<String>,
    pub tz: Option<String>,
}

impl FeedParams {
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "channel" => {
                    if !params.channels.iter().any(|c| c == value) {
                        params.channels.push(value.to_string());
                    }
                }
                "tz" => params.tz = Some(value.to_string()),
                _ => {}
            }
        }

        params
    }
}

impl<S> FromRequestParts<S> for FeedParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query(parts.uri.query()))
    }
}
