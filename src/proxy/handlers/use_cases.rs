//! Pagination proxy for `/api/use-cases`

use axum::{
    extract::{RawQuery, State},
    Json,
};
use serde_json::Value;
use url::form_urlencoded;

use crate::proxy::error::PortalError;
use crate::proxy::server::AppState;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    /// Read `page` and `page_size` from a raw query string. The first
    /// occurrence of a repeated key wins; unknown keys are ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match &*key {
                "page" => &mut query.page,
                "page_size" => &mut query.page_size,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }
}

/// Parameters forwarded upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub page: String,
    pub page_size: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl PageParams {
    /// Apply defaults, and the optional page size limit.
    ///
    /// Without a limit the raw values are forwarded untouched. With one,
    /// `page >= 1` and `1 <= page_size <= limit`; values that do not parse
    /// take the defaults.
    pub fn resolve(query: &PageQuery, max_page_size: Option<u32>) -> Self {
        let Some(limit) = max_page_size else {
            return Self {
                page: non_empty(&query.page).unwrap_or("1").to_string(),
                page_size: non_empty(&query.page_size).unwrap_or("20").to_string(),
            };
        };

        let page = non_empty(&query.page)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_PAGE)
            .max(1);
        let page_size = non_empty(&query.page_size)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(limit)
            .max(1);

        Self {
            page: page.to_string(),
            page_size: page_size.to_string(),
        }
    }
}

/// Forward one page request upstream and relay the body unchanged
pub async fn list_use_cases(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Value>, PortalError> {
    let query = PageQuery::parse(raw.as_deref());
    let params = PageParams::resolve(&query, state.max_page_size);

    let body = state
        .upstream
        .fetch_use_cases(&params.page, &params.page_size)
        .await?;

    Ok(Json(body))
}
