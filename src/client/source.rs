use async_trait::async_trait;
use thiserror::Error;

use super::models::UseCasePage;

/// Login surface the loaders send the user to on a 401
pub const LOGIN_PATH: &str = "/login";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The portal answered 401
    #[error("Authentication required")]
    Unauthorized,

    #[error("Failed to fetch data: {status}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Text for a login form: the portal's own `error` message when it sent one
    pub fn detail(&self) -> String {
        match self {
            FetchError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Where pages come from
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page. `page` is 1-indexed, as on the wire.
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<UseCasePage, FetchError>;
}

/// Navigation hook for the hosting UI
pub trait Navigator: Send + Sync {
    /// Leave the catalog for the login surface
    fn navigate_to_login(&self);
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for std::sync::Arc<T> {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<UseCasePage, FetchError> {
        (**self).fetch_page(page, page_size).await
    }
}

impl<T: Navigator + ?Sized> Navigator for std::sync::Arc<T> {
    fn navigate_to_login(&self) {
        (**self).navigate_to_login()
    }
}
