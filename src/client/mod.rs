//! Client side of the catalog: page sources and the loaders that drive the view

pub mod http;
pub mod loader;
pub mod models;
pub mod source;

pub use http::PortalClient;
pub use loader::{InfiniteLoader, LoadOutcome, LoaderConfig, LoaderState, PagedLoader};
pub use models::{CatalogRow, RowIdentity, UseCasePage, UseCaseRecord};
pub use source::{FetchError, Navigator, PageSource, LOGIN_PATH};
