//! Catalog Client
//!
//! Client-side access to the chapter catalog:
//! - [`CatalogFetcher`]: cached listing reads with retry and offline short-circuit
//! - [`ConnectivityMonitor`]: reachability flag fed by platform signals
//! - [`HttpCatalogSource`]: `reqwest` transport carrying the session cookie
//!
//! Failures end up as a [`FetchError`] whose [`UserAction`] tells a UI
//! whether to send the user to login, show an offline banner or show the
//! error inline.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod model;
pub mod source;


pub use config::ClientConfig;
pub use connectivity::ConnectivityMonitor;
pub use error::{FetchError, SourceError, UserAction};
pub use fetcher::{CatalogFetcher, Listing};
pub use http::HttpCatalogSource;
pub use model::{ChapterPayload, ChapterRecord, ListingQuery};
pub use source::CatalogSource;
