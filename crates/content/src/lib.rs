//! Content pipeline for the café site: a client for the external content
//! database, the raw row model it returns, and the normalization of those
//! rows into the typed lists served by the site's API.

pub mod catalog;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod raw;

pub use error::ContentFetchError;
pub use normalize::{CollectionIds, ContentNormalizer};
pub use provider::{ContentProvider, HttpContentProvider, ProviderSettings};
pub use raw::RawContentRecord;
