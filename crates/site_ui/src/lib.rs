//! Client-side utilities of the café site, written against small capability
//! traits so the browser pieces (local storage, intersection observation,
//! timers, the analytics tag) can be swapped for in-memory fakes.

pub mod analytics;
pub mod consent;
pub mod preference;
pub mod reveal;
pub mod store;

pub use analytics::{Analytics, AnalyticsSink};
pub use consent::CookieConsent;
pub use preference::PersistedPreference;
pub use reveal::{RevealOptions, RevealTarget, ScrollRevealController};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, PersistenceError};
