use std::sync::Arc;

use crate::{analytics::Analytics, preference::PersistedPreference, store::KeyValueStore};

pub const CONSENT_KEY: &str = "cafe-site:cookie-consent";

/// Cookie-consent banner state backed by a stored JSON boolean.
///
/// Declining is stored as `false`, which is also the default, so the banner
/// is hidden for the rest of the session but shows again on the next visit.
pub struct CookieConsent {
    accepted: PersistedPreference<bool>,
    dismissed: bool,
    analytics: Analytics,
}

impl CookieConsent {
    pub fn load(store: Option<Arc<dyn KeyValueStore>>, analytics: Analytics) -> Self {
        let accepted = PersistedPreference::load(store, CONSENT_KEY, false);
        if *accepted.get() {
            analytics.consent_update(true);
        }
        Self {
            accepted,
            dismissed: false,
            analytics,
        }
    }

    pub fn accepted(&self) -> bool {
        *self.accepted.get()
    }

    pub fn banner_visible(&self) -> bool {
        !self.accepted() && !self.dismissed
    }

    pub fn accept(&mut self) {
        self.accepted.set(true);
        self.dismissed = true;
        self.analytics.consent_update(true);
    }

    pub fn decline(&mut self) {
        self.accepted.set(false);
        self.dismissed = true;
        self.analytics.consent_update(false);
    }

    pub fn reset(&mut self) {
        self.accepted.reset();
        self.dismissed = false;
    }
}

#[cfg(test)]
#[path = "tests/consent_tests.rs"]
mod tests;
