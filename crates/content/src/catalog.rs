//! Filtering and ordering of normalized lists for display. The normalizer
//! returns provider order; pages that need a particular order go through
//! these helpers.

use chrono::NaiveDate;
use shared::domain::{Event, MenuItem, NewsArticle};

pub const UNCATEGORISED: &str = "Other";

/// Events on or after `today`, soonest first. Undated events trail.
pub fn upcoming_events(events: &[Event], today: NaiveDate) -> Vec<Event> {
    let mut upcoming: Vec<Event> = events
        .iter()
        .filter(|event| event.date.map_or(true, |date| date >= today))
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| match (a.date, b.date) {
        (Some(a_date), Some(b_date)) => a_date
            .cmp(&b_date)
            .then_with(|| a.start_time.cmp(&b.start_time)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    upcoming
}

/// Menu grouped by category, categories in order of first appearance.
pub fn menu_by_category(items: &[MenuItem]) -> Vec<(String, Vec<MenuItem>)> {
    let mut groups: Vec<(String, Vec<MenuItem>)> = Vec::new();
    for item in items {
        let category = item
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORISED.to_string());
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, members)) => members.push(item.clone()),
            None => groups.push((category, vec![item.clone()])),
        }
    }
    groups
}

/// Newest articles first, at most `limit`. Undated articles trail.
pub fn latest_news(articles: &[NewsArticle], limit: usize) -> Vec<NewsArticle> {
    let mut sorted = articles.to_vec();
    // Stable sort keeps provider order among equal dates.
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(limit);
    sorted
}

pub fn news_in_category(articles: &[NewsArticle], category: &str) -> Vec<NewsArticle> {
    articles
        .iter()
        .filter(|article| {
            article
                .category
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(category))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
