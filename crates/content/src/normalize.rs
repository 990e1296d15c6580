use std::sync::Arc;

use shared::domain::{ContentId, ContentKind, Event, MenuItem, NewsArticle};
use tracing::{info, warn};

use crate::{
    error::ContentFetchError,
    provider::ContentProvider,
    raw::{ParsedMoment, RawContentRecord},
};

const DESCRIPTION_FIELDS: &[&str] = &["Description", "Summary", "Excerpt"];
const SUMMARY_FIELDS: &[&str] = &["Summary", "Excerpt", "Description"];
const BODY_FIELDS: &[&str] = &["Content", "Body"];
const DATE_FIELDS: &[&str] = &["Date", "Published", "Publish Date"];
const START_TIME_FIELDS: &[&str] = &["Start Time", "Time"];
const END_TIME_FIELDS: &[&str] = &["End Time"];
const LOCATION_FIELDS: &[&str] = &["Location", "Venue"];
const CATEGORY_FIELDS: &[&str] = &["Category", "Type"];
const PRICE_FIELDS: &[&str] = &["Price"];
const TAG_FIELDS: &[&str] = &["Tags", "Dietary"];
const AVAILABLE_FIELDS: &[&str] = &["Available", "In Stock"];
const IMAGE_FIELDS: &[&str] = &["Image", "Photo", "Cover"];

/// Provider collection identifiers, one per content kind.
#[derive(Debug, Clone, Default)]
pub struct CollectionIds {
    pub events: Option<String>,
    pub menu: Option<String>,
    pub news: Option<String>,
}

impl CollectionIds {
    pub fn get(&self, kind: ContentKind) -> Option<&str> {
        let id = match kind {
            ContentKind::Events => self.events.as_deref(),
            ContentKind::Menu => self.menu.as_deref(),
            ContentKind::News => self.news.as_deref(),
        };
        id.map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn setting_name(kind: ContentKind) -> &'static str {
        match kind {
            ContentKind::Events => "CONTENT_EVENTS_DATABASE_ID",
            ContentKind::Menu => "CONTENT_MENU_DATABASE_ID",
            ContentKind::News => "CONTENT_NEWS_DATABASE_ID",
        }
    }
}

/// Fetches a collection and maps every row to its domain shape.
///
/// Rows keep provider order and are never dropped: a row missing its title
/// comes back with an empty title so provider misconfiguration stays
/// visible on the site.
#[derive(Clone)]
pub struct ContentNormalizer {
    provider: Arc<dyn ContentProvider>,
    collections: CollectionIds,
}

impl ContentNormalizer {
    pub fn new(provider: Arc<dyn ContentProvider>, collections: CollectionIds) -> Self {
        Self {
            provider,
            collections,
        }
    }

    pub fn collections(&self) -> &CollectionIds {
        &self.collections
    }

    pub async fn fetch_events(&self) -> Result<Vec<Event>, ContentFetchError> {
        let records = self.fetch_raw(ContentKind::Events).await?;
        Ok(map_records(&records, ContentKind::Events, normalize_event))
    }

    pub async fn fetch_menu(&self) -> Result<Vec<MenuItem>, ContentFetchError> {
        let records = self.fetch_raw(ContentKind::Menu).await?;
        Ok(map_records(&records, ContentKind::Menu, normalize_menu_item))
    }

    pub async fn fetch_news(&self) -> Result<Vec<NewsArticle>, ContentFetchError> {
        let records = self.fetch_raw(ContentKind::News).await?;
        Ok(map_records(&records, ContentKind::News, normalize_news_article))
    }

    async fn fetch_raw(&self, kind: ContentKind) -> Result<Vec<RawContentRecord>, ContentFetchError> {
        let collection_id = self
            .collections
            .get(kind)
            .ok_or(ContentFetchError::ConfigurationMissing(
                CollectionIds::setting_name(kind),
            ))?;
        let records = self
            .provider
            .query_collection(collection_id)
            .await
            .map_err(|error| {
                warn!(%kind, %error, "content: provider query failed");
                error
            })?;
        info!(%kind, count = records.len(), "content: collection fetched");
        Ok(records)
    }
}

fn map_records<T, F>(records: &[RawContentRecord], kind: ContentKind, normalize: F) -> Vec<T>
where
    T: WithId,
    F: Fn(&RawContentRecord) -> T,
{
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let mut item = normalize(record);
            if item.id().as_str().trim().is_empty() {
                *item.id_mut() = ContentId(format!("{kind}-{index}"));
            }
            item
        })
        .collect()
}

trait WithId {
    fn id(&self) -> &ContentId;
    fn id_mut(&mut self) -> &mut ContentId;
}

macro_rules! with_id {
    ($ty:ty) => {
        impl WithId for $ty {
            fn id(&self) -> &ContentId {
                &self.id
            }
            fn id_mut(&mut self) -> &mut ContentId {
                &mut self.id
            }
        }
    };
}

with_id!(Event);
with_id!(MenuItem);
with_id!(NewsArticle);

pub fn normalize_event(record: &RawContentRecord) -> Event {
    let start = record
        .date(DATE_FIELDS)
        .and_then(|date| ParsedMoment::parse(&date.start));
    let end = record
        .date(DATE_FIELDS)
        .and_then(|date| date.end.as_deref())
        .and_then(ParsedMoment::parse);

    Event {
        id: ContentId(record.id.clone()),
        title: record.title().unwrap_or_default(),
        description: record.text(DESCRIPTION_FIELDS).unwrap_or_default(),
        date: start.map(|moment| moment.date),
        start_time: record
            .text(START_TIME_FIELDS)
            .or_else(|| start.and_then(|moment| moment.time_label())),
        end_time: record
            .text(END_TIME_FIELDS)
            .or_else(|| end.and_then(|moment| moment.time_label())),
        location: record.text(LOCATION_FIELDS),
        image_url: record.file_url(IMAGE_FIELDS),
    }
}

pub fn normalize_menu_item(record: &RawContentRecord) -> MenuItem {
    MenuItem {
        id: ContentId(record.id.clone()),
        title: record.title().unwrap_or_default(),
        description: record.text(DESCRIPTION_FIELDS).unwrap_or_default(),
        price: record.number(PRICE_FIELDS),
        category: record.select(CATEGORY_FIELDS),
        tags: record.multi_select(TAG_FIELDS),
        available: record.checkbox(AVAILABLE_FIELDS).unwrap_or(true),
        image_url: record.file_url(IMAGE_FIELDS),
    }
}

pub fn normalize_news_article(record: &RawContentRecord) -> NewsArticle {
    NewsArticle {
        id: ContentId(record.id.clone()),
        title: record.title().unwrap_or_default(),
        summary: record.text(SUMMARY_FIELDS).unwrap_or_default(),
        date: record
            .date(DATE_FIELDS)
            .and_then(|date| ParsedMoment::parse(&date.start))
            .map(|moment| moment.date),
        category: record.select(CATEGORY_FIELDS),
        body: record.text(BODY_FIELDS),
        image_url: record.file_url(IMAGE_FIELDS),
    }
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
