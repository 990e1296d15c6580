use super::*;
use shared::domain::ContentId;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).expect("date")
}

fn event(id: &str, date: Option<NaiveDate>, start: Option<&str>) -> Event {
    Event {
        id: ContentId::from(id),
        title: id.to_string(),
        description: String::new(),
        date,
        start_time: start.map(str::to_string),
        end_time: None,
        location: None,
        image_url: None,
    }
}

fn item(id: &str, category: Option<&str>) -> MenuItem {
    MenuItem {
        id: ContentId::from(id),
        title: id.to_string(),
        description: String::new(),
        price: None,
        category: category.map(str::to_string),
        tags: Vec::new(),
        available: true,
        image_url: None,
    }
}

fn article(id: &str, date: Option<NaiveDate>, category: Option<&str>) -> NewsArticle {
    NewsArticle {
        id: ContentId::from(id),
        title: id.to_string(),
        summary: String::new(),
        date,
        category: category.map(str::to_string),
        body: None,
        image_url: None,
    }
}

fn ids<T>(items: &[T], id: impl Fn(&T) -> &ContentId) -> Vec<String> {
    items.iter().map(|item| id(item).0.clone()).collect()
}

#[test]
fn upcoming_events_drop_past_and_sort_by_date_then_time() {
    let events = vec![
        event("past", Some(day(1)), None),
        event("later", Some(day(20)), None),
        event("undated", None, None),
        event("today-evening", Some(day(10)), Some("19:00")),
        event("today-morning", Some(day(10)), Some("09:00")),
    ];
    let upcoming = upcoming_events(&events, day(10));
    assert_eq!(
        ids(&upcoming, |e| &e.id),
        vec!["today-morning", "today-evening", "later", "undated"]
    );
}

#[test]
fn menu_groups_keep_first_appearance_order() {
    let items = vec![
        item("latte", Some("Coffee")),
        item("scone", Some("Bakery")),
        item("mocha", Some("Coffee")),
        item("mystery", None),
    ];
    let groups = menu_by_category(&items);
    let names: Vec<&str> = groups.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["Coffee", "Bakery", UNCATEGORISED]);
    assert_eq!(ids(&groups[0].1, |i| &i.id), vec!["latte", "mocha"]);
}

#[test]
fn latest_news_is_newest_first_and_limited() {
    let articles = vec![
        article("old", Some(day(1)), None),
        article("undated", None, None),
        article("new", Some(day(25)), None),
        article("mid", Some(day(12)), None),
    ];
    assert_eq!(ids(&latest_news(&articles, 3), |a| &a.id), vec!["new", "mid", "old"]);
    assert_eq!(latest_news(&articles, 10).last().map(|a| a.id.0.as_str()), Some("undated"));
}

#[test]
fn news_category_match_ignores_case() {
    let articles = vec![
        article("a", None, Some("Events")),
        article("b", None, Some("Roastery")),
        article("c", None, None),
    ];
    assert_eq!(ids(&news_in_category(&articles, "roastery"), |a| &a.id), vec!["b"]);
}
