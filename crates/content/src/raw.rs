use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Timelike};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateValue {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileLink {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileObject {
    File { file: FileLink },
    External { external: FileLink },
}

impl FileObject {
    pub fn url(&self) -> &str {
        match self {
            FileObject::File { file } => &file.url,
            FileObject::External { external } => &external.url,
        }
    }
}

/// One typed property of a provider row. Property kinds this site never
/// reads decode as [`PropertyValue::Unsupported`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileObject>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

fn join_text(parts: &[RichText]) -> Option<String> {
    let text: String = parts.iter().map(|part| part.plain_text.as_str()).collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn select_name(select: &Option<SelectOption>) -> Option<String> {
    let name = select.as_ref()?.name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawContentRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_properties")]
    pub properties: HashMap<String, PropertyValue>,
}

/// Decodes each property on its own. A property that does not match its
/// declared shape becomes [`PropertyValue::Unsupported`] so one bad cell
/// never costs the row.
fn lenient_properties<'de, D>(deserializer: D) -> Result<HashMap<String, PropertyValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };
    Ok(entries
        .into_iter()
        .map(|(name, value)| {
            let property = serde_json::from_value(value).unwrap_or(PropertyValue::Unsupported);
            (name, property)
        })
        .collect())
}

impl RawContentRecord {
    /// Text of the row's title-typed property, whatever its display name.
    pub fn title(&self) -> Option<String> {
        self.properties
            .values()
            .find_map(|value| match value {
                PropertyValue::Title { title } => join_text(title),
                _ => None,
            })
            .or_else(|| self.text(&["Name", "Title"]))
    }

    /// First non-blank textual value among `names`.
    pub fn text(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| match self.properties.get(*name)? {
            PropertyValue::Title { title } => join_text(title),
            PropertyValue::RichText { rich_text } => join_text(rich_text),
            PropertyValue::Url { url } => url.clone().filter(|url| !url.trim().is_empty()),
            PropertyValue::Select { select } => select_name(select),
            _ => None,
        })
    }

    pub fn number(&self, names: &[&str]) -> Option<f64> {
        names.iter().find_map(|name| match self.properties.get(*name)? {
            PropertyValue::Number { number } => *number,
            PropertyValue::RichText { rich_text } => join_text(rich_text)
                .and_then(|text| text.trim_start_matches(['$', '€', '£']).parse().ok()),
            _ => None,
        })
    }

    pub fn select(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| match self.properties.get(*name)? {
            PropertyValue::Select { select } => select_name(select),
            PropertyValue::RichText { rich_text } => join_text(rich_text),
            _ => None,
        })
    }

    pub fn multi_select(&self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .find_map(|name| match self.properties.get(*name)? {
                PropertyValue::MultiSelect { multi_select } => Some(
                    multi_select
                        .iter()
                        .map(|option| option.name.trim().to_string())
                        .filter(|name| !name.is_empty())
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn date(&self, names: &[&str]) -> Option<&DateValue> {
        names.iter().find_map(|name| match self.properties.get(*name)? {
            PropertyValue::Date { date } => date.as_ref(),
            _ => None,
        })
    }

    pub fn checkbox(&self, names: &[&str]) -> Option<bool> {
        names.iter().find_map(|name| match self.properties.get(*name)? {
            PropertyValue::Checkbox { checkbox } => Some(*checkbox),
            _ => None,
        })
    }

    /// URL of the first file attached under any of `names`, or a plain URL
    /// property of that name.
    pub fn file_url(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| match self.properties.get(*name)? {
            PropertyValue::Files { files } => files.first().map(|file| file.url().to_string()),
            PropertyValue::Url { url } => url.clone(),
            _ => None,
        })
    }
}

/// A provider date split into its calendar day and, for datetimes, the
/// wall-clock time in `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedMoment {
    pub date: NaiveDate,
    pub time: Option<(u32, u32)>,
}

impl ParsedMoment {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(Self { date, time: None });
        }
        let moment = DateTime::parse_from_rfc3339(raw).ok()?;
        let naive = moment.naive_local();
        Some(Self {
            date: naive.date(),
            time: Some((naive.hour(), naive.minute())),
        })
    }

    pub fn time_label(&self) -> Option<String> {
        self.time.map(|(hour, minute)| format!("{hour:02}:{minute:02}"))
    }
}

#[cfg(test)]
#[path = "tests/raw_tests.rs"]
mod tests;
