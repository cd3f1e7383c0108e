//! Card metadata read from the rendered block.

use chrono::Utc;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Author, tags and timestamps shown alongside a card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardMeta {
    pub uid: String,
    pub username: String,
    pub page_links: Vec<String>,
    /// Epoch milliseconds
    pub edit_time: i64,
    /// Epoch milliseconds
    pub create_time: i64,
}

impl CardMeta {
    /// Read metadata from the first elements carrying the host's `data-*`
    /// attributes. Missing or malformed values fall back to defaults: the
    /// user becomes `"Unknown"`, page links become empty and timestamps
    /// become the current time.
    pub fn from_html(html: &str, uid: impl Into<String>) -> Self {
        let doc = Html::parse_fragment(html);
        let attr = |name: &str| first_attr(&doc, name);
        let now = Utc::now().timestamp_millis();

        let username = attr("data-edit-display-name")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        let page_links = attr("data-page-links")
            .and_then(|raw| match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(links) => Some(links),
                Err(e) => {
                    log::warn!("Ignoring malformed page links {:?}: {}", raw, e);
                    None
                }
            })
            .unwrap_or_default();

        let timestamp = |raw: Option<String>| {
            raw.and_then(|t| t.trim().parse::<i64>().ok())
                .unwrap_or(now)
        };

        Self {
            uid: uid.into(),
            username,
            page_links,
            edit_time: timestamp(attr("data-edit-time")),
            create_time: timestamp(attr("data-create-time")),
        }
    }

    /// Download name for the rendered card image.
    pub fn file_name(&self) -> String {
        format!("{}-{}.png", self.username, self.uid)
    }
}

fn first_attr(doc: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!("[{}]", name)).ok()?;
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr(name))
        .map(str::to_string)
}
