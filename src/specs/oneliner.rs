// src/specs/oneliner.rs
//! Scraping *spec* for the oneliner shoutbox (`oneliner.php?page=<n>`).
//!
//! Entries live in `ul.boxlist`. A `li.day` is a date header; any other `li` is a
//! shout: `<time datetime=..>HH:MM</time> <a class="usera" href="user.php?who=ID" title="nick">`
//! followed by the message text. Shouts missing the time or the user link are skipped.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::core::html::{max_page_option, query_param_u32, sel, text};

static BOXLIST: LazyLock<Selector> = LazyLock::new(|| sel("ul.boxlist"));
static ITEM: LazyLock<Selector> = LazyLock::new(|| sel("li"));
static TIME: LazyLock<Selector> = LazyLock::new(|| sel("time"));
static USER: LazyLock<Selector> = LazyLock::new(|| sel("a.usera"));

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OnelinerLine {
    Day {
        label: String,
    },
    Shout {
        time: String,
        posted_at: Option<String>,
        nickname: String,
        user_id: Option<u32>,
        message: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnelinerPage {
    pub page: u32,
    pub lines: Vec<OnelinerLine>,
}

/// `None` when the page has no boxlist at all (layout changed or error page).
pub fn parse_page(page: u32, html: &str) -> Option<OnelinerPage> {
    let doc = Html::parse_document(html);
    let boxlist = doc.select(&BOXLIST).next()?;

    let mut lines = Vec::new();
    for li in boxlist.select(&ITEM) {
        if li.value().classes().any(|c| c == "day") {
            lines.push(OnelinerLine::Day { label: text(li) });
            continue;
        }

        let (Some(time), Some(user)) = (li.select(&TIME).next(), li.select(&USER).next()) else {
            continue;
        };

        let nickname = user.value().attr("title").unwrap_or("unknown").to_string();
        let user_id = user.value().attr("href").and_then(|h| query_param_u32(h, "who"));
        // The first token of the item text is the displayed time.
        let message = text(li)
            .split_once(' ')
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_default();

        lines.push(OnelinerLine::Shout {
            time: text(time),
            posted_at: time.value().attr("datetime").map(str::to_string),
            nickname,
            user_id,
            message,
        });
    }

    Some(OnelinerPage { page, lines })
}

/// Last page number from the page selector of the shoutbox index.
pub fn last_page(html: &str) -> Option<u32> {
    max_page_option(&Html::parse_document(html))
}

impl OnelinerPage {
    pub fn render_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                OnelinerLine::Day { label } => label.clone(),
                OnelinerLine::Shout { time, nickname, user_id, message, .. } => {
                    let who = user_id.map(|id| id.to_string()).unwrap_or_else(|| "unknown".into());
                    format!("{time} {nickname}[{who}] : {message}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
