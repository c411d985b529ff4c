// src/specs/topic.rs
//! Scraping *spec* for BBS topics (`topic.php?which=<id>&page=<n>`).
//!
//! Page layout relied on:
//! - title: `#pouetbox_bbsview h2`
//! - pagination: `<select name="page">` listing every page number
//! - posts: `div.bbspost` holding `div.content` and `div.foot`, the foot reading
//!   `added on the YYYY-MM-DD HH:MM:SS by <a href="user.php?who=ID">nick</a>`

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::core::html::{max_page_option, query_param_u32, sel, text, text_lines};

const SITE_TIME: &str = "%Y-%m-%d %H:%M:%S";

static TITLE: LazyLock<Selector> = LazyLock::new(|| sel("#pouetbox_bbsview h2"));
static POST: LazyLock<Selector> = LazyLock::new(|| sel("div.bbspost"));
static CONTENT: LazyLock<Selector> = LazyLock::new(|| sel("div.content"));
static FOOT: LazyLock<Selector> = LazyLock::new(|| sel("div.foot"));
static USER_LINK: LazyLock<Selector> = LazyLock::new(|| sel(r#"a[href*="user.php?who="]"#));
static ADDED_ON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"added on the\s+(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})").expect("static regex")
});

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub timestamp: Option<NaiveDateTime>,
    pub user_nick: String,
    pub user_id: Option<u32>,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub topic_id: u32,
    pub title: String,
    pub creation_date: Option<NaiveDate>,
    pub posts: Vec<Post>,
}

/// What a single sub-page yields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicPage {
    pub title: String,
    pub total_pages: u32,
    pub posts: Vec<Post>,
}

pub fn parse_page(html: &str) -> TopicPage {
    let doc = Html::parse_document(html);
    let title = doc
        .select(&TITLE)
        .next()
        .map(text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "untitled".to_string());

    TopicPage {
        title,
        total_pages: max_page_option(&doc).unwrap_or(1).max(1),
        posts: parse_posts(&doc),
    }
}

pub fn parse_posts(doc: &Html) -> Vec<Post> {
    let mut posts = Vec::new();
    for post in doc.select(&POST) {
        let (Some(content), Some(foot)) = (post.select(&CONTENT).next(), post.select(&FOOT).next())
        else {
            continue;
        };

        let foot_text = text(foot);
        let timestamp = ADDED_ON
            .captures(&foot_text)
            .and_then(|c| NaiveDateTime::parse_from_str(&c[1], SITE_TIME).ok());

        let link = foot.select(&USER_LINK).next();
        let user_nick = link
            .map(text)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let user_id = link
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| query_param_u32(href, "who"));

        posts.push(Post { timestamp, user_nick, user_id, content: text_lines(content) });
    }
    posts
}

impl Topic {
    /// Join the sub-pages of one topic. The creation date is the earliest known post date.
    pub fn assemble(topic_id: u32, title: String, posts: Vec<Post>) -> Self {
        let creation_date = posts.iter().filter_map(|p| p.timestamp).min().map(|t| t.date());
        Self { topic_id, title, creation_date, posts }
    }

    pub fn render_text(&self) -> String {
        let mut out = format!("# Topic {} – {}\n\n", self.topic_id, self.title);
        for post in &self.posts {
            let when = post
                .timestamp
                .map(|t| t.format(SITE_TIME).to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let who = post.user_id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string());
            let _ = writeln!(out, "{when} by {}[{who}]", post.user_nick);
            let _ = writeln!(out, "{}\n", post.content);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_ONE: &str = r#"
        <html><body>
        <div id="pouetbox_bbsview">
          <h2> the scene is dead </h2>
          <select name="page"><option>1</option><option selected>2</option><option>3</option></select>
          <div class="bbspost">
            <div class="content">first line<br/>second line</div>
            <div class="foot">added on the 2004-03-05 21:10:00 by
              <a href="user.php?who=38632">astrofra</a> <img src="avatar.gif"/></div>
          </div>
          <div class="bbspost">
            <div class="content">no it is not</div>
            <div class="foot">added on the 2004-03-04 08:00:01 by <a href="user.php?who=1">analogue</a></div>
          </div>
          <div class="bbspost"><div class="content">no foot here</div></div>
        </div>
        </body></html>"#;

    #[test]
    fn reads_title_pages_and_posts() {
        let page = parse_page(PAGE_ONE);
        assert_eq!(page.title, "the scene is dead");
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.posts.len(), 2);

        let first = &page.posts[0];
        assert_eq!(first.user_nick, "astrofra");
        assert_eq!(first.user_id, Some(38632));
        assert_eq!(first.content, "first line\nsecond line");
        assert_eq!(
            first.timestamp,
            NaiveDateTime::parse_from_str("2004-03-05 21:10:00", SITE_TIME).ok()
        );
    }

    #[test]
    fn missing_pieces_fall_back() {
        let page = parse_page(
            r#"<div class="bbspost"><div class="content">hi</div><div class="foot">by nobody</div></div>"#,
        );
        assert_eq!(page.title, "untitled");
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.posts[0].user_nick, "unknown");
        assert_eq!(page.posts[0].user_id, None);
        assert_eq!(page.posts[0].timestamp, None);
    }

    #[test]
    fn creation_date_is_earliest_post() {
        let page = parse_page(PAGE_ONE);
        let topic = Topic::assemble(7, page.title, page.posts);
        assert_eq!(topic.creation_date, NaiveDate::from_ymd_opt(2004, 3, 4));
    }

    #[test]
    fn text_rendering() {
        let page = parse_page(PAGE_ONE);
        let topic = Topic::assemble(7, page.title, page.posts);
        let txt = topic.render_text();
        assert!(txt.starts_with("# Topic 7 – the scene is dead\n\n"));
        assert!(txt.contains("2004-03-05 21:10:00 by astrofra[38632]\nfirst line\nsecond line\n\n"));
    }
}
