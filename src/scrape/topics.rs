// src/scrape/topics.rs
use tracing::debug;

use super::{build_artifact, get_body};
use crate::config::NetOptions;
use crate::core::sanitize::{padded, slug};
use crate::engine::{FetchOutcome, Session, Source};
use crate::error::{FetchError, Result};
use crate::specs::topic::{self, Topic};
use crate::store::Artifact;

const ID_WIDTH: usize = 5;

/// BBS threads, `topic.php?which=<id>&page=<n>`. A thread spans one or more pages.
pub struct Topics {
    site_url: String,
}

impl Topics {
    pub fn new(net: &NetOptions) -> Self {
        Self { site_url: net.site_url.trim_end_matches('/').to_string() }
    }

    pub fn url(&self, id: u32, page: u32) -> String {
        format!("{}/topic.php?which={id}&page={page}", self.site_url)
    }

    /// `00042_2004-03-04_the_scene_is_dead`
    pub fn base_name(record: &Topic) -> String {
        let date = record
            .creation_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "undated".to_string());
        format!("{}_{date}_{}", padded(record.topic_id, ID_WIDTH), slug(&record.title, "untitled"))
    }
}

impl Source for Topics {
    type Record = Topic;

    fn name(&self) -> &'static str {
        "topics"
    }

    fn fetch_one(&self, id: u32, session: &mut Session<'_>) -> FetchOutcome<Topic> {
        let first = match get_body(session, &self.url(id, 1)) {
            Ok(body) => body,
            Err(outcome) => return outcome,
        };
        let page_one = topic::parse_page(&first);
        let mut posts = page_one.posts;

        // A sub-page that fails after page one spoils the whole thread: retry it next run.
        for page in 2..=page_one.total_pages {
            if let Err(e) = session.page_pause() {
                return FetchOutcome::Transient(e);
            }
            debug!(id, page, of = page_one.total_pages, "topic sub-page");
            let url = self.url(id, page);
            match session.get(&url) {
                Ok(resp) if resp.is_ok() => posts.extend(topic::parse_page(&resp.body).posts),
                Ok(resp) => {
                    return FetchOutcome::Transient(FetchError::Status { status: resp.status, url });
                }
                Err(e) => return FetchOutcome::Transient(e),
            }
        }

        if posts.is_empty() {
            return FetchOutcome::Empty;
        }
        FetchOutcome::Success(Topic::assemble(id, page_one.title, posts))
    }

    fn artifact(&self, _id: u32, record: &Topic, with_text: bool) -> Result<Artifact> {
        let text = with_text.then(|| record.render_text());
        build_artifact(Self::base_name(record), record, text)
    }
}
