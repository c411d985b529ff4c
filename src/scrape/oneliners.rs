// src/scrape/oneliners.rs
use super::{build_artifact, get_body};
use crate::config::NetOptions;
use crate::core::sanitize::padded;
use crate::engine::{FetchOutcome, Session, Source};
use crate::error::{FetchError, Result};
use crate::specs::oneliner::{self, OnelinerPage};
use crate::store::Artifact;

const PAGE_WIDTH: usize = 5;

/// Shoutbox archive, `oneliner.php?page=<n>`, one artifact per page.
pub struct Oneliners {
    site_url: String,
}

impl Oneliners {
    pub fn new(net: &NetOptions) -> Self {
        Self { site_url: net.site_url.trim_end_matches('/').to_string() }
    }

    pub fn url(&self, page: u32) -> String {
        format!("{}/oneliner.php?page={page}", self.site_url)
    }

    pub fn index_url(&self) -> String {
        format!("{}/oneliner.php", self.site_url)
    }
}

impl Source for Oneliners {
    type Record = OnelinerPage;

    fn name(&self) -> &'static str {
        "oneliners"
    }

    fn fetch_one(&self, page: u32, session: &mut Session<'_>) -> FetchOutcome<OnelinerPage> {
        let body = match get_body(session, &self.url(page)) {
            Ok(body) => body,
            Err(outcome) => return outcome,
        };
        match oneliner::parse_page(page, &body) {
            Some(parsed) if !parsed.lines.is_empty() => FetchOutcome::Success(parsed),
            _ => FetchOutcome::Empty,
        }
    }

    fn artifact(&self, page: u32, record: &OnelinerPage, with_text: bool) -> Result<Artifact> {
        let text = with_text.then(|| record.render_text());
        build_artifact(padded(page, PAGE_WIDTH), record, text)
    }

    /// The index page carries the page selector with the newest page number.
    fn last_id(&self, session: &mut Session<'_>) -> std::result::Result<Option<u32>, FetchError> {
        let url = self.index_url();
        let resp = session.get(&url)?;
        if !resp.is_ok() {
            return Err(FetchError::Status { status: resp.status, url });
        }
        Ok(oneliner::last_page(&resp.body))
    }
}
