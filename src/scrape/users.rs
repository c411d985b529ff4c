// src/scrape/users.rs
use super::{build_artifact, get_body};
use crate::config::NetOptions;
use crate::core::sanitize::{padded, slug};
use crate::engine::{FetchOutcome, Session, Source};
use crate::error::Result;
use crate::specs::user::{self, User};
use crate::store::Artifact;

const ID_WIDTH: usize = 6;

/// User records from the JSON API, `v1/user/?id=<id>`.
pub struct Users {
    api_url: String,
}

impl Users {
    pub fn new(net: &NetOptions) -> Self {
        Self { api_url: net.api_url.trim_end_matches('/').to_string() }
    }

    pub fn url(&self, id: u32) -> String {
        format!("{}/user/?id={id}", self.api_url)
    }
}

impl Source for Users {
    type Record = User;

    fn name(&self) -> &'static str {
        "users"
    }

    fn fetch_one(&self, id: u32, session: &mut Session<'_>) -> FetchOutcome<User> {
        let body = match get_body(session, &self.url(id)) {
            Ok(body) => body,
            Err(outcome) => return outcome,
        };
        match user::parse_response(id, &body) {
            Ok(Some(found)) => FetchOutcome::Success(found),
            Ok(None) => FetchOutcome::NotFound { status: None },
            Err(e) => FetchOutcome::Transient(e),
        }
    }

    /// `000001_analogue.json` plus a `.txt` holding just the nickname.
    fn artifact(&self, id: u32, record: &User, with_text: bool) -> Result<Artifact> {
        let base = format!("{}_{}", padded(id, ID_WIDTH), slug(&record.nickname, "user"));
        build_artifact(base, record, with_text.then(|| record.nickname.clone()))
    }
}
