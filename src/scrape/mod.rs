// src/scrape/mod.rs
//! One `Source` per remote collection: URLs, sub-page walk, outcome mapping,
//! artifact naming. Parsing itself is delegated to `specs`.

mod oneliners;
mod topics;
mod users;

pub use oneliners::Oneliners;
pub use topics::Topics;
pub use users::Users;

use serde::Serialize;

use crate::core::net::{StatusClass, classify};
use crate::engine::{FetchOutcome, Session};
use crate::error::{FetchError, Result};
use crate::store::Artifact;

/// GET `url` and keep the body only on 200; anything else is already an outcome.
fn get_body<R>(session: &mut Session<'_>, url: &str) -> std::result::Result<String, FetchOutcome<R>> {
    match session.get(url) {
        Ok(resp) => match classify(resp.status) {
            StatusClass::Ok => Ok(resp.body),
            StatusClass::Absent => Err(FetchOutcome::NotFound { status: Some(resp.status) }),
            StatusClass::Retryable => Err(FetchOutcome::Transient(FetchError::Status {
                status: resp.status,
                url: url.to_string(),
            })),
        },
        Err(e) => Err(FetchOutcome::Transient(e)),
    }
}

fn build_artifact<T: Serialize>(base: String, record: &T, text: Option<String>) -> Result<Artifact> {
    let mut json = serde_json::to_string_pretty(record)?;
    json.push('\n');
    Ok(Artifact { base, json, text })
}
