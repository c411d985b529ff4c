// src/core/net.rs
// Blocking HTTP GET. One request at a time; the caller paces.

use std::time::Duration;

use tracing::debug;

use crate::config::NetOptions;
use crate::error::{Error, FetchError};

/// Status line + body. Non-2xx statuses are data, not errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, body: body.into() }
    }

    pub fn status(status: u16) -> Self {
        Self { status, body: String::new() }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// How a response status maps onto the outcome taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    /// The resource does not exist (or no longer / not yet).
    Absent,
    /// Worth trying again on a later run.
    Retryable,
}

pub fn classify(status: u16) -> StatusClass {
    match status {
        200 => StatusClass::Ok,
        408 | 429 => StatusClass::Retryable,
        500..=599 => StatusClass::Retryable,
        300..=499 => StatusClass::Absent,
        _ => StatusClass::Retryable,
    }
}

/// The HTTP GET capability the fetcher consumes.
pub trait HttpClient {
    fn get(&self, url: &str) -> Result<Response, FetchError>;
}

pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new(opts: &NetOptions) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(opts.user_agent.clone())
            .timeout(opts.timeout)
            .connect_timeout(opts.timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| Error::Net(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Response, FetchError> {
        debug!(url, "GET");
        let resp = self.client.get(url).send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(Response { status, body })
    }
}
