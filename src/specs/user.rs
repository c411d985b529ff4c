// src/specs/user.rs
//! Reading the user API (`v1/user/?id=<id>`).
//!
//! A hit looks like `{"success": true, "user": {"id": "1", "nickname": "analogue",
//! "registerDate": "2000-08-31 ...", ...}}`. A miss still answers 200, with
//! `success` false or no `user` object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub nickname: String,
    pub registration_date: Option<String>,
    /// The whole API answer, kept verbatim.
    pub raw: Value,
}

/// `Ok(None)` when the API says there is no such user.
pub fn parse_response(id: u32, body: &str) -> Result<Option<User>, FetchError> {
    let raw: Value = serde_json::from_str(body)?;

    if raw.get("success").and_then(Value::as_bool) != Some(true) {
        return Ok(None);
    }
    let Some(user) = raw.get("user").filter(|u| u.is_object()) else {
        return Ok(None);
    };

    let nickname = user
        .get("nickname")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("ID {id}"));
    let registration_date = user
        .get("registerDate")
        .or_else(|| user.get("registration_date"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Some(User { id, nickname, registration_date, raw }))
}
