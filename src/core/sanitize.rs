// src/core/sanitize.rs

use crate::config::consts::SLUG_MAX_LEN;

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Filename-safe slug: letters and digits kept, whitespace runs become one `_`,
/// `-` and `_` kept, everything else dropped. Capped at `SLUG_MAX_LEN` chars.
/// Falls back to `fallback` when nothing survives.
pub fn slug(name: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_us = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() { out.push(ch); last_us = false; }
        else if ch.is_whitespace() || ch == '_' { if !last_us { out.push('_'); last_us = true; } }
        else if ch == '-' { out.push(ch); last_us = false; }
    }
    let out: String = out.trim_matches('_').chars().take(SLUG_MAX_LEN).collect();
    let out = out.trim_end_matches('_');
    if out.is_empty() { fallback.to_string() } else { out.to_string() }
}

/// Zero-padded id so artifact names sort lexicographically.
pub fn padded(id: u32, width: usize) -> String {
    format!("{id:0width$}")
}
