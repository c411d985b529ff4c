// src/config/mod.rs

pub mod consts;
pub mod options;

pub use options::{secs_to_duration, DelayRange, FetchOptions, JobKind, NetOptions, NotFoundPolicy};
