// src/engine/mod.rs
//! The resumable fetch loop and the types it speaks.

mod engine;
pub mod pacer;
pub mod stop;
pub mod types;

pub use engine::{Runtime, Session, Source, run};
pub use pacer::{Pacer, Sleeper, ThreadSleeper};
pub use stop::StopSignal;
pub use types::{FetchOutcome, IdSpace, ItemReport, ItemStatus, Plan, RunSummary, StopReason};
