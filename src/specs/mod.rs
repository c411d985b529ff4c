// src/specs/mod.rs
//! # Scraping “specs” module
//!
//! Page-specific readers for the site. Each spec focuses on a single page or
//! endpoint and encodes *where the ground truth lives* in the HTML (or JSON) and
//! *how to extract it robustly*.
//!
//! ## What lives here
//! - **Pure parsing** of a response body into records (`Topic`, `OnelinerPage`, `User`).
//! - **Selector choice** and fallbacks (`"untitled"`, `"unknown"`, one page when the
//!   pagination control is absent).
//! - **Plain-text renderings** of the records for quick inspection.
//!
//! ## What does **not** live here
//! - **Networking and pacing**: `scrape::*` sources fetch, `engine` paces.
//! - **Persistence**: the ledger, negative cache and artifact files belong to `store`.
//! - **Outcome policy**: specs report what they saw; deciding between `Empty`,
//!   `NotFound` and `Transient` is up to the source.
//!
//! ## Typical call chain
//! ```text
//! engine::run → Source::fetch_one → HttpClient::get
//!                                 ↘ specs::<page>::parse_*  → record
//!             → store::Store::persist(artifact)
//! ```
//!
//! ## Testing notes
//! Specs are tested offline against small captured fixtures; keep selectors
//! resilient to whitespace, attribute order and quote style.

pub mod oneliner;
pub mod topic;
pub mod user;

pub use oneliner::{OnelinerLine, OnelinerPage};
pub use topic::{Post, Topic};
pub use user::User;
