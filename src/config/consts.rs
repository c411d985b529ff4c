// src/config/consts.rs

// Net config
pub const SITE_URL: &str = "https://www.pouet.net";
pub const API_URL: &str = "https://api.pouet.net/v1";
pub const USER_AGENT: &str =
    "pouet_scrape/0.1 (+https://www.pouet.net ; resumable archive bot, one request at a time)";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// Local store
pub const LEDGER_FILE: &str = "index.log";
pub const LEDGER_SEP: char = ';';
pub const NEGATIVE_CACHE_FILE: &str = "missing_ids.json";
pub const DEBUG_LOG_FILE: &str = "debug.log";
pub const SLUG_MAX_LEN: usize = 80;

// Default output folders, one per job
pub const TOPICS_DIR: &str = "bbs";
pub const ONELINERS_DIR: &str = "pouet_oneliners";
pub const USERS_DIR: &str = "pouet_users";

// Identifier spaces
pub const TOPICS_FIRST_ID: u32 = 1;
pub const TOPICS_LAST_ID: u32 = 12_880;
pub const ONELINERS_FIRST_PAGE: u32 = 1;
pub const USERS_MAX_ID: u32 = 108_641;
pub const USERS_SAMPLE: usize = 1_000;

// Politeness, in seconds
pub const TOPIC_DELAY_SECS: (f64, f64) = (20.0, 80.0);
pub const TOPIC_PAGE_DELAY_SECS: (f64, f64) = (10.0, 30.0);
pub const ONELINER_DELAY_SECS: (f64, f64) = (3.0, 10.0);
pub const USER_DELAY_SECS: (f64, f64) = (120.0, 240.0);

// Rate ceiling: never more than this many requests per minute, whatever the delay range says
pub const MAX_PER_MINUTE: f64 = 30.0;
// Longest single pause accepted from options (one day)
pub const MAX_DELAY_SECS: u64 = 86_400;

// Stop checks while sleeping
pub const SLEEP_SLICE_MS: u64 = 250;
