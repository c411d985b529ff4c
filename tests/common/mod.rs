// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use pouet_scrape::config::{DelayRange, FetchOptions, JobKind, NetOptions, NotFoundPolicy};
use pouet_scrape::core::{HttpClient, Response};
use pouet_scrape::engine::{IdSpace, Runtime, Sleeper, StopSignal};
use pouet_scrape::error::FetchError;

pub const SITE: &str = "http://pouet.test";
pub const API: &str = "http://api.pouet.test/v1";

pub fn net() -> NetOptions {
    NetOptions { site_url: SITE.into(), api_url: API.into(), ..NetOptions::default() }
}

/// Canned responses by exact URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct ScriptedHttp {
    routes: HashMap<String, Result<Response, String>>,
    requested: RefCell<Vec<String>>,
    /// Raise the stop flag once this many requests have been served.
    stop_after: Option<(usize, StopSignal)>,
    served: Cell<usize>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Ok(Response::ok(body)));
        self
    }

    pub fn status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.routes.insert(url.into(), Ok(Response::status(status)));
        self
    }

    pub fn broken(mut self, url: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Err("connection reset".into()));
        self
    }

    pub fn stop_after(mut self, n: usize, stop: &StopSignal) -> Self {
        self.stop_after = Some((n, stop.clone()));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }

    pub fn was_requested(&self, url: &str) -> bool {
        self.requested.borrow().iter().any(|u| u == url)
    }
}

impl HttpClient for ScriptedHttp {
    fn get(&self, url: &str) -> Result<Response, FetchError> {
        self.requested.borrow_mut().push(url.to_string());
        self.served.set(self.served.get() + 1);
        if let Some((n, stop)) = &self.stop_after {
            if self.served.get() >= *n {
                stop.request();
            }
        }
        match self.routes.get(url) {
            Some(Ok(resp)) => Ok(resp.clone()),
            Some(Err(msg)) => Err(FetchError::Network(msg.clone())),
            None => Ok(Response::status(404)),
        }
    }
}

/// Records pauses instead of sleeping.
pub struct RecordingSleeper<'a>(pub &'a RefCell<Vec<Duration>>);

impl Sleeper for RecordingSleeper<'_> {
    fn sleep(&mut self, d: Duration, _stop: &StopSignal) {
        self.0.borrow_mut().push(d);
    }
}

pub struct NoSleep;

impl Sleeper for NoSleep {
    fn sleep(&mut self, _d: Duration, _stop: &StopSignal) {}
}

pub fn runtime(http: &ScriptedHttp) -> Runtime<'_> {
    Runtime { http, sleeper: Box::new(NoSleep), stop: StopSignal::new() }
}

/// Job defaults with zero pauses, no rate ceiling in practice and a fixed seed.
pub fn quick_opts(kind: JobKind, dir: &Path, ids: IdSpace, policy: NotFoundPolicy) -> FetchOptions {
    let mut opts = FetchOptions::for_job(kind);
    opts.out_dir = dir.to_path_buf();
    opts.ids = ids;
    opts.not_found = policy;
    opts.item_delay = DelayRange::ZERO;
    opts.page_delay = DelayRange::ZERO;
    opts.max_per_minute = 1e9;
    opts.seed = Some(7);
    opts
}

pub fn topic_url(id: u32, page: u32) -> String {
    format!("{SITE}/topic.php?which={id}&page={page}")
}

pub fn oneliner_url(page: u32) -> String {
    format!("{SITE}/oneliner.php?page={page}")
}

pub fn user_url(id: u32) -> String {
    format!("{API}/user/?id={id}")
}

/// A topic page with `pages` in its selector and one post per entry.
pub fn topic_html(title: &str, pages: u32, posts: &[(&str, &str, u32, &str)]) -> String {
    let options: String = (1..=pages).map(|p| format!("<option>{p}</option>")).collect();
    let body: String = posts
        .iter()
        .map(|(when, nick, uid, content)| {
            format!(
                r#"<div class="bbspost"><div class="content">{content}</div>
                   <div class="foot">added on the {when} by <a href="user.php?who={uid}">{nick}</a></div></div>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="pouetbox_bbsview"><h2>{title}</h2>
           <select name="page">{options}</select>{body}</div></body></html>"#
    )
}

pub fn simple_topic(id: u32) -> String {
    topic_html(&format!("thread {id}"), 1, &[("2004-03-04 08:00:01", "analogue", 1, "hello")])
}

pub fn oneliner_html(last_page: u32, shouts: &[(&str, &str, u32, &str)]) -> String {
    let options: String = (1..=last_page).map(|p| format!("<option>{p}</option>")).collect();
    let items: String = shouts
        .iter()
        .map(|(time, nick, uid, msg)| {
            format!(
                r#"<li><time datetime='2000-10-04 {time}:00'>{time}</time>
                   <a href='user.php?who={uid}' class='usera' title="{nick}"></a> {msg}</li>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><select name="page">{options}</select>
           <ul class="boxlist"><li class="day">2000-10-04</li>{items}</ul></body></html>"#
    )
}

pub fn user_json(id: u32, nick: &str) -> String {
    format!(r#"{{"success":true,"user":{{"id":"{id}","nickname":"{nick}","registerDate":"2001-01-01 00:00:00"}}}}"#)
}

pub const USER_MISS: &str = r#"{"success":false,"errors":["user not found"]}"#;

pub fn ledger_ids(dir: &Path) -> Vec<u32> {
    let text = std::fs::read_to_string(dir.join("index.log")).unwrap_or_default();
    text.lines().filter_map(|l| l.split(';').next()?.parse().ok()).collect()
}

pub fn json_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".json") && n != "missing_ids.json")
        .collect();
    names.sort();
    names
}

#[derive(Clone, Default)]
struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` under a thread-local subscriber and return what it logged at warn and above.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let logged = String::from_utf8_lossy(&buf.0.lock().unwrap()).into_owned();
    (out, logged)
}
