// benches/parse.rs
use std::fmt::Write as _;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use pouet_scrape::specs::{oneliner, topic};
use pouet_scrape::store::Ledger;

/// A topic page the size of a busy thread: 25 posts.
fn topic_page() -> String {
    let mut html = String::from(
        r#"<html><body><div id="pouetbox_bbsview"><h2>what are you listening to</h2>
           <select name="page"><option>1</option><option>2</option><option>48</option></select>"#,
    );
    for i in 0..25 {
        let _ = write!(
            html,
            r#"<div class="bbspost"><div class="content">post {i}<br/>with <b>markup</b> and a <a href="prod.php?which={i}">link</a></div>
               <div class="foot">added on the 2004-03-05 21:{:02}:00 by <a href="user.php?who={i}">nick{i}</a></div></div>"#,
            i % 60
        );
    }
    html.push_str("</div></body></html>");
    html
}

fn oneliner_page() -> String {
    let mut html = String::from(r#"<ul class="boxlist"><li class="day">2000-10-04</li>"#);
    for i in 0..50 {
        let _ = write!(
            html,
            r#"<li><time datetime='2000-10-04 18:{m:02}:00'>18:{m:02}</time>
               <a href='user.php?who={i}' class='usera' title="nick{i}"></a> shout number {i}</li>"#,
            m = i % 60
        );
    }
    html.push_str("</ul>");
    html
}

fn bench_parse(c: &mut Criterion) {
    let doc = topic_page();
    c.bench_function("topic_parse_page", |b| {
        b.iter(|| black_box(topic::parse_page(black_box(&doc)).posts.len()))
    });

    let doc = oneliner_page();
    c.bench_function("oneliner_parse_page", |b| {
        b.iter(|| black_box(oneliner::parse_page(1, black_box(&doc)).map(|p| p.lines.len())))
    });
}

fn bench_ledger(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("index.log");
    let mut text = String::new();
    for id in 1..=12_880u32 {
        let _ = writeln!(text, "{id};{id:05}_2004-03-04_some_thread_title");
    }
    std::fs::write(&path, text).expect("write ledger");

    c.bench_function("ledger_load_12880", |b| {
        b.iter(|| black_box(Ledger::load(&path).expect("load").len()))
    });
}

criterion_group!(benches, bench_parse, bench_ledger);
criterion_main!(benches);
