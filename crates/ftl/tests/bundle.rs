//! Bundle loading against real files on disk.

use std::fs;
use std::future::Future;
use std::task::{Context, Poll, Waker};

use ftl::{Bundle, Error};

const MANIFEST: &str = r#"{
    "version": 1,
    "default_locale": "en-US",
    "entries": {
        "en-US": {
            "display_name": "English (US)",
            "path": "en_us.ftl",
            "aliases": ["en"],
            "defaults": { "brand": { "type": "string", "value": "Acme" } }
        },
        "de-DE": {
            "display_name": "Deutsch",
            "path": "de_de.ftl",
            "aliases": ["de"]
        }
    },
    "defaults": {
        "brand": { "type": "string", "value": "Fallback" },
        "year": { "type": "long", "value": 2024 }
    }
}"#;

const EN_US: &str = "\
welcome = Welcome to {$brand} ({$year})!
plain = Hello!
";

const DE_DE: &str = "\
welcome = Willkommen bei {$brand}!
";

/// Drives a future to completion on the current thread. The opener futures
/// used here are ready immediately; a noop waker is all that's needed.
fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = Box::pin(future);
    let mut context = Context::from_waker(Waker::noop());
    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

fn write_resources(dir: &std::path::Path) {
    fs::write(dir.join("en_us.ftl"), EN_US).unwrap();
    fs::write(dir.join("de_de.ftl"), DE_DE).unwrap();
}

#[test]
fn load_locale_from_disk_with_injected_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_resources(dir.path());

    let bundle = Bundle::from_json(MANIFEST).unwrap();
    let file = bundle
        .load_locale("en", |path| fs::File::open(dir.path().join(path)))
        .unwrap();

    // The entry-level brand wins over the bundle-level one; the bundle-level
    // year survives.
    assert_eq!(
        file.format("welcome", |_| {}).unwrap(),
        "Welcome to Acme (2024)!"
    );
}

#[test]
fn per_call_variables_override_injected_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_resources(dir.path());

    let bundle = Bundle::from_json(MANIFEST).unwrap();
    let file = bundle
        .load_locale("en-US", |path| fs::File::open(dir.path().join(path)))
        .unwrap();

    let result = file
        .format("welcome", |ctx| {
            ctx.string("brand", "Overridden");
        })
        .unwrap();
    assert_eq!(result, "Welcome to Overridden (2024)!");
}

#[test]
fn unknown_locale_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    write_resources(dir.path());

    let bundle = Bundle::from_json(MANIFEST).unwrap();
    let file = bundle
        .load_locale("fr-FR", |path| fs::File::open(dir.path().join(path)))
        .unwrap();
    assert_eq!(file.format("plain", |_| {}).unwrap(), "Hello!");
}

#[test]
fn alias_selects_its_entry() {
    let dir = tempfile::tempdir().unwrap();
    write_resources(dir.path());

    let bundle = Bundle::from_json(MANIFEST).unwrap();
    let file = bundle
        .load_locale("de", |path| fs::File::open(dir.path().join(path)))
        .unwrap();
    // de_de.ftl has no entry-level brand, so the bundle-level one applies.
    assert_eq!(
        file.format("welcome", |_| {}).unwrap(),
        "Willkommen bei Fallback!"
    );
}

#[test]
fn async_opener_resolves_to_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    write_resources(dir.path());

    let bundle = Bundle::from_json(MANIFEST).unwrap();
    let file = block_on(bundle.load_locale_async("en", |path| {
        let path = dir.path().join(path);
        async move { fs::File::open(path) }
    }))
    .unwrap();
    assert_eq!(
        file.format("welcome", |_| {}).unwrap(),
        "Welcome to Acme (2024)!"
    );
}

#[test]
fn failed_load_leaves_no_state_behind() {
    let bundle = Bundle::from_json(MANIFEST).unwrap();
    let result = bundle.load_locale("en", |_| -> std::io::Result<fs::File> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "offline"))
    });
    assert!(matches!(result, Err(Error::Bundle { .. })));

    // The bundle holds no cache; a later load with a working opener is
    // unaffected by the failure.
    let dir = tempfile::tempdir().unwrap();
    write_resources(dir.path());
    let file = bundle
        .load_locale("en", |path| fs::File::open(dir.path().join(path)))
        .unwrap();
    assert_eq!(file.format("plain", |_| {}).unwrap(), "Hello!");
}

#[test]
fn parse_errors_in_the_resource_surface_as_parser_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("en_us.ftl"), "broken = {\n").unwrap();
    fs::write(dir.path().join("de_de.ftl"), DE_DE).unwrap();

    let bundle = Bundle::from_json(MANIFEST).unwrap();
    let result = bundle.load_locale("en", |path| fs::File::open(dir.path().join(path)));
    assert!(matches!(result, Err(Error::Parser { .. })));
}
