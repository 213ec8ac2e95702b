//! Reads HTML from stdin and prints the extracted page as JSON.
//!
//! Usage: `extract_stdin <base-url> < page.html`
//!
//! Logging follows `RUST_LOG` (for example `RUST_LOG=rs_percollate=debug`).
//! Fetching is up to the caller, so a declared AMP alternate is only
//! reported at `info` level. Exits with status 1 when the input cannot be
//! read or extraction fails, and 2 on a usage error.

use rs_percollate::encoding::decode_html;
use rs_percollate::{amp_alternate, parse, process, Options};
use std::io::{self, Read};
use url::Url;

fn main() {
    env_logger::init();

    let Some(base_url) = std::env::args().nth(1) else {
        eprintln!("usage: extract_stdin <base-url> < page.html");
        std::process::exit(2);
    };

    let mut html = Vec::new();
    if let Err(err) = io::stdin().read_to_end(&mut html) {
        eprintln!("failed to read from stdin: {err}");
        std::process::exit(1);
    }

    let html = decode_html(&html);
    let options = Options::default();

    if options.prefer_amp {
        if let Some(amp) = Url::parse(&base_url)
            .ok()
            .and_then(|base| amp_alternate(&parse(&html), &base))
        {
            log::info!("document declares an AMP alternate: {amp}");
        }
    }

    let page = match process(&html, &base_url, &options) {
        Ok(page) => page,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(if err.is_extraction_failure() { 1 } else { 2 });
        }
    };

    match serde_json::to_string_pretty(&page) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            std::process::exit(1);
        }
    }
}
