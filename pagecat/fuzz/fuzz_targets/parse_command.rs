#![no_main]

use libfuzzer_sys::fuzz_target;
use pagecat::command::Command;
use pagecat::config::{PageRange, SelectionSpec};

fuzz_target!(|data: &[u8]| {
    let s = std::str::from_utf8(data).unwrap_or("");

    let _ = s.parse::<Command>();
    let _ = s.parse::<SelectionSpec>();

    if let Ok(range) = PageRange::parse(s) {
        // Expanded pages never exceed the bound and never repeat.
        let pages = range.pages_in_order(64);
        assert!(pages.iter().all(|page| (1..=64).contains(page)));
        let mut sorted = pages.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), pages.len());
    }
});
