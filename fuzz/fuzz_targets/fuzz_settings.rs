#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(content) = std::str::from_utf8(rest) else {
        return;
    };

    // Settings parsing must never panic, whatever the format
    let file = match selector % 3 {
        0 => "settings.yml",
        1 => "settings.json",
        _ => "settings.toml",
    };
    let _ = iacdeploy::config::parse_with_warnings(Path::new(file), content);
});
