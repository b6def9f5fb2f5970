#![no_main]

use iacdeploy::domain::services::replace_tokens;
use iacdeploy::domain::value_objects::{TokenDelimiters, TokenMap, TokenSource};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Layout: prefix \0 suffix \0 name=value lines \0 content
    let mut parts = text.splitn(4, '\0');
    let (Some(prefix), Some(suffix), Some(tokens), Some(content)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return;
    };

    let map = TokenMap::builder()
        .extend(
            TokenSource::Custom,
            tokens.lines().filter_map(|l| l.split_once('=')),
        )
        .build();
    let delimiters = TokenDelimiters::new(prefix, suffix);

    let result = replace_tokens(content, &map, &delimiters);
    if !delimiters.is_valid() {
        assert_eq!(result.content, content);
    }
});
