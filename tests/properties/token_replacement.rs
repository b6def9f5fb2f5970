//! Property tests for token substitution.

use std::collections::BTreeMap;

use proptest::prelude::*;

use iacdeploy::domain::services::replace_tokens;
use iacdeploy::domain::value_objects::{TokenDelimiters, TokenMap, TokenSource};

fn token_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z][A-Za-z0-9_]{0,11}").unwrap()
}

/// Values never contain the default delimiters
fn token_value() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z0-9 ./:-]{0,16}").unwrap()
}

/// Text between placeholders; no `<` or `>` so it cannot form one
fn filler() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-zA-Z0-9 {}\":,\\n-]{0,20}").unwrap()
}

fn token_map(entries: &BTreeMap<String, String>) -> TokenMap {
    TokenMap::builder()
        .extend(TokenSource::Custom, entries.clone())
        .build()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every placeholder whose name is in the map is replaced.
    #[test]
    fn property_known_placeholders_are_all_replaced(
        entries in proptest::collection::btree_map(token_name(), token_value(), 1..6),
        picks in proptest::collection::vec((any::<prop::sample::Index>(), filler()), 0..10),
        head in filler(),
    ) {
        let delimiters = TokenDelimiters::default();
        let names: Vec<&String> = entries.keys().collect();

        let mut content = head.clone();
        let mut expected = head;
        for (index, text) in &picks {
            let name = names[index.index(names.len())];
            content.push_str(&delimiters.wrap(name));
            content.push_str(text);
            expected.push_str(&entries[name]);
            expected.push_str(text);
        }

        let result = replace_tokens(&content, &token_map(&entries), &delimiters);

        prop_assert_eq!(&result.content, &expected);
        prop_assert_eq!(result.total_replaced(), picks.len());
        prop_assert!(result.unresolved.is_empty());
        for name in entries.keys() {
            prop_assert!(!result.content.contains(&delimiters.wrap(name)));
        }
    }

    /// PROPERTY: placeholders without a value survive verbatim.
    #[test]
    fn property_unknown_placeholders_are_left_alone(
        known in token_name(),
        unknown in token_name(),
        value in token_value(),
        text in filler(),
    ) {
        prop_assume!(known != unknown);
        let delimiters = TokenDelimiters::default();
        let content = format!("{}{}{}", delimiters.wrap(&unknown), text, delimiters.wrap(&known));
        let tokens = TokenMap::builder()
            .insert(TokenSource::Local, known.clone(), value.clone())
            .build();

        let result = replace_tokens(&content, &tokens, &delimiters);

        prop_assert_eq!(result.content, format!("{}{}{}", delimiters.wrap(&unknown), text, value));
        prop_assert_eq!(result.unresolved, vec![unknown]);
    }

    /// PROPERTY: content without placeholders is returned unchanged.
    #[test]
    fn property_content_without_placeholders_is_untouched(
        content in filler(),
        entries in proptest::collection::btree_map(token_name(), token_value(), 0..4),
    ) {
        let result = replace_tokens(&content, &token_map(&entries), &TokenDelimiters::default());
        prop_assert_eq!(&result.content, &content);
        prop_assert_eq!(result.total_replaced(), 0);
    }

    /// PROPERTY: custom beats local beats built-in, whatever the insertion order.
    #[test]
    fn property_token_precedence(
        name in token_name(),
        built_in in token_value(),
        local in token_value(),
        custom in token_value(),
        order in Just(vec![TokenSource::Custom, TokenSource::BuiltIn, TokenSource::Local]).prop_shuffle(),
    ) {
        let value_for = |source: TokenSource| match source {
            TokenSource::BuiltIn => built_in.clone(),
            TokenSource::Local => local.clone(),
            TokenSource::Custom => custom.clone(),
        };

        let mut builder = TokenMap::builder();
        for source in order {
            builder = builder.insert(source, name.clone(), value_for(source));
        }
        let map = builder.build();
        prop_assert_eq!(map.get(&name), Some(custom.as_str()));
        prop_assert_eq!(map.source_of(&name), Some(TokenSource::Custom));

        let without_custom = TokenMap::builder()
            .insert(TokenSource::Local, name.clone(), local.clone())
            .insert(TokenSource::BuiltIn, name.clone(), built_in.clone())
            .build();
        prop_assert_eq!(without_custom.get(&name), Some(local.as_str()));
    }

    /// PROPERTY: a value containing a placeholder is not expanded again.
    #[test]
    fn property_single_pass(
        first in token_name(),
        second in token_name(),
        value in token_value(),
    ) {
        prop_assume!(first != second);
        let delimiters = TokenDelimiters::default();
        let tokens = TokenMap::builder()
            .insert(TokenSource::Custom, first.clone(), delimiters.wrap(&second))
            .insert(TokenSource::Custom, second.clone(), value)
            .build();

        let result = replace_tokens(&delimiters.wrap(&first), &tokens, &delimiters);

        prop_assert_eq!(result.content, delimiters.wrap(&second));
    }
}
