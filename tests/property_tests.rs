use nzmstow::ignore::rules::{escape, normalize_line};
use nzmstow::utils::{batch_size, normalize};
use proptest::prelude::*;
use std::path::{Component, Path};

proptest! {
    #[test]
    fn test_normalize_line_never_yields_rooted_patterns(line in ".*") {
        // Invariant: every accepted rule is relative to its ignore file's directory
        if let Some((pattern, _)) = normalize_line(&line) {
            prop_assert!(!pattern.is_empty());
            prop_assert!(!pattern.starts_with('/'));
            prop_assert!(!pattern.contains("//"));
            prop_assert!(!pattern.split('/').any(|s| s == "." || s == ".."));
        }
    }

    #[test]
    fn test_negation_flag_follows_leading_bang(body in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
        let plain = normalize_line(&body);
        let negated = normalize_line(&format!("!{body}"));
        prop_assert_eq!(plain.clone().map(|(_, n)| n), Some(false));
        prop_assert_eq!(negated, plain.map(|(p, _)| (p, true)));
    }

    #[test]
    fn test_unanchored_rules_match_any_depth(name in "[a-z][a-z0-9_.-]{0,10}") {
        let (pattern, negate) = normalize_line(&name).unwrap();
        prop_assert!(!negate);
        prop_assert_eq!(pattern, format!("**/{name}"));
    }

    #[test]
    fn test_escaped_names_match_themselves(name in "[a-zA-Z0-9_.*?\\[\\] -]{1,20}") {
        let pattern = glob::Pattern::new(&escape(&name)).unwrap();
        prop_assert!(pattern.matches(&name));
    }

    #[test]
    fn test_path_normalization_is_idempotent(parts in prop::collection::vec("(\\.|\\.\\.|[a-z]{1,4})", 0..8)) {
        let path = parts.join("/");
        let once = normalize(Path::new(&path));
        let twice = normalize(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert!(!once.components().any(|c| c == Component::CurDir));
    }

    #[test]
    fn test_batches_cover_all_actions(len in 0usize..10_000, workers in 0usize..64) {
        let size = batch_size(len, workers);
        prop_assert!(size >= 1);
        prop_assert!(size * workers.max(1) >= len);
    }
}
