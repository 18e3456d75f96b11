use oaslint::Pointer;
use proptest::prelude::*;

/// Tokens heavy in the characters that need escaping.
fn arb_token() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z~/01]{0,8}",
        "\\PC{0,12}",
        Just("~1".to_string()),
        Just("~0".to_string()),
        Just(String::new()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn display_then_parse_round_trips(tokens in prop::collection::vec(arb_token(), 0..6)) {
        let pointer = Pointer::from_tokens(tokens.clone());
        let text = pointer.to_string();
        let parsed = Pointer::parse(&text).unwrap();
        prop_assert_eq!(parsed.tokens(), tokens.as_slice());
        prop_assert_eq!(parsed, pointer);
    }

    #[test]
    fn fragment_form_round_trips(tokens in prop::collection::vec(arb_token(), 0..6)) {
        let pointer = Pointer::from_tokens(tokens);
        let fragment = pointer.to_fragment();
        prop_assert!(fragment.starts_with('#'));
        prop_assert_eq!(Pointer::parse(&fragment).unwrap(), pointer);
    }

    #[test]
    fn child_then_parent_is_identity(
        tokens in prop::collection::vec(arb_token(), 0..5),
        extra in arb_token(),
    ) {
        let pointer = Pointer::from_tokens(tokens);
        let child = pointer.child(extra.clone());
        prop_assert_eq!(child.last(), Some(extra.as_str()));
        prop_assert!(child.starts_with(&pointer));
        prop_assert_eq!(child.parent(), Some(pointer));
    }

    #[test]
    fn ancestors_end_at_root(tokens in prop::collection::vec(arb_token(), 0..6)) {
        let pointer = Pointer::from_tokens(tokens.clone());
        let ancestors: Vec<_> = pointer.ancestors().collect();
        prop_assert_eq!(ancestors.len(), tokens.len() + 1);
        prop_assert_eq!(&ancestors[0], &pointer);
        prop_assert!(ancestors.last().unwrap().is_root());
        prop_assert!(ancestors.iter().all(|a| pointer.starts_with(a)));
    }
}
