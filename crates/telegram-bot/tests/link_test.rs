use pretty_assertions::assert_eq;
use rstest::rstest;
use vitalog_telegram_bot::link::{credential_prefix, deep_link, linking_deep_link};

#[test]
fn test_deep_link() {
    assert_eq!(
        deep_link("pillbox_bot", "abc123"),
        "https://t.me/pillbox_bot?start=abc123"
    );
}

#[test]
fn test_deep_link_strips_at_sign() {
    assert_eq!(
        deep_link("@pillbox_bot", "abc123"),
        "https://t.me/pillbox_bot?start=abc123"
    );
}

#[rstest]
#[case("XYZ789:realtoken", "XYZ789")]
#[case("nocolon", "nocolon")]
#[case("a:b:c", "a")]
fn test_credential_prefix(#[case] credential: &str, #[case] expected: &str) {
    assert_eq!(credential_prefix(credential), expected);
}

#[test]
fn test_linking_deep_link_carries_prefix() {
    assert_eq!(
        linking_deep_link("pillbox_bot", "abc123", "XYZ789:realtoken"),
        "https://t.me/pillbox_bot?start=abc123_XYZ789"
    );
}

#[test]
fn test_linking_deep_link_encodes_user_id() {
    assert_eq!(
        linking_deep_link("pillbox_bot", "a b", "XYZ:t"),
        "https://t.me/pillbox_bot?start=a%20b_XYZ"
    );
}
