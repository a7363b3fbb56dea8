use vitalog_telegram_bot::config::{BotConfig, DEFAULT_API_BASE};

#[test]
fn test_api_base_default() {
    let config = BotConfig::default();

    assert_eq!(config.api_base(), DEFAULT_API_BASE);
    assert_eq!(config.request_timeout_secs, 10);
}

#[test]
fn test_api_base_trailing_slash_trimmed() {
    let config = BotConfig {
        api_base_url: "http://127.0.0.1:9000/".to_string(),
        request_timeout_secs: 5,
    };

    assert_eq!(config.api_base(), "http://127.0.0.1:9000");
}
