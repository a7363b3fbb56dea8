const LINK_BASE: &str = "https://t.me";

/// Link that opens a chat with the bot and pre-fills `/start <userId>`.
pub fn deep_link(bot_handle: &str, user_id: &str) -> String {
    format!(
        "{}/{}?start={}",
        LINK_BASE,
        bot_handle.trim_start_matches('@'),
        urlencoding::encode(user_id)
    )
}

/// The part of a credential the handshake checks: everything before the
/// first `:`, or the whole credential when it has none.
pub fn credential_prefix(credential: &str) -> &str {
    credential
        .split_once(':')
        .map_or(credential, |(prefix, _)| prefix)
}

/// Deep link carrying the credential prefix the linking handshake requires.
pub fn linking_deep_link(bot_handle: &str, user_id: &str, credential: &str) -> String {
    let payload = format!("{}_{}", user_id, credential_prefix(credential));
    format!(
        "{}/{}?start={}",
        LINK_BASE,
        bot_handle.trim_start_matches('@'),
        urlencoding::encode(&payload)
    )
}
