use serde::Deserialize;

/// Command that opens a linking conversation.
pub const START_COMMAND: &str = "/start";

/// Inbound webhook envelope. Only the fields the linking flow reads are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message_id: Option<i64>,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Chat {
    /// Best human-readable name for the conversation.
    pub fn display_handle(&self) -> Option<&str> {
        [&self.username, &self.first_name, &self.title]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// What a message's text says about account linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartPayload {
    /// Not a start command; nothing to do.
    NotStart,
    /// A start command missing the user id or the credential prefix.
    Incomplete,
    Link {
        user_id: String,
        credential_prefix: String,
    },
}

impl Update {
    pub fn text(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.text.as_deref())
    }

    pub fn chat(&self) -> Option<&Chat> {
        self.message.as_ref().map(|m| &m.chat)
    }
}

/// Parses `/start <userId>_<credentialPrefix>`.
///
/// The command may carry a `@bot` suffix as group chats send it. User ids may
/// contain underscores, so the split happens at the last one.
pub fn parse_start(text: &str) -> StartPayload {
    let Some(rest) = text.trim_start().strip_prefix(START_COMMAND) else {
        return StartPayload::NotStart;
    };

    // "/startled" is not the start command
    let rest = match rest.chars().next() {
        None => rest,
        Some(c) if c.is_whitespace() => rest,
        Some('@') => rest
            .find(char::is_whitespace)
            .map_or("", |idx| &rest[idx..]),
        Some(_) => return StartPayload::NotStart,
    };

    let Some((user_id, prefix)) = rest.trim().rsplit_once('_') else {
        return StartPayload::Incomplete;
    };

    if user_id.is_empty() || prefix.is_empty() {
        return StartPayload::Incomplete;
    }

    StartPayload::Link {
        user_id: user_id.to_string(),
        credential_prefix: prefix.to_string(),
    }
}
