//! Independent delivery paths for a due reminder.
//!
//! Each dispatcher turns every failure into a [`DispatchOutcome`] so a broken
//! channel never stops the other channel or the rest of the cycle.

pub mod chat;
pub mod email;

use std::fmt;

pub use chat::{ChatCredential, ChatDispatcher, CredentialResolution, resolve_credential};
pub use email::{EmailDispatcher, EmailMessage, EmailTransport, SmtpMailer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Chat,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Email => write!(f, "email"),
            Channel::Chat => write!(f, "chat"),
        }
    }
}

/// Why a channel was not attempted for a due reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoEmailAddress,
    ChatDisabled,
    /// The active binding lacks a credential or has not been linked to a chat.
    BindingIncomplete,
    /// The summary names an active binding that no longer exists.
    BindingMissing,
    /// Legacy credential present but the reminder carries no chat id.
    NoChatId,
    NoCredential,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Skipped(SkipReason),
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchOutcome::Failed(_))
    }
}
