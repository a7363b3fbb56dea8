//! Messaging-platform plumbing for Vitalog: the inbound update envelope, the
//! `/start` linking command, deep links, and the outbound send-message
//! transport.

pub mod client;
pub mod config;
pub mod link;
pub mod update;

pub use client::{ChatTransport, TelegramClient};
