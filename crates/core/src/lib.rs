//! # Vitalog Core
//!
//! Domain records shared by every Vitalog crate: medication reminders and
//! their schedules, messaging-bot bindings, the per-user summary mirror, and
//! the classified error type.

pub mod errors;
pub mod models;
pub mod schedule;
