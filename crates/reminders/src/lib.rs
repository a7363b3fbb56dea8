//! Reminder delivery for Vitalog.
//!
//! The [`engine::ReminderDispatcher`] reads every stored reminder once per
//! cycle, asks the schedule matcher which ones are due, and fans each due
//! reminder out to the email and chat channels independently. The
//! [`scheduler`] module drives cycles on a fixed cadence.

pub mod channels;
pub mod config;
pub mod engine;
pub mod mock;
pub mod scheduler;

pub use engine::{CycleReport, ReminderDispatcher};
