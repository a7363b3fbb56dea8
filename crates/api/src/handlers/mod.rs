pub mod bots;
pub mod reminders;
pub mod telegram;
