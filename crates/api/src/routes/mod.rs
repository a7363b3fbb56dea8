pub mod bots;
pub mod health;
pub mod reminders;
pub mod telegram;
