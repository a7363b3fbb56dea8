pub mod bot;
pub mod reminder;
