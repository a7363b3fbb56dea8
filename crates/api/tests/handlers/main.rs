mod bots_test;
mod error_handling_test;
mod health_test;
mod reminders_test;
mod telegram_test;
mod test_utils;
