use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use eyre::{Result, WrapErr};
use tracing::{info, warn};
use uuid::Uuid;
use vitalog_core::{models::reminder::Reminder, schedule::is_due};
use vitalog_db::repositories::{BotRepository, ReminderRepository};
use vitalog_telegram_bot::ChatTransport;

use crate::channels::{Channel, ChatDispatcher, DispatchOutcome, EmailDispatcher, EmailTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRecord {
    pub reminder_id: Uuid,
    pub channel: Channel,
    pub outcome: DispatchOutcome,
}

/// What one cycle did. Nothing here is persisted.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Rows read from the store
    pub examined: usize,
    /// Rows that failed store-boundary validation
    pub invalid: usize,
    /// Due reminders whose notifications are switched off
    pub muted: usize,
    pub records: Vec<DispatchRecord>,
}

impl CycleReport {
    pub fn outcome(&self, reminder_id: Uuid, channel: Channel) -> Option<&DispatchOutcome> {
        self.records
            .iter()
            .find(|r| r.reminder_id == reminder_id && r.channel == channel)
            .map(|r| &r.outcome)
    }

    pub fn sent(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_sent()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_failed()).count()
    }
}

pub struct ReminderDispatcher {
    reminders: Arc<dyn ReminderRepository>,
    email: EmailDispatcher,
    chat: ChatDispatcher,
    timezone: Tz,
}

impl ReminderDispatcher {
    pub fn new(
        reminders: Arc<dyn ReminderRepository>,
        bots: Arc<dyn BotRepository>,
        email: Arc<dyn EmailTransport>,
        chat: Arc<dyn ChatTransport>,
        timezone: Tz,
    ) -> Self {
        Self {
            reminders,
            email: EmailDispatcher::new(email),
            chat: ChatDispatcher::new(bots, chat),
            timezone,
        }
    }

    /// Wall-clock time in the configured zone.
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }

    pub async fn run_cycle(&self) -> Result<CycleReport> {
        self.run_cycle_at(self.local_now()).await
    }

    /// Runs one dispatch cycle as of `now`.
    ///
    /// Only a failed bulk read is returned as an error. Everything after that
    /// is recorded per reminder and channel.
    pub async fn run_cycle_at(&self, now: NaiveDateTime) -> Result<CycleReport> {
        let rows = self
            .reminders
            .list_all()
            .await
            .wrap_err("Failed to load reminders")?;

        let mut report = CycleReport {
            examined: rows.len(),
            ..CycleReport::default()
        };

        for row in rows {
            let reminder = match Reminder::try_from(row) {
                Ok(reminder) => reminder,
                Err(e) => {
                    warn!(error = %e, "Skipping invalid reminder record");
                    report.invalid += 1;
                    continue;
                }
            };

            if !is_due(&reminder, &now) {
                continue;
            }

            if !reminder.notifications_enabled {
                report.muted += 1;
                continue;
            }

            self.dispatch(&reminder, &mut report).await;
        }

        info!(
            examined = report.examined,
            sent = report.sent(),
            failed = report.failed(),
            invalid = report.invalid,
            "Dispatch cycle finished"
        );

        Ok(report)
    }

    async fn dispatch(&self, reminder: &Reminder, report: &mut CycleReport) {
        // Each channel reports its own outcome, so one failing never blocks the other.
        let email = self.email.dispatch(reminder).await;
        report.records.push(DispatchRecord {
            reminder_id: reminder.id,
            channel: Channel::Email,
            outcome: email,
        });

        let chat = self.chat.dispatch(reminder).await;
        report.records.push(DispatchRecord {
            reminder_id: reminder.id,
            channel: Channel::Chat,
            outcome: chat,
        });
    }
}
