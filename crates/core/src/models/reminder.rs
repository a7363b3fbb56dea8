use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{HealthError, HealthResult};

/// Wire literal for each supported frequency.
pub const FREQUENCY_DAILY: &str = "daily";
pub const FREQUENCY_WEEKLY: &str = "weekly";
pub const FREQUENCY_SPECIFIC_DATE: &str = "specific_date";

/// When a reminder repeats.
///
/// The variant carries exactly the fields its frequency needs, so a weekly
/// schedule always has its days and a one-off schedule always has its date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "snake_case")]
pub enum Schedule {
    Daily,
    Weekly {
        #[serde(with = "weekday_names")]
        days_of_week: Vec<Weekday>,
    },
    SpecificDate {
        specific_date: NaiveDate,
    },
}

impl Schedule {
    /// Builds a schedule from the flat fields a record is stored with.
    ///
    /// Fields that belong to another frequency are ignored; fields the
    /// frequency requires must be present and well formed.
    pub fn from_parts(
        frequency: &str,
        days_of_week: &[String],
        specific_date: Option<NaiveDate>,
    ) -> HealthResult<Self> {
        match frequency {
            FREQUENCY_DAILY => Ok(Schedule::Daily),
            FREQUENCY_WEEKLY => {
                if days_of_week.is_empty() {
                    return Err(HealthError::Data(
                        "weekly reminder has no days of week".to_string(),
                    ));
                }
                let days = days_of_week
                    .iter()
                    .map(|day| parse_weekday(day))
                    .collect::<HealthResult<Vec<_>>>()?;
                Ok(Schedule::Weekly { days_of_week: days })
            }
            FREQUENCY_SPECIFIC_DATE => specific_date
                .map(|specific_date| Schedule::SpecificDate { specific_date })
                .ok_or_else(|| {
                    HealthError::Data("specific_date reminder has no date".to_string())
                }),
            other => Err(HealthError::Data(format!("unknown frequency '{}'", other))),
        }
    }

    pub fn frequency(&self) -> &'static str {
        match self {
            Schedule::Daily => FREQUENCY_DAILY,
            Schedule::Weekly { .. } => FREQUENCY_WEEKLY,
            Schedule::SpecificDate { .. } => FREQUENCY_SPECIFIC_DATE,
        }
    }

    /// Weekday names in storage form, empty unless weekly.
    pub fn day_names(&self) -> Vec<String> {
        match self {
            Schedule::Weekly { days_of_week } => days_of_week
                .iter()
                .map(|day| weekday_name(*day).to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn specific_date(&self) -> Option<NaiveDate> {
        match self {
            Schedule::SpecificDate { specific_date } => Some(*specific_date),
            _ => None,
        }
    }
}

/// One stored medication schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub schedule: Schedule,
    #[serde(with = "time_of_day")]
    pub time: NaiveTime,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub email: Option<String>,
    pub notifications_enabled: bool,
    pub telegram_notifications_enabled: bool,
    pub telegram_chat_id: Option<String>,
}

impl Reminder {
    /// Target address, if one is set and non-blank.
    pub fn target_email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    /// Chat id bound directly on the reminder, if non-blank.
    pub fn chat_id(&self) -> Option<&str> {
        self.telegram_chat_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Time of day in `HH:MM` form.
    pub fn time_label(&self) -> String {
        self.time.format(time_of_day::FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReminderRequest {
    pub name: String,
    pub frequency: String,
    pub time: String,
    #[serde(default)]
    pub days_of_week: Vec<String>,
    pub specific_date: Option<NaiveDate>,
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub telegram_notifications_enabled: bool,
    pub telegram_chat_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl CreateReminderRequest {
    /// Validates the request and returns its typed schedule and time.
    ///
    /// Unlike store decoding, a request may not carry fields that belong to
    /// another frequency.
    pub fn validate(&self) -> HealthResult<(Schedule, NaiveTime)> {
        if self.name.trim().is_empty() {
            return Err(HealthError::Validation("name must not be empty".to_string()));
        }
        if self.frequency != FREQUENCY_WEEKLY && !self.days_of_week.is_empty() {
            return Err(HealthError::Validation(
                "days_of_week is only allowed for weekly reminders".to_string(),
            ));
        }
        if self.frequency != FREQUENCY_SPECIFIC_DATE && self.specific_date.is_some() {
            return Err(HealthError::Validation(
                "specific_date is only allowed for specific_date reminders".to_string(),
            ));
        }
        let schedule = Schedule::from_parts(
            &self.frequency,
            &self.days_of_week,
            self.specific_date,
        )
        .map_err(into_validation)?;
        let time = parse_time_of_day(&self.time).map_err(into_validation)?;
        Ok((schedule, time))
    }
}

fn into_validation(err: HealthError) -> HealthError {
    match err {
        HealthError::Data(message) => HealthError::Validation(message),
        other => other,
    }
}

/// Parses an `HH:MM` time of day.
pub fn parse_time_of_day(value: &str) -> HealthResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), time_of_day::FORMAT)
        .map_err(|e| HealthError::Data(format!("invalid time of day '{}': {}", value, e)))
}

/// Parses a weekday by its English name, e.g. `Monday`.
pub fn parse_weekday(value: &str) -> HealthResult<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| HealthError::Data(format!("invalid weekday '{}'", value)))
}

/// Full English name of a weekday, the form reminders store.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

mod weekday_names {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de::Error, ser::SerializeSeq};

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(days.len()))?;
        for day in days {
            seq.serialize_element(super::weekday_name(*day))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Weekday>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|name| super::parse_weekday(name).map_err(D::Error::custom))
            .collect()
    }
}

mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_time_of_day(&value).map_err(D::Error::custom)
    }
}
