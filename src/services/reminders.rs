//! Medication and appointment reminders
//!
//! Reminders are a paid-plan surface; without access the backend answers
//! 403, which reaches the caller as [`ApiError::Status`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};

const LIST_PATH: &str = "reminders/";
const CREATE_PATH: &str = "reminders/create/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    Medication,
    Appointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: u64,
    pub reminder_type: ReminderType,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// ISO 8601 timestamp
    pub start_time: String,
    pub frequency: Frequency,
    /// Next firing time computed by the backend
    #[serde(default)]
    pub next_trigger: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Body of a reminder creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReminder {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub start_time: String,
    pub frequency: Frequency,
    pub reminder_type: ReminderType,
}

impl NewReminder {
    pub fn new(
        reminder_type: ReminderType,
        title: impl Into<String>,
        start_time: impl Into<String>,
        frequency: Frequency,
    ) -> Self {
        Self {
            title: title.into(),
            notes: None,
            start_time: start_time.into(),
            frequency,
            reminder_type,
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update; unset fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReminderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_type: Option<ReminderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ReminderService {
    api: Arc<ApiClient>,
}

impl ReminderService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Reminder>, ApiError> {
        self.api.get_json(LIST_PATH).await
    }

    pub async fn create(&self, reminder: &NewReminder) -> Result<Reminder, ApiError> {
        let created: Reminder = self.api.post_json(CREATE_PATH, reminder).await?;
        tracing::debug!("Reminder {} created", created.id);
        Ok(created)
    }

    pub async fn update(&self, id: u64, update: &ReminderUpdate) -> Result<Reminder, ApiError> {
        self.api
            .put(&format!("reminders/{}/update/", id), update)
            .await?
            .json()
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.api.delete(&format!("reminders/{}/delete/", id)).await?;
        tracing::debug!("Reminder {} deleted", id);
        Ok(())
    }
}
