use super::customer::normalize_email;
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryKind {
    #[default]
    General,
    Collaboration,
    Commission,
    Purchase,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Budget {
    #[serde(rename = "under-500")]
    Under500,
    #[serde(rename = "500-1000")]
    From500To1000,
    #[serde(rename = "1000-2500")]
    From1000To2500,
    #[serde(rename = "2500-5000")]
    From2500To5000,
    #[serde(rename = "over-5000")]
    Over5000,
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timeline {
    Urgent,
    OneWeek,
    TwoToFourWeeks,
    OneToTwoMonths,
    #[default]
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
    Closed,
}

/// What a visitor submits through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub kind: InquiryKind,
    #[serde(default)]
    pub budget: Budget,
    #[serde(default)]
    pub timeline: Timeline,
    #[serde(default)]
    pub project_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub kind: InquiryKind,
    pub budget: Budget,
    pub timeline: Timeline,
    pub project_details: Option<String>,
    pub status: ContactStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn require_min_chars(field: &str, value: &str, min: usize) -> Result<String> {
    let value = value.trim();
    if value.chars().count() < min {
        return Err(StoreError::validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(value.to_string())
}

impl ContactMessage {
    pub fn from_request(request: ContactRequest, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: require_min_chars("Name", &request.name, 2)?,
            email: normalize_email(&request.email)?,
            phone: request
                .phone
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
            subject: require_min_chars("Subject", &request.subject, 5)?,
            message: require_min_chars("Message", &request.message, 10)?,
            kind: request.kind,
            budget: request.budget,
            timeline: request.timeline,
            project_details: request.project_details,
            status: ContactStatus::New,
            notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Marks a new message as read. Returns whether anything changed.
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == ContactStatus::New {
            self.status = ContactStatus::Read;
            self.updated_at = now;
            true
        } else {
            false
        }
    }
}
