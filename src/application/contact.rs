//! Contact inbox.

use super::engine::StoreEngine;
use super::page::{Page, paginate};
use crate::domain::contact::{ContactMessage, ContactRequest, ContactStatus, InquiryKind};
use crate::domain::ports::Notification;
use crate::error::{Result, StoreError};
use chrono::Utc;
use serde::Deserialize;
use std::cmp::Reverse;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactQuery {
    pub status: Option<ContactStatus>,
    pub kind: Option<InquiryKind>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl StoreEngine {
    pub async fn submit_contact(&self, request: ContactRequest) -> Result<ContactMessage> {
        let message = ContactMessage::from_request(request, Utc::now())?;
        self.contacts.store(message.clone()).await?;
        tracing::info!(contact = %message.id, kind = ?message.kind, "contact message received");
        self.notify(Notification::ContactReceived {
            id: message.id,
            email: message.email.clone(),
            subject: message.subject.clone(),
        })
        .await;
        Ok(message)
    }

    /// Opens a message; the first read moves it from `new` to `read`.
    pub async fn read_contact(&self, id: Uuid) -> Result<ContactMessage> {
        let mut message = self
            .contacts
            .get(id)
            .await?
            .ok_or(StoreError::ContactNotFound(id))?;
        if message.mark_read(Utc::now()) {
            self.contacts.store(message.clone()).await?;
        }
        Ok(message)
    }

    pub async fn update_contact_status(
        &self,
        id: Uuid,
        status: ContactStatus,
        notes: Option<String>,
    ) -> Result<ContactMessage> {
        let mut message = self
            .contacts
            .get(id)
            .await?
            .ok_or(StoreError::ContactNotFound(id))?;
        message.status = status;
        if let Some(notes) = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            message.notes = Some(notes);
        }
        message.updated_at = Utc::now();
        self.contacts.store(message.clone()).await?;
        Ok(message)
    }

    /// Messages matching the filters, newest first.
    pub async fn list_contacts(&self, query: &ContactQuery) -> Result<Page<ContactMessage>> {
        let mut messages: Vec<ContactMessage> = self
            .contacts
            .get_all()
            .await?
            .into_iter()
            .filter(|m| query.status.is_none_or(|status| m.status == status))
            .filter(|m| query.kind.is_none_or(|kind| m.kind == kind))
            .collect();
        messages.sort_by_key(|m| (Reverse(m.created_at), m.id));
        Ok(paginate(
            messages,
            query.page.unwrap_or(1),
            self.config.page_size(query.limit),
        ))
    }

    pub async fn delete_contact(&self, id: Uuid) -> Result<()> {
        if !self.contacts.delete(id).await? {
            return Err(StoreError::ContactNotFound(id));
        }
        tracing::info!(contact = %id, "contact message deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::engine::Backends;
    use crate::config::EngineConfig;
    use crate::domain::contact::{Budget, Timeline};
    use crate::infrastructure::notifications::RecordingNotifier;
    use crate::infrastructure::payments::TestCardProcessor;

    fn engine(notifier: RecordingNotifier) -> StoreEngine {
        StoreEngine::new(
            Backends::in_memory(),
            Box::new(TestCardProcessor::new()),
            Box::new(notifier),
            EngineConfig::default(),
        )
    }

    fn request(kind: InquiryKind) -> ContactRequest {
        ContactRequest {
            name: "Marta".to_string(),
            email: "marta@studio.io".to_string(),
            phone: None,
            subject: "Mural for the cafe".to_string(),
            message: "We would love a mural on our back wall.".to_string(),
            kind,
            budget: Budget::Unspecified,
            timeline: Timeline::Flexible,
            project_details: None,
        }
    }

    #[tokio::test]
    async fn test_submit_and_read() {
        let notifier = RecordingNotifier::new();
        let engine = engine(notifier.clone());

        let message = engine
            .submit_contact(request(InquiryKind::Commission))
            .await
            .unwrap();
        assert_eq!(message.status, ContactStatus::New);
        assert!(matches!(
            notifier.sent().await.as_slice(),
            [Notification::ContactReceived { .. }]
        ));

        let read = engine.read_contact(message.id).await.unwrap();
        assert_eq!(read.status, ContactStatus::Read);

        let replied = engine
            .update_contact_status(message.id, ContactStatus::Replied, Some("sent quote".into()))
            .await
            .unwrap();
        assert_eq!(replied.notes.as_deref(), Some("sent quote"));

        // Reading again does not move it back
        let again = engine.read_contact(message.id).await.unwrap();
        assert_eq!(again.status, ContactStatus::Replied);
    }

    #[tokio::test]
    async fn test_invalid_submission_not_stored() {
        let engine = engine(RecordingNotifier::new());
        let mut bad = request(InquiryKind::General);
        bad.message = "short".to_string();
        assert!(engine.submit_contact(bad).await.is_err());
        assert_eq!(
            engine.list_contacts(&ContactQuery::default()).await.unwrap().total,
            0
        );
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let engine = engine(RecordingNotifier::new());
        let first = engine
            .submit_contact(request(InquiryKind::Commission))
            .await
            .unwrap();
        engine
            .submit_contact(request(InquiryKind::General))
            .await
            .unwrap();

        let query = ContactQuery {
            kind: Some(InquiryKind::Commission),
            ..ContactQuery::default()
        };
        assert_eq!(engine.list_contacts(&query).await.unwrap().total, 1);

        engine.delete_contact(first.id).await.unwrap();
        assert!(matches!(
            engine.delete_contact(first.id).await,
            Err(StoreError::ContactNotFound(_))
        ));
        assert!(matches!(
            engine.read_contact(first.id).await,
            Err(StoreError::ContactNotFound(_))
        ));
        assert_eq!(
            engine.list_contacts(&ContactQuery::default()).await.unwrap().total,
            1
        );
    }
}
