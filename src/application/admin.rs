// src/application/admin.rs
use crate::application::MarketplaceRepository;
use crate::domain::{
    Currency, DomainError, ListingPatch, MarketplaceNote, NoteContent, Price, Session,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Curated listings managed directly by administrators, without a source note.
pub struct MarketplaceAdmin<S> {
    store: Arc<S>,
}

impl<S: MarketplaceRepository> MarketplaceAdmin<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[instrument(level = "debug", skip(self, session, content))]
    pub async fn create_listing(
        &self,
        session: &Session,
        topic: &str,
        course_code: &str,
        content: NoteContent,
        amount: f64,
        currency: Currency,
    ) -> Result<MarketplaceNote, DomainError> {
        session.require_admin("create a listing")?;
        let price = Price::new(amount)?;
        let topic = required_topic(topic)?;
        content.validate()?;

        let now = Utc::now();
        let listing = MarketplaceNote {
            id: Uuid::new_v4().simple().to_string(),
            owner_id: None,
            topic,
            course_code: course_code.trim().to_string(),
            content,
            price,
            currency,
            created_at: now,
            updated_at: now,
        };
        self.store.put_listing(&listing).await?;
        info!(note_id = %listing.id, "Created curated listing");
        Ok(listing)
    }

    #[instrument(level = "debug", skip(self, session, patch))]
    pub async fn update_listing(
        &self,
        session: &Session,
        note_id: &str,
        mut patch: ListingPatch,
    ) -> Result<MarketplaceNote, DomainError> {
        session.require_admin("update a listing")?;
        if patch.is_empty() {
            return Err(DomainError::Validation("nothing to update".to_string()));
        }
        if let Some(topic) = patch.topic.take() {
            patch.topic = Some(required_topic(&topic)?);
        }
        if let Some(content) = &patch.content {
            content.validate()?;
        }

        let listing = self.store.update_listing(note_id, patch).await?;
        info!(note_id, "Updated listing");
        Ok(listing)
    }

    #[instrument(level = "debug", skip(self, session))]
    pub async fn delete_listing(&self, session: &Session, note_id: &str) -> Result<(), DomainError> {
        session.require_admin("delete a listing")?;
        self.store.delete_listing(note_id).await?;
        info!(note_id, "Deleted listing");
        Ok(())
    }
}

fn required_topic(topic: &str) -> Result<String, DomainError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(DomainError::Validation("topic must not be empty".to_string()));
    }
    Ok(topic.to_string())
}
