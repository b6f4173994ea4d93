// src/application/publisher.rs
use crate::application::{InFlight, MarketplaceRepository, NoteRepository};
use crate::domain::{Currency, DomainError, MarketplaceNote, Price, Session};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Promotes a private note to a marketplace listing.
///
/// Publishing is two writes without a transaction:
/// 1. overwrite the listing (projection) with a copy of the note;
/// 2. flag the source note `is_public` with the price.
///
/// If step 2 fails the listing exists while the source still reads private;
/// this is reported as `PublishIncomplete` and publishing again repairs it.
pub struct Publisher<S> {
    store: Arc<S>,
    in_flight: InFlight,
}

impl<S: NoteRepository + MarketplaceRepository> Publisher<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            in_flight: InFlight::new(),
        }
    }

    #[instrument(level = "debug", skip(self, session))]
    pub async fn publish(
        &self,
        session: &Session,
        note_id: &str,
        amount: f64,
        currency: Currency,
    ) -> Result<MarketplaceNote, DomainError> {
        let price = Price::new(amount)?;
        let user = session.require_user("publish a note")?;
        let _guard = self.in_flight.begin(format!("publish:{}", note_id))?;

        let note = self.store.get_note(&user.id, note_id).await?;
        if !note.is_owned_by(&user.id) {
            return Err(DomainError::Forbidden(format!(
                "only the owner can publish note {note_id}"
            )));
        }
        if note.is_public {
            return Err(DomainError::InvalidState(format!(
                "note {note_id} is already published"
            )));
        }
        if note.content.metadata.topic.trim().is_empty() {
            return Err(DomainError::Validation(
                "a published note needs a topic".to_string(),
            ));
        }
        note.content.validate()?;

        let listing = MarketplaceNote::project(&note, price, currency, Utc::now());
        self.store.put_listing(&listing).await?;
        info!(note_id, price = price.amount(), %currency, "Listing written");

        if let Err(e) = self.store.mark_public(&user.id, note_id, price).await {
            error!(note_id, error = %e, "Listing written but source note not flagged public");
            return Err(DomainError::PublishIncomplete {
                note_id: note_id.to_string(),
                reason: e.to_string(),
            });
        }

        info!(note_id, "Published note");
        Ok(listing)
    }
}
