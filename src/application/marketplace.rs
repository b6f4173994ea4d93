// src/application/marketplace.rs
use crate::application::{InFlight, MarketplaceRepository, NoteRepository, PurchaseRepository};
use crate::domain::{
    format_price, DomainError, Entitlement, GatedView, MarketplaceNote, Note, Purchase, Session,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Purchased(Purchase),
    /// A record for this viewer and note already existed; nothing was written.
    AlreadyOwned(Purchase),
    /// The viewer authored the listing and needs no purchase.
    AlreadyEntitled,
}

/// One entry of the marketplace grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingCard {
    pub id: String,
    pub topic: String,
    pub course_code: String,
    pub price_label: String,
    pub call_to_action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<&MarketplaceNote> for ListingCard {
    fn from(listing: &MarketplaceNote) -> Self {
        let course_code = if listing.course_code.trim().is_empty() {
            "General".to_string()
        } else {
            listing.course_code.clone()
        };
        let call_to_action = if listing.price.is_free() {
            "Get for Free"
        } else {
            "Purchase Note"
        };
        Self {
            id: listing.id.clone(),
            topic: listing.topic.clone(),
            course_code,
            price_label: format_price(listing.price, listing.currency),
            call_to_action: call_to_action.to_string(),
            description: listing.content.description().to_string(),
            created_at: listing.created_at,
        }
    }
}

/// Buyer-facing marketplace: browse, gated view, purchase, and "Edit Copy".
pub struct Marketplace<S> {
    store: Arc<S>,
    in_flight: InFlight,
}

impl<S> Marketplace<S>
where
    S: MarketplaceRepository + PurchaseRepository + NoteRepository,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            in_flight: InFlight::new(),
        }
    }

    /// Listings newest first, optionally filtered on topic or course code
    /// (case-insensitive substring).
    pub async fn browse(&self, search: Option<&str>) -> Result<Vec<ListingCard>, DomainError> {
        let needle = search.map(str::trim).unwrap_or_default().to_lowercase();
        let listings = self.store.list_listings().await?;
        Ok(listings
            .iter()
            .filter(|l| {
                needle.is_empty()
                    || l.topic.to_lowercase().contains(&needle)
                    || l.course_code.to_lowercase().contains(&needle)
            })
            .map(ListingCard::from)
            .collect())
    }

    pub async fn entitlement(
        &self,
        session: &Session,
        listing: &MarketplaceNote,
    ) -> Result<Entitlement, DomainError> {
        let purchased = match session.user_id() {
            Some(user_id) if !listing.is_owned_by(user_id) => self
                .store
                .find_purchase(user_id, &listing.id)
                .await?
                .is_some(),
            _ => false,
        };
        Ok(Entitlement::resolve(
            session,
            listing.owner_id.as_deref(),
            purchased,
        ))
    }

    #[instrument(level = "debug", skip(self, session))]
    pub async fn view(&self, session: &Session, note_id: &str) -> Result<GatedView, DomainError> {
        let listing = self.store.get_listing(note_id).await?;
        let entitlement = self.entitlement(session, &listing).await?;
        debug!(?entitlement, "Resolved viewer entitlement");
        Ok(GatedView::build(&listing, entitlement))
    }

    /// Record a purchase for the signed-in viewer. Idempotent per (user, note).
    #[instrument(level = "debug", skip(self, session))]
    pub async fn purchase(
        &self,
        session: &Session,
        note_id: &str,
    ) -> Result<PurchaseOutcome, DomainError> {
        let user = session.require_user("purchase a note")?;
        let _guard = self
            .in_flight
            .begin(format!("purchase:{}:{}", user.id, note_id))?;

        let listing = self.store.get_listing(note_id).await?;
        if listing.is_owned_by(&user.id) {
            return Ok(PurchaseOutcome::AlreadyEntitled);
        }
        if let Some(existing) = self.store.find_purchase(&user.id, note_id).await? {
            debug!("Purchase record already present");
            return Ok(PurchaseOutcome::AlreadyOwned(existing));
        }

        let purchase = Purchase {
            user_id: user.id.clone(),
            note_id: note_id.to_string(),
            purchased_at: Utc::now(),
        };
        if !self.store.insert_purchase_if_absent(&purchase).await? {
            // Lost a race with another session of the same user.
            let existing = self
                .store
                .find_purchase(&user.id, note_id)
                .await?
                .unwrap_or(purchase);
            return Ok(PurchaseOutcome::AlreadyOwned(existing));
        }

        info!(user_id = %user.id, note_id, price = %format_price(listing.price, listing.currency), "Purchased note");
        Ok(PurchaseOutcome::Purchased(purchase))
    }

    /// "Edit Copy": a private note for the purchaser, seeded from the listing.
    #[instrument(level = "debug", skip(self, session))]
    pub async fn clone_for_editing(
        &self,
        session: &Session,
        note_id: &str,
    ) -> Result<Note, DomainError> {
        let user = session.require_user("copy a note")?;
        let _guard = self
            .in_flight
            .begin(format!("clone:{}:{}", user.id, note_id))?;

        let listing = self.store.get_listing(note_id).await?;
        let entitlement = self.entitlement(session, &listing).await?;
        if entitlement != Entitlement::Purchaser {
            return Err(DomainError::Forbidden(format!(
                "only purchasers can copy note {note_id}"
            )));
        }

        let copy = Note::derived_from(
            &listing,
            Uuid::new_v4().simple().to_string(),
            &user.id,
            Utc::now(),
        );
        self.store.save_note(&copy).await?;
        info!(source = note_id, copy = %copy.id, "Created private copy");
        Ok(copy)
    }

    /// Listings the signed-in user has purchased.
    pub async fn library(&self, session: &Session) -> Result<Vec<Purchase>, DomainError> {
        let user = session.require_user("list purchases")?;
        self.store.list_purchases(&user.id).await
    }
}
