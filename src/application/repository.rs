// src/application/repository.rs
//
// Document store seams. Every call is atomic for a single document only.
use crate::domain::{DomainError, ListingPatch, MarketplaceNote, Note, Price, Purchase, User};
use async_trait::async_trait;

/// Private notes, scoped by owner.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Fails with `NoteNotFound` when the owner has no note with this id.
    async fn get_note(&self, owner_id: &str, note_id: &str) -> Result<Note, DomainError>;

    /// Owner's notes, newest first.
    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, DomainError>;

    /// Create or overwrite.
    async fn save_note(&self, note: &Note) -> Result<(), DomainError>;

    /// Set `is_public` and `price` on an existing note.
    async fn mark_public(&self, owner_id: &str, note_id: &str, price: Price)
        -> Result<(), DomainError>;

    async fn delete_note(&self, owner_id: &str, note_id: &str) -> Result<(), DomainError>;
}

#[async_trait]
pub trait MarketplaceRepository: Send + Sync {
    async fn get_listing(&self, note_id: &str) -> Result<MarketplaceNote, DomainError>;

    /// All listings, newest first.
    async fn list_listings(&self) -> Result<Vec<MarketplaceNote>, DomainError>;

    /// Create or overwrite; the last write wins.
    async fn put_listing(&self, listing: &MarketplaceNote) -> Result<(), DomainError>;

    async fn update_listing(
        &self,
        note_id: &str,
        patch: ListingPatch,
    ) -> Result<MarketplaceNote, DomainError>;

    async fn delete_listing(&self, note_id: &str) -> Result<(), DomainError>;
}

#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    async fn find_purchase(
        &self,
        user_id: &str,
        note_id: &str,
    ) -> Result<Option<Purchase>, DomainError>;

    /// Insert unless a record for `(user_id, note_id)` exists.
    /// Returns `false` when one was already there.
    async fn insert_purchase_if_absent(&self, purchase: &Purchase) -> Result<bool, DomainError>;

    async fn list_purchases(&self, user_id: &str) -> Result<Vec<Purchase>, DomainError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, DomainError>;
}
