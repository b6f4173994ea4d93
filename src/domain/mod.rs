// src/domain/mod.rs
pub mod entitlement;
pub mod error;
pub mod identity;
pub mod note;
pub mod price;
pub mod view_mode;

pub use entitlement::{Actions, Entitlement, GatedView, PurchaseOffer};
pub use error::DomainError;
pub use identity::{Role, Session, User};
pub use note::{ListingPatch, MarketplaceNote, Metadata, Note, NoteContent, Purchase, Row};
pub use price::{format_price, Currency, Price};
pub use view_mode::{ViewMode, ViewState};
