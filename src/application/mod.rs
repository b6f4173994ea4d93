// src/application/mod.rs
pub mod admin;
pub mod editor;
pub mod generator;
pub mod in_flight;
pub mod marketplace;
pub mod notebook;
pub mod print;
pub mod publisher;
pub mod repository;

pub use admin::MarketplaceAdmin;
pub use editor::{EditorSession, MetadataField, RowField};
pub use generator::{parse_generated, ContentGenerator};
pub use in_flight::{InFlight, InFlightGuard};
pub use marketplace::{ListingCard, Marketplace, PurchaseOutcome};
pub use notebook::Notebook;
pub use print::{Frame, PrintEngine, PrintExporter, PrintJob, PrintOutcome, RenderTarget, ViewRequest};
pub use publisher::Publisher;
pub use repository::{MarketplaceRepository, NoteRepository, PurchaseRepository, UserDirectory};
