// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{
    ContentGenerator, MarketplaceRepository, NoteRepository, PrintEngine, PrintJob, PrintOutcome,
    PurchaseRepository, UserDirectory,
};
use crate::domain::{
    Currency, DomainError, ListingPatch, MarketplaceNote, Metadata, Note, NoteContent, Price,
    Purchase, Row, User,
};

/// Store operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetNote,
    ListNotes,
    SaveNote,
    MarkPublic,
    DeleteNote,
    GetListing,
    ListListings,
    PutListing,
    UpdateListing,
    DeleteListing,
    FindPurchase,
    InsertPurchase,
    ListPurchases,
    FindUser,
}

/// In-memory store implementing every repository trait, with failure injection.
///
/// # Examples
///
/// ```
/// use snapnote::util::testing::{sample_note, MockStore, Operation};
///
/// let store = MockStore::builder()
///     .with_note(sample_note("n1", "alice", 3))
///     .failing_on(Operation::PutListing)
///     .build();
/// assert_eq!(store.write_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockStore {
    notes: Mutex<HashMap<(String, String), Note>>,
    listings: Mutex<HashMap<String, MarketplaceNote>>,
    purchases: Mutex<Vec<Purchase>>,
    users: HashMap<String, User>,
    failures: Mutex<HashSet<Operation>>,
    writes: AtomicUsize,
}

impl MockStore {
    pub fn builder() -> MockStoreBuilder {
        MockStoreBuilder::new()
    }

    /// Number of successful write calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn purchase_count(&self) -> usize {
        lock(&self.purchases).len()
    }

    pub fn note(&self, owner_id: &str, note_id: &str) -> Option<Note> {
        lock(&self.notes)
            .get(&(owner_id.to_string(), note_id.to_string()))
            .cloned()
    }

    pub fn notes_of(&self, owner_id: &str) -> Vec<Note> {
        lock(&self.notes)
            .values()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect()
    }

    pub fn listing(&self, note_id: &str) -> Option<MarketplaceNote> {
        lock(&self.listings).get(note_id).cloned()
    }

    pub fn fail_on(&self, operation: Operation) {
        lock(&self.failures).insert(operation);
    }

    pub fn heal(&self, operation: Operation) {
        lock(&self.failures).remove(&operation);
    }

    fn check(&self, operation: Operation) -> Result<(), DomainError> {
        if lock(&self.failures).contains(&operation) {
            return Err(DomainError::Backend(format!("injected failure in {operation:?}")));
        }
        Ok(())
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl NoteRepository for MockStore {
    async fn get_note(&self, owner_id: &str, note_id: &str) -> Result<Note, DomainError> {
        self.check(Operation::GetNote)?;
        self.note(owner_id, note_id)
            .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))
    }

    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, DomainError> {
        self.check(Operation::ListNotes)?;
        let mut notes = self.notes_of(owner_id);
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn save_note(&self, note: &Note) -> Result<(), DomainError> {
        self.check(Operation::SaveNote)?;
        lock(&self.notes).insert((note.owner_id.clone(), note.id.clone()), note.clone());
        self.wrote();
        Ok(())
    }

    async fn mark_public(
        &self,
        owner_id: &str,
        note_id: &str,
        price: Price,
    ) -> Result<(), DomainError> {
        self.check(Operation::MarkPublic)?;
        let mut notes = lock(&self.notes);
        let note = notes
            .get_mut(&(owner_id.to_string(), note_id.to_string()))
            .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))?;
        note.is_public = true;
        note.price = Some(price);
        self.wrote();
        Ok(())
    }

    async fn delete_note(&self, owner_id: &str, note_id: &str) -> Result<(), DomainError> {
        self.check(Operation::DeleteNote)?;
        lock(&self.notes)
            .remove(&(owner_id.to_string(), note_id.to_string()))
            .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))?;
        self.wrote();
        Ok(())
    }
}

#[async_trait]
impl MarketplaceRepository for MockStore {
    async fn get_listing(&self, note_id: &str) -> Result<MarketplaceNote, DomainError> {
        self.check(Operation::GetListing)?;
        self.listing(note_id)
            .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))
    }

    async fn list_listings(&self) -> Result<Vec<MarketplaceNote>, DomainError> {
        self.check(Operation::ListListings)?;
        let mut listings: Vec<_> = lock(&self.listings).values().cloned().collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    async fn put_listing(&self, listing: &MarketplaceNote) -> Result<(), DomainError> {
        self.check(Operation::PutListing)?;
        lock(&self.listings).insert(listing.id.clone(), listing.clone());
        self.wrote();
        Ok(())
    }

    async fn update_listing(
        &self,
        note_id: &str,
        patch: ListingPatch,
    ) -> Result<MarketplaceNote, DomainError> {
        self.check(Operation::UpdateListing)?;
        let mut listings = lock(&self.listings);
        let listing = listings
            .get_mut(note_id)
            .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))?;
        patch.apply(listing, Utc::now());
        self.wrote();
        Ok(listing.clone())
    }

    async fn delete_listing(&self, note_id: &str) -> Result<(), DomainError> {
        self.check(Operation::DeleteListing)?;
        lock(&self.listings)
            .remove(note_id)
            .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))?;
        self.wrote();
        Ok(())
    }
}

#[async_trait]
impl PurchaseRepository for MockStore {
    async fn find_purchase(
        &self,
        user_id: &str,
        note_id: &str,
    ) -> Result<Option<Purchase>, DomainError> {
        self.check(Operation::FindPurchase)?;
        Ok(lock(&self.purchases)
            .iter()
            .find(|p| p.user_id == user_id && p.note_id == note_id)
            .cloned())
    }

    async fn insert_purchase_if_absent(&self, purchase: &Purchase) -> Result<bool, DomainError> {
        self.check(Operation::InsertPurchase)?;
        let mut purchases = lock(&self.purchases);
        if purchases
            .iter()
            .any(|p| p.user_id == purchase.user_id && p.note_id == purchase.note_id)
        {
            return Ok(false);
        }
        purchases.push(purchase.clone());
        self.wrote();
        Ok(true)
    }

    async fn list_purchases(&self, user_id: &str) -> Result<Vec<Purchase>, DomainError> {
        self.check(Operation::ListPurchases)?;
        Ok(lock(&self.purchases)
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserDirectory for MockStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, DomainError> {
        self.check(Operation::FindUser)?;
        Ok(self.users.get(user_id).cloned())
    }
}

/// Builder for MockStore
///
/// Provides a fluent interface for seeding data and configuring failures.
#[derive(Debug, Default)]
pub struct MockStoreBuilder {
    notes: Vec<Note>,
    listings: Vec<MarketplaceNote>,
    purchases: Vec<Purchase>,
    users: Vec<User>,
    failures: HashSet<Operation>,
}

impl MockStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_listing(mut self, listing: MarketplaceNote) -> Self {
        self.listings.push(listing);
        self
    }

    pub fn with_purchase(mut self, user_id: &str, note_id: &str) -> Self {
        self.purchases.push(Purchase {
            user_id: user_id.to_string(),
            note_id: note_id.to_string(),
            purchased_at: Utc::now(),
        });
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    /// Make every call of this operation fail with `DomainError::Backend`.
    pub fn failing_on(mut self, operation: Operation) -> Self {
        self.failures.insert(operation);
        self
    }

    pub fn build(self) -> MockStore {
        MockStore {
            notes: Mutex::new(
                self.notes
                    .into_iter()
                    .map(|n| ((n.owner_id.clone(), n.id.clone()), n))
                    .collect(),
            ),
            listings: Mutex::new(
                self.listings
                    .into_iter()
                    .map(|l| (l.id.clone(), l))
                    .collect(),
            ),
            purchases: Mutex::new(self.purchases),
            users: self.users.into_iter().map(|u| (u.id.clone(), u)).collect(),
            failures: Mutex::new(self.failures),
            writes: AtomicUsize::new(0),
        }
    }
}

/// Print engine double that records every job it receives.
#[derive(Debug)]
pub struct RecordingPrinter {
    outcome: PrintOutcome,
    fail: bool,
    jobs: Mutex<Vec<PrintJob>>,
}

impl RecordingPrinter {
    pub fn answering(outcome: PrintOutcome) -> Self {
        Self {
            outcome,
            fail: false,
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: PrintOutcome::Cancelled,
            fail: true,
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn jobs(&self) -> Vec<PrintJob> {
        lock(&self.jobs).clone()
    }
}

#[async_trait]
impl PrintEngine for RecordingPrinter {
    async fn capture(&self, job: PrintJob) -> Result<PrintOutcome, DomainError> {
        lock(&self.jobs).push(job);
        if self.fail {
            return Err(DomainError::Backend("printer offline".to_string()));
        }
        Ok(self.outcome)
    }
}

/// Generator double returning a canned response, optionally after a delay.
#[derive(Debug)]
pub struct StaticGenerator {
    response: Result<String, String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StaticGenerator {
    pub fn returning(raw: impl Into<String>) -> Self {
        Self {
            response: Ok(raw.into()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for StaticGenerator {
    async fn generate(&self, _topic: &str, _course: &str) -> Result<String, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone().map_err(DomainError::Backend)
    }
}

/// Content with `rows` numbered cue/note pairs.
pub fn sample_content(rows: usize) -> NoteContent {
    NoteContent {
        metadata: Metadata {
            topic: "Linear Algebra".to_string(),
            date: "2026-01-15".to_string(),
            course: "MATH 101".to_string(),
            objective: "Understand eigenvalues".to_string(),
        },
        rows: (1..=rows)
            .map(|i| Row {
                id: i.to_string(),
                cue: format!("Question {i}?"),
                note: format!("Answer {i} with $x_{i}$"),
            })
            .collect(),
        summary: "- eigenvalues scale eigenvectors".to_string(),
    }
}

pub fn sample_note(id: &str, owner_id: &str, rows: usize) -> Note {
    let created_at = Utc
        .with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    Note::new(id, owner_id, sample_content(rows), created_at)
}

pub fn sample_listing(id: &str, owner_id: Option<&str>, rows: usize, price: f64) -> MarketplaceNote {
    let note = sample_note(id, owner_id.unwrap_or("curator"), rows);
    let mut listing = MarketplaceNote::project(
        &note,
        Price::new(price).unwrap_or(Price::FREE),
        Currency::Usd,
        note.created_at,
    );
    listing.owner_id = owner_id.map(str::to_string);
    listing
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "mio", "tokio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn given_note_added_when_getting_note_then_returns_note() {
        let store = MockStore::builder()
            .with_note(sample_note("n1", "alice", 2))
            .build();

        let note = store.get_note("alice", "n1").await.expect("Note should exist");

        assert_eq!(note.content.rows.len(), 2);
    }

    #[tokio::test]
    async fn given_other_owner_when_getting_note_then_returns_not_found() {
        let store = MockStore::builder()
            .with_note(sample_note("n1", "alice", 2))
            .build();

        let result = store.get_note("bob", "n1").await;

        assert!(matches!(result, Err(DomainError::NoteNotFound(id)) if id == "n1"));
    }

    #[tokio::test]
    async fn given_injected_failure_when_saving_then_nothing_is_written() {
        let store = MockStore::builder()
            .failing_on(Operation::SaveNote)
            .build();

        let result = store.save_note(&sample_note("n1", "alice", 1)).await;

        assert!(matches!(result, Err(DomainError::Backend(_))));
        assert_eq!(store.write_count(), 0);
        assert!(store.note("alice", "n1").is_none());
    }

    #[tokio::test]
    async fn given_existing_purchase_when_inserting_again_then_returns_false() {
        let store = MockStore::builder().with_purchase("bob", "n1").build();
        let purchase = Purchase {
            user_id: "bob".to_string(),
            note_id: "n1".to_string(),
            purchased_at: Utc::now(),
        };

        let inserted = store.insert_purchase_if_absent(&purchase).await.unwrap();

        assert!(!inserted);
        assert_eq!(store.purchase_count(), 1);
    }

    #[tokio::test]
    async fn given_healed_operation_when_calling_then_succeeds_again() {
        let store = MockStore::builder()
            .failing_on(Operation::ListListings)
            .build();
        assert!(store.list_listings().await.is_err());

        store.heal(Operation::ListListings);

        assert!(store.list_listings().await.unwrap().is_empty());
    }
}
