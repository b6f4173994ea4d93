// src/infrastructure/json_store.rs
use crate::application::{MarketplaceRepository, NoteRepository, PurchaseRepository, UserDirectory};
use crate::domain::{DomainError, ListingPatch, MarketplaceNote, Note, Price, Purchase, User};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Everything the store holds, persisted as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    notes: Vec<Note>,
    #[serde(default)]
    listings: Vec<MarketplaceNote>,
    #[serde(default)]
    purchases: Vec<Purchase>,
}

/// Document store backed by a single JSON file.
///
/// Calls are serialised by an async mutex; each write replaces the file
/// atomically (temp file + rename), so a failed write leaves the previous
/// state on disk.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register or replace a user profile.
    pub async fn upsert_user(&self, user: User) -> Result<(), DomainError> {
        self.update(|data| {
            data.users.retain(|u| u.id != user.id);
            data.users.push(user);
            Ok(())
        })
        .await
    }

    async fn load(&self) -> Result<StoreData, DomainError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(StoreData::default()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                DomainError::Backend(format!("corrupt store {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreData::default()),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }

    async fn save(&self, data: &StoreData) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| DomainError::Backend(format!("failed to serialise store: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))?;
        debug!(path = %self.path.display(), "Store written");
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&StoreData) -> T) -> Result<T, DomainError> {
        let _lock = self.lock.lock().await;
        let data = self.load().await?;
        Ok(f(&data))
    }

    /// Load, modify and write back under the lock. Nothing is written if `f` fails.
    async fn update<T>(
        &self,
        f: impl FnOnce(&mut StoreData) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let _lock = self.lock.lock().await;
        let mut data = self.load().await?;
        let result = f(&mut data)?;
        self.save(&data).await?;
        Ok(result)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> DomainError {
    DomainError::Backend(format!("{}: {e}", path.display()))
}

fn newest_first<T>(items: &mut [T], created: impl Fn(&T) -> chrono::DateTime<Utc>) {
    items.sort_by(|a, b| created(b).cmp(&created(a)));
}

#[async_trait]
impl NoteRepository for JsonStore {
    #[instrument(level = "trace", skip(self))]
    async fn get_note(&self, owner_id: &str, note_id: &str) -> Result<Note, DomainError> {
        self.read(|data| {
            data.notes
                .iter()
                .find(|n| n.owner_id == owner_id && n.id == note_id)
                .cloned()
        })
        .await?
        .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))
    }

    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, DomainError> {
        let mut notes = self
            .read(|data| {
                data.notes
                    .iter()
                    .filter(|n| n.owner_id == owner_id)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await?;
        newest_first(&mut notes, |n| n.created_at);
        Ok(notes)
    }

    #[instrument(level = "trace", skip(self, note), fields(note_id = %note.id))]
    async fn save_note(&self, note: &Note) -> Result<(), DomainError> {
        self.update(|data| {
            match data
                .notes
                .iter_mut()
                .find(|n| n.owner_id == note.owner_id && n.id == note.id)
            {
                Some(existing) => *existing = note.clone(),
                None => data.notes.push(note.clone()),
            }
            Ok(())
        })
        .await
    }

    #[instrument(level = "trace", skip(self))]
    async fn mark_public(
        &self,
        owner_id: &str,
        note_id: &str,
        price: Price,
    ) -> Result<(), DomainError> {
        self.update(|data| {
            let note = data
                .notes
                .iter_mut()
                .find(|n| n.owner_id == owner_id && n.id == note_id)
                .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))?;
            note.is_public = true;
            note.price = Some(price);
            Ok(())
        })
        .await
    }

    async fn delete_note(&self, owner_id: &str, note_id: &str) -> Result<(), DomainError> {
        self.update(|data| {
            let before = data.notes.len();
            data.notes
                .retain(|n| !(n.owner_id == owner_id && n.id == note_id));
            if data.notes.len() == before {
                return Err(DomainError::NoteNotFound(note_id.to_string()));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl MarketplaceRepository for JsonStore {
    async fn get_listing(&self, note_id: &str) -> Result<MarketplaceNote, DomainError> {
        self.read(|data| data.listings.iter().find(|l| l.id == note_id).cloned())
            .await?
            .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))
    }

    async fn list_listings(&self) -> Result<Vec<MarketplaceNote>, DomainError> {
        let mut listings = self.read(|data| data.listings.clone()).await?;
        newest_first(&mut listings, |l| l.created_at);
        Ok(listings)
    }

    #[instrument(level = "trace", skip(self, listing), fields(note_id = %listing.id))]
    async fn put_listing(&self, listing: &MarketplaceNote) -> Result<(), DomainError> {
        self.update(|data| {
            data.listings.retain(|l| l.id != listing.id);
            data.listings.push(listing.clone());
            Ok(())
        })
        .await
    }

    async fn update_listing(
        &self,
        note_id: &str,
        patch: ListingPatch,
    ) -> Result<MarketplaceNote, DomainError> {
        self.update(|data| {
            let listing = data
                .listings
                .iter_mut()
                .find(|l| l.id == note_id)
                .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()))?;
            patch.apply(listing, Utc::now());
            Ok(listing.clone())
        })
        .await
    }

    async fn delete_listing(&self, note_id: &str) -> Result<(), DomainError> {
        self.update(|data| {
            let before = data.listings.len();
            data.listings.retain(|l| l.id != note_id);
            if data.listings.len() == before {
                return Err(DomainError::NoteNotFound(note_id.to_string()));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl PurchaseRepository for JsonStore {
    async fn find_purchase(
        &self,
        user_id: &str,
        note_id: &str,
    ) -> Result<Option<Purchase>, DomainError> {
        self.read(|data| {
            data.purchases
                .iter()
                .find(|p| p.user_id == user_id && p.note_id == note_id)
                .cloned()
        })
        .await
    }

    #[instrument(level = "trace", skip(self, purchase), fields(user_id = %purchase.user_id, note_id = %purchase.note_id))]
    async fn insert_purchase_if_absent(&self, purchase: &Purchase) -> Result<bool, DomainError> {
        self.update(|data| {
            if data
                .purchases
                .iter()
                .any(|p| p.user_id == purchase.user_id && p.note_id == purchase.note_id)
            {
                return Ok(false);
            }
            data.purchases.push(purchase.clone());
            Ok(true)
        })
        .await
    }

    async fn list_purchases(&self, user_id: &str) -> Result<Vec<Purchase>, DomainError> {
        self.read(|data| {
            data.purchases
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect()
        })
        .await
    }
}

#[async_trait]
impl UserDirectory for JsonStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, DomainError> {
        self.read(|data| data.users.iter().find(|u| u.id == user_id).cloned())
            .await
    }
}
