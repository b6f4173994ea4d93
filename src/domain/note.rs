// src/domain/note.rs
use crate::constants::{DEFAULT_TOPIC, DERIVATIVE_TOPIC_SUFFIX, NO_DESCRIPTION};
use crate::domain::{Currency, DomainError, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub topic: String,
    pub date: String,
    pub course: String,
    pub objective: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    pub cue: String,
    pub note: String,
}

impl Row {
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cue: String::new(),
            note: String::new(),
        }
    }
}

/// Cornell layout: header metadata, cue/note rows read top to bottom, summary band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteContent {
    pub metadata: Metadata,
    pub rows: Vec<Row>,
    pub summary: String,
}

impl NoteContent {
    /// Fresh editor content: empty metadata and a single empty row.
    pub fn blank(date: impl Into<String>) -> Self {
        Self {
            metadata: Metadata {
                date: date.into(),
                ..Default::default()
            },
            rows: vec![Row::empty("1")],
            summary: String::new(),
        }
    }

    /// Check the invariants every stored note satisfies.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.rows.is_empty() {
            return Err(DomainError::Validation(
                "a note needs at least one row".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(self.rows.len());
        for row in &self.rows {
            if row.id.is_empty() {
                return Err(DomainError::Validation("row id must not be empty".to_string()));
            }
            if !seen.insert(row.id.as_str()) {
                return Err(DomainError::Validation(format!(
                    "duplicate row id '{}'",
                    row.id
                )));
            }
        }
        Ok(())
    }

    pub fn topic_or_default(&self) -> String {
        let topic = self.metadata.topic.trim();
        if topic.is_empty() {
            DEFAULT_TOPIC.to_string()
        } else {
            topic.to_string()
        }
    }

    /// Objective, else summary, else a fixed placeholder.
    pub fn description(&self) -> &str {
        if !self.metadata.objective.trim().is_empty() {
            &self.metadata.objective
        } else if !self.summary.trim().is_empty() {
            &self.summary
        } else {
            NO_DESCRIPTION
        }
    }
}

/// Private note, editable only by its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub owner_id: String,
    pub topic: String,
    pub course_code: String,
    pub content: NoteContent,
    pub is_public: bool,
    #[serde(default)]
    pub price: Option<Price>,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        content: NoteContent,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            topic: content.topic_or_default(),
            course_code: content.metadata.course.trim().to_string(),
            content,
            is_public: false,
            price: Some(Price::FREE),
            created_at,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Replace the content and refresh the header fields derived from it.
    pub fn apply_content(&mut self, content: NoteContent) {
        self.topic = content.topic_or_default();
        self.course_code = content.metadata.course.trim().to_string();
        self.content = content;
    }

    /// Private copy of a listing for a purchaser. The listing is left untouched.
    pub fn derived_from(
        listing: &MarketplaceNote,
        id: impl Into<String>,
        owner_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let topic = format!("{}{}", listing.topic, DERIVATIVE_TOPIC_SUFFIX);
        let mut content = listing.content.clone();
        content.metadata.topic = topic.clone();
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            topic,
            course_code: listing.course_code.clone(),
            content,
            is_public: false,
            price: None,
            created_at,
        }
    }
}

/// Published projection of a note, as listed in the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceNote {
    pub id: String,
    /// Author of the source note; `None` for listings curated by an administrator.
    #[serde(default)]
    pub owner_id: Option<String>,
    pub topic: String,
    pub course_code: String,
    pub content: NoteContent,
    pub price: Price,
    #[serde(default)]
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketplaceNote {
    pub fn project(note: &Note, price: Price, currency: Currency, now: DateTime<Utc>) -> Self {
        Self {
            id: note.id.clone(),
            owner_id: Some(note.owner_id.clone()),
            topic: note.topic.clone(),
            course_code: note.course_code.clone(),
            content: note.content.clone(),
            price,
            currency,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }
}

/// Partial update of a listing; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub topic: Option<String>,
    pub course_code: Option<String>,
    pub content: Option<NoteContent>,
    pub price: Option<Price>,
    pub currency: Option<Currency>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        *self == ListingPatch::default()
    }

    pub fn apply(self, listing: &mut MarketplaceNote, now: DateTime<Utc>) {
        if let Some(topic) = self.topic {
            listing.topic = topic;
        }
        if let Some(course_code) = self.course_code {
            listing.course_code = course_code;
        }
        if let Some(content) = self.content {
            listing.content = content;
        }
        if let Some(price) = self.price {
            listing.price = price;
        }
        if let Some(currency) = self.currency {
            listing.currency = currency;
        }
        listing.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub user_id: String,
    pub note_id: String,
    pub purchased_at: DateTime<Utc>,
}
