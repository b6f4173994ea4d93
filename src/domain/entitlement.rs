// src/domain/entitlement.rs
use crate::constants::PREVIEW_ROW_LIMIT;
use crate::domain::price::purchase_label;
use crate::domain::{format_price, MarketplaceNote, Row, Session};
use serde::Serialize;

/// What a viewer holds over a note. Derived per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entitlement {
    Owner,
    Purchaser,
    NonPurchaser,
}

impl Entitlement {
    pub fn resolve(session: &Session, owner_id: Option<&str>, purchased: bool) -> Self {
        match session.user_id() {
            None => Entitlement::NonPurchaser,
            Some(id) if owner_id == Some(id) => Entitlement::Owner,
            Some(_) if purchased => Entitlement::Purchaser,
            Some(_) => Entitlement::NonPurchaser,
        }
    }

    pub fn sees_full_content(&self) -> bool {
        !matches!(self, Entitlement::NonPurchaser)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Actions {
    pub can_edit: bool,
    pub can_publish: bool,
    pub can_buy: bool,
    pub can_clone: bool,
    pub can_print: bool,
}

impl Actions {
    /// `is_listed` tells whether the note already has a marketplace listing.
    pub fn for_entitlement(entitlement: Entitlement, is_listed: bool) -> Self {
        match entitlement {
            Entitlement::Owner => Actions {
                can_edit: true,
                can_publish: !is_listed,
                can_print: true,
                ..Default::default()
            },
            Entitlement::Purchaser => Actions {
                can_clone: true,
                can_print: true,
                ..Default::default()
            },
            Entitlement::NonPurchaser => Actions {
                can_buy: true,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOffer {
    pub price_label: String,
    pub button_label: String,
}

/// A listing as one particular viewer is allowed to see it.
#[derive(Debug, Clone, Serialize)]
pub struct GatedView {
    pub note_id: String,
    pub topic: String,
    pub course_code: String,
    pub objective: String,
    pub entitlement: Entitlement,
    pub price_label: String,
    pub rows: Vec<Row>,
    pub withheld_rows: usize,
    pub summary: Option<String>,
    pub actions: Actions,
    pub offer: Option<PurchaseOffer>,
}

impl GatedView {
    pub fn build(listing: &MarketplaceNote, entitlement: Entitlement) -> Self {
        let total = listing.content.rows.len();
        let visible = if entitlement.sees_full_content() {
            total
        } else {
            total.min(PREVIEW_ROW_LIMIT)
        };

        let offer = (!entitlement.sees_full_content()).then(|| PurchaseOffer {
            price_label: format_price(listing.price, listing.currency),
            button_label: purchase_label(listing.price, listing.currency),
        });

        Self {
            note_id: listing.id.clone(),
            topic: listing.topic.clone(),
            course_code: listing.course_code.clone(),
            objective: listing.content.metadata.objective.clone(),
            entitlement,
            price_label: format_price(listing.price, listing.currency),
            rows: listing.content.rows[..visible].to_vec(),
            withheld_rows: total - visible,
            summary: entitlement
                .sees_full_content()
                .then(|| listing.content.summary.clone()),
            actions: Actions::for_entitlement(entitlement, true),
            offer,
        }
    }

    /// True when rows are held back and the unlock block must be shown.
    pub fn is_locked(&self) -> bool {
        self.withheld_rows > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, Metadata, NoteContent, Price, User};
    use chrono::Utc;
    use rstest::rstest;

    fn listing(rows: usize, price: f64) -> MarketplaceNote {
        MarketplaceNote {
            id: "n1".to_string(),
            owner_id: Some("author".to_string()),
            topic: "Thermodynamics".to_string(),
            course_code: "PHY 201".to_string(),
            content: NoteContent {
                metadata: Metadata {
                    topic: "Thermodynamics".to_string(),
                    objective: "Understand entropy".to_string(),
                    ..Default::default()
                },
                rows: (1..=rows)
                    .map(|i| Row {
                        id: i.to_string(),
                        cue: format!("Q{i}"),
                        note: format!("A{i}"),
                    })
                    .collect(),
                summary: "- heat flows".to_string(),
            },
            price: Price::new(price).unwrap(),
            currency: Currency::Usd,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(3, 2)]
    #[case(10, 2)]
    fn given_non_purchaser_when_gating_then_reveals_at_most_two_rows(
        #[case] total: usize,
        #[case] expected: usize,
    ) {
        let view = GatedView::build(&listing(total, 1.0), Entitlement::NonPurchaser);

        assert_eq!(view.rows.len(), expected);
        assert_eq!(view.withheld_rows, total - expected);
        assert_eq!(view.is_locked(), total > 2);
    }

    #[test]
    fn given_five_rows_and_anonymous_viewer_when_gating_then_offers_purchase() {
        // Arrange
        let note = listing(5, 4.5);
        let entitlement = Entitlement::resolve(&Session::anonymous(), note.owner_id.as_deref(), false);

        // Act
        let view = GatedView::build(&note, entitlement);

        // Assert
        assert_eq!(entitlement, Entitlement::NonPurchaser);
        assert_eq!(
            view.rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "2"]
        );
        assert_eq!(view.withheld_rows, 3);
        assert!(view.is_locked());
        assert!(view.summary.is_none());
        let offer = view.offer.expect("purchase offer");
        assert_eq!(offer.price_label, "$4.50");
        assert_eq!(offer.button_label, "Buy for $4.50");
        assert!(view.actions.can_buy);
        assert!(!view.actions.can_clone);
    }

    #[test]
    fn given_purchaser_when_gating_then_sees_everything_and_may_clone() {
        let note = listing(5, 4.5);
        let session = Session::signed_in(User::new("buyer"));
        let entitlement = Entitlement::resolve(&session, note.owner_id.as_deref(), true);

        let view = GatedView::build(&note, entitlement);

        assert_eq!(entitlement, Entitlement::Purchaser);
        assert_eq!(view.rows.len(), 5);
        assert!(!view.is_locked());
        assert!(view.offer.is_none());
        assert_eq!(view.summary.as_deref(), Some("- heat flows"));
        assert!(view.actions.can_clone);
        assert!(!view.actions.can_edit);
    }

    #[test]
    fn given_owner_when_resolving_then_owner_wins_over_purchase_state() {
        let session = Session::signed_in(User::new("author"));

        let entitlement = Entitlement::resolve(&session, Some("author"), false);

        assert_eq!(entitlement, Entitlement::Owner);
        let actions = Actions::for_entitlement(entitlement, false);
        assert!(actions.can_edit && actions.can_publish && actions.can_print);
        assert!(!actions.can_buy);
    }

    #[test]
    fn given_signed_in_stranger_without_purchase_when_resolving_then_non_purchaser() {
        let session = Session::signed_in(User::new("someone"));

        assert_eq!(
            Entitlement::resolve(&session, Some("author"), false),
            Entitlement::NonPurchaser
        );
        assert_eq!(
            Entitlement::resolve(&session, None, false),
            Entitlement::NonPurchaser
        );
    }

    #[test]
    fn given_free_listing_when_gating_then_offer_reads_free() {
        let view = GatedView::build(&listing(3, 0.0), Entitlement::NonPurchaser);

        let offer = view.offer.unwrap();
        assert_eq!(offer.price_label, "FREE");
        assert_eq!(offer.button_label, "Get for Free");
    }
}
