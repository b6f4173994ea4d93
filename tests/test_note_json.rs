use anyhow::Result;
use snapnote::application::ListingCard;
use snapnote::domain::{
    Currency, Entitlement, GatedView, MarketplaceNote, Note, NoteContent, Price,
};
use chrono::{TimeZone, Utc};

fn note() -> Note {
    let created = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
    Note::new("n1", "alice", NoteContent::blank("2026-10-17"), created)
}

#[test]
fn given_note_when_serializing_then_uses_snake_case_fields() -> Result<()> {
    // Arrange
    let note = note();

    // Act
    let json = serde_json::to_string(&note)?;

    // Assert
    assert!(json.contains(r#""owner_id":"alice""#));
    assert!(json.contains(r#""course_code":"""#));
    assert!(json.contains(r#""is_public":false"#));
    assert!(json.contains(r#""price":0.0"#));
    assert!(!json.contains(r#""ownerId""#));
    Ok(())
}

#[test]
fn given_listing_when_serializing_then_currency_is_uppercase_code() -> Result<()> {
    // Arrange
    let listing = MarketplaceNote::project(&note(), Price::new(1000.0)?, Currency::Lkr, Utc::now());

    // Act
    let json = serde_json::to_string_pretty(&listing)?;

    // Assert
    assert!(json.contains(r#""currency": "LKR""#));
    assert!(json.contains(r#""price": 1000.0"#));
    Ok(())
}

#[test]
fn given_negative_price_in_json_when_deserializing_then_rejected() {
    let json = r#"{
        "id": "n1", "owner_id": "alice", "topic": "T", "course_code": "",
        "content": {"metadata": {"topic": "T", "date": "", "course": "", "objective": ""},
                    "rows": [{"id": "1", "cue": "", "note": ""}], "summary": ""},
        "is_public": true, "price": -5.0, "created_at": "2026-10-17T09:30:00Z"
    }"#;

    let result = serde_json::from_str::<Note>(json);

    assert!(result.is_err());
}

#[test]
fn given_listing_without_currency_when_deserializing_then_defaults_to_usd() -> Result<()> {
    let json = r#"{
        "id": "n1", "topic": "T", "course_code": "",
        "content": {"metadata": {"topic": "T", "date": "", "course": "", "objective": ""},
                    "rows": [{"id": "1", "cue": "", "note": ""}], "summary": ""},
        "price": 2.0, "created_at": "2026-10-17T09:30:00Z", "updated_at": "2026-10-17T09:30:00Z"
    }"#;

    let listing: MarketplaceNote = serde_json::from_str(json)?;

    assert_eq!(listing.currency, Currency::Usd);
    assert!(listing.owner_id.is_none());
    Ok(())
}

#[test]
fn given_locked_view_when_serializing_then_withheld_rows_are_absent() -> Result<()> {
    // Arrange
    let mut content = NoteContent::blank("2026-10-17");
    content.rows = (1..=4)
        .map(|i| snapnote::domain::Row {
            id: i.to_string(),
            cue: format!("secret cue {i}"),
            note: String::new(),
        })
        .collect();
    let mut source = note();
    source.apply_content(content);
    let listing = MarketplaceNote::project(&source, Price::new(3.0)?, Currency::Usd, Utc::now());

    // Act
    let json = serde_json::to_string(&GatedView::build(&listing, Entitlement::NonPurchaser))?;
    let card = serde_json::to_string(&ListingCard::from(&listing))?;

    // Assert
    assert!(json.contains("secret cue 2"));
    assert!(!json.contains("secret cue 3"));
    assert!(json.contains(r#""entitlement":"non_purchaser""#));
    assert!(json.contains(r#""withheld_rows":2"#));
    assert!(card.contains(r#""price_label":"$3.00""#));
    Ok(())
}
