// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use crate::application::{
    EditorSession, Marketplace, MarketplaceAdmin, Notebook, PrintExporter, Publisher,
    PurchaseOutcome, UserDirectory,
};
use crate::cli::args::{AdminCommand, Args, Command};
use crate::domain::{Currency, ListingPatch, NoteContent, Price, Session, User};
use crate::infrastructure::{BrowserPrinter, CommandGenerator, Config, DocumentViewer, JsonStore};
use crate::ports::{HtmlPresenter, RenderSurface};
use crate::util::text::excerpt;
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const EXCERPT_CHARS: usize = 48;

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting snapnote with arguments");

    // Initialize infrastructure
    let config = Config::resolve(args.config.as_deref())?;
    let store_path = match args.store {
        Some(path) => {
            debug!(?path, "Using provided store path");
            path
        }
        None => config.store.path.clone(),
    };
    let store = Arc::new(JsonStore::new(&store_path));
    let session = resolve_session(store.as_ref(), args.user.as_deref()).await?;
    let presenter = HtmlPresenter::new();

    match args.command {
        Command::New { from } => {
            let content = match from {
                Some(path) => read_content(&path)?,
                None => NoteContent::blank(Utc::now().format("%Y-%m-%d").to_string()),
            };
            let note = Notebook::new(store).create(&session, content).await?;
            println!("{}", note.id);
        }
        Command::Generate { topic, course } => {
            let generator = CommandGenerator::from_config(&config.generator)
                .context("No generator command configured ([generator] command)")?;
            let note = Notebook::new(store)
                .create_from_generator(&session, &generator, &topic, &course)
                .await?;
            println!("{}", note.id);
        }
        Command::List => {
            let notes = Notebook::new(store).list(&session).await?;
            for note in notes {
                let status = if note.is_public { "public" } else { "private" };
                println!(
                    "{}\t{}\t{}\t{}",
                    note.id,
                    status,
                    excerpt(&note.topic, EXCERPT_CHARS),
                    note.course_code
                );
            }
        }
        Command::Save { note_id, from } => {
            let note = Notebook::new(store)
                .save(&session, &note_id, read_content(&from)?)
                .await?;
            println!("Saved {}", note.id);
        }
        Command::Delete { note_id } => {
            Notebook::new(store).delete(&session, &note_id).await?;
            println!("Deleted {note_id}");
        }
        Command::Render {
            note_id,
            preview,
            out,
        } => {
            let note = Notebook::new(store).get(&session, &note_id).await?;
            let mut editor = EditorSession::from_note(&note);
            if preview {
                editor.toggle_preview();
            }
            let html = presenter.render_editor(editor.content(), editor.mode());
            match out {
                Some(path) => {
                    std::fs::write(&path, html)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Rendered note");
                }
                None => {
                    DocumentViewer::new().show("note.html", &html).await?;
                }
            }
        }
        Command::Export { note_id } => {
            let note = Notebook::new(store).get(&session, &note_id).await?;
            let mut editor = EditorSession::from_note(&note);
            let surface = RenderSurface::spawn(presenter);
            let printer = BrowserPrinter::new(config.print.open_browser);
            let exporter = PrintExporter::new(printer);
            let outcome = exporter.export(&mut editor, &surface).await?;
            info!(?outcome, mode = %editor.mode(), "Export finished");
        }
        Command::Publish {
            note_id,
            price,
            currency,
        } => {
            let currency = parse_currency(currency.as_deref(), config.marketplace.currency)?;
            let listing = Publisher::new(store)
                .publish(&session, &note_id, price, currency)
                .await?;
            println!(
                "Published {} at {}",
                listing.id,
                domain::format_price(listing.price, listing.currency)
            );
        }
        Command::Market { search, html } => {
            let cards = Marketplace::new(store).browse(search.as_deref()).await?;
            if html {
                let page = presenter.render_grid(&cards);
                DocumentViewer::new().show("marketplace.html", &page).await?;
                return Ok(());
            }
            if cards.is_empty() {
                println!("No notes found");
            }
            for card in cards {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    card.id,
                    excerpt(&card.topic, EXCERPT_CHARS),
                    card.course_code,
                    card.price_label,
                    excerpt(&card.description, EXCERPT_CHARS)
                );
            }
        }
        Command::View { note_id, json } => {
            let view = Marketplace::new(store).view(&session, &note_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                let html = presenter.render_listing(&view);
                DocumentViewer::new().show("listing.html", &html).await?;
            }
        }
        Command::Buy { note_id } => {
            match Marketplace::new(store).purchase(&session, &note_id).await? {
                PurchaseOutcome::Purchased(_) => println!("Purchased {note_id}"),
                PurchaseOutcome::AlreadyOwned(_) => println!("Already purchased {note_id}"),
                PurchaseOutcome::AlreadyEntitled => println!("You are the author of {note_id}"),
            }
        }
        Command::Copy { note_id } => {
            let copy = Marketplace::new(store)
                .clone_for_editing(&session, &note_id)
                .await?;
            println!("{}", copy.id);
        }
        Command::Admin { action } => {
            run_admin(MarketplaceAdmin::new(store), &session, action, config.marketplace.currency)
                .await?
        }
    }

    Ok(())
}

async fn run_admin(
    admin: MarketplaceAdmin<JsonStore>,
    session: &Session,
    action: AdminCommand,
    default_currency: Currency,
) -> Result<()> {
    match action {
        AdminCommand::Create {
            topic,
            course,
            from,
            price,
            currency,
        } => {
            let currency = parse_currency(currency.as_deref(), default_currency)?;
            let listing = admin
                .create_listing(session, &topic, &course, read_content(&from)?, price, currency)
                .await?;
            println!("{}", listing.id);
        }
        AdminCommand::Update {
            note_id,
            topic,
            course,
            from,
            price,
            currency,
        } => {
            let patch = ListingPatch {
                topic,
                course_code: course,
                content: from.as_deref().map(read_content).transpose()?,
                price: price.map(Price::new).transpose()?,
                currency: currency.as_deref().map(str::parse::<Currency>).transpose()?,
            };
            let listing = admin.update_listing(session, &note_id, patch).await?;
            println!("Updated {}", listing.id);
        }
        AdminCommand::Delete { note_id } => {
            admin.delete_listing(session, &note_id).await?;
            println!("Deleted {note_id}");
        }
    }
    Ok(())
}

/// Signed-in session for `user_id`, with the role from the user directory.
/// Unknown ids act as plain users; no id means anonymous.
pub async fn resolve_session<D: UserDirectory>(directory: &D, user_id: Option<&str>) -> Result<Session> {
    let Some(user_id) = user_id.map(str::trim).filter(|id| !id.is_empty()) else {
        return Ok(Session::anonymous());
    };
    let user = directory
        .find_user(user_id)
        .await?
        .unwrap_or_else(|| User::new(user_id));
    debug!(user_id, role = ?user.role, "Resolved session");
    Ok(Session::signed_in(user))
}

fn parse_currency(value: Option<&str>, default: Currency) -> Result<Currency> {
    Ok(value.map(str::parse::<Currency>).transpose()?.unwrap_or(default))
}

fn read_content(path: &Path) -> Result<NoteContent> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read note content from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse note content in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use crate::util::testing;
    #[ctor::ctor]
    fn init() {
        testing::init_test_setup().expect("Failed to initialize test setup");
    }
}
