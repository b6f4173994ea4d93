// src/ports/html.rs
use crate::application::ListingCard;
use crate::constants::MATHJAX_CDN;
use crate::domain::{Entitlement, GatedView, NoteContent, ViewMode};
use crate::infrastructure::math::MathRenderer;
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::instrument;

const NO_OBJECTIVE: &str = "No objective defined.";
const NO_SUMMARY: &str = "No summary provided.";

/// Renders notes, listings and the marketplace grid as standalone HTML documents.
#[derive(Debug, Clone, Default)]
pub struct HtmlPresenter {
    math: MathRenderer,
}

impl HtmlPresenter {
    pub fn new() -> Self {
        Self {
            math: MathRenderer::new(),
        }
    }

    /// Cornell layout of editor content.
    ///
    /// Only `Edit` renders form controls. `Preview` and `Print` render the
    /// math-typeset, read-only layout used for export.
    #[instrument(level = "debug", skip(self, content))]
    pub fn render_editor(&self, content: &NoteContent, mode: ViewMode) -> String {
        let body = if mode.is_editable() {
            self.editable_body(content)
        } else {
            self.readonly_body(content)
        };
        page(&content.topic_or_default(), &format!("mode-{mode}"), &body)
    }

    fn editable_body(&self, content: &NoteContent) -> String {
        let meta = &content.metadata;
        let rows: String = content
            .rows
            .iter()
            .map(|row| {
                format!(
                    r#"
            <div class="row" data-row-id="{id}">
                <div class="cue"><textarea name="cue" placeholder="Add cue...">{cue}</textarea></div>
                <div class="notes"><textarea name="note" placeholder="Start typing your notes here...">{note}</textarea></div>
                <button type="button" class="remove-row" data-row-id="{id}">Remove row</button>
            </div>"#,
                    id = encode_double_quoted_attribute(&row.id),
                    cue = encode_text(&row.cue),
                    note = encode_text(&row.note),
                )
            })
            .collect();

        format!(
            r#"<header class="note-header">
            <input name="topic" placeholder="e.g. Linear Algebra" value="{topic}">
            <input name="date" value="{date}">
            <input name="course" placeholder="CODE 101" value="{course}">
            <input name="objective" placeholder="What are you trying to learn today?" value="{objective}">
        </header>
        <section class="rows">{rows}
            <button type="button" class="add-row">Add row</button>
        </section>
        <footer class="summary">
            <h2>Summary</h2>
            <textarea name="summary" placeholder="Summarize the main points...">{summary}</textarea>
        </footer>"#,
            topic = encode_double_quoted_attribute(&meta.topic),
            date = encode_double_quoted_attribute(&meta.date),
            course = encode_double_quoted_attribute(&meta.course),
            objective = encode_double_quoted_attribute(&meta.objective),
            rows = rows,
            summary = encode_text(&content.summary),
        )
    }

    fn readonly_body(&self, content: &NoteContent) -> String {
        let meta = &content.metadata;
        let rows: String = content
            .rows
            .iter()
            .map(|row| {
                format!(
                    r#"
            <div class="row">
                <div class="cue">{cue}</div>
                <div class="notes">{note}</div>
            </div>"#,
                    cue = self.math.render_html(&row.cue, None),
                    note = self.math.render_html(&row.note, None),
                )
            })
            .collect();

        format!(
            r#"<header class="note-header">
            <h1>{topic}</h1>
            <div class="meta"><span>{date}</span> <span class="course">{course}</span></div>
            <div class="objective">{objective}</div>
        </header>
        <section class="rows">{rows}
        </section>
        <footer class="summary">
            <h2>Summary</h2>
            <div>{summary}</div>
        </footer>"#,
            topic = encode_text(&content.topic_or_default()),
            date = encode_text(&meta.date),
            course = encode_text(&meta.course),
            objective = self.math.render_html(&meta.objective, Some(NO_OBJECTIVE)),
            rows = rows,
            summary = self.math.render_html(&content.summary, Some(NO_SUMMARY)),
        )
    }

    /// A listing as the given viewer may see it. Withheld rows are never emitted.
    #[instrument(level = "debug", skip(self, view), fields(note_id = %view.note_id))]
    pub fn render_listing(&self, view: &GatedView) -> String {
        let rows: String = view
            .rows
            .iter()
            .map(|row| {
                format!(
                    r#"
            <div class="row">
                <div class="cue">{}</div>
                <div class="notes">{}</div>
            </div>"#,
                    self.math.render_html(&row.cue, None),
                    self.math.render_html(&row.note, None),
                )
            })
            .collect();

        let badge = match view.entitlement {
            Entitlement::Owner => r#"<span class="badge">Your note</span>"#.to_string(),
            Entitlement::Purchaser => r#"<span class="badge">Owned</span>"#.to_string(),
            Entitlement::NonPurchaser => format!(
                r#"<span class="price">{}</span>"#,
                encode_text(&view.price_label)
            ),
        };

        let locked = match &view.offer {
            Some(offer) if view.is_locked() => format!(
                r#"
        <section class="locked">
            <h3>Purchase to Unlock Full Note</h3>
            <p>{} more rows and the summary are available after purchase.</p>
            <button type="button" class="buy">{}</button>
        </section>"#,
                view.withheld_rows,
                encode_text(&offer.button_label)
            ),
            Some(offer) => format!(
                r#"
        <section class="offer">
            <button type="button" class="buy">{}</button>
        </section>"#,
                encode_text(&offer.button_label)
            ),
            None => String::new(),
        };

        let summary = match &view.summary {
            Some(summary) => format!(
                r#"
        <footer class="summary">
            <h2>Summary</h2>
            <div>{}</div>
        </footer>"#,
                self.math.render_html(summary, Some(NO_SUMMARY))
            ),
            None => String::new(),
        };

        let body = format!(
            r#"<header class="note-header">
            <h1>{topic}</h1>
            <div class="meta"><span class="course">{course}</span> {badge}</div>
            <div class="objective">{objective}</div>
        </header>
        <section class="rows">{rows}
        </section>{locked}{summary}"#,
            topic = encode_text(&view.topic),
            course = encode_text(&view.course_code),
            badge = badge,
            objective = self.math.render_html(&view.objective, Some(NO_OBJECTIVE)),
            rows = rows,
            locked = locked,
            summary = summary,
        );
        page(&view.topic, "listing", &body)
    }

    pub fn render_grid(&self, cards: &[ListingCard]) -> String {
        if cards.is_empty() {
            return page(
                "Marketplace",
                "grid",
                r#"<div class="empty"><h3>No notes found</h3></div>"#,
            );
        }

        let cards: String = cards
            .iter()
            .map(|card| {
                format!(
                    r#"
        <article class="listing-card" data-note-id="{id}">
            <div class="meta"><span class="course">{course}</span> <span class="price">{price}</span></div>
            <h3>{topic}</h3>
            <p>{description}</p>
            <a class="cta" href="{id}.html">{cta}</a>
        </article>"#,
                    id = encode_double_quoted_attribute(&card.id),
                    course = encode_text(&card.course_code),
                    price = encode_text(&card.price_label),
                    topic = encode_text(&card.topic),
                    description = encode_text(&card.description),
                    cta = encode_text(&card.call_to_action),
                )
            })
            .collect();
        page(
            "Marketplace",
            "grid",
            &format!(r#"<section class="listings">{cards}
        </section>"#),
        )
    }
}

fn page(title: &str, class: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <script>
        window.MathJax = {{
            tex: {{
                inlineMath: [['\\(', '\\)']],
                displayMath: [['\\[', '\\]']],
                packages: {{'[+]': ['noerrors', 'noundefined']}}
            }},
            options: {{
                ignoreHtmlClass: 'tex2jax_ignore',
                processHtmlClass: 'math'
            }}
        }};
    </script>
    <script src="{mathjax}"></script>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            max-width: 900px;
            margin: 2rem auto;
            padding: 0 1rem;
            background-color: #f5f5f5;
        }}
        .sheet {{
            background: white;
            border-radius: 8px;
            padding: 2rem;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
        .note-header {{
            border-bottom: 2px solid #333;
            padding-bottom: 1rem;
            margin-bottom: 1rem;
        }}
        .row {{
            display: grid;
            grid-template-columns: 30% 70%;
            border-bottom: 1px solid #eee;
            padding: 0.5rem 0;
        }}
        .cue {{
            font-weight: bold;
            border-right: 1px solid #ccc;
            padding-right: 1rem;
        }}
        .notes {{
            padding-left: 1rem;
        }}
        .text {{
            white-space: pre-wrap;
        }}
        .placeholder {{
            color: #999;
            font-style: italic;
        }}
        .math-fallback {{
            font-family: monospace;
            color: #b00;
        }}
        .summary {{
            border-top: 2px solid #333;
            margin-top: 1rem;
            padding-top: 1rem;
        }}
        .locked {{
            text-align: center;
            background: #f8f9fa;
            border: 1px dashed #ccc;
            border-radius: 8px;
            padding: 2rem;
            margin-top: 1rem;
        }}
        .badge, .price, .course {{
            display: inline-block;
            background: #e9ecef;
            padding: 2px 8px;
            border-radius: 4px;
            font-size: 0.8em;
        }}
        .listings {{
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(250px, 1fr));
            gap: 1rem;
        }}
        .listing-card {{
            background: white;
            border-radius: 8px;
            padding: 1rem;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
        @media print {{
            body {{ background: white; margin: 0; max-width: none; }}
            .sheet {{ box-shadow: none; }}
        }}
    </style>
</head>
<body class="tex2jax_ignore">
    <div class="sheet {class}">
        {body}
    </div>
</body>
</html>"#,
        title = encode_text(title),
        mathjax = MATHJAX_CDN,
        class = class,
        body = body,
    )
}
