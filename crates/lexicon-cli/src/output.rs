//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;

use anyhow::anyhow;
use lexicon_api_models::{
    BackupHistoryEntry, CategoryStats, CategorySummary, PromptPage, PromptRecord,
};
use lexicon_ui::pages::PageWindow;
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};
use crate::terminal::TerminalRow;

const TERM_WIDTH: usize = 24;
const TRANSLATION_WIDTH: usize = 32;

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_categories(categories: &[CategorySummary], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(categories)?,
        OutputFormat::Table => {
            println!("{:>7} NAME", "ENTRIES");
            for category in categories {
                println!("{:>7} {}", category.count, category.name);
            }
        }
    }
    Ok(())
}

pub(crate) fn render_rows(
    rows: &[TerminalRow],
    window: Option<PageWindow>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<Value> = rows.iter().map(row_json).collect();
            let document = window.map_or_else(
                || json!({ "rows": rows }),
                |window| {
                    json!({
                        "rows": rows,
                        "page": window.page,
                        "pages": window.total_pages,
                        "total": window.total,
                    })
                },
            );
            print_json(&document)?;
        }
        OutputFormat::Table => print!("{}", format_rows(rows, window)),
    }
    Ok(())
}

fn row_json(row: &TerminalRow) -> Value {
    json!({
        "id": row.entry.id,
        "category": row.entry.category,
        "term": row.entry.term,
        "translation": row.entry.translation,
        "note": row.entry.note,
    })
}

/// Fixed-width table of rows with an optional page footer.
pub(crate) fn format_rows(rows: &[TerminalRow], window: Option<PageWindow>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6} {:<16} {:<TERM_WIDTH$} {:<TRANSLATION_WIDTH$} NOTE",
        "ID", "CATEGORY", "TERM", "TRANSLATION"
    );
    for row in rows {
        let id = row
            .entry
            .id
            .map_or_else(|| "-".to_string(), |id| id.0.to_string());
        let _ = writeln!(
            out,
            "{id:>6} {:<16} {:<TERM_WIDTH$} {:<TRANSLATION_WIDTH$} {}",
            clip(&row.entry.category, 16),
            clip(&row.entry.term, TERM_WIDTH),
            clip(&row.entry.translation, TRANSLATION_WIDTH),
            row.entry.note
        );
    }
    if let Some(window) = window {
        let _ = writeln!(
            out,
            "page {} of {} ({} entries)",
            window.page,
            window.total_pages.max(1),
            window.total
        );
    }
    out
}

pub(crate) fn render_prompt(record: &PromptRecord, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(record)?,
        OutputFormat::Table => {
            println!("id: {}", record.id.0);
            println!("category: {}", record.category);
            println!("term: {}", record.name);
            println!("translation: {}", record.translation);
            if let Some(comment) = record.comment.as_deref().filter(|text| !text.is_empty()) {
                println!("note: {comment}");
            }
            if let Some(created) = &record.created_at {
                println!("created: {created}");
            }
            if let Some(updated) = &record.updated_at {
                println!("updated: {updated}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_search(page: &PromptPage, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(page)?,
        OutputFormat::Table => {
            println!("{:>6} {:<16} {:<TERM_WIDTH$} TRANSLATION", "ID", "CATEGORY", "TERM");
            for record in &page.prompts {
                println!(
                    "{:>6} {:<16} {:<TERM_WIDTH$} {}",
                    record.id.0,
                    clip(&record.category, 16),
                    clip(&record.name, TERM_WIDTH),
                    record.translation
                );
            }
            println!(
                "page {} of {} ({} matches)",
                page.pagination.page,
                page.pagination.pages.max(1),
                page.pagination.total
            );
        }
    }
    Ok(())
}

pub(crate) fn render_history(history: &[BackupHistoryEntry], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(history)?,
        OutputFormat::Table => {
            println!("{:<20} {:<16} {:>8} FILE", "WHEN", "OPERATION", "IMPORTED");
            for entry in history {
                println!(
                    "{:<20} {:<16} {:>8} {}",
                    entry.timestamp.as_deref().unwrap_or("-"),
                    entry.operation,
                    entry.imported_count,
                    entry.filename
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_stats(stats: &CategoryStats, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(stats)?,
        OutputFormat::Table => {
            println!("categories: {}", stats.total_categories);
            println!("entries: {}", stats.total_prompts);
            println!("added in the last 7 days: {}", stats.recent_added);
        }
    }
    Ok(())
}

/// Shorten `text` to `width` characters, marking the cut with `~`.
pub(crate) fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}
