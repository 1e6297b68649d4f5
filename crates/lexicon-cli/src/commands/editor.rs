//! Whole-category table editing.
//!
//! Every mutating command loads the category, applies the change to the
//! rendered rows and writes the table back in one save.

use std::rc::Rc;

use lexicon_ui::models::Field;
use lexicon_ui::pages::EditorPage;
use lexicon_ui::render::EditOutcome;

use super::Session;
use crate::cli::{EditorAddArgs, EditorCommand, EditorRowArgs, EditorSetArgs};
use crate::client::{CliError, CliResult, ReqwestTransport};
use crate::output::render_rows;
use crate::terminal::{TerminalSurface, TokioYielder};

type Editor = EditorPage<ReqwestTransport, TerminalSurface, TokioYielder>;

pub(crate) async fn handle_editor(session: &Session, command: EditorCommand) -> CliResult<()> {
    match command {
        EditorCommand::Rows { category } => {
            let (surface, _editor) = open(session, &category).await?;
            render_rows(&surface.visible(), None, session.output)
        }
        EditorCommand::Set(args) => handle_set(session, args).await,
        EditorCommand::Add(args) => handle_add(session, args).await,
        EditorCommand::Drop(args) => handle_drop(session, args).await,
        EditorCommand::Sort { category } => {
            let (_surface, editor) = open(session, &category).await?;
            let written = editor.sort_and_save().await?;
            tracing::info!(category = %category, written, "category sorted");
            Ok(())
        }
    }
}

async fn open(session: &Session, category: &str) -> CliResult<(TerminalSurface, Editor)> {
    if category.trim().is_empty() {
        return Err(CliError::validation("category must not be empty"));
    }
    let (surface, renderer) = session.renderer();
    let editor = EditorPage::new(session.context(), Rc::clone(&session.gateway), renderer);
    editor.load_category(category).await?;
    Ok((surface, editor))
}

/// Zero-based index for a row number as printed by `editor rows`.
fn row_index(row: usize) -> CliResult<usize> {
    row.checked_sub(1)
        .ok_or_else(|| CliError::validation("row numbers start at 1"))
}

fn apply(editor: &Editor, index: usize, field: Field, value: &str) -> CliResult<bool> {
    match editor.edit_cell(index, field, value) {
        EditOutcome::Accepted(_) => Ok(true),
        EditOutcome::Unchanged => Ok(false),
        EditOutcome::Rejected(err) => Err(CliError::validation(err.to_string())),
        EditOutcome::MissingRow => Err(CliError::validation(format!(
            "row {} does not exist",
            index + 1
        ))),
    }
}

async fn handle_set(session: &Session, args: EditorSetArgs) -> CliResult<()> {
    let (_surface, editor) = open(session, &args.category).await?;
    let index = row_index(args.row)?;
    if !apply(&editor, index, args.field, &args.value)? {
        tracing::info!(row = args.row, field = args.field.key(), "value unchanged; nothing saved");
        return Ok(());
    }
    editor.save().await?;
    Ok(())
}

async fn handle_add(session: &Session, args: EditorAddArgs) -> CliResult<()> {
    let (surface, editor) = open(session, &args.category).await?;
    // An empty category renders one blank row; fill it instead of appending.
    let blank = surface
        .visible()
        .iter()
        .position(|row| row.entry.term.is_empty() && row.entry.translation.is_empty());
    let index = match blank {
        Some(index) => index,
        None => editor.add_row()?,
    };
    apply(&editor, index, Field::Term, &args.term)?;
    apply(&editor, index, Field::Translation, &args.translation)?;
    if let Some(note) = &args.note {
        apply(&editor, index, Field::Note, note)?;
    }
    editor.save().await?;
    Ok(())
}

async fn handle_drop(session: &Session, args: EditorRowArgs) -> CliResult<()> {
    let (_surface, editor) = open(session, &args.category).await?;
    let removed = editor.delete_row(row_index(args.row)?).await?;
    tracing::debug!(term = %removed.term, "row removed");
    editor.save().await?;
    Ok(())
}
