//! Paged listing, single-entry input, edits and deletes.

use std::rc::Rc;

use lexicon_api_models::PromptId;
use lexicon_ui::models::Entry;
use lexicon_ui::pages::{EntryForm, InputPage, ManagePage};

use super::Session;
use crate::cli::{AddArgs, EditArgs, ListArgs, RemoveArgs};
use crate::client::{CliError, CliResult, ReqwestTransport};
use crate::output::render_rows;
use crate::terminal::{TerminalRow, TerminalSurface, TokioYielder};

type Manage = ManagePage<ReqwestTransport, TerminalSurface, TokioYielder>;

fn manage_page(session: &Session) -> (TerminalSurface, Manage) {
    let (surface, renderer) = session.renderer();
    let page = ManagePage::new(
        session.context(),
        Rc::clone(&session.gateway),
        renderer,
        &session.config,
    );
    (surface, page)
}

async fn open_page(page: &Manage, category: Option<&str>, number: u32) -> CliResult<()> {
    page.set_category(category).await?;
    if number > 1 {
        page.load_page(number).await?;
    }
    Ok(())
}

pub(crate) async fn handle_list(session: &Session, args: ListArgs) -> CliResult<()> {
    let (surface, page) = manage_page(session);
    open_page(&page, args.category.as_deref(), args.page).await?;
    render_rows(&surface.visible(), Some(page.window()), session.output)
}

pub(crate) async fn handle_add(session: &Session, args: AddArgs) -> CliResult<()> {
    let input = InputPage::new(
        session.context(),
        Rc::clone(&session.gateway),
        session.config.field_limits,
    );
    let form = EntryForm {
        category: args.category,
        new_category: None,
        term: args.term,
        translation: args.translation,
        note: args.note.unwrap_or_default(),
    };
    let saved = if args.legacy {
        input.submit_legacy(&form).await?
    } else {
        input.submit(&form).await?
    };
    render_rows(&[shown(saved)], None, session.output)
}

pub(crate) async fn handle_edit(session: &Session, args: EditArgs) -> CliResult<()> {
    let changes = [
        args.category.as_ref(),
        args.term.as_ref(),
        args.translation.as_ref(),
        args.note.as_ref(),
    ];
    if changes.iter().all(Option::is_none) {
        return Err(CliError::validation(
            "nothing to change; pass --category, --term, --translation or --note",
        ));
    }

    let id = PromptId(args.id);
    let current = session.gateway.prompt(id).await.map_err(CliError::failure)?;
    let draft = apply_changes(Entry::from(current), &args);

    let (_surface, page) = manage_page(session);
    let saved = page.save_edit(id, &draft).await?;
    render_rows(&[shown(saved)], None, session.output)
}

fn apply_changes(mut entry: Entry, args: &EditArgs) -> Entry {
    if let Some(category) = &args.category {
        entry.category.clone_from(category);
    }
    if let Some(term) = &args.term {
        entry.term.clone_from(term);
    }
    if let Some(translation) = &args.translation {
        entry.translation.clone_from(translation);
    }
    if let Some(note) = &args.note {
        entry.note.clone_from(note);
    }
    entry
}

/// Delete entries shown on one page of the listing.
///
/// The page is loaded first so the deletes go through the same selection and
/// confirmation path as the manage screen.
pub(crate) async fn handle_remove(session: &Session, args: RemoveArgs) -> CliResult<()> {
    let (surface, page) = manage_page(session);
    open_page(&page, args.category.as_deref(), args.page).await?;

    let rows = surface.visible();
    let indexes = row_indexes(&rows, &args.ids)?;
    if let [index] = indexes.as_slice() {
        page.delete_one(*index).await?;
        return Ok(());
    }
    for index in indexes {
        page.toggle_row(index, true)?;
    }
    let deleted = page.delete_selected().await?;
    tracing::info!(deleted, "batch delete finished");
    Ok(())
}

/// Positions of `ids` among `rows`, in the order given.
fn row_indexes(rows: &[TerminalRow], ids: &[i64]) -> CliResult<Vec<usize>> {
    let mut indexes = Vec::with_capacity(ids.len());
    for id in ids {
        let index = rows
            .iter()
            .position(|row| row.entry.id == Some(PromptId(*id)))
            .ok_or_else(|| {
                CliError::validation(format!(
                    "entry {id} is not on this page; pass --category or --page to locate it"
                ))
            })?;
        if !indexes.contains(&index) {
            indexes.push(index);
        }
    }
    Ok(indexes)
}

fn shown(entry: Entry) -> TerminalRow {
    TerminalRow {
        entry,
        checked: false,
        visible: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64) -> TerminalRow {
        let mut entry = Entry::new("Animals", format!("term{id}"), "t", "");
        entry.id = Some(PromptId(id));
        shown(entry)
    }

    #[test]
    fn row_indexes_follow_argument_order_and_skip_duplicates() {
        let rows = [row(3), row(5), row(8)];
        let indexes = row_indexes(&rows, &[8, 3, 8]).ok();
        assert_eq!(indexes, Some(vec![2, 0]));
    }

    #[test]
    fn row_indexes_reject_ids_off_the_page() {
        let rows = [row(3)];
        let err = row_indexes(&rows, &[4]).err().map(|err| err.exit_code());
        assert_eq!(err, Some(2));
    }

    #[test]
    fn apply_changes_only_touches_given_fields() {
        let args = EditArgs {
            id: 1,
            category: None,
            term: None,
            translation: Some("chaton".to_string()),
            note: Some(String::new()),
        };
        let entry = apply_changes(Entry::new("Animals", "kitten", "chat", "young"), &args);
        assert_eq!(entry.term, "kitten");
        assert_eq!(entry.translation, "chaton");
        assert_eq!(entry.note, "");
    }
}
