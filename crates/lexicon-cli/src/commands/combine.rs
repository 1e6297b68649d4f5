//! Combine terms from one or more categories into a single prompt line.

use std::rc::Rc;

use lexicon_ui::CombineSource;
use lexicon_ui::pages::CombinePage;

use super::Session;
use crate::cli::CombineArgs;
use crate::client::{CliError, CliResult};
use crate::terminal::StdoutClipboard;

pub(crate) async fn handle_combine(session: &Session, args: CombineArgs) -> CliResult<()> {
    if args.categories.is_empty() {
        return Err(CliError::validation("name at least one category"));
    }
    let mut config = session.config.clone();
    if args.legacy {
        config.combine_source = CombineSource::Legacy;
    }
    let (surface, renderer) = session.renderer();
    let page = CombinePage::new(
        session.context(),
        Rc::clone(&session.gateway),
        renderer,
        &config,
    );
    page.set_prefix_enabled(args.prefix);

    let mut unmatched: Vec<String> = args.pick.clone();
    for category in &args.categories {
        page.select_category(category).await?;
        for (index, row) in surface.visible().iter().enumerate() {
            let term = &row.entry.term;
            let wanted = args.pick.is_empty() || args.pick.iter().any(|pick| pick == term);
            if wanted && !row.checked {
                page.toggle(index, true)?;
            }
            unmatched.retain(|pick| pick != term);
        }
    }
    if !unmatched.is_empty() {
        return Err(CliError::validation(format!(
            "terms not found: {}",
            unmatched.join(", ")
        )));
    }

    let clipboard = StdoutClipboard::default();
    page.copy_text(&clipboard).await?;
    tracing::debug!(
        selected = page.selected_count(),
        written = clipboard.written().map_or(0, |text| text.len()),
        "combined text written"
    );
    Ok(())
}
