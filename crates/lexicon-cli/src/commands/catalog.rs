//! Read-only lookups: categories, statistics, search and single entries.

use lexicon_api_models::{PromptId, PromptQuery};

use super::Session;
use crate::cli::SearchArgs;
use crate::client::{CliError, CliResult};
use crate::output::{render_categories, render_prompt, render_search};

pub(crate) async fn handle_categories(session: &Session) -> CliResult<()> {
    let categories = session
        .gateway
        .category_summaries()
        .await
        .map_err(CliError::failure)?;
    render_categories(&categories, session.output)
}

pub(crate) async fn handle_show(session: &Session, id: i64) -> CliResult<()> {
    let record = session
        .gateway
        .prompt(PromptId(id))
        .await
        .map_err(CliError::failure)?;
    render_prompt(&record, session.output)
}

pub(crate) async fn handle_search(session: &Session, args: SearchArgs) -> CliResult<()> {
    let keyword = args.keyword.trim();
    if keyword.is_empty() {
        return Err(CliError::validation("search keyword must not be empty"));
    }
    let query = PromptQuery {
        keyword: Some(keyword.to_string()),
        category: args.category,
        page: Some(args.page.max(1)),
        limit: Some(session.config.page_size),
        sort: None,
    };
    let page = session
        .gateway
        .search_prompts(&query)
        .await
        .map_err(CliError::failure)?;
    render_search(&page, session.output)
}
