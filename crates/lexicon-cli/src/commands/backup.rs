//! Export, restore, history and statistics.

use std::io::Write as _;
use std::path::Path;
use std::rc::Rc;

use anyhow::anyhow;
use lexicon_api_models::BackupFormat;
use lexicon_ui::pages::BackupPage;

use super::Session;
use crate::cli::{ExportArgs, RestoreArgs};
use crate::client::{CliError, CliResult, ReqwestTransport};
use crate::output::{render_history, render_stats};

fn backup_page(session: &Session) -> BackupPage<ReqwestTransport> {
    BackupPage::new(session.context(), Rc::clone(&session.gateway))
}

pub(crate) async fn handle_export(session: &Session, args: ExportArgs) -> CliResult<()> {
    let page = backup_page(session);
    let format: BackupFormat = args.format.into();
    tracing::debug!(
        url = %page.export_url(format, args.category.as_deref()),
        "downloading export"
    );
    let bytes = page.download(format, args.category.as_deref()).await?;
    match args.out_file {
        Some(path) => {
            tokio::fs::write(&path, &bytes).await.map_err(|err| {
                CliError::failure(anyhow!("failed to write {}: {err}", path.display()))
            })?;
            eprintln!("wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|()| stdout.flush())
                .map_err(|err| CliError::failure(anyhow!("failed to write export: {err}")))?;
        }
    }
    Ok(())
}

pub(crate) async fn handle_restore(session: &Session, args: RestoreArgs) -> CliResult<()> {
    let filename = file_name(&args.file)?;
    let bytes = tokio::fs::read(&args.file).await.map_err(|err| {
        CliError::validation(format!("failed to read {}: {err}", args.file.display()))
    })?;
    let summary = backup_page(session)
        .restore(args.format.into(), args.mode.into(), &filename, bytes)
        .await?;
    // The controller already reported the counts; list the rejected rows.
    for error in &summary.errors {
        eprintln!("  {error}");
    }
    Ok(())
}

fn file_name(path: &Path) -> CliResult<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| CliError::validation(format!("{} is not a file path", path.display())))
}

pub(crate) async fn handle_history(session: &Session) -> CliResult<()> {
    let history = backup_page(session).history().await?;
    render_history(&history, session.output)
}

pub(crate) async fn handle_stats(session: &Session) -> CliResult<()> {
    let stats = backup_page(session).stats().await?;
    render_stats(&stats, session.output)
}
