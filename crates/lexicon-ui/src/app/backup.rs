//! Backup screen bindings: exports, restores, statistics and history.

use std::rc::Rc;

use gloo::console;
use gloo::utils::{document, window};
use js_sys::Uint8Array;
use lexicon_api_models::{BackupFormat, RestoreMode};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, HtmlInputElement};

use super::transport::FetchTransport;
use super::{Shell, by_id, listen, run, set_text};
use crate::notify::{NotificationKind, Notifier};
use crate::pages::{BackupPage, PageError};

type Page = BackupPage<FetchTransport>;

const CONTROLS: &[&str] = &["exportCsv", "exportDb", "restoreCsv", "restoreDb"];

pub(super) fn mount(shell: &Shell) {
    if by_id::<Element>("restoreCsv").is_none() && by_id::<Element>("exportCsv").is_none() {
        return;
    }
    let page = Rc::new(
        Page::new(shell.context(CONTROLS), Rc::clone(&shell.gateway))
            .with_refresh(shell.refresh()),
    );

    for (id, format) in [("exportCsv", BackupFormat::Csv), ("exportDb", BackupFormat::Db)] {
        if let Some(button) = by_id::<Element>(id) {
            let page = Rc::clone(&page);
            listen(&button, "click", move |_| {
                let url = page.export_url(format, None);
                if let Err(err) = window().location().set_href(&url) {
                    console::error!("export navigation failed", err);
                }
            });
        }
    }

    let restores = [
        ("restoreCsv", "csvFile", "csvMode", BackupFormat::Csv),
        ("restoreDb", "dbFile", "dbMode", BackupFormat::Db),
    ];
    for (button_id, file_id, mode_name, format) in restores {
        let Some(button) = by_id::<Element>(button_id) else {
            continue;
        };
        let page = Rc::clone(&page);
        let notifier = shell.notifier();
        listen(&button, "click", move |_| {
            let Some(input) = by_id::<HtmlInputElement>(file_id) else {
                return;
            };
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                notifier.notify(NotificationKind::Warning, "Choose a file to restore first");
                return;
            };
            let mode = selected_mode(mode_name);
            let page = Rc::clone(&page);
            let notifier = Rc::clone(&notifier);
            run("restore backup", async move {
                let Ok(buffer) = JsFuture::from(file.array_buffer()).await else {
                    notifier.notify(
                        NotificationKind::Error,
                        &format!("Could not read {}", file.name()),
                    );
                    return Ok(());
                };
                let bytes = Uint8Array::new(&buffer).to_vec();
                page.restore(format, mode, &file.name(), bytes).await?;
                input.set_value("");
                show_stats(&page).await
            });
        });
    }

    let loader = Rc::clone(&page);
    run("load statistics", async move { show_stats(&loader).await });
}

fn selected_mode(name: &str) -> RestoreMode {
    let selector = format!("input[name=\"{name}\"]:checked");
    let value = document()
        .query_selector(&selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value());
    match value.as_deref() {
        Some("replace") => RestoreMode::Replace,
        _ => RestoreMode::Increment,
    }
}

async fn show_stats(page: &Page) -> Result<(), PageError> {
    if by_id::<Element>("backupStats").is_none() {
        return Ok(());
    }
    let stats = page.stats().await?;
    set_text(
        "backupStats",
        &format!(
            "{} categories, {} entries, {} added this week",
            stats.total_categories, stats.total_prompts, stats.recent_added
        ),
    );
    let Some(list) = by_id::<Element>("backupHistory") else {
        return Ok(());
    };
    let history = page.history().await?;
    list.set_inner_html("");
    for entry in history {
        let Ok(item) = document().create_element("li") else {
            continue;
        };
        let when = entry.timestamp.as_deref().unwrap_or("unknown time");
        item.set_text_content(Some(&format!(
            "{when}: {} {} ({} imported)",
            entry.operation, entry.filename, entry.imported_count
        )));
        let _ = list.append_child(&item);
    }
    Ok(())
}
