//! Combine screen bindings.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

use super::dialogs::BrowserClipboard;
use super::dom::{DomRows, Layout};
use super::transport::{FetchTransport, TimeoutYielder};
use super::{Shell, by_id, fill_select, listen, row_event, run, set_text};
use crate::pages::{CombinePage, PageError};

type Page = CombinePage<FetchTransport, DomRows, TimeoutYielder>;

const CONTROLS: &[&str] = &["combineCategory", "copyBtn", "clearBtn"];

pub(super) fn mount(shell: &Shell) {
    let Some(list) = by_id::<Element>("termList") else {
        return;
    };
    let page = Rc::new(Page::new(
        shell.context(CONTROLS),
        Rc::clone(&shell.gateway),
        shell.renderer(list.clone(), Layout::CheckList),
        &shell.config,
    ));

    if let Some(select) = by_id::<HtmlSelectElement>("combineCategory") {
        bind_categories(&page, select.clone());
        let refresher = Rc::clone(&page);
        shell.on_refresh(move || {
            let page = Rc::clone(&refresher);
            let select = select.clone();
            run("refresh categories", async move {
                let names = page.load_categories().await?;
                let current = select.value();
                fill_select(&select, Some("Choose a category"), &names, Some(&current));
                Ok::<_, PageError>(())
            });
        });
    }

    let toggles = Rc::clone(&page);
    listen(&list, "change", move |event| {
        let Some((index, target)) = row_event(event) else {
            return;
        };
        let Ok(checkbox) = target.dyn_into::<HtmlInputElement>() else {
            return;
        };
        if toggles.toggle(index, checkbox.checked()).is_ok() {
            show_selection(&toggles);
        }
    });

    if let Some(copy) = by_id::<Element>("copyBtn") {
        let page = Rc::clone(&page);
        listen(&copy, "click", move |_| {
            let page = Rc::clone(&page);
            run("copy selection", async move {
                page.copy_text(&BrowserClipboard).await
            });
        });
    }

    if let Some(clear) = by_id::<Element>("clearBtn") {
        let page = Rc::clone(&page);
        listen(&clear, "click", move |_| {
            let page = Rc::clone(&page);
            run("clear selection", async move {
                page.clear_selection().await?;
                show_selection(&page);
                Ok::<_, PageError>(())
            });
        });
    }

    if let Some(prefix) = by_id::<HtmlInputElement>("usePrefix") {
        let page = Rc::clone(&page);
        let source = prefix.clone();
        listen(&prefix, "change", move |_| {
            page.set_prefix_enabled(source.checked());
            show_selection(&page);
        });
    }

    if let Some(search) = by_id::<HtmlInputElement>("searchInput") {
        bind_search(&page, search, shell.config.search_debounce_ms);
    }
    show_selection(&page);
}

fn bind_categories(page: &Rc<Page>, select: HtmlSelectElement) {
    let loader = Rc::clone(page);
    let target = select.clone();
    run("load categories", async move {
        let names = loader.load_categories().await?;
        fill_select(&target, Some("Choose a category"), &names, None);
        Ok::<_, PageError>(())
    });

    let page = Rc::clone(page);
    let source = select.clone();
    listen(&select, "change", move |_| {
        let category = source.value();
        if category.is_empty() {
            return;
        }
        let page = Rc::clone(&page);
        run("select category", async move {
            page.select_category(&category).await
        });
    });
}

fn bind_search(page: &Rc<Page>, search: HtmlInputElement, delay_ms: u32) {
    let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
    let page = Rc::clone(page);
    let source = search.clone();
    listen(&search, "input", move |_| {
        let page = Rc::clone(&page);
        let source = source.clone();
        let timeout = Timeout::new(delay_ms, move || {
            page.search(&source.value());
        });
        // Replacing the handle cancels the previous timer.
        *pending.borrow_mut() = Some(timeout);
    });
}

fn show_selection(page: &Page) {
    set_text("selectedCount", &page.selected_count().to_string());
    let preview = page.preview();
    match by_id::<HtmlTextAreaElement>("previewText") {
        Some(area) => area.set_value(&preview),
        None => set_text("previewText", &preview),
    }
}
