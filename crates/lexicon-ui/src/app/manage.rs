//! Management table bindings: paging, bulk selection and the edit modal.

use std::cell::Cell;
use std::rc::Rc;

use lexicon_api_models::PromptId;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

use super::dom::{DomRows, Layout};
use super::transport::{FetchTransport, TimeoutYielder};
use super::{
    Shell, by_id, fill_select, input_value, is_checked, listen, row_event, run, set_hidden,
    set_text,
};
use crate::models::Entry;
use crate::pages::{ManagePage, PageError};

type Page = ManagePage<FetchTransport, DomRows, TimeoutYielder>;

const CONTROLS: &[&str] = &[
    "manageCategory",
    "prevPage",
    "nextPage",
    "deleteSelected",
    "selectAll",
    "editSave",
];
const MODAL_ID: &str = "editPromptModal";

pub(super) fn mount(shell: &Shell) {
    let Some(body) = by_id::<Element>("promptsTableBody") else {
        return;
    };
    let page = Rc::new(Page::new(
        shell.context(CONTROLS),
        Rc::clone(&shell.gateway),
        shell.renderer(body.clone(), Layout::Table),
        &shell.config,
    ));
    let editing: Rc<Cell<Option<PromptId>>> = Rc::new(Cell::new(None));

    let loader = Rc::clone(&page);
    run("load entries", async move {
        load_filters(&loader).await?;
        loader.load_page(1).await?;
        show_window(&loader);
        Ok::<_, PageError>(())
    });

    let refresher = Rc::clone(&page);
    shell.on_refresh(move || {
        let page = Rc::clone(&refresher);
        run("refresh entries", async move {
            load_filters(&page).await?;
            page.reload().await?;
            show_window(&page);
            Ok::<_, PageError>(())
        });
    });

    if let Some(select) = by_id::<HtmlSelectElement>("manageCategory") {
        let page = Rc::clone(&page);
        let source = select.clone();
        listen(&select, "change", move |_| {
            let page = Rc::clone(&page);
            let category = source.value();
            run("filter category", async move {
                page.set_category(Some(&category)).await?;
                show_window(&page);
                Ok::<_, PageError>(())
            });
        });
    }

    bind_paging(&page);
    bind_rows(&page, &body, &editing);
    bind_modal(&page, &editing);

    if let Some(select_all) = by_id::<HtmlInputElement>("selectAll") {
        let page = Rc::clone(&page);
        let source = select_all.clone();
        listen(&select_all, "change", move |_| {
            page.toggle_all(source.checked());
            show_window(&page);
        });
    }

    if let Some(delete) = by_id::<Element>("deleteSelected") {
        let page = Rc::clone(&page);
        listen(&delete, "click", move |_| {
            let page = Rc::clone(&page);
            run("delete selected", async move {
                page.delete_selected().await?;
                show_window(&page);
                Ok::<_, PageError>(())
            });
        });
    }
}

async fn load_filters(page: &Page) -> Result<(), PageError> {
    let names = page.load_categories().await?;
    let active = page.category();
    if let Some(select) = by_id::<HtmlSelectElement>("manageCategory") {
        fill_select(&select, Some("All categories"), &names, active.as_deref());
    }
    if let Some(select) = by_id::<HtmlSelectElement>("editCategory") {
        fill_select(&select, None, &names, None);
    }
    Ok(())
}

fn bind_paging(page: &Rc<Page>) {
    if let Some(prev) = by_id::<Element>("prevPage") {
        let page = Rc::clone(page);
        listen(&prev, "click", move |_| {
            let page = Rc::clone(&page);
            run("previous page", async move {
                page.prev_page().await?;
                show_window(&page);
                Ok::<_, PageError>(())
            });
        });
    }
    if let Some(next) = by_id::<Element>("nextPage") {
        let page = Rc::clone(page);
        listen(&next, "click", move |_| {
            let page = Rc::clone(&page);
            run("next page", async move {
                page.next_page().await?;
                show_window(&page);
                Ok::<_, PageError>(())
            });
        });
    }
}

fn bind_rows(page: &Rc<Page>, body: &Element, editing: &Rc<Cell<Option<PromptId>>>) {
    let toggles = Rc::clone(page);
    listen(body, "change", move |event| {
        let Some((index, target)) = row_event(event) else {
            return;
        };
        let Ok(checkbox) = target.dyn_into::<HtmlInputElement>() else {
            return;
        };
        if toggles.toggle_row(index, checkbox.checked()).is_ok() {
            show_window(&toggles);
        }
    });

    let page = Rc::clone(page);
    let editing = Rc::clone(editing);
    listen(body, "click", move |event| {
        let Some((index, target)) = row_event(event) else {
            return;
        };
        let page = Rc::clone(&page);
        match target.get_attribute("data-action").as_deref() {
            Some("delete") => run("delete entry", async move {
                page.delete_one(index).await?;
                show_window(&page);
                Ok::<_, PageError>(())
            }),
            Some("edit") => {
                let editing = Rc::clone(&editing);
                run("open editor", async move {
                    let draft = page.edit_draft(index).await?;
                    editing.set(draft.id);
                    open_modal(&draft);
                    Ok::<_, PageError>(())
                });
            }
            _ => {}
        }
    });
}

fn bind_modal(page: &Rc<Page>, editing: &Rc<Cell<Option<PromptId>>>) {
    if let Some(toggle) = by_id::<HtmlInputElement>("useEditNewCategory") {
        let source = toggle.clone();
        listen(&toggle, "change", move |_| {
            set_hidden("editNewCategory", !source.checked());
        });
    }
    if let Some(cancel) = by_id::<Element>("editCancel") {
        let editing = Rc::clone(editing);
        listen(&cancel, "click", move |_| {
            editing.set(None);
            set_hidden(MODAL_ID, true);
        });
    }
    if let Some(save) = by_id::<Element>("editSave") {
        let page = Rc::clone(page);
        let editing = Rc::clone(editing);
        listen(&save, "click", move |_| {
            let Some(id) = editing.get() else {
                return;
            };
            let page = Rc::clone(&page);
            let editing = Rc::clone(&editing);
            let draft = modal_draft();
            run("save entry", async move {
                page.save_edit(id, &draft).await?;
                editing.set(None);
                set_hidden(MODAL_ID, true);
                show_window(&page);
                Ok::<_, PageError>(())
            });
        });
    }
}

fn open_modal(draft: &Entry) {
    let id = draft.id.map(|id| id.0.to_string()).unwrap_or_default();
    set_value("editId", &id);
    if let Some(select) = by_id::<HtmlSelectElement>("editCategory") {
        select.set_value(&draft.category);
    }
    set_value("editName", &draft.term);
    set_value("editTranslation", &draft.translation);
    set_value("editComment", &draft.note);
    set_value("editNewCategory", "");
    if let Some(toggle) = by_id::<HtmlInputElement>("useEditNewCategory") {
        toggle.set_checked(false);
    }
    set_hidden("editNewCategory", true);
    set_hidden(MODAL_ID, false);
}

fn modal_draft() -> Entry {
    let category = if is_checked("useEditNewCategory") {
        input_value("editNewCategory")
    } else {
        input_value("editCategory")
    };
    Entry::new(
        category,
        input_value("editName"),
        input_value("editTranslation"),
        input_value("editComment"),
    )
}

fn set_value(id: &str, value: &str) {
    if let Some(input) = by_id::<HtmlInputElement>(id) {
        input.set_value(value);
    } else if let Some(area) = by_id::<HtmlTextAreaElement>(id) {
        area.set_value(value);
    }
}

fn show_window(page: &Page) {
    let window = page.window();
    set_text(
        "pageInfo",
        &format!(
            "Page {} of {} ({} entries)",
            window.page,
            window.total_pages.max(1),
            window.total
        ),
    );
    set_disabled("prevPage", !window.has_prev());
    set_disabled("nextPage", !window.has_next());
    set_disabled("deleteSelected", !page.bulk_enabled());
    set_text("selectedCount", &page.selected_count().to_string());
    if let Some(select_all) = by_id::<HtmlInputElement>("selectAll") {
        let header = page.header_state();
        select_all.set_checked(header.is_checked());
        select_all.set_indeterminate(header.is_indeterminate());
    }
}

fn set_disabled(id: &str, disabled: bool) {
    if let Some(control) = by_id::<Element>(id) {
        let _ = control.toggle_attribute_with_force("disabled", disabled);
    }
}
