//! Category editor bindings.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement, HtmlSelectElement};

use super::dom::{DomRows, Layout};
use super::transport::{FetchTransport, TimeoutYielder};
use super::{Shell, by_id, fill_select, listen, row_event, run};
use crate::models::Field;
use crate::pages::{EditorPage, PageError};

type Page = EditorPage<FetchTransport, DomRows, TimeoutYielder>;

const CONTROLS: &[&str] = &[
    "categorySelect",
    "addRow",
    "saveToServer",
    "saveToServerTop",
    "sortAndSaveBtn",
];
const SAVE_BUTTONS: [&str; 2] = ["saveToServer", "saveToServerTop"];

pub(super) fn mount(shell: &Shell) {
    let Some(body) = by_id::<Element>("tableBody") else {
        return;
    };
    let page = Rc::new(Page::new(
        shell.context(CONTROLS),
        Rc::clone(&shell.gateway),
        shell.renderer(body.clone(), Layout::Editor),
    ));
    let select = by_id::<HtmlSelectElement>("categorySelect");

    if let Some(select) = select.clone() {
        let loader = Rc::clone(&page);
        run("load categories", async move {
            let names = loader.load_categories().await?;
            fill_select(&select, Some("Choose a category"), &names, None);
            Ok::<_, PageError>(())
        });
    }

    let refresher = Rc::clone(&page);
    let refresh_select = select.clone();
    shell.on_refresh(move || {
        let page = Rc::clone(&refresher);
        let select = refresh_select.clone();
        run("refresh editor", async move {
            page.load_categories().await?;
            if let Some(active) = page.active_category() {
                page.load_category(&active).await?;
            }
            keep_selection(&page, select.as_ref());
            Ok::<_, PageError>(())
        });
    });

    if let Some(select) = select.clone() {
        let page = Rc::clone(&page);
        let source = select.clone();
        listen(&select, "change", move |_| {
            let page = Rc::clone(&page);
            let category = source.value();
            run("load category", async move {
                page.load_category(&category).await
            });
        });
    }

    let edits = Rc::clone(&page);
    listen(&body, "change", move |event| {
        let Some((index, target)) = row_event(event) else {
            return;
        };
        let Some(field) = target
            .get_attribute("data-field")
            .as_deref()
            .and_then(Field::from_key)
        else {
            return;
        };
        if let Ok(input) = target.dyn_into::<HtmlInputElement>() {
            edits.edit_cell(index, field, &input.value());
        }
    });

    let deletes = Rc::clone(&page);
    listen(&body, "click", move |event| {
        let Some((index, target)) = row_event(event) else {
            return;
        };
        if target.get_attribute("data-action").as_deref() == Some("delete") {
            let page = Rc::clone(&deletes);
            run("delete row", async move { page.delete_row(index).await });
        }
    });

    if let Some(add) = by_id::<Element>("addRow") {
        let page = Rc::clone(&page);
        listen(&add, "click", move |_| {
            let _ = page.add_row();
        });
    }

    for id in SAVE_BUTTONS {
        let Some(save) = by_id::<Element>(id) else {
            continue;
        };
        let page = Rc::clone(&page);
        let select = select.clone();
        listen(&save, "click", move |_| {
            let page = Rc::clone(&page);
            let select = select.clone();
            run("save category", async move {
                page.save().await?;
                keep_selection(&page, select.as_ref());
                Ok::<_, PageError>(())
            });
        });
    }

    if let Some(sort) = by_id::<Element>("sortAndSaveBtn") {
        let page = Rc::clone(&page);
        listen(&sort, "click", move |_| {
            let page = Rc::clone(&page);
            let select = select.clone();
            run("sort and save", async move {
                page.sort_and_save().await?;
                keep_selection(&page, select.as_ref());
                Ok::<_, PageError>(())
            });
        });
    }
}

/// Redraw the dropdown after a save refreshed the category list.
fn keep_selection(page: &Page, select: Option<&HtmlSelectElement>) {
    if let Some(select) = select {
        let active = page.active_category();
        fill_select(
            select,
            Some("Choose a category"),
            &page.categories(),
            active.as_deref(),
        );
    }
}
