//! Entry form bindings for the v1 add form and the legacy quick-entry form.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{
    Element, HtmlFormElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
};

use super::transport::FetchTransport;
use super::{
    Shell, by_id, fill_select, input_value, is_checked, listen, run, set_hidden, set_text,
};
use crate::pages::{EntryForm, InputPage, PageError};

type Page = InputPage<FetchTransport>;

const CONTROLS: &[&str] = &["category", "addSubmit", "entrySubmit"];

pub(super) fn mount(shell: &Shell) {
    let add_form = by_id::<HtmlFormElement>("addForm");
    let entry_form = by_id::<HtmlFormElement>("entryForm");
    if add_form.is_none() && entry_form.is_none() {
        return;
    }
    let page = Rc::new(Page::new(
        shell.context(CONTROLS),
        Rc::clone(&shell.gateway),
        shell.config.field_limits,
    ));
    if let Some(form) = add_form {
        bind_add_form(&page, form);
        let refresher = Rc::clone(&page);
        shell.on_refresh(move || {
            let page = Rc::clone(&refresher);
            run("refresh categories", async move {
                let names = page.load_categories().await?;
                refill_categories(&names);
                Ok::<_, PageError>(())
            });
        });
    }
    if let Some(form) = entry_form {
        bind_entry_form(&page, form);
    }
}

fn bind_add_form(page: &Rc<Page>, form: HtmlFormElement) {
    let loader = Rc::clone(page);
    run("load categories", async move {
        let names = loader.load_categories().await?;
        refill_categories(&names);
        Ok::<_, PageError>(())
    });

    if let Some(toggle) = by_id::<HtmlInputElement>("useNewCategory") {
        let source = toggle.clone();
        listen(&toggle, "change", move |_| {
            let typed = source.checked();
            set_hidden("newCategory", !typed);
            set_hidden("category", typed);
        });
    }

    let page = Rc::clone(page);
    let target = form.clone();
    listen(&form, "submit", move |event| {
        event.prevent_default();
        let entry = EntryForm {
            category: input_value("category"),
            new_category: is_checked("useNewCategory").then(|| input_value("newCategory")),
            term: input_value("name"),
            translation: input_value("translation"),
            note: input_value("comment"),
        };
        let page = Rc::clone(&page);
        let form = target.clone();
        run("add entry", async move {
            let created = page.submit(&entry).await?;
            form.reset();
            refill_categories(&page.categories());
            if let Some(select) = by_id::<HtmlSelectElement>("category") {
                select.set_value(&created.category);
            }
            set_text(
                "formMessage",
                &format!("Added \"{}\" to {}", created.term, created.category),
            );
            Ok::<_, PageError>(())
        });
    });
}

fn bind_entry_form(page: &Rc<Page>, form: HtmlFormElement) {
    let page = Rc::clone(page);
    let target = form.clone();
    listen(&form, "submit", move |event| {
        event.prevent_default();
        let entry = EntryForm {
            category: named_value(&target, "category"),
            new_category: None,
            term: named_value(&target, "term"),
            translation: named_value(&target, "trans"),
            note: named_value(&target, "note"),
        };
        let page = Rc::clone(&page);
        let form = target.clone();
        run("add entry", async move {
            page.submit_legacy(&entry).await?;
            form.reset();
            set_text("msg", "Saved");
            Ok::<_, PageError>(())
        });
    });
}

fn refill_categories(names: &[String]) {
    if let Some(select) = by_id::<HtmlSelectElement>("category") {
        let current = select.value();
        fill_select(&select, Some("Choose a category"), names, Some(&current));
    }
}

/// Value of the form control named `name`.
fn named_value(form: &Element, name: &str) -> String {
    let Ok(Some(control)) = form.query_selector(&format!("[name=\"{name}\"]")) else {
        return String::new();
    };
    match control.dyn_into::<HtmlInputElement>() {
        Ok(input) => input.value(),
        Err(control) => match control.dyn_into::<HtmlSelectElement>() {
            Ok(select) => select.value(),
            Err(control) => control
                .dyn_into::<HtmlTextAreaElement>()
                .map(|area| area.value())
                .unwrap_or_default(),
        },
    }
}
