//! DOM-backed [`RowSurface`] for the editor grid, the management table and
//! the combine checklist.

use gloo::console;
use gloo::utils::document;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, HtmlElement, HtmlInputElement, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

use crate::models::Field;
use crate::render::{RowLabels, RowSurface, RowView};

const EDITOR_FIELDS: [Field; 3] = [Field::Term, Field::Translation, Field::Note];

/// Markup produced for each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    /// `<tr>` of text inputs plus a delete button.
    Editor,
    /// `<tr>` with a checkbox, text cells and edit/delete buttons.
    Table,
    /// `<label class="term-item">` wrapping a checkbox.
    CheckList,
}

/// Rows rendered as the children of `container`.
pub(crate) struct DomRows {
    container: Element,
    layout: Layout,
}

impl DomRows {
    pub(crate) const fn new(container: Element, layout: Layout) -> Self {
        Self { container, layout }
    }

    fn row(&self, index: usize) -> Option<Element> {
        self.container.children().item(u32::try_from(index).ok()?)
    }

    fn field(&self, index: usize, field: Field) -> Option<Element> {
        self.row(index)?
            .query_selector(&format!("[data-field=\"{}\"]", field.key()))
            .ok()?
    }

    fn build(&self, view: &RowView) -> Result<Element, JsValue> {
        match self.layout {
            Layout::Editor => editor_row(view),
            Layout::Table => table_row(view),
            Layout::CheckList => check_item(view),
        }
    }
}

fn element(tag: &str) -> Result<Element, JsValue> {
    document().create_element(tag)
}

fn cell(row: &Element, child: &Element) -> Result<(), JsValue> {
    let cell = element("td")?;
    cell.append_child(child)?;
    row.append_child(&cell)?;
    Ok(())
}

fn button(action: &str, text: &str, label: &str) -> Result<Element, JsValue> {
    let button = element("button")?;
    button.set_attribute("type", "button")?;
    button.set_attribute("data-action", action)?;
    button.set_attribute("aria-label", label)?;
    button.set_text_content(Some(text));
    Ok(button)
}

fn checkbox(checked: bool) -> Result<HtmlInputElement, JsValue> {
    let input = element("input")?.dyn_into::<HtmlInputElement>()?;
    input.set_type("checkbox");
    input.set_attribute("data-action", "toggle")?;
    input.set_checked(checked);
    Ok(input)
}

fn editor_row(view: &RowView) -> Result<Element, JsValue> {
    let row = element("tr")?;
    row.set_attribute("data-index", &view.index.to_string())?;
    for field in EDITOR_FIELDS {
        let input = element("input")?.dyn_into::<HtmlInputElement>()?;
        input.set_type("text");
        input.set_value(view.entry.field(field));
        input.set_attribute("data-field", field.key())?;
        input.set_attribute("aria-label", view.labels.field(field))?;
        cell(&row, &input)?;
    }
    cell(&row, &button("delete", "Delete", view.labels.delete())?)?;
    Ok(row)
}

fn table_row(view: &RowView) -> Result<Element, JsValue> {
    let row = element("tr")?;
    row.set_attribute("data-index", &view.index.to_string())?;
    cell(&row, &checkbox(view.checked)?)?;
    for field in Field::ALL {
        let text = element("td")?;
        text.set_attribute("data-field", field.key())?;
        text.set_text_content(Some(view.entry.field(field)));
        row.append_child(&text)?;
    }
    let actions = element("td")?;
    actions.append_child(&button("edit", "Edit", &format!("Edit row {}", view.index + 1))?)?;
    actions.append_child(&button("delete", "Delete", view.labels.delete())?)?;
    row.append_child(&actions)?;
    Ok(row)
}

fn check_item(view: &RowView) -> Result<Element, JsValue> {
    let item = element("label")?;
    item.set_class_name("term-item");
    item.set_attribute("data-index", &view.index.to_string())?;
    let input = checkbox(view.checked)?;
    input.set_class_name("term-checkbox");
    item.append_child(&input)?;
    for (field, class) in [(Field::Term, "term-name"), (Field::Translation, "term-trans")] {
        let span = element("span")?;
        span.set_class_name(class);
        span.set_attribute("data-field", field.key())?;
        span.set_text_content(Some(view.entry.field(field)));
        item.append_child(&span)?;
    }
    Ok(item)
}

impl RowSurface for DomRows {
    fn clear(&self) {
        self.container.set_inner_html("");
    }

    fn append_rows(&self, rows: &[RowView]) {
        for view in rows {
            let appended = self
                .build(view)
                .and_then(|row| self.container.append_child(&row).map(|_| ()));
            if let Err(err) = appended {
                console::error!("row render failed", view.index, err);
            }
        }
    }

    fn remove_row(&self, index: usize) {
        if let Some(row) = self.row(index) {
            row.remove();
        }
    }

    fn relabel_row(&self, index: usize, labels: &RowLabels) {
        let Some(row) = self.row(index) else {
            return;
        };
        let _ = row.set_attribute("data-index", &index.to_string());
        if self.layout == Layout::Editor {
            for field in EDITOR_FIELDS {
                if let Some(input) = self.field(index, field) {
                    let _ = input.set_attribute("aria-label", labels.field(field));
                }
            }
        }
        if let Ok(Some(delete)) = row.query_selector("[data-action=\"delete\"]") {
            let _ = delete.set_attribute("aria-label", labels.delete());
        }
        if let Ok(Some(edit)) = row.query_selector("[data-action=\"edit\"]") {
            let _ = edit.set_attribute("aria-label", &format!("Edit row {}", index + 1));
        }
    }

    fn set_field_value(&self, index: usize, field: Field, value: &str) {
        let Some(target) = self.field(index, field) else {
            return;
        };
        match target.dyn_into::<HtmlInputElement>() {
            Ok(input) => input.set_value(value),
            Err(other) => other.set_text_content(Some(value)),
        }
    }

    fn focus_field(&self, index: usize, field: Field) {
        let Some(target) = self
            .field(index, field)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Center);
        target.scroll_into_view_with_scroll_into_view_options(&options);
        let _ = target.focus();
    }

    fn set_checked(&self, index: usize, checked: bool) {
        let toggle = self
            .row(index)
            .and_then(|row| row.query_selector("[data-action=\"toggle\"]").ok().flatten())
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok());
        if let Some(toggle) = toggle {
            toggle.set_checked(checked);
        }
    }

    fn set_visible(&self, index: usize, visible: bool) {
        if let Some(row) = self
            .row(index)
            .and_then(|row| row.dyn_into::<HtmlElement>().ok())
        {
            row.set_hidden(!visible);
        }
    }
}
