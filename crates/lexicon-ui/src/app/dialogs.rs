//! Confirmation dialogs, control toggling and clipboard access.

use async_trait::async_trait;
use gloo::utils::{document, window};
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement};

use super::{by_id, set_hidden};
use crate::pages::{Clipboard, Confirmer, Controls};

const LOADING_ID: &str = "loading";

/// `window.confirm`.
pub(crate) struct BrowserConfirmer;

#[async_trait(?Send)]
impl Confirmer for BrowserConfirmer {
    async fn confirm(&self, message: &str) -> bool {
        gloo::dialogs::confirm(message)
    }
}

/// Disables a fixed set of controls and shows `#loading` while busy.
pub(crate) struct ButtonControls {
    ids: &'static [&'static str],
}

impl ButtonControls {
    pub(crate) const fn new(ids: &'static [&'static str]) -> Self {
        Self { ids }
    }
}

impl Controls for ButtonControls {
    fn set_loading(&self, loading: bool) {
        for id in self.ids {
            if let Some(control) = by_id::<web_sys::Element>(id) {
                let _ = control.toggle_attribute_with_force("disabled", loading);
            }
        }
        set_hidden(LOADING_ID, !loading);
    }
}

/// Async Clipboard API with an `execCommand("copy")` fallback.
pub(crate) struct BrowserClipboard;

#[async_trait(?Send)]
impl Clipboard for BrowserClipboard {
    async fn write_text(&self, text: &str) -> Result<(), String> {
        match clipboard_promise(text) {
            Some(promise) => JsFuture::from(promise)
                .await
                .map(|_| ())
                .or_else(|_| copy_with_selection(text)),
            None => copy_with_selection(text),
        }
    }
}

fn clipboard_promise(text: &str) -> Option<Promise> {
    let clipboard = Reflect::get(&window().navigator(), &JsValue::from_str("clipboard")).ok()?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return None;
    }
    let write = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    write
        .call1(&clipboard, &JsValue::from_str(text))
        .ok()?
        .dyn_into::<Promise>()
        .ok()
}

fn copy_with_selection(text: &str) -> Result<(), String> {
    let failed = |err: JsValue| format!("{err:?}");
    let area = document()
        .create_element("textarea")
        .map_err(failed)?
        .dyn_into::<HtmlTextAreaElement>()
        .map_err(|_| "textarea unavailable".to_string())?;
    area.set_value(text);
    area.set_attribute("readonly", "").map_err(failed)?;
    let body = document().body().ok_or("document has no body")?;
    body.append_child(&area).map_err(failed)?;
    area.select();
    let copied = document()
        .dyn_into::<HtmlDocument>()
        .map_err(|_| "not an HTML document".to_string())
        .and_then(|html| html.exec_command("copy").map_err(failed));
    area.remove();
    match copied {
        Ok(true) => Ok(()),
        Ok(false) => Err("copy command was rejected".to_string()),
        Err(reason) => Err(reason),
    }
}
