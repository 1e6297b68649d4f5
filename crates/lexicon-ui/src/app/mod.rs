//! Browser shell: binds the page controllers to the glossary screens.
//!
//! # Design
//! - One document may host several screens; each screen is mounted only when
//!   its anchor element exists and is otherwise skipped silently.
//! - Controllers own all behaviour. Bindings read values from the DOM, call
//!   into a controller and reflect the result back; nothing else.
//! - Async handlers run through [`run`], which drops superseded and cancelled
//!   outcomes since the controllers have already notified the user.

mod backup;
mod combine;
mod dialogs;
mod dom;
mod editor;
mod input;
mod manage;
mod preferences;
mod toast;
mod transport;

use std::future::Future;
use std::rc::Rc;

use gloo::console;
use gloo::events::EventListener;
use gloo::utils::document;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, Event, EventTarget, HtmlElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement,
};

use crate::config::UiConfig;
use crate::gateway::Gateway;
use crate::notify::Notifier;
use crate::pages::{Confirmer, DataRefresh, PageContext, PageError};
use crate::render::IncrementalRenderer;

use dialogs::{BrowserConfirmer, ButtonControls};
use dom::{DomRows, Layout};
use toast::ToastHost;
use transport::{FetchTransport, TimeoutYielder};

pub(crate) type Api = Gateway<FetchTransport>;
pub(crate) type Rows = IncrementalRenderer<DomRows, TimeoutYielder>;

/// Mount every screen present in the document.
pub fn run_app() {
    console_error_panic_hook::set_once();
    let config = preferences::load_config();
    let shell = Shell::new(config);
    combine::mount(&shell);
    manage::mount(&shell);
    editor::mount(&shell);
    input::mount(&shell);
    backup::mount(&shell);
}

/// Collaborators shared by every mounted screen.
pub(crate) struct Shell {
    pub(crate) config: UiConfig,
    pub(crate) gateway: Rc<Api>,
    notifier: Rc<ToastHost>,
    confirmer: Rc<BrowserConfirmer>,
    refresh: Rc<DataRefresh>,
}

impl Shell {
    fn new(config: UiConfig) -> Self {
        let gateway = Rc::new(Gateway::new(FetchTransport, &config.api_base));
        let notifier = Rc::new(ToastHost::new(
            config.notification_ttl_ms,
            config.max_notifications,
        ));
        Self {
            config,
            gateway,
            notifier,
            confirmer: Rc::new(BrowserConfirmer),
            refresh: Rc::new(DataRefresh::new()),
        }
    }

    /// Page context whose loading state disables the controls in `ids`.
    pub(crate) fn context(&self, ids: &'static [&'static str]) -> PageContext {
        let notifier: Rc<dyn Notifier> = self.notifier.clone();
        let confirmer: Rc<dyn Confirmer> = self.confirmer.clone();
        PageContext::new(notifier, confirmer, Rc::new(ButtonControls::new(ids)))
    }

    pub(crate) fn renderer(&self, container: Element, layout: Layout) -> Rows {
        IncrementalRenderer::new(
            DomRows::new(container, layout),
            TimeoutYielder,
            self.config.chunk_size,
            self.config.field_limits,
        )
    }

    pub(crate) fn notifier(&self) -> Rc<dyn Notifier> {
        self.notifier.clone()
    }

    /// Re-run `listener` whenever another screen replaced shared data.
    pub(crate) fn on_refresh(&self, listener: impl Fn() + 'static) {
        self.refresh.subscribe(listener);
    }

    pub(crate) fn refresh(&self) -> Rc<DataRefresh> {
        Rc::clone(&self.refresh)
    }
}

/// Element with `id`, cast to `T`.
pub(crate) fn by_id<T: JsCast>(id: &str) -> Option<T> {
    document()
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok())
}

/// Attach a listener for the lifetime of the page.
pub(crate) fn listen<F>(target: &EventTarget, event: &'static str, handler: F)
where
    F: FnMut(&Event) + 'static,
{
    EventListener::new(target, event, handler).forget();
}

/// Run a controller action in the background.
pub(crate) fn run<F, T>(action: &'static str, future: F)
where
    F: Future<Output = Result<T, PageError>> + 'static,
{
    spawn_local(async move {
        match future.await {
            Ok(_) | Err(PageError::Superseded | PageError::ConfirmationAborted) => {}
            Err(err) => console::debug!(action, err.to_string()),
        }
    });
}

/// Row index and target element of an event raised inside a rendered row.
pub(crate) fn row_event(event: &Event) -> Option<(usize, Element)> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let row = target.closest("[data-index]").ok()??;
    let index = row.get_attribute("data-index")?.parse().ok()?;
    Some((index, target))
}

/// Replace the options of `select`, keeping `selected` when still present.
pub(crate) fn fill_select(
    select: &HtmlSelectElement,
    placeholder: Option<&str>,
    names: &[String],
    selected: Option<&str>,
) {
    select.set_inner_html("");
    let options = placeholder
        .map(|label| ("", label))
        .into_iter()
        .chain(names.iter().map(|name| (name.as_str(), name.as_str())));
    for (value, label) in options {
        let Ok(option) = document().create_element("option") else {
            continue;
        };
        let _ = option.set_attribute("value", value);
        option.set_text_content(Some(label));
        let _ = select.append_child(&option);
    }
    if let Some(selected) = selected.filter(|name| names.iter().any(|known| known == name)) {
        select.set_value(selected);
    }
}

pub(crate) fn set_text(id: &str, text: &str) {
    if let Some(element) = by_id::<Element>(id) {
        element.set_text_content(Some(text));
    }
}

pub(crate) fn input_value(id: &str) -> String {
    by_id::<HtmlInputElement>(id)
        .map(|input| input.value())
        .or_else(|| by_id::<HtmlSelectElement>(id).map(|select| select.value()))
        .or_else(|| by_id::<HtmlTextAreaElement>(id).map(|area| area.value()))
        .unwrap_or_default()
}

pub(crate) fn is_checked(id: &str) -> bool {
    by_id::<HtmlInputElement>(id).is_some_and(|input| input.checked())
}

pub(crate) fn set_hidden(id: &str, hidden: bool) {
    if let Some(element) = by_id::<HtmlElement>(id) {
        element.set_hidden(hidden);
    }
}
