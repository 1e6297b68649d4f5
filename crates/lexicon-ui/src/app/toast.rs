//! Toast container fed by the notification centre.

use std::rc::Rc;

use gloo::console;
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use gloo::utils::document;
use wasm_bindgen::JsValue;
use web_sys::Element;

use crate::notify::{Clock, Notification, NotificationCenter, NotificationKind, Notifier};

pub(crate) const CONTAINER_ID: &str = "message";

/// Wall clock from `Date.now()`.
pub(crate) struct BrowserClock;

impl Clock for BrowserClock {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}

/// Renders the active notifications into the `#message` container.
pub(crate) struct ToastHost {
    center: Rc<NotificationCenter<BrowserClock>>,
    container: Option<Element>,
}

impl ToastHost {
    pub(crate) fn new(ttl_ms: u64, capacity: usize) -> Self {
        let container = document().get_element_by_id(CONTAINER_ID);
        if container.is_none() {
            console::warn!("notification container missing", CONTAINER_ID);
        }
        Self {
            center: Rc::new(NotificationCenter::new(BrowserClock, ttl_ms, capacity)),
            container,
        }
    }
}

impl Notifier for ToastHost {
    fn notify(&self, kind: NotificationKind, message: &str) -> u64 {
        let id = self.center.push(kind, message);
        if kind == NotificationKind::Error {
            console::error!(message.to_string());
        }
        let Some(container) = self.container.clone() else {
            return id;
        };
        repaint(&container, &self.center);
        let center = Rc::clone(&self.center);
        let delay = u32::try_from(self.center.ttl_ms()).unwrap_or(u32::MAX);
        Timeout::new(delay, move || {
            if !center.sweep().is_empty() {
                repaint(&container, &center);
            }
        })
        .forget();
        id
    }
}

fn repaint(container: &Element, center: &Rc<NotificationCenter<BrowserClock>>) {
    container.set_inner_html("");
    for notification in center.active() {
        if let Err(err) = append_toast(container, center, &notification) {
            console::error!("toast render failed", err);
        }
    }
}

fn append_toast(
    container: &Element,
    center: &Rc<NotificationCenter<BrowserClock>>,
    notification: &Notification,
) -> Result<(), JsValue> {
    let toast = document().create_element("div")?;
    toast.set_class_name(&format!("notification {}", notification.kind.as_str()));
    toast.set_attribute("role", "status")?;
    toast.set_text_content(Some(&notification.message));
    container.append_child(&toast)?;

    let id = notification.id;
    let center = Rc::clone(center);
    let host = container.clone();
    EventListener::once(&toast, "click", move |_| {
        if center.dismiss(id) {
            repaint(&host, &center);
        }
    })
    .forget();
    Ok(())
}
