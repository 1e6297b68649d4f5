//! Fake collaborators for driving the gateway, renderer and page controllers.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use lexicon_ui::gateway::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use lexicon_ui::models::{Entry, Field};
use lexicon_ui::notify::{NotificationKind, Notifier};
use lexicon_ui::pages::{Clipboard, Confirmer, Controls, PageContext};
use lexicon_ui::render::{RowLabels, RowSurface, RowView, Yielder};
use serde_json::Value;
use tokio::sync::Notify;

#[derive(Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
    Gated(Rc<Notify>, HttpResponse),
}

/// Route table transport recording every request it receives.
///
/// Routes match on method and path (query string ignored). Queued replies are
/// consumed in order; the last one repeats.
#[derive(Default)]
pub struct FakeTransport {
    routes: RefCell<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl FakeTransport {
    /// Empty route table; unknown routes answer 404.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .borrow_mut()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queue a JSON reply with `status`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &Value) -> &Self {
        self.push(method, path, Reply::Respond(json_response(status, body)));
        self
    }

    /// Queue a 200 JSON reply.
    pub fn ok(&self, method: Method, path: &str, body: &Value) -> &Self {
        self.respond(method, path, 200, body)
    }

    /// Queue a raw reply.
    pub fn respond_raw(&self, method: Method, path: &str, response: HttpResponse) -> &Self {
        self.push(method, path, Reply::Respond(response));
        self
    }

    /// Queue a transport-level failure.
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.push(method, path, Reply::Fail(message.to_string()));
        self
    }

    /// Queue a 200 reply held back until the returned gate is notified.
    pub fn gated(&self, method: Method, path: &str, body: &Value) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        self.push(
            method,
            path,
            Reply::Gated(Rc::clone(&gate), json_response(200, body)),
        );
        gate
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    /// Requests received for `method` and `path` (query string ignored).
    #[must_use]
    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|request| request.method == method && path_of(&request.url) == path)
            .count()
    }

    /// Most recent request, if any.
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }

    fn next_reply(&self, method: Method, path: &str) -> Option<Reply> {
        let mut routes = self.routes.borrow_mut();
        let queue = routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = request.method;
        let path = path_of(&request.url).to_string();
        self.requests.borrow_mut().push(request);
        match self.next_reply(method, &path) {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(TransportError::new(message)),
            Some(Reply::Gated(gate, response)) => {
                gate.notified().await;
                Ok(response)
            }
            None => Ok(json_response(
                404,
                &serde_json::json!({ "message": format!("no route for {} {path}", method.as_str()) }),
            )),
        }
    }
}

fn path_of(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

fn json_response(status: u16, body: &Value) -> HttpResponse {
    HttpResponse {
        status,
        status_text: String::new(),
        body: body.to_string().into_bytes(),
    }
}

/// One row as the fake surface currently shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRow {
    /// Index attribute last written to the row.
    pub index: usize,
    /// Displayed values.
    pub entry: Entry,
    /// Accessibility labels last written to the row.
    pub labels: RowLabels,
    /// Checkbox state.
    pub checked: bool,
    /// Whether the row is shown.
    pub visible: bool,
}

#[derive(Default)]
struct SurfaceState {
    rows: Vec<SurfaceRow>,
    appends: Vec<usize>,
    clears: usize,
    focus: Option<(usize, Field)>,
}

/// In-memory [`RowSurface`]; clones share the same rows.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl RecordingSurface {
    /// Empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in display order.
    #[must_use]
    pub fn rows(&self) -> Vec<SurfaceRow> {
        self.state.borrow().rows.clone()
    }

    /// Rendered row count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().rows.len()
    }

    /// Whether no rows are shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().rows.is_empty()
    }

    /// Index attributes in display order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.state.borrow().rows.iter().map(|row| row.index).collect()
    }

    /// Terms in display order.
    #[must_use]
    pub fn terms(&self) -> Vec<String> {
        self.state
            .borrow()
            .rows
            .iter()
            .map(|row| row.entry.term.clone())
            .collect()
    }

    /// Sizes of each `append_rows` batch.
    #[must_use]
    pub fn appends(&self) -> Vec<usize> {
        self.state.borrow().appends.clone()
    }

    /// Times the surface was cleared.
    #[must_use]
    pub fn clears(&self) -> usize {
        self.state.borrow().clears
    }

    /// Last focused field.
    #[must_use]
    pub fn focus(&self) -> Option<(usize, Field)> {
        self.state.borrow().focus
    }

    fn with_row(&self, index: usize, update: impl FnOnce(&mut SurfaceRow)) {
        if let Some(row) = self.state.borrow_mut().rows.get_mut(index) {
            update(row);
        }
    }
}

impl RowSurface for RecordingSurface {
    fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.rows.clear();
        state.clears += 1;
    }

    fn append_rows(&self, rows: &[RowView]) {
        let mut state = self.state.borrow_mut();
        state.appends.push(rows.len());
        state.rows.extend(rows.iter().map(|view| SurfaceRow {
            index: view.index,
            entry: view.entry.clone(),
            labels: view.labels.clone(),
            checked: view.checked,
            visible: true,
        }));
    }

    fn remove_row(&self, index: usize) {
        let mut state = self.state.borrow_mut();
        if index < state.rows.len() {
            state.rows.remove(index);
        }
    }

    fn relabel_row(&self, index: usize, labels: &RowLabels) {
        self.with_row(index, |row| {
            row.index = index;
            row.labels = labels.clone();
        });
    }

    fn set_field_value(&self, index: usize, field: Field, value: &str) {
        self.with_row(index, |row| row.entry.set_field(field, value.to_string()));
    }

    fn focus_field(&self, index: usize, field: Field) {
        self.state.borrow_mut().focus = Some((index, field));
    }

    fn set_checked(&self, index: usize, checked: bool) {
        self.with_row(index, |row| row.checked = checked);
    }

    fn set_visible(&self, index: usize, visible: bool) {
        self.with_row(index, |row| row.visible = visible);
    }
}

/// [`Yielder`] that counts pauses and hands control back to the tokio scheduler.
#[derive(Clone, Default)]
pub struct CountingYielder {
    count: Rc<Cell<usize>>,
}

impl CountingYielder {
    /// Yielder starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pauses so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.get()
    }
}

#[async_trait(?Send)]
impl Yielder for CountingYielder {
    async fn yield_now(&self) {
        self.count.set(self.count.get() + 1);
        tokio::task::yield_now().await;
    }
}

/// [`Notifier`] that keeps every message.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    /// Messages in the order raised.
    #[must_use]
    pub fn messages(&self) -> Vec<(NotificationKind, String)> {
        self.messages.borrow().clone()
    }

    /// Most recent message.
    #[must_use]
    pub fn last(&self) -> Option<(NotificationKind, String)> {
        self.messages.borrow().last().cloned()
    }

    /// Whether a message of `kind` containing `needle` was raised.
    #[must_use]
    pub fn saw(&self, kind: NotificationKind, needle: &str) -> bool {
        self.messages
            .borrow()
            .iter()
            .any(|(seen, text)| *seen == kind && text.contains(needle))
    }

    /// Messages of `kind`.
    #[must_use]
    pub fn count(&self, kind: NotificationKind) -> usize {
        self.messages
            .borrow()
            .iter()
            .filter(|(seen, _)| *seen == kind)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) -> u64 {
        let mut messages = self.messages.borrow_mut();
        messages.push((kind, message.to_string()));
        u64::try_from(messages.len()).unwrap_or(u64::MAX)
    }
}

/// [`Confirmer`] answering from a script, then with a fixed default.
pub struct ScriptedConfirmer {
    answers: RefCell<VecDeque<bool>>,
    fallback: bool,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedConfirmer {
    /// Always answers yes.
    #[must_use]
    pub fn accepting() -> Self {
        Self::scripted(&[], true)
    }

    /// Always answers no.
    #[must_use]
    pub fn declining() -> Self {
        Self::scripted(&[], false)
    }

    /// Answers `answers` in order, then `fallback`.
    #[must_use]
    pub fn scripted(answers: &[bool], fallback: bool) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            fallback,
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, message: &str) -> bool {
        self.prompts.borrow_mut().push(message.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(self.fallback)
    }
}

/// [`Controls`] recording every loading toggle.
#[derive(Default)]
pub struct RecordingControls {
    toggles: RefCell<Vec<bool>>,
}

impl RecordingControls {
    /// Loading flags in the order set.
    #[must_use]
    pub fn toggles(&self) -> Vec<bool> {
        self.toggles.borrow().clone()
    }

    /// Whether the controls are currently disabled.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.toggles.borrow().last().copied().unwrap_or(false)
    }
}

impl Controls for RecordingControls {
    fn set_loading(&self, loading: bool) {
        self.toggles.borrow_mut().push(loading);
    }
}

/// [`Clipboard`] keeping the last written text, or refusing every write.
#[derive(Default)]
pub struct RecordingClipboard {
    text: RefCell<Option<String>>,
    refusal: Option<String>,
}

impl RecordingClipboard {
    /// Clipboard refusing writes with `reason`.
    #[must_use]
    pub fn refusing(reason: &str) -> Self {
        Self {
            text: RefCell::new(None),
            refusal: Some(reason.to_string()),
        }
    }

    /// Last text written.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.text.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<(), String> {
        if let Some(reason) = &self.refusal {
            return Err(reason.clone());
        }
        *self.text.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

/// Recording collaborators bundled for one page controller.
pub struct PageHarness {
    /// Raised notifications.
    pub notifier: Rc<RecordingNotifier>,
    /// Confirmation script.
    pub confirmer: Rc<ScriptedConfirmer>,
    /// Loading toggles.
    pub controls: Rc<RecordingControls>,
}

impl PageHarness {
    /// Harness whose confirmer always accepts.
    #[must_use]
    pub fn new() -> Self {
        Self::with_confirmer(ScriptedConfirmer::accepting())
    }

    /// Harness with a custom confirmer.
    #[must_use]
    pub fn with_confirmer(confirmer: ScriptedConfirmer) -> Self {
        Self {
            notifier: Rc::new(RecordingNotifier::default()),
            confirmer: Rc::new(confirmer),
            controls: Rc::new(RecordingControls::default()),
        }
    }

    /// Page context backed by the recording collaborators.
    #[must_use]
    pub fn context(&self) -> PageContext {
        PageContext::new(
            Rc::clone(&self.notifier) as Rc<dyn Notifier>,
            Rc::clone(&self.confirmer) as Rc<dyn Confirmer>,
            Rc::clone(&self.controls) as Rc<dyn Controls>,
        )
    }
}

impl Default for PageHarness {
    fn default() -> Self {
        Self::new()
    }
}
