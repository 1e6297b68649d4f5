use std::cell::Cell;
use std::rc::Rc;

use lexicon_api_models::{BackupFormat, PromptId, RestoreMode};
use lexicon_test_support::fixtures;
use lexicon_test_support::mocks::{
    CountingYielder, FakeTransport, PageHarness, RecordingClipboard, RecordingSurface,
    ScriptedConfirmer,
};
use lexicon_ui::config::{CombineSource, FieldLimits, UiConfig};
use lexicon_ui::gateway::{Body, Gateway, Method, RequestError};
use lexicon_ui::models::{Entry, Field};
use lexicon_ui::notify::NotificationKind;
use lexicon_ui::pages::{
    BackupPage, CombinePage, DataRefresh, EditorPage, EntryForm, InputPage, ManagePage, PageError,
    PagePhase,
};
use lexicon_ui::render::{EditOutcome, IncrementalRenderer};
use lexicon_ui::selection::HeaderState;
use lexicon_ui::validate::ValidationError;
use serde_json::json;

type TestRenderer = IncrementalRenderer<RecordingSurface, CountingYielder>;

fn gateway() -> Rc<Gateway<FakeTransport>> {
    Rc::new(Gateway::new(FakeTransport::new(), ""))
}

fn renderer(surface: &RecordingSurface) -> TestRenderer {
    IncrementalRenderer::new(
        surface.clone(),
        CountingYielder::new(),
        100,
        FieldLimits::default(),
    )
}

fn manage_page(
    harness: &PageHarness,
    gateway: &Rc<Gateway<FakeTransport>>,
    surface: &RecordingSurface,
) -> ManagePage<FakeTransport, RecordingSurface, CountingYielder> {
    ManagePage::new(
        harness.context(),
        Rc::clone(gateway),
        renderer(surface),
        &UiConfig::default(),
    )
}

fn editor_page(
    harness: &PageHarness,
    gateway: &Rc<Gateway<FakeTransport>>,
    surface: &RecordingSurface,
) -> EditorPage<FakeTransport, RecordingSurface, CountingYielder> {
    EditorPage::new(harness.context(), Rc::clone(gateway), renderer(surface))
}

// Manage ---------------------------------------------------------------------

#[tokio::test]
async fn manage_loads_a_sorted_page_window() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway.transport().ok(
        Method::Get,
        "/api/v1/prompts",
        &fixtures::prompt_page(fixtures::prompts("Animals", 1, 3), 1, 2, 103),
    );
    let page = manage_page(&harness, &gateway, &surface);

    let report = page.set_category(Some("Animals")).await?;

    assert_eq!(report.rows, 3);
    assert_eq!(surface.terms(), vec!["term-1", "term-2", "term-3"]);
    let window = page.window();
    assert_eq!((window.page, window.total_pages, window.total), (1, 2, 103));
    assert!(window.has_next());
    assert!(!window.has_prev());
    assert_eq!(
        gateway.transport().last_request().map(|request| request.url),
        Some("/api/v1/prompts?category=Animals&page=1&limit=100&sort=name_asc".to_string())
    );
    assert_eq!(page.phase(), PagePhase::Succeeded);
    assert_eq!(harness.controls.toggles(), vec![true, false]);
    Ok(())
}

#[tokio::test]
async fn manage_header_state_follows_visible_rows() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway.transport().ok(
        Method::Get,
        "/api/v1/prompts",
        &fixtures::prompt_page(fixtures::prompts("Animals", 1, 3), 1, 1, 3),
    );
    let page = manage_page(&harness, &gateway, &surface);
    page.load_page(1).await?;

    assert_eq!(page.header_state(), HeaderState::Unchecked);
    assert!(!page.bulk_enabled());
    assert_eq!(page.toggle_row(1, true)?, HeaderState::Indeterminate);
    assert!(page.bulk_enabled());
    assert_eq!(page.toggle_all(true), HeaderState::Checked);
    assert_eq!(page.selected_count(), 3);
    assert!(surface.rows().iter().all(|row| row.checked));
    assert_eq!(page.toggle_all(false), HeaderState::Unchecked);
    assert_eq!(page.selected_count(), 0);
    Ok(())
}

#[tokio::test]
async fn manage_selection_survives_a_reload() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway.transport().ok(
        Method::Get,
        "/api/v1/prompts",
        &fixtures::prompt_page(fixtures::prompts("Animals", 1, 3), 1, 1, 3),
    );
    let page = manage_page(&harness, &gateway, &surface);
    page.load_page(1).await?;
    page.toggle_row(2, true)?;

    page.reload().await?;

    let checked: Vec<bool> = surface.rows().iter().map(|row| row.checked).collect();
    assert_eq!(checked, vec![false, false, true]);
    Ok(())
}

#[tokio::test]
async fn failed_batch_delete_keeps_rows_and_notifies() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(
            Method::Get,
            "/api/v1/prompts",
            &fixtures::prompt_page(fixtures::prompts("Animals", 1, 3), 1, 1, 3),
        )
        .respond(
            Method::Delete,
            "/api/v1/prompts/batch",
            500,
            &json!({ "message": "database is locked" }),
        );
    let page = manage_page(&harness, &gateway, &surface);
    page.load_page(1).await?;
    page.toggle_row(0, true)?;
    page.toggle_row(2, true)?;

    let result = page.delete_selected().await;

    assert_eq!(
        result,
        Err(PageError::Request(RequestError::new(
            "database is locked",
            Some(500)
        )))
    );
    assert_eq!(surface.len(), 3);
    assert_eq!(page.selected_count(), 2);
    assert!(harness.notifier.saw(
        NotificationKind::Error,
        "Batch delete failed: database is locked"
    ));
    assert_eq!(gateway.transport().calls(Method::Get, "/api/v1/prompts"), 1);
    assert_eq!(page.phase(), PagePhase::Failed);
    assert!(!harness.controls.is_loading());
    Ok(())
}

#[tokio::test]
async fn batch_delete_removes_selection_and_reloads() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(
            Method::Get,
            "/api/v1/prompts",
            &fixtures::prompt_page(fixtures::prompts("Animals", 1, 3), 1, 1, 3),
        )
        .ok(
            Method::Get,
            "/api/v1/prompts",
            &fixtures::prompt_page(fixtures::prompts("Animals", 2, 1), 1, 1, 1),
        )
        .ok(
            Method::Delete,
            "/api/v1/prompts/batch",
            &fixtures::v1(json!({ "deleted_count": 2 })),
        );
    let page = manage_page(&harness, &gateway, &surface);
    page.load_page(1).await?;
    page.toggle_row(0, true)?;
    page.toggle_row(2, true)?;

    let deleted = page.delete_selected().await?;

    assert_eq!(deleted, 2);
    assert_eq!(page.selected_count(), 0);
    assert_eq!(surface.terms(), vec!["term-2"]);
    assert!(harness
        .notifier
        .saw(NotificationKind::Success, "Deleted 2 entries"));
    assert_eq!(
        harness.confirmer.prompts(),
        vec!["Delete 2 selected entries? This cannot be undone.".to_string()]
    );
    let delete = gateway
        .transport()
        .requests()
        .into_iter()
        .find(|request| request.method == Method::Delete)
        .map(|request| request.body);
    assert_eq!(delete, Some(Body::Json(json!({ "ids": [1, 3] }))));
    Ok(())
}

#[tokio::test]
async fn batch_delete_without_selection_warns() {
    let harness = PageHarness::new();
    let gateway = gateway();
    let page = manage_page(&harness, &gateway, &RecordingSurface::new());

    assert_eq!(page.delete_selected().await, Err(PageError::EmptySelection));
    assert!(harness
        .notifier
        .saw(NotificationKind::Warning, "Select entries to delete first"));
    assert!(gateway.transport().requests().is_empty());
}

#[tokio::test]
async fn declined_delete_sends_nothing() -> anyhow::Result<()> {
    let harness = PageHarness::with_confirmer(ScriptedConfirmer::declining());
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway.transport().ok(
        Method::Get,
        "/api/v1/prompts",
        &fixtures::prompt_page(fixtures::prompts("Animals", 1, 2), 1, 1, 2),
    );
    let page = manage_page(&harness, &gateway, &surface);
    page.load_page(1).await?;

    assert_eq!(page.delete_one(0).await, Err(PageError::ConfirmationAborted));
    assert_eq!(gateway.transport().calls(Method::Delete, "/api/v1/prompts/1"), 0);
    assert_eq!(surface.len(), 2);
    Ok(())
}

#[tokio::test]
async fn deleting_the_only_row_on_the_last_page_steps_back() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(
            Method::Get,
            "/api/v1/prompts",
            &fixtures::prompt_page(fixtures::prompts("Animals", 101, 1), 2, 2, 101),
        )
        .ok(
            Method::Get,
            "/api/v1/prompts",
            &fixtures::prompt_page(Vec::new(), 2, 1, 100),
        )
        .ok(
            Method::Get,
            "/api/v1/prompts",
            &fixtures::prompt_page(fixtures::prompts("Animals", 1, 100), 1, 1, 100),
        )
        .ok(Method::Delete, "/api/v1/prompts/101", &fixtures::v1(json!({})));
    let page = manage_page(&harness, &gateway, &surface);
    page.load_page(2).await?;

    page.delete_one(0).await?;

    let pages: Vec<String> = gateway
        .transport()
        .requests()
        .into_iter()
        .filter(|request| request.method == Method::Get)
        .map(|request| request.url)
        .collect();
    assert_eq!(
        pages,
        vec![
            "/api/v1/prompts?page=2&limit=100&sort=name_asc".to_string(),
            "/api/v1/prompts?page=2&limit=100&sort=name_asc".to_string(),
            "/api/v1/prompts?page=1&limit=100&sort=name_asc".to_string(),
        ]
    );
    let window = page.window();
    assert_eq!((window.page, window.total_pages), (1, 1));
    assert_eq!(surface.len(), 100);
    assert_eq!(page.phase(), PagePhase::Succeeded);
    Ok(())
}

#[tokio::test]
async fn newer_page_load_supersedes_older() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    let gate = gateway.transport().gated(
        Method::Get,
        "/api/v1/prompts",
        &fixtures::prompt_page(fixtures::prompts("Animals", 1, 2), 1, 2, 4),
    );
    gateway.transport().ok(
        Method::Get,
        "/api/v1/prompts",
        &fixtures::prompt_page(fixtures::prompts("Animals", 3, 2), 2, 2, 4),
    );
    let page = manage_page(&harness, &gateway, &surface);

    let (first, second) = tokio::join!(page.load_page(1), async {
        tokio::task::yield_now().await;
        let second = page.load_page(2).await;
        gate.notify_one();
        second
    });

    assert_eq!(first, Err(PageError::Superseded));
    assert!(second.is_ok());
    assert_eq!(surface.terms(), vec!["term-3", "term-4"]);
    assert_eq!(page.window().page, 2);
    assert_eq!(page.phase(), PagePhase::Succeeded);
    Ok(())
}

#[tokio::test]
async fn exclusive_actions_are_refused_while_busy() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway.transport().ok(
        Method::Get,
        "/api/v1/prompts",
        &fixtures::prompt_page(fixtures::prompts("Animals", 1, 2), 1, 1, 2),
    );
    let gate = gateway.transport().gated(
        Method::Delete,
        "/api/v1/prompts/batch",
        &fixtures::v1(json!({ "deleted_count": 1 })),
    );
    let page = manage_page(&harness, &gateway, &surface);
    page.load_page(1).await?;
    page.toggle_row(0, true)?;

    let (deleted, refused) = tokio::join!(page.delete_selected(), async {
        tokio::task::yield_now().await;
        let refused = page.edit_draft(1).await;
        gate.notify_one();
        refused
    });

    assert_eq!(deleted, Ok(1));
    assert_eq!(refused, Err(PageError::Busy));
    assert_eq!(gateway.transport().calls(Method::Get, "/api/v1/prompts/2"), 0);
    Ok(())
}

#[tokio::test]
async fn save_edit_validates_before_sending() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let page = manage_page(&harness, &gateway, &RecordingSurface::new());
    let draft = Entry::new("Animals", "", "chat", "");

    let result = page.save_edit(PromptId(1), &draft).await;

    assert_eq!(
        result,
        Err(PageError::Validation(ValidationError::Required {
            field: Field::Term
        }))
    );
    assert!(harness.notifier.saw(NotificationKind::Warning, "Term is required"));
    assert!(gateway.transport().requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn save_edit_puts_trimmed_values_and_reloads() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(
            Method::Get,
            "/api/v1/prompts",
            &fixtures::prompt_page(fixtures::prompts("Animals", 1, 1), 1, 1, 1),
        )
        .ok(
            Method::Put,
            "/api/v1/prompts/1",
            &fixtures::v1(fixtures::prompt(1, "Animals", "cat", "chat")),
        );
    let page = manage_page(&harness, &gateway, &surface);
    page.load_page(1).await?;

    let saved = page
        .save_edit(PromptId(1), &Entry::new(" Animals ", " cat ", "chat", ""))
        .await?;

    assert_eq!(saved.term, "cat");
    let put = gateway
        .transport()
        .requests()
        .into_iter()
        .find(|request| request.method == Method::Put)
        .map(|request| request.body);
    assert_eq!(
        put,
        Some(Body::Json(json!({
            "category": "Animals",
            "name": "cat",
            "translation": "chat",
            "comment": "",
        })))
    );
    assert_eq!(gateway.transport().calls(Method::Get, "/api/v1/prompts"), 2);
    Ok(())
}

// Editor ---------------------------------------------------------------------

#[tokio::test]
async fn deleting_the_last_row_leaves_one_blank_row() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(Method::Get, "/api/data", &fixtures::flat_rows("Animals", 1));
    let page = editor_page(&harness, &gateway, &surface);
    page.load_category("Animals").await?;

    let removed = page.delete_row(0).await?;

    assert_eq!(removed.term, "term-1");
    assert_eq!(page.renderer().len(), 1);
    let rows = surface.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entry, Entry::blank("Animals"));
    assert_eq!(rows[0].index, 0);
    assert!(harness.notifier.saw(NotificationKind::Success, "Row deleted"));
    Ok(())
}

#[tokio::test]
async fn sorting_a_lone_blank_row_warns_without_requests() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(Method::Get, "/api/data", &json!([]));
    let page = editor_page(&harness, &gateway, &surface);
    page.load_category("Colors").await?;

    assert_eq!(page.sort_and_save().await, Err(PageError::NothingToSort));

    assert!(harness.notifier.saw(NotificationKind::Warning, "Nothing to sort"));
    assert!(harness.confirmer.prompts().is_empty());
    assert_eq!(gateway.transport().calls(Method::Post, "/api/data"), 0);
    assert_eq!(gateway.transport().calls(Method::Post, "/api/sort"), 0);
    Ok(())
}

#[tokio::test]
async fn empty_category_result_gets_a_blank_row() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(Method::Get, "/api/data", &json!([]));
    let page = editor_page(&harness, &gateway, &surface);

    page.load_category("Colors").await?;

    assert_eq!(surface.rows().len(), 1);
    assert_eq!(surface.rows()[0].entry.category, "Colors");
    assert_eq!(surface.focus(), Some((0, Field::Term)));
    Ok(())
}

#[tokio::test]
async fn blank_category_clears_the_table() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(Method::Get, "/api/data", &fixtures::flat_rows("Animals", 2));
    let page = editor_page(&harness, &gateway, &surface);
    page.load_category("Animals").await?;

    page.load_category("  ").await?;

    assert!(surface.is_empty());
    assert_eq!(page.active_category(), None);
    assert_eq!(harness.notifier.count(NotificationKind::Info), 1);
    assert_eq!(
        page.add_row(),
        Err(PageError::Validation(ValidationError::Required {
            field: Field::Category
        }))
    );
    Ok(())
}

#[tokio::test]
async fn editor_rejects_over_long_cells() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(Method::Get, "/api/data", &fixtures::flat_rows("Animals", 1));
    let page = editor_page(&harness, &gateway, &surface);
    page.load_category("Animals").await?;

    let outcome = page.edit_cell(0, Field::Note, &"x".repeat(201));

    assert!(matches!(outcome, EditOutcome::Rejected(_)));
    assert_eq!(surface.rows()[0].entry.note, "");
    assert!(harness
        .notifier
        .saw(NotificationKind::Error, "Note cannot exceed 200 characters"));
    Ok(())
}

#[tokio::test]
async fn editor_save_writes_rows_and_refetches() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(Method::Get, "/api/data", &fixtures::flat_rows("Animals", 1))
        .ok(Method::Post, "/api/data", &fixtures::legacy_ok())
        .ok(Method::Get, "/api/categories", &json!(["Animals", "Colors"]));
    let page = editor_page(&harness, &gateway, &surface);
    page.load_category("Animals").await?;
    let index = page.add_row()?;
    page.edit_cell(index, Field::Category, "Colors");
    page.edit_cell(index, Field::Term, "red");
    page.edit_cell(index, Field::Translation, "rouge");

    let written = page.save().await?;

    assert_eq!(written, 2);
    let post = gateway
        .transport()
        .requests()
        .into_iter()
        .find(|request| request.method == Method::Post)
        .map(|request| request.body);
    assert_eq!(
        post,
        Some(Body::Json(json!({
            "editorData": {
                "Animals": [{ "term": "term-1", "trans": "trans-1", "note": "" }],
                "Colors": [{ "term": "red", "trans": "rouge", "note": "" }],
            },
            "loadedCategory": "Animals",
        })))
    );
    assert_eq!(gateway.transport().calls(Method::Get, "/api/data"), 2);
    assert_eq!(page.categories(), vec!["Animals", "Colors"]);
    assert!(harness.notifier.saw(NotificationKind::Success, "Saved 2 rows"));
    Ok(())
}

// Combine --------------------------------------------------------------------

fn combine_page(
    harness: &PageHarness,
    gateway: &Rc<Gateway<FakeTransport>>,
    surface: &RecordingSurface,
    config: &UiConfig,
) -> CombinePage<FakeTransport, RecordingSurface, CountingYielder> {
    CombinePage::new(
        harness.context(),
        Rc::clone(gateway),
        renderer(surface),
        config,
    )
}

#[tokio::test]
async fn combine_joins_selected_translations_across_categories() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway
        .transport()
        .ok(
            Method::Get,
            "/api/v1/prompts",
            &fixtures::prompt_page(fixtures::prompts("Animals", 1, 2), 1, 1, 2),
        )
        .ok(
            Method::Get,
            "/api/v1/prompts",
            &fixtures::prompt_page(fixtures::prompts("Colors", 10, 2), 1, 1, 2),
        )
        .ok(
            Method::Get,
            "/api/v1/prompts",
            &fixtures::prompt_page(fixtures::prompts("Animals", 1, 2), 1, 1, 2),
        );
    let page = combine_page(&harness, &gateway, &surface, &UiConfig::default());

    page.select_category("Animals").await?;
    page.toggle(1, true)?;
    page.select_category("Colors").await?;
    page.toggle(0, true)?;
    page.select_category("Animals").await?;

    assert_eq!(page.preview(), "trans-2, trans-10");
    page.set_prefix_enabled(true);
    assert_eq!(page.preview(), "Nai trans-2, trans-10");
    let checked: Vec<bool> = surface.rows().iter().map(|row| row.checked).collect();
    assert_eq!(checked, vec![false, true]);
    assert!(harness.notifier.saw(NotificationKind::Success, "Added: trans-2"));
    assert!(gateway
        .transport()
        .last_request()
        .is_some_and(|request| request.url.contains("limit=1000")));
    Ok(())
}

#[tokio::test]
async fn combine_legacy_source_keys_by_translation() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway.transport().ok(
        Method::Get,
        "/api/terms/Animals",
        &fixtures::term_records(&[("cat", "chat"), ("dog", "chien")]),
    );
    let config = UiConfig {
        combine_source: CombineSource::Legacy,
        ..UiConfig::default()
    };
    let page = combine_page(&harness, &gateway, &surface, &config);

    page.select_category("Animals").await?;
    page.toggle(0, true)?;
    page.toggle(1, true)?;
    page.toggle(0, false)?;

    assert_eq!(page.preview(), "chien");
    assert!(harness.notifier.saw(NotificationKind::Success, "Removed: chat"));
    Ok(())
}

#[tokio::test]
async fn copying_an_empty_selection_warns() {
    let harness = PageHarness::new();
    let gateway = gateway();
    let page = combine_page(&harness, &gateway, &RecordingSurface::new(), &UiConfig::default());
    let clipboard = RecordingClipboard::default();

    assert_eq!(page.copy_text(&clipboard).await, Err(PageError::EmptySelection));
    assert_eq!(clipboard.text(), None);
    assert!(harness
        .notifier
        .saw(NotificationKind::Warning, "Select at least one term"));
}

#[tokio::test]
async fn copy_and_clear_selection() -> anyhow::Result<()> {
    let harness = PageHarness::with_confirmer(ScriptedConfirmer::scripted(&[false], true));
    let gateway = gateway();
    let surface = RecordingSurface::new();
    gateway.transport().ok(
        Method::Get,
        "/api/v1/prompts",
        &fixtures::prompt_page(fixtures::prompts("Animals", 1, 2), 1, 1, 2),
    );
    let page = combine_page(&harness, &gateway, &surface, &UiConfig::default());
    page.select_category("Animals").await?;
    page.toggle(0, true)?;
    page.toggle(1, true)?;

    let clipboard = RecordingClipboard::default();
    assert_eq!(page.copy_text(&clipboard).await?, "trans-1, trans-2");
    assert_eq!(clipboard.text(), Some("trans-1, trans-2".to_string()));

    assert_eq!(page.clear_selection().await, Err(PageError::ConfirmationAborted));
    assert_eq!(page.selected_count(), 2);
    page.clear_selection().await?;
    assert_eq!(page.selected_count(), 0);
    assert!(surface.rows().iter().all(|row| !row.checked));
    assert_eq!(page.search("trans-2"), 1);
    assert!(harness
        .notifier
        .saw(NotificationKind::Info, "1 term matching \"trans-2\""));
    Ok(())
}

#[tokio::test]
async fn refused_clipboard_is_reported() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    gateway.transport().ok(
        Method::Get,
        "/api/v1/prompts",
        &fixtures::prompt_page(fixtures::prompts("Animals", 1, 1), 1, 1, 1),
    );
    let page = combine_page(&harness, &gateway, &RecordingSurface::new(), &UiConfig::default());
    page.select_category("Animals").await?;
    page.toggle(0, true)?;

    let result = page
        .copy_text(&RecordingClipboard::refusing("permission denied"))
        .await;

    assert_eq!(result, Err(PageError::Clipboard("permission denied".to_string())));
    assert!(harness
        .notifier
        .saw(NotificationKind::Error, "Copy failed: permission denied"));
    Ok(())
}

// Input ----------------------------------------------------------------------

#[tokio::test]
async fn input_creates_entries_in_a_new_category() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    gateway
        .transport()
        .ok(
            Method::Post,
            "/api/v1/prompts",
            &fixtures::v1(fixtures::prompt(5, "Birds", "owl", "hibou")),
        )
        .ok(
            Method::Get,
            "/api/v1/categories",
            &fixtures::categories(&["Animals", "Birds"]),
        );
    let page = InputPage::new(harness.context(), Rc::clone(&gateway), FieldLimits::default());
    let form = EntryForm {
        category: "Animals".to_string(),
        new_category: Some(" Birds ".to_string()),
        term: "owl".to_string(),
        translation: "hibou".to_string(),
        note: String::new(),
    };

    let created = page.submit(&form).await?;

    assert_eq!(created.id, Some(PromptId(5)));
    assert_eq!(page.categories(), vec!["Animals", "Birds"]);
    let body = gateway
        .transport()
        .requests()
        .into_iter()
        .find(|request| request.method == Method::Post)
        .map(|request| request.body);
    assert_eq!(
        body,
        Some(Body::Json(json!({
            "category": "Birds",
            "name": "owl",
            "translation": "hibou",
            "comment": "",
        })))
    );
    Ok(())
}

#[tokio::test]
async fn input_rejects_forbidden_category_characters() {
    let harness = PageHarness::new();
    let gateway = gateway();
    let page = InputPage::new(harness.context(), Rc::clone(&gateway), FieldLimits::default());
    let form = EntryForm {
        category: "a/b".to_string(),
        term: "owl".to_string(),
        translation: "hibou".to_string(),
        ..EntryForm::default()
    };

    let result = page.submit_legacy(&form).await;

    assert_eq!(
        result,
        Err(PageError::Validation(ValidationError::ForbiddenCharacter {
            found: '/'
        }))
    );
    assert!(gateway.transport().requests().is_empty());
}

// Backup ---------------------------------------------------------------------

#[tokio::test]
async fn replace_restore_requires_confirmation() {
    let harness = PageHarness::with_confirmer(ScriptedConfirmer::declining());
    let gateway = gateway();
    let page = BackupPage::new(harness.context(), Rc::clone(&gateway));

    let result = page
        .restore(BackupFormat::Db, RestoreMode::Replace, "glossary.sqlite", vec![1, 2])
        .await;

    assert_eq!(result, Err(PageError::ConfirmationAborted));
    assert!(gateway.transport().requests().is_empty());
}

#[tokio::test]
async fn restore_rejects_mismatched_files() {
    let harness = PageHarness::new();
    let gateway = gateway();
    let page = BackupPage::new(harness.context(), Rc::clone(&gateway));

    let result = page
        .restore(BackupFormat::Csv, RestoreMode::Increment, "glossary.db", vec![])
        .await;

    assert!(matches!(
        result,
        Err(PageError::Validation(ValidationError::FileType { .. }))
    ));
    assert!(harness.notifier.saw(NotificationKind::Warning, ".csv"));
}

#[tokio::test]
async fn increment_restore_reports_counts() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    gateway.transport().ok(
        Method::Post,
        "/api/v1/backup/restore/csv/increment",
        &fixtures::v1(json!({ "imported_count": 4, "updated_count": 1, "skipped_count": 0 })),
    );
    let page = BackupPage::new(harness.context(), Rc::clone(&gateway));

    let summary = page
        .restore(BackupFormat::Csv, RestoreMode::Increment, "Glossary.CSV", b"x".to_vec())
        .await?;

    assert_eq!(summary.imported_count, Some(4));
    assert!(harness.confirmer.prompts().is_empty());
    assert!(harness.notifier.saw(
        NotificationKind::Success,
        "Restore completed: 4 imported, 1 updated, 0 skipped"
    ));
    Ok(())
}

#[tokio::test]
async fn completed_restore_asks_other_screens_to_refetch() -> anyhow::Result<()> {
    let harness = PageHarness::new();
    let gateway = gateway();
    gateway
        .transport()
        .respond(
            Method::Post,
            "/api/v1/backup/restore/db",
            500,
            &json!({ "message": "disk full" }),
        )
        .ok(
            Method::Post,
            "/api/v1/backup/restore/db",
            &fixtures::v1(json!({ "restored_count": 12 })),
        );
    let refresh = Rc::new(DataRefresh::new());
    let refetches = Rc::new(Cell::new(0));
    let counter = Rc::clone(&refetches);
    refresh.subscribe(move || counter.set(counter.get() + 1));
    let page = BackupPage::new(harness.context(), Rc::clone(&gateway))
        .with_refresh(Rc::clone(&refresh));

    let failed = page
        .restore(BackupFormat::Db, RestoreMode::Replace, "glossary.db", b"x".to_vec())
        .await;
    assert!(matches!(failed, Err(PageError::Request(_))));
    assert_eq!(refetches.get(), 0);

    page.restore(BackupFormat::Db, RestoreMode::Replace, "glossary.db", b"x".to_vec())
        .await?;
    assert_eq!(refetches.get(), 1);
    Ok(())
}
