use lexicon_test_support::mocks::{CountingYielder, RecordingNotifier, RecordingSurface};
use lexicon_ui::config::FieldLimits;
use lexicon_ui::models::{Entry, Field};
use lexicon_ui::notify::NotificationKind;
use lexicon_ui::render::{EditOutcome, IncrementalRenderer, RenderError};
use lexicon_ui::validate::ValidationError;

fn entries(count: usize) -> Vec<Entry> {
    (0..count)
        .map(|n| Entry::new("Animals", format!("term-{n}"), format!("trans-{n}"), ""))
        .collect()
}

fn renderer(
    surface: &RecordingSurface,
    yielder: &CountingYielder,
    chunk_size: usize,
) -> IncrementalRenderer<RecordingSurface, CountingYielder> {
    IncrementalRenderer::new(
        surface.clone(),
        yielder.clone(),
        chunk_size,
        FieldLimits::default(),
    )
}

#[tokio::test]
async fn render_preserves_count_and_order() {
    let surface = RecordingSurface::new();
    let renderer = renderer(&surface, &CountingYielder::new(), 100);

    let report = renderer.render(entries(5)).await;

    assert_eq!(report.rows, 5);
    assert_eq!(renderer.len(), 5);
    assert_eq!(
        surface.terms(),
        vec!["term-0", "term-1", "term-2", "term-3", "term-4"]
    );
    assert_eq!(surface.indices(), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn small_renders_do_not_yield() {
    let surface = RecordingSurface::new();
    let yielder = CountingYielder::new();
    let renderer = renderer(&surface, &yielder, 100);

    let report = renderer.render(entries(100)).await;

    assert_eq!(report.chunks, 1);
    assert_eq!(report.yields, 0);
    assert_eq!(yielder.count(), 0);
}

#[tokio::test]
async fn large_renders_yield_between_chunks_but_not_after_the_last() {
    let surface = RecordingSurface::new();
    let yielder = CountingYielder::new();
    let renderer = renderer(&surface, &yielder, 100);

    let report = renderer.render(entries(250)).await;

    assert_eq!(report.rows, 250);
    assert_eq!(report.chunks, 3);
    assert_eq!(report.yields, 2);
    assert_eq!(yielder.count(), report.yields);
    assert_eq!(surface.appends(), vec![100, 100, 50]);
    assert_eq!(surface.len(), 250);
    assert_eq!(surface.indices(), (0..250).collect::<Vec<_>>());
}

#[tokio::test]
async fn newer_render_supersedes_one_in_flight() {
    let surface = RecordingSurface::new();
    let renderer = renderer(&surface, &CountingYielder::new(), 100);

    let (stale, fresh) = tokio::join!(renderer.render(entries(250)), async {
        tokio::task::yield_now().await;
        renderer
            .render(vec![Entry::new("Colors", "red", "rouge", "")])
            .await
    });

    assert!(stale.superseded);
    assert!(stale.rows < 250);
    assert!(!fresh.superseded);
    assert_eq!(surface.terms(), vec!["red"]);
    assert_eq!(renderer.len(), 1);
}

#[tokio::test]
async fn removal_keeps_indices_contiguous() -> anyhow::Result<()> {
    let surface = RecordingSurface::new();
    let renderer = renderer(&surface, &CountingYielder::new(), 100);
    renderer.render(entries(5)).await;

    let removed = renderer.remove_one(1)?;

    assert_eq!(removed.term, "term-1");
    assert_eq!(surface.indices(), vec![0, 1, 2, 3]);
    assert_eq!(surface.terms(), vec!["term-0", "term-2", "term-3", "term-4"]);
    let rows = surface.rows();
    assert_eq!(rows[1].labels.field(Field::Term), "Term - row 2");
    assert_eq!(rows[3].labels.delete(), "Delete row 4");
    assert_eq!(renderer.len(), 4);
    Ok(())
}

#[tokio::test]
async fn removal_out_of_range_is_reported() {
    let surface = RecordingSurface::new();
    let renderer = renderer(&surface, &CountingYielder::new(), 100);
    renderer.render(entries(2)).await;

    assert_eq!(
        renderer.remove_one(2),
        Err(RenderError::OutOfRange { index: 2, len: 2 })
    );
    assert_eq!(surface.len(), 2);
}

#[tokio::test]
async fn insert_one_appends_and_focuses_first_empty_field() {
    let surface = RecordingSurface::new();
    let renderer = renderer(&surface, &CountingYielder::new(), 100);
    renderer.render(entries(2)).await;

    let index = renderer.insert_one(Entry::blank("Animals"));

    assert_eq!(index, 2);
    assert_eq!(surface.clears(), 1);
    assert_eq!(surface.focus(), Some((2, Field::Term)));
    assert_eq!(surface.rows()[2].labels.field(Field::Note), "Note - row 3");
}

#[tokio::test]
async fn over_long_note_is_rejected_and_reverted() {
    let surface = RecordingSurface::new();
    let notifier = RecordingNotifier::default();
    let renderer = renderer(&surface, &CountingYielder::new(), 100);
    renderer
        .render(vec![Entry::new("Animals", "cat", "chat", "pet")])
        .await;

    let outcome = renderer.edit_field(0, Field::Note, &"n".repeat(201), &notifier);

    assert_eq!(
        outcome,
        EditOutcome::Rejected(ValidationError::TooLong {
            field: Field::Note,
            max: 200,
        })
    );
    assert_eq!(surface.rows()[0].entry.note, "pet");
    assert_eq!(renderer.entry(0).map(|entry| entry.note), Some("pet".to_string()));
    assert!(notifier.saw(NotificationKind::Error, "Note cannot exceed 200 characters"));
}

#[tokio::test]
async fn accepted_edits_are_trimmed_into_the_row() {
    let surface = RecordingSurface::new();
    let notifier = RecordingNotifier::default();
    let renderer = renderer(&surface, &CountingYielder::new(), 100);
    renderer.render(entries(1)).await;

    let outcome = renderer.edit_field(0, Field::Translation, "  chat  ", &notifier);

    assert_eq!(outcome, EditOutcome::Accepted("chat".to_string()));
    assert_eq!(surface.rows()[0].entry.translation, "chat");
    assert_eq!(
        renderer.entry(0).map(|entry| entry.translation),
        Some("chat".to_string())
    );
    assert!(notifier.messages().is_empty());
    assert_eq!(
        renderer.edit_field(0, Field::Translation, "chat", &notifier),
        EditOutcome::Unchanged
    );
}

#[tokio::test]
async fn filter_hides_non_matching_rows() {
    let surface = RecordingSurface::new();
    let renderer = renderer(&surface, &CountingYielder::new(), 100);
    renderer
        .render(vec![
            Entry::new("Animals", "cat", "Chat", ""),
            Entry::new("Animals", "dog", "chien", ""),
            Entry::new("Animals", "catfish", "poisson-chat", ""),
        ])
        .await;

    assert_eq!(renderer.filter("CHAT"), 2);
    let visible: Vec<bool> = surface.rows().iter().map(|row| row.visible).collect();
    assert_eq!(visible, vec![true, false, true]);
    assert_eq!(renderer.visible_records().len(), 2);

    assert_eq!(renderer.filter(""), 3);
    assert!(surface.rows().iter().all(|row| row.visible));
}

#[tokio::test]
async fn nesting_drops_incomplete_rows_and_groups_by_category() {
    let surface = RecordingSurface::new();
    let renderer = renderer(&surface, &CountingYielder::new(), 100);
    renderer
        .render(vec![
            Entry::new("Animals", "cat", "chat", ""),
            Entry::new(" Colors ", "red", "rouge", "warm"),
            Entry::new("Animals", "dog", "  ", ""),
            Entry::blank("Animals"),
        ])
        .await;

    let nested = renderer.nest_by_category();

    assert_eq!(nested.len(), 2);
    assert_eq!(nested["Animals"].len(), 1);
    assert_eq!(nested["Colors"][0].trans, "rouge");
}
