use lexicon_api_models::{
    BackupFormat, NestedTerms, PromptId, PromptQuery, RestoreMode, SortOrder, TermRecord,
};
use lexicon_test_support::fixtures;
use lexicon_test_support::mocks::FakeTransport;
use lexicon_ui::gateway::{Body, FormField, Gateway, Method, RequestError};
use lexicon_ui::models::Entry;
use serde_json::json;

fn gateway() -> Gateway<FakeTransport> {
    Gateway::new(FakeTransport::new(), "")
}

#[tokio::test]
async fn category_reads_are_cached_until_a_save() -> anyhow::Result<()> {
    let gateway = gateway();
    gateway
        .transport()
        .ok(Method::Get, "/api/data", &fixtures::flat_rows("Animals", 2))
        .ok(Method::Post, "/api/data", &fixtures::legacy_ok());

    let first = gateway.list_by_category("Animals").await?;
    let second = gateway.list_by_category("Animals").await?;
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(gateway.transport().calls(Method::Get, "/api/data"), 1);

    let mut nested = NestedTerms::new();
    nested.insert(
        "Animals".to_string(),
        vec![TermRecord {
            term: "cat".to_string(),
            trans: "chat".to_string(),
            note: String::new(),
        }],
    );
    gateway.save(&nested, "Animals").await?;
    assert!(!gateway.is_cached("Animals"));

    gateway.list_by_category("Animals").await?;
    assert_eq!(gateway.transport().calls(Method::Get, "/api/data"), 2);
    Ok(())
}

#[tokio::test]
async fn failed_reads_leave_the_cache_empty() {
    let gateway = gateway();
    gateway
        .transport()
        .fail(Method::Get, "/api/data", "connection reset");

    let err = gateway.list_by_category("Animals").await.err();

    assert_eq!(err, Some(RequestError::new("connection reset", None)));
    assert!(!gateway.is_cached("Animals"));
}

#[tokio::test]
async fn save_posts_nested_rows_with_the_loaded_category() -> anyhow::Result<()> {
    let gateway = gateway();
    gateway
        .transport()
        .ok(Method::Post, "/api/data", &fixtures::legacy_ok());
    let mut nested = NestedTerms::new();
    nested.insert(
        "Colors".to_string(),
        vec![TermRecord {
            term: "red".to_string(),
            trans: "rouge".to_string(),
            note: "warm".to_string(),
        }],
    );

    gateway.save(&nested, "Animals").await?;

    let request = gateway.transport().last_request();
    assert_eq!(
        request.map(|request| request.body),
        Some(Body::Json(json!({
            "editorData": { "Colors": [{ "term": "red", "trans": "rouge", "note": "warm" }] },
            "loadedCategory": "Animals",
        })))
    );
    Ok(())
}

#[tokio::test]
async fn legacy_error_flag_surfaces_the_server_message() {
    let gateway = gateway();
    gateway.transport().ok(
        Method::Post,
        "/api/add_entry",
        &fixtures::legacy_error("term already exists"),
    );

    let err = gateway
        .add_entry(&Entry::new("Animals", "cat", "chat", ""))
        .await
        .err();

    assert_eq!(err.map(|err| err.message), Some("term already exists".to_string()));
}

#[tokio::test]
async fn add_entry_sends_legacy_form_fields() -> anyhow::Result<()> {
    let gateway = gateway();
    gateway
        .transport()
        .ok(Method::Post, "/api/add_entry", &fixtures::legacy_ok());

    gateway
        .add_entry(&Entry::new("Animals", "cat", "chat", "pet"))
        .await?;

    let body = gateway.transport().last_request().map(|request| request.body);
    assert_eq!(
        body,
        Some(Body::Form(vec![
            FormField::text("category", "Animals"),
            FormField::text("term", "cat"),
            FormField::text("trans", "chat"),
            FormField::text("note", "pet"),
        ]))
    );
    Ok(())
}

#[tokio::test]
async fn listing_encodes_the_page_window() -> anyhow::Result<()> {
    let gateway = gateway();
    gateway.transport().ok(
        Method::Get,
        "/api/v1/prompts",
        &fixtures::prompt_page(fixtures::prompts("Animals", 1, 2), 2, 3, 202),
    );

    let page = gateway
        .list_prompts(&PromptQuery {
            category: Some("Big Cats".to_string()),
            page: Some(2),
            limit: Some(100),
            sort: Some(SortOrder::NameAsc),
            keyword: None,
        })
        .await?;

    assert_eq!(page.prompts.len(), 2);
    assert_eq!(page.pagination.pages, 3);
    assert_eq!(
        gateway.transport().last_request().map(|request| request.url),
        Some("/api/v1/prompts?category=Big%20Cats&page=2&limit=100&sort=name_asc".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn envelope_error_codes_fail_even_with_http_success() {
    let gateway = gateway();
    gateway.transport().ok(
        Method::Get,
        "/api/v1/prompts/9",
        &fixtures::v1_error(404, "prompt not found"),
    );

    let err = gateway.prompt(PromptId(9)).await.err();

    assert_eq!(err, Some(RequestError::new("prompt not found", Some(404))));
}

#[tokio::test]
async fn batch_delete_sends_ids_in_the_body() -> anyhow::Result<()> {
    let gateway = gateway();
    gateway.transport().ok(
        Method::Delete,
        "/api/v1/prompts/batch",
        &fixtures::v1(json!({ "deleted_count": 2 })),
    );

    let result = gateway.delete_prompts(&[PromptId(4), PromptId(7)]).await?;

    assert_eq!(result.deleted_count, 2);
    assert_eq!(
        gateway.transport().last_request().map(|request| request.body),
        Some(Body::Json(json!({ "ids": [4, 7] })))
    );
    Ok(())
}

#[tokio::test]
async fn category_names_keep_server_order() -> anyhow::Result<()> {
    let gateway = gateway();
    gateway.transport().ok(
        Method::Get,
        "/api/v1/categories",
        &fixtures::categories(&["动物", "Animals", "Colors"]),
    );

    let names = gateway.categories().await?;

    assert_eq!(names, vec!["动物", "Animals", "Colors"]);
    Ok(())
}

#[tokio::test]
async fn csv_restore_posts_to_the_mode_path_and_clears_the_cache() -> anyhow::Result<()> {
    let gateway = gateway();
    gateway
        .transport()
        .ok(Method::Get, "/api/data", &fixtures::flat_rows("Animals", 1))
        .ok(
            Method::Post,
            "/api/v1/backup/restore/csv/replace",
            &fixtures::v1(json!({ "imported_count": 3, "skipped_count": 0 })),
        );
    gateway.list_by_category("Animals").await?;

    let summary = gateway
        .restore_csv(RestoreMode::Replace, "backup.csv", b"a,b".to_vec())
        .await?;

    assert_eq!(summary.imported_count, Some(3));
    assert!(!gateway.is_cached("Animals"));
    let body = gateway.transport().last_request().map(|request| request.body);
    assert_eq!(
        body,
        Some(Body::Form(vec![FormField::File {
            name: "file".to_string(),
            filename: "backup.csv".to_string(),
            bytes: b"a,b".to_vec(),
        }]))
    );
    Ok(())
}

#[tokio::test]
async fn export_urls_only_carry_a_category_for_csv() {
    let gateway = Gateway::new(FakeTransport::new(), "http://glossary.test/");

    assert_eq!(
        gateway.export_url(BackupFormat::Csv, Some("Animals")),
        "http://glossary.test/api/v1/backup/export/csv?category=Animals"
    );
    assert_eq!(
        gateway.export_url(BackupFormat::Db, Some("Animals")),
        "http://glossary.test/api/v1/backup/export/db"
    );
}
