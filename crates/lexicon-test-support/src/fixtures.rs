//! JSON payloads shaped like the glossary backend's responses.

use serde_json::{Value, json};

/// Wrap `data` in a successful v1 envelope.
#[must_use]
pub fn v1(data: Value) -> Value {
    json!({
        "code": 200,
        "message": "ok",
        "data": data,
        "timestamp": "2026-01-01T00:00:00Z",
    })
}

/// Failed v1 envelope carrying `code` and `message`.
#[must_use]
pub fn v1_error(code: i64, message: &str) -> Value {
    json!({ "code": code, "message": message, "data": null })
}

/// Legacy `{status: "ok"}` acknowledgement.
#[must_use]
pub fn legacy_ok() -> Value {
    json!({ "status": "ok" })
}

/// Legacy `{status: "error", msg}` reply.
#[must_use]
pub fn legacy_error(message: &str) -> Value {
    json!({ "status": "error", "msg": message })
}

/// One prompt record.
#[must_use]
pub fn prompt(id: i64, category: &str, name: &str, translation: &str) -> Value {
    json!({
        "id": id,
        "category": category,
        "name": name,
        "translation": translation,
        "comment": null,
        "created_at": "2026-01-01 00:00:00",
        "updated_at": "2026-01-01 00:00:00",
    })
}

/// `count` prompts in `category` with ids starting at `first_id`.
#[must_use]
pub fn prompts(category: &str, first_id: i64, count: usize) -> Vec<Value> {
    (first_id..)
        .take(count)
        .map(|id| prompt(id, category, &format!("term-{id}"), &format!("trans-{id}")))
        .collect()
}

/// v1 listing page envelope.
#[must_use]
pub fn prompt_page(prompts: Vec<Value>, page: u32, pages: u32, total: u64) -> Value {
    v1(json!({
        "prompts": prompts,
        "pagination": { "page": page, "limit": 100, "total": total, "pages": pages },
    }))
}

/// v1 category summaries for `names`, in the given order.
#[must_use]
pub fn categories(names: &[&str]) -> Value {
    let rows: Vec<Value> = names
        .iter()
        .zip(1_u32..)
        .map(|(name, id)| json!({ "id": id, "name": name, "count": 1 }))
        .collect();
    v1(Value::Array(rows))
}

/// Flattened legacy rows for the table editor.
#[must_use]
pub fn flat_rows(category: &str, count: usize) -> Value {
    let rows: Vec<Value> = (1..=count)
        .map(|n| {
            json!({
                "category": category,
                "term": format!("term-{n}"),
                "trans": format!("trans-{n}"),
                "note": "",
            })
        })
        .collect();
    Value::Array(rows)
}

/// Legacy term records as served by `/api/terms/{category}`.
#[must_use]
pub fn term_records(pairs: &[(&str, &str)]) -> Value {
    let rows: Vec<Value> = pairs
        .iter()
        .map(|(term, trans)| json!({ "term": term, "trans": trans, "note": "" }))
        .collect();
    Value::Array(rows)
}
