//! Fetch-backed transport and timer-backed yielder for the browser.

use async_trait::async_trait;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Uint8Array};
use web_sys::{Blob, FormData};

use crate::gateway::{Body, FormField, HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::render::Yielder;

/// Same-origin `fetch` transport.
pub(crate) struct FetchTransport;

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Put => Request::put(&request.url),
            Method::Delete => Request::delete(&request.url),
        };
        let builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder
                .header("Content-Type", "application/json")
                .body(value.to_string()),
            Body::Form(fields) => builder.body(form_data(&fields)?),
        };
        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::new(err.to_string()))?;
        let status = response.status();
        let status_text = response.status_text();
        let body = response
            .binary()
            .await
            .map_err(|err| TransportError::new(err.to_string()))?;
        Ok(HttpResponse {
            status,
            status_text,
            body,
        })
    }
}

fn form_data(fields: &[FormField]) -> Result<FormData, TransportError> {
    let form = FormData::new().map_err(|_| TransportError::new("form-data failed"))?;
    for field in fields {
        let appended = match field {
            FormField::Text { name, value } => form.append_with_str(name, value),
            FormField::File {
                name,
                filename,
                bytes,
            } => {
                let parts = Array::of1(&Uint8Array::from(bytes.as_slice()).into());
                let blob = Blob::new_with_u8_array_sequence(&parts)
                    .map_err(|err| TransportError::new(format!("attach file: {err:?}")))?;
                form.append_with_blob_and_filename(name, &blob, filename)
            }
        };
        appended.map_err(|err| TransportError::new(format!("form field {}: {err:?}", field.name())))?;
    }
    Ok(form)
}

/// Yields to the event loop through a zero-delay timer.
pub(crate) struct TimeoutYielder;

#[async_trait(?Send)]
impl Yielder for TimeoutYielder {
    async fn yield_now(&self) {
        TimeoutFuture::new(0).await;
    }
}
