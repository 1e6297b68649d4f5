//! Shared client utilities: error type, reqwest transport and gateway wiring.

use std::fmt::{self, Display, Formatter};
use std::rc::Rc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use lexicon_ui::gateway::{
    Body, FormField, Gateway, HttpRequest, HttpResponse, Method, Transport, TransportError,
};
use lexicon_ui::PageError;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};

pub(crate) const USER_AGENT: &str = concat!("lexicon-cli/", env!("CARGO_PKG_VERSION"));

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<PageError> for CliError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::Validation(_)
            | PageError::ConfirmationAborted
            | PageError::EmptySelection
            | PageError::NothingToSort
            | PageError::Row(_) => Self::validation(err.to_string()),
            PageError::Request(_)
            | PageError::Busy
            | PageError::Superseded
            | PageError::Clipboard(_) => Self::failure(anyhow!(err)),
        }
    }
}

/// Sends gateway requests through a shared `reqwest` client.
pub(crate) struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub(crate) const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let builder = self.client.request(method, &request.url);
        let builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Form(fields) => builder.multipart(multipart(fields)),
        };
        let response = builder.send().await.map_err(|err| {
            TransportError::new(format!("request to {} failed: {err}", request.url))
        })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::new(format!("failed to read response body: {err}")))?;
        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.to_vec(),
        })
    }
}

fn multipart(fields: Vec<FormField>) -> Form {
    fields.into_iter().fold(Form::new(), |form, field| match field {
        FormField::Text { name, value } => form.text(name, value),
        FormField::File {
            name,
            filename,
            bytes,
        } => form.part(name, Part::bytes(bytes).file_name(filename)),
    })
}

/// Build the HTTP client used by every command.
pub(crate) fn build_client(timeout_secs: u64) -> CliResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

/// Gateway rooted at `base_url`.
pub(crate) fn gateway(client: Client, base_url: &Url) -> Rc<Gateway<ReqwestTransport>> {
    Rc::new(Gateway::new(
        ReqwestTransport::new(client),
        base_url.as_str(),
    ))
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    let url = input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))?;
    if url.cannot_be_a_base() {
        return Err(format!("invalid URL '{input}': not a base URL"));
    }
    Ok(url)
}
