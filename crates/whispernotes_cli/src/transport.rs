//! Blocking HTTP client for the WhisperNotes REST API.

use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use whispernotes_core::{
    ApiError, ApiErrorKind, NewNote, Note, NoteId, NotePatch, NoteTransport, Theme,
    ThemeSelection, TransportError,
};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(network)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tags(&self) -> Result<Vec<String>, TransportError> {
        self.send(self.client.get(self.url("/api/tags")))
    }

    pub fn current_theme(&self) -> Result<Theme, TransportError> {
        self.send(self.client.get(self.url("/api/theme")))
    }

    pub fn select_theme(&self, selection: &ThemeSelection) -> Result<Theme, TransportError> {
        self.send(self.client.put(self.url("/api/theme")).json(selection))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn note_url(&self, id: NoteId) -> String {
        self.url(&format!("/api/notes/{id}"))
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        let response = self.execute(request)?;
        response
            .json::<T>()
            .map_err(|err| TransportError::Malformed(err.to_string()))
    }

    fn execute(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request.send().map_err(network)?;
        let status = response.status();
        debug!(
            "event=http_call module=cli status={} code={} url={}",
            if status.is_success() { "ok" } else { "error" },
            status.as_u16(),
            response.url()
        );
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let (kind, message) = match serde_json::from_str::<ApiError>(&body) {
            Ok(api_error) => (api_error.error, api_error.message),
            Err(_) => (ApiErrorKind::Unknown, body),
        };
        Err(TransportError::Rejected {
            status: status.as_u16(),
            kind,
            message,
        })
    }
}

impl NoteTransport for HttpTransport {
    fn list(&self) -> Result<Vec<Note>, TransportError> {
        self.send(self.client.get(self.url("/api/notes")))
    }

    fn create(&self, new_note: &NewNote) -> Result<Note, TransportError> {
        self.send(self.client.post(self.url("/api/notes")).json(new_note))
    }

    fn update(&self, id: NoteId, patch: &NotePatch) -> Result<Note, TransportError> {
        self.send(self.client.put(self.note_url(id)).json(patch))
    }

    fn delete(&self, id: NoteId) -> Result<(), TransportError> {
        self.execute(self.client.delete(self.note_url(id)))
            .map(|_| ())
    }
}

fn network(err: reqwest::Error) -> TransportError {
    TransportError::Network(err.to_string())
}
