//! GraphQL transport
//!
//! One POST endpoint, one credential. Every request carries its query text and
//! a separate `variables` object, so user input never lands in the query body.
//! Nothing here retries: a failed request surfaces to the caller immediately.

use std::io::Read;
use std::time::Instant;

use miette::Diagnostic;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::Settings;

/// Largest avatar image we are willing to buffer
const MAX_DOWNLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A GraphQL query or mutation with its variables
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub variables: Value,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Value::Null,
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    /// Operation name for logging (`query Teams { ... }` -> `Teams`)
    pub fn operation_name(&self) -> &str {
        self.query
            .split_whitespace()
            .nth(1)
            .map(|word| word.split(['(', '{']).next().unwrap_or(word))
            .filter(|name| !name.is_empty())
            .unwrap_or("anonymous")
    }
}

/// Errors raised while talking to the API
#[derive(Debug, Error, Diagnostic)]
pub enum TransportError {
    #[error("API returned HTTP {status}: {body}")]
    #[diagnostic(
        code(lincli::transport::status),
        help("check your API key (`linear init <apikey>`) and rate limits")
    )]
    Status { status: u16, body: String },

    #[error("Request to {url} failed: {message}")]
    #[diagnostic(code(lincli::transport::network))]
    Network { url: String, message: String },

    #[error("Failed to decode API response: {0}")]
    #[diagnostic(code(lincli::transport::decode))]
    Decode(String),

    #[error("API reported errors: {0}")]
    #[diagnostic(code(lincli::transport::graphql))]
    Graphql(String),

    #[error("API response is missing `{0}`")]
    #[diagnostic(code(lincli::transport::missing_field))]
    MissingField(String),
}

/// Request/response boundary with the remote service
pub trait Transport {
    /// Send one GraphQL document and return the parsed response body
    fn send(&self, request: &GraphqlRequest) -> Result<Value, TransportError>;

    /// Fetch raw bytes with a plain, unauthenticated GET
    fn download(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Pull a typed value out of `data.<path>`, checking every level
///
/// A missing or null node is reported as `MissingField`, unless the server
/// sent an `errors` array, in which case those messages are returned instead.
pub fn extract<T: DeserializeOwned>(body: &Value, path: &[&str]) -> Result<T, TransportError> {
    let mut node = body.get("data");
    let mut walked = String::from("data");
    for key in path {
        walked.push('.');
        walked.push_str(key);
        node = node.filter(|n| !n.is_null()).and_then(|n| n.get(key));
    }

    match node {
        Some(value) if !value.is_null() => {
            serde_json::from_value(value.clone()).map_err(|e| TransportError::Decode(e.to_string()))
        }
        _ => match graphql_errors(body) {
            Some(messages) => Err(TransportError::Graphql(messages)),
            None => Err(TransportError::MissingField(walked)),
        },
    }
}

fn graphql_errors(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_array()?;
    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|e| e.get("message").and_then(Value::as_str))
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

/// Blocking HTTPS transport
pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(settings: &Settings, api_key: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.timeout)
            .user_agent(concat!("linear-cli/", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            endpoint: settings.endpoint.clone(),
            api_key: api_key.to_string(),
        }
    }

    fn network_error(&self, url: &str, err: impl std::fmt::Display) -> TransportError {
        TransportError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &GraphqlRequest) -> Result<Value, TransportError> {
        let start = Instant::now();

        // The key goes out verbatim; the API does not expect a "Bearer " prefix.
        let result = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &self.api_key)
            .set("Content-Type", "application/json")
            .send_json(request);

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                return Err(TransportError::Status {
                    status,
                    body: response.into_string().unwrap_or_default(),
                });
            }
            Err(ureq::Error::Transport(err)) => return Err(self.network_error(&self.endpoint, err)),
        };

        if response.status() != 200 {
            return Err(TransportError::Status {
                status: response.status(),
                body: response.into_string().unwrap_or_default(),
            });
        }

        let body: Value = response
            .into_json()
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        tracing::debug!(
            operation = request.operation_name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request complete"
        );
        Ok(body)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                return Err(TransportError::Status {
                    status,
                    body: response.into_string().unwrap_or_default(),
                });
            }
            Err(ureq::Error::Transport(err)) => return Err(self.network_error(url, err)),
        };

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_DOWNLOAD_BYTES)
            .read_to_end(&mut bytes)
            .map_err(|e| self.network_error(url, e))?;
        Ok(bytes)
    }
}

/// Scripted transport for unit tests
#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    use super::*;

    /// Replays queued responses in order and records every request
    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<Value, TransportError>>>,
        downloads: RefCell<HashMap<String, Option<Vec<u8>>>>,
        pub requests: RefCell<Vec<GraphqlRequest>>,
        pub download_attempts: RefCell<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, data: Value) -> Self {
            self.reply(serde_json::json!({ "data": data }))
        }

        /// Queue a full response body, `data` and `errors` included
        pub fn reply(self, body: Value) -> Self {
            self.responses.borrow_mut().push_back(Ok(body));
            self
        }

        pub fn fail(self, status: u16) -> Self {
            self.responses.borrow_mut().push_back(Err(TransportError::Status {
                status,
                body: "scripted failure".to_string(),
            }));
            self
        }

        pub fn serve(self, url: &str, bytes: &[u8]) -> Self {
            self.downloads
                .borrow_mut()
                .insert(url.to_string(), Some(bytes.to_vec()));
            self
        }

        pub fn refuse(self, url: &str) -> Self {
            self.downloads.borrow_mut().insert(url.to_string(), None);
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }

        pub fn request(&self, index: usize) -> GraphqlRequest {
            self.requests.borrow()[index].clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, request: &GraphqlRequest) -> Result<Value, TransportError> {
            self.requests.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Decode("no scripted response".into())))
        }

        fn download(&self, url: &str) -> Result<Vec<u8>, TransportError> {
            self.download_attempts.borrow_mut().push(url.to_string());
            match self.downloads.borrow().get(url) {
                Some(Some(bytes)) => Ok(bytes.clone()),
                _ => Err(TransportError::Status {
                    status: 404,
                    body: String::new(),
                }),
            }
        }
    }
}
