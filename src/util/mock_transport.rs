use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use hyper::StatusCode;

use crate::util::body::HttpResponse;
use crate::util::http_transport::{Credentials, HttpTransport};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub credentials: Option<Credentials>,
}

enum MockResponse {
    Respond(StatusCode, Bytes),
    Fail(String),
    /// body stream yields the bytes, then fails
    BreakOff(StatusCode, Bytes, String),
}

/// in-memory transport answering from a fixed table of URLs, for testing purposes. Unknown URLs
///  get a 404.
pub struct MockHttpTransport {
    responses: HashMap<String, MockResponse>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}
impl MockHttpTransport {
    pub fn new() -> MockHttpTransport {
        MockHttpTransport {
            responses: Default::default(),
            requests: Default::default(),
        }
    }

    pub fn with_response(mut self, url: &str, status: u16, body: &str) -> MockHttpTransport {
        let status = StatusCode::from_u16(status).unwrap();
        self.responses.insert(url.to_string(), MockResponse::Respond(status, Bytes::from(body.to_string())));
        self
    }

    pub fn with_failure(mut self, url: &str, message: &str) -> MockHttpTransport {
        self.responses.insert(url.to_string(), MockResponse::Fail(message.to_string()));
        self
    }

    pub fn with_broken_body(mut self, url: &str, status: u16, first_chunk: &str, message: &str) -> MockHttpTransport {
        let status = StatusCode::from_u16(status).unwrap();
        self.responses.insert(url.to_string(), MockResponse::BreakOff(status, Bytes::from(first_chunk.to_string()), message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn get(&self, url: &str, credentials: Option<&Credentials>) -> anyhow::Result<HttpResponse> {
        self.requests.lock()
            .unwrap()
            .push(RecordedRequest {
                url: url.to_string(),
                credentials: credentials.cloned(),
            });

        match self.responses.get(url) {
            Some(MockResponse::Respond(status, body)) => Ok(HttpResponse::from_bytes(*status, body.clone())),
            Some(MockResponse::Fail(message)) => Err(anyhow::Error::msg(message.clone())),
            Some(MockResponse::BreakOff(status, first_chunk, message)) => {
                let chunks = vec![
                    Ok(first_chunk.clone()),
                    Err(anyhow::Error::msg(message.clone())),
                ];
                Ok(HttpResponse::new(*status, futures::stream::iter(chunks)))
            }
            None => Ok(HttpResponse::from_bytes(StatusCode::NOT_FOUND, Bytes::new())),
        }
    }
}
