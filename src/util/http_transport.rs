use std::fmt::{Debug, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use futures_core::Stream;
use hyper::{Body, Client, Request, Uri};
use hyper::client::HttpConnector;
use hyper::header::{AUTHORIZATION, USER_AGENT};
use hyper_tls::HttpsConnector;
use tracing::trace;

use crate::util::body::{BodyStream, HttpResponse};

/// Maven Central returns a 403 without a user agent
pub const USER_AGENT_VALUE: &str = concat!("arti-fetch/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}
impl Credentials {
    /// Credentials are only used if both parts are present and non-empty
    pub fn from_parts(user: Option<String>, password: Option<String>) -> Option<Credentials> {
        match (user, password) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => Some(Credentials { user, password }),
            _ => None,
        }
    }

    pub fn basic_auth_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", self.user, self.password)))
    }
}
impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// A single GET, optionally with basic auth. No retries, redirects are left to the
///  implementation.
///
/// This is the seam for exercising resolution and download logic without a real server.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, credentials: Option<&Credentials>) -> anyhow::Result<HttpResponse>;
}

/// Instances do HTTP connection caching internally, so keeping them alive has performance benefits.
pub struct HyperTransport {
    client: Client<HttpsConnector<HttpConnector>>,
    timeout: Option<Duration>,
}
impl HyperTransport {
    pub fn new() -> HyperTransport {
        HyperTransport {
            client: Client::builder()
                .build::<_, Body>(HttpsConnector::new()),
            timeout: None,
        }
    }

    /// Deadline for the response head to arrive, and again for every chunk of the body. A body
    ///  that keeps delivering is never cut off.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> HyperTransport {
        self.timeout = timeout;
        self
    }
}
impl Default for HyperTransport {
    fn default() -> Self {
        HyperTransport::new()
    }
}

#[async_trait]
impl HttpTransport for HyperTransport {
    async fn get(&self, url: &str, credentials: Option<&Credentials>) -> anyhow::Result<HttpResponse> {
        let mut request = Request::builder()
            .method("GET")
            .uri(Uri::try_from(url)?)
            .header(USER_AGENT, USER_AGENT_VALUE);
        if let Some(credentials) = credentials {
            request = request.header(AUTHORIZATION, credentials.basic_auth_header());
        }
        let request = request.body(Body::empty())?;

        trace!("getting {:?}", request.uri());

        let response = match self.timeout {
            None => self.client.request(request).await?,
            Some(timeout) => tokio::time::timeout(timeout, self.client.request(request))
                .await
                .map_err(|_| anyhow!("no response from {} within {:?}", url, timeout))??,
        };

        trace!("response status {} for {}", response.status(), url);

        let status = response.status();
        let body = response.into_body().map_err(anyhow::Error::from);
        match self.timeout {
            None => Ok(HttpResponse::new(status, body)),
            Some(timeout) => Ok(HttpResponse::new(status, with_chunk_deadline(Box::pin(body), timeout, url.to_string()))),
        }
    }
}

/// Fails the stream if the next chunk takes longer than `timeout`; nothing is polled after that
fn with_chunk_deadline(body: BodyStream, timeout: Duration, url: String) -> impl Stream<Item = anyhow::Result<Bytes>> + Send + 'static {
    futures::stream::unfold(Some(body), move |state| {
        let url = url.clone();
        async move {
            let mut body = state?;
            match tokio::time::timeout(timeout, body.next()).await {
                Ok(Some(chunk)) => Some((chunk, Some(body))),
                Ok(None) => None,
                Err(_) => Some((Err(anyhow!("body of {} stalled for more than {:?}", url, timeout)), None)),
            }
        }
    })
}
