use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures_core::Stream;
use hyper::StatusCode;

pub type BodyStream = Pin<Box<dyn Stream<Item = anyhow::Result<Bytes>> + Send + 'static>>;

/// A response as seen by this crate: status code plus a body that is consumed as a stream
///  without materializing it. Dropping the response releases the underlying connection.
pub struct HttpResponse {
    pub status: StatusCode,
    pub data: BodyStream,
}
impl HttpResponse {
    pub fn new(status: StatusCode, data: impl Stream<Item = anyhow::Result<Bytes>> + Send + 'static) -> HttpResponse {
        HttpResponse {
            status,
            data: Box::pin(data),
        }
    }

    /// single-chunk body, mostly for tests and small payloads
    pub fn from_bytes(status: StatusCode, bytes: impl Into<Bytes>) -> HttpResponse {
        let bytes = bytes.into();
        HttpResponse::new(status, futures::stream::once(async move { Ok::<_, anyhow::Error>(bytes) }))
    }

    /// Drains the body into memory - only for payloads known to be small, e.g. metadata files
    pub async fn into_bytes(self) -> anyhow::Result<Bytes> {
        let mut data = self.data;
        let mut result = BytesMut::new();
        while let Some(chunk) = data.next().await {
            result.extend_from_slice(&chunk?);
        }
        Ok(result.freeze())
    }
}
