//! Outbound delivery of the finished screenshot.
//!
//! The pipeline treats delivery as an opaque sink: a photo goes in, pass or
//! fail comes out. Sink-specific payloads are never interpreted beyond that.

mod telegram;

pub use telegram::TelegramSink;

use async_trait::async_trait;
use bytes::Bytes;

pub const PHOTO_FILENAME: &str = "screenshot.png";
pub const PHOTO_CONTENT_TYPE: &str = "image/png";

/// Finished image handed to a sink, plus caption metadata.
#[derive(Debug, Clone)]
pub struct OutboundPhoto {
    pub bytes: Bytes,
    pub caption: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("sink unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("sink rejected the photo: {0}")]
    Rejected(String),
}

/// Downstream notification channel.
#[async_trait]
pub trait ImageSink: Send + Sync {
    async fn deliver(&self, photo: &OutboundPhoto, recipient: &str) -> Result<(), RelayError>;
}
