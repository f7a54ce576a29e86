//! Network edges for shotrelay: screenshot acquisition and outbound photo
//! delivery, plus telemetry initialization. Everything that suspends on I/O
//! lives here; the processing crate stays pure.

pub mod fetch;
pub mod relay;
pub mod telemetry;

pub use fetch::{FetchError, FetchErrorKind, RetryPolicy, ScreenshotFetcher};
pub use relay::{
    ImageSink, OutboundPhoto, RelayError, TelegramSink, PHOTO_CONTENT_TYPE, PHOTO_FILENAME,
};
