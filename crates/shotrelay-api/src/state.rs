//! Application state shared across handlers.

use shotrelay_core::Config;
use shotrelay_infra::{ImageSink, ScreenshotFetcher};
use std::sync::Arc;

/// A configured delivery target: the sink plus the recipient it posts to.
#[derive(Clone)]
pub struct RelayHandle {
    pub sink: Arc<dyn ImageSink>,
    pub chat_id: String,
}

impl std::fmt::Debug for RelayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayHandle")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

/// Immutable per-process state. Requests share the pooled clients inside the
/// fetcher and sink; everything else is request-local.
pub struct AppState {
    pub config: Config,
    pub fetcher: ScreenshotFetcher,
    /// None until both bot token and chat id are configured. Only non-dry-run
    /// requests care, and they find out after the image has been produced.
    pub relay: Option<RelayHandle>,
}
