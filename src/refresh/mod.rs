mod loop_worker;

pub use loop_worker::refresh_loop;

use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{display::DisplaySink, timer::TrackerController};

/// Poll cadences for the display refresh cycle. Tight while a timer is
/// armed so the running counter stays smooth, coarse while idle.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub armed_poll: Duration,
    pub idle_poll: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            armed_poll: Duration::from_millis(50),
            idle_poll: Duration::from_millis(500),
        }
    }
}

/// Owns the spawned refresh task and its cancellation token, so the loop
/// can be shut down deterministically.
pub struct RefreshController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl RefreshController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start_refresh(
        &mut self,
        tracker: TrackerController,
        display: Arc<dyn DisplaySink>,
        config: RefreshConfig,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("refresh loop already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(refresh_loop(tracker, display, config, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop_refresh(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("refresh loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}
