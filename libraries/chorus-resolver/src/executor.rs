//! Bounded background loading of redirected catalog items

use chorus_core::{RedirectTask, Redirector, ResolveError, Result, TrackLoadingExecutor};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Runs redirects on the tokio runtime, at most `concurrency` at a time
pub struct BoundedRedirectExecutor {
    redirector: Arc<dyn Redirector>,
    permits: Arc<Semaphore>,
    runtime: Handle,
}

impl BoundedRedirectExecutor {
    /// Must be created from within a tokio runtime
    pub fn new(redirector: Arc<dyn Redirector>, concurrency: usize) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| ResolveError::Config(format!("no tokio runtime for redirects: {}", e)))?;

        Ok(Self {
            redirector,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            runtime,
        })
    }
}

impl TrackLoadingExecutor for BoundedRedirectExecutor {
    fn execute(&self, task: RedirectTask) {
        let redirector = Arc::clone(&self.redirector);
        let permits = Arc::clone(&self.permits);

        self.runtime.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                task.slot.fail("background loader shut down");
                return;
            };

            if !task.slot.is_wanted() {
                debug!(item = %task.item.id(), "Playable dropped before redirect, skipping");
                return;
            }

            match redirector.redirect(&task.item).await {
                Ok(Some(stream)) => {
                    debug!(item = %task.item.id(), url = %stream.url, "Redirect resolved");
                    task.slot.complete(stream);
                }
                Ok(None) => {
                    warn!(item = %task.item.id(), "No streamable equivalent found");
                    task.slot.fail(format!(
                        "No streamable equivalent found for '{}'",
                        task.item.display()
                    ));
                }
                Err(e) => {
                    warn!(item = %task.item.id(), error = %e, "Redirect failed");
                    task.slot.fail(e.to_string());
                }
            }
        });
    }
}
