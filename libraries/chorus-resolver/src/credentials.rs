//! Credential context selection
//!
//! Each catalog call decides on its own whether it runs as the requester
//! (`own` flag) or under the shared application credentials. Requester
//! mode needs a completed login, which may still be in progress; that wait
//! is a suspension point and honours the request's cancellation token.

use chorus_core::types::{CredentialContext, RequesterId};
use chorus_core::{LoginProvider, ResolveError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct CredentialSelector {
    logins: Arc<dyn LoginProvider>,
    login_timeout: Option<Duration>,
}

impl CredentialSelector {
    pub fn new(logins: Arc<dyn LoginProvider>, login_timeout: Option<Duration>) -> Self {
        Self {
            logins,
            login_timeout,
        }
    }

    /// Context for calls that always run on the shared credentials
    pub fn shared(&self) -> CredentialContext {
        CredentialContext::Shared
    }

    /// Context for a call, requester-scoped when `own` is set
    ///
    /// # Errors
    /// `AuthenticationRequired` when the requester has no login (or the wait
    /// timed out), `Cancelled` when the request was cancelled while waiting.
    pub async fn select(
        &self,
        own: bool,
        requester: &RequesterId,
        cancel: &CancellationToken,
    ) -> Result<CredentialContext> {
        if !own {
            return Ok(CredentialContext::Shared);
        }

        debug!(requester = %requester, "Waiting for requester login");

        let wait = async {
            match self.login_timeout {
                Some(timeout) => tokio::time::timeout(timeout, self.logins.await_login(requester))
                    .await
                    .map_err(|_| {
                        warn!(requester = %requester, ?timeout, "Timed out waiting for login");
                        ResolveError::AuthenticationRequired(format!(
                            "Timed out waiting for {} to log in",
                            requester
                        ))
                    })?,
                None => self.logins.await_login(requester).await,
            }
        };

        let login = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(requester = %requester, "Login wait cancelled");
                return Err(ResolveError::Cancelled);
            }
            login = wait => login?,
        };

        match login {
            Some(login) => Ok(CredentialContext::Requester(login)),
            None => Err(ResolveError::AuthenticationRequired(format!(
                "{} needs to log in first",
                requester
            ))),
        }
    }
}
