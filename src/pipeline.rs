//! Authenticated, balance-aware request pipeline.
//!
//! Every paid call goes through [`AuthenticatedPipeline::call`]:
//!
//! - no session: `Unauthenticated`, nothing is sent
//! - 401: session torn down, `Unauthenticated`
//! - 402: `InsufficientFunds`, balance untouched
//! - other non-success or transport failure: `RequestFailed`
//! - success: balance refreshed from `GET /user/me`, then the body is returned
//!
//! There is no retry and no queueing. Callers keep one call in flight per
//! user action.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

use std::sync::Arc;

use serde_json::Value;

use crate::error::GenerationError;
use crate::net::{ApiRequest, ApiResponse, Transport, UserProfile};
use crate::session::SessionManager;

pub const PROFILE_PATH: &str = "/user/me";

/// Message used when a failure carries no server detail.
pub const GENERIC_FAILURE: &str = "request failed";

const INSUFFICIENT_FUNDS: &str = "insufficient balance";

const STATUS_UNAUTHORIZED: u16 = 401;
const STATUS_PAYMENT_REQUIRED: u16 = 402;

pub struct AuthenticatedPipeline {
    transport: Arc<dyn Transport>,
}

impl AuthenticatedPipeline {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// POST `body` to `path` with the session credential.
    ///
    /// # Errors
    ///
    /// See the module docs for the status mapping.
    pub async fn call(&self, session: &mut SessionManager, path: &str, body: Value) -> Result<Value, GenerationError> {
        let Some(token) = session.token().map(str::to_owned) else {
            return Err(GenerationError::Unauthenticated);
        };

        let response = self
            .transport
            .send(ApiRequest::post_json(path, body).with_bearer(token))
            .await?;

        match response.status {
            STATUS_UNAUTHORIZED => {
                session.receive_unauthorized();
                Err(GenerationError::Unauthenticated)
            }
            STATUS_PAYMENT_REQUIRED => {
                let detail = response.detail().unwrap_or_else(|| INSUFFICIENT_FUNDS.to_owned());
                tracing::info!(path, %detail, "generation refused for insufficient balance");
                Err(GenerationError::InsufficientFunds(detail))
            }
            _ if !response.is_success() => Err(request_failed(&response)),
            _ => {
                self.refresh_after_spend(session).await;
                Ok(response.body)
            }
        }
    }

    /// Fetch `GET /user/me` and cache the profile on the session.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a session or on 401 (which also tears the
    /// session down); `RequestFailed` for anything else.
    pub async fn refresh_profile(&self, session: &mut SessionManager) -> Result<UserProfile, GenerationError> {
        let Some(token) = session.token().map(str::to_owned) else {
            return Err(GenerationError::Unauthenticated);
        };

        let response = self
            .transport
            .send(ApiRequest::get(PROFILE_PATH).with_bearer(token))
            .await?;

        if response.status == STATUS_UNAUTHORIZED {
            session.receive_unauthorized();
            return Err(GenerationError::Unauthenticated);
        }
        if !response.is_success() {
            return Err(request_failed(&response));
        }
        let user: UserProfile = response
            .parse()
            .map_err(|e| GenerationError::RequestFailed(format!("malformed profile: {e}")))?;
        tracing::debug!(username = %user.username, balance = user.balance, "profile refreshed");
        session.set_profile(user.clone());
        Ok(user)
    }

    /// Send a request that needs no session (templates, login, register).
    ///
    /// # Errors
    ///
    /// `RequestFailed` for any non-success response or transport failure.
    pub async fn send_public(&self, request: ApiRequest) -> Result<Value, GenerationError> {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(request_failed(&response));
        }
        Ok(response.body)
    }

    /// The spend already happened, so a failed refresh never fails the call.
    async fn refresh_after_spend(&self, session: &mut SessionManager) {
        match self.refresh_profile(session).await {
            Ok(_) => {}
            Err(GenerationError::Unauthenticated) => {
                tracing::warn!("session rejected during balance refresh; result still delivered");
            }
            Err(e) => {
                tracing::warn!(error = %e, "balance refresh failed; keeping last known balance");
                session.mark_balance_stale();
            }
        }
    }
}

fn request_failed(response: &ApiResponse) -> GenerationError {
    GenerationError::RequestFailed(response.detail().unwrap_or_else(|| GENERIC_FAILURE.to_owned()))
}
