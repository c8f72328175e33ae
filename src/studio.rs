//! Application context.
//!
//! [`Studio`] owns the canvas engine, the session, the request pipeline, and
//! the template catalog. Hosts construct one at startup, drive it from their
//! event loop, and call [`Studio::dispose`] on the way out. All methods take
//! `&mut self`, so at most one generation is in flight per studio.

#[cfg(test)]
#[path = "studio_test.rs"]
mod studio_test;

use std::sync::Arc;

use canvas::doc::{ImagePayload, ObjectId};
use canvas::engine::{Action, Engine};
use canvas::render::{Rasterizer, SoftwareRasterizer};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::StudioConfig;
use crate::error::{GenerationError, TransportError};
use crate::generation::{
    AvatarRequest, CanvasRequest, GenerationRequest, ImageRequest, ImageResult, MusicRequest, MusicResult,
    RechargeRequest, RechargeResult, VideoRequest, VideoResult, parse_result, require,
};
use crate::net::{ApiRequest, HttpTransport, TokenResponse, Transport, UserProfile};
use crate::pipeline::AuthenticatedPipeline;
use crate::session::{CredentialStore, FileCredentialStore, SessionManager};
use crate::templates::{TEMPLATES_PATH, TemplateCatalog};

pub const LOGIN_PATH: &str = "/auth/token";
pub const REGISTER_PATH: &str = "/auth/register";

/// A generated image placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasResult {
    pub id: ObjectId,
    pub image_url: String,
    pub message: Option<String>,
    /// Engine actions for the host to apply.
    pub actions: Vec<Action>,
}

pub struct Studio {
    engine: Engine,
    session: SessionManager,
    pipeline: AuthenticatedPipeline,
    catalog: TemplateCatalog,
    rasterizer: Box<dyn Rasterizer + Send + Sync>,
}

impl Studio {
    /// Wire a studio from explicit collaborators.
    #[must_use]
    pub fn new(config: &StudioConfig, transport: Arc<dyn Transport>, store: Box<dyn CredentialStore>) -> Self {
        Self {
            engine: Engine::new(config.surface_width, config.surface_height),
            session: SessionManager::new(store),
            pipeline: AuthenticatedPipeline::new(transport),
            catalog: TemplateCatalog::default(),
            rasterizer: Box::new(SoftwareRasterizer),
        }
    }

    /// HTTP transport plus the file credential store named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: &StudioConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.base_url.clone(), config.timeouts)?;
        let store = FileCredentialStore::new(config.credential_path.clone());
        Ok(Self::new(config, Arc::new(transport), Box::new(store)))
    }

    #[must_use]
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn Rasterizer + Send + Sync>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    // --- Lifecycle ---

    /// Adopt a stored credential and load the profile behind it.
    ///
    /// Returns whether a session is active afterwards. An expired credential
    /// is cleared and reported as `false`. Any other refresh failure keeps
    /// the session with a stale balance.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Credential`] if the store cannot be read.
    pub async fn startup(&mut self) -> Result<bool, GenerationError> {
        if !self.session.restore()? {
            return Ok(false);
        }
        match self.pipeline.refresh_profile(&mut self.session).await {
            Ok(user) => {
                tracing::info!(username = %user.username, balance = user.balance, "studio started");
                Ok(true)
            }
            Err(GenerationError::Unauthenticated) => Ok(false),
            Err(e) => {
                tracing::warn!(error = %e, "profile unavailable at startup");
                self.session.mark_balance_stale();
                Ok(true)
            }
        }
    }

    /// Tear down. The stored credential survives for the next startup.
    pub fn dispose(mut self) {
        self.engine.clear();
        tracing::info!("studio disposed");
    }

    // --- Account ---

    /// Exchange a username and password for a session.
    ///
    /// # Errors
    ///
    /// `Validation` for blank input, `RequestFailed` if the server refuses,
    /// `Credential` if the token cannot be stored. If the follow-up profile
    /// fetch fails, the new session is rolled back and that error returned.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<UserProfile, GenerationError> {
        require("username", username)?;
        require("password", password)?;
        let body = self
            .pipeline
            .send_public(ApiRequest::post_form(LOGIN_PATH, &[("username", username), ("password", password)]))
            .await?;
        let token: TokenResponse = parse_result(body)?;
        self.session.login(&token.access_token)?;

        match self.pipeline.refresh_profile(&mut self.session).await {
            Ok(user) => Ok(user),
            Err(e) => {
                if self.session.is_authenticated() {
                    if let Err(clear) = self.session.logout() {
                        tracing::warn!(error = %clear, "stored credential could not be cleared after failed login");
                    }
                }
                Err(e)
            }
        }
    }

    /// Create an account, then log into it.
    ///
    /// # Errors
    ///
    /// See [`Studio::login`].
    pub async fn register(&mut self, username: &str, password: &str) -> Result<UserProfile, GenerationError> {
        require("username", username)?;
        require("password", password)?;
        self.pipeline
            .send_public(ApiRequest::post_json(
                REGISTER_PATH,
                json!({ "username": username, "password": password }),
            ))
            .await?;
        tracing::info!(username, "account registered");
        self.login(username, password).await
    }

    /// # Errors
    ///
    /// Returns [`GenerationError::Credential`] if the stored credential
    /// cannot be removed; the session is gone regardless.
    pub fn logout(&mut self) -> Result<(), GenerationError> {
        self.session.logout()?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`AuthenticatedPipeline::refresh_profile`].
    pub async fn refresh_profile(&mut self) -> Result<UserProfile, GenerationError> {
        self.pipeline.refresh_profile(&mut self.session).await
    }

    /// Top up the balance. The new balance is fetched afterwards.
    ///
    /// # Errors
    ///
    /// `Validation` for a non-positive amount, otherwise as [`AuthenticatedPipeline::call`].
    pub async fn recharge(&mut self, amount: f64) -> Result<RechargeResult, GenerationError> {
        self.submit(&RechargeRequest::new(amount)).await
    }

    /// Fetch and cache the prompt templates. No session needed.
    ///
    /// # Errors
    ///
    /// `RequestFailed` or `InvalidResult`; the previous catalog is kept.
    pub async fn load_templates(&mut self) -> Result<&TemplateCatalog, GenerationError> {
        let body = self.pipeline.send_public(ApiRequest::get(TEMPLATES_PATH)).await?;
        self.catalog = TemplateCatalog::parse(body)?;
        tracing::debug!(count = self.catalog.len(), "templates loaded");
        Ok(&self.catalog)
    }

    // --- Generation ---

    /// # Errors
    ///
    /// See [`AuthenticatedPipeline::call`].
    pub async fn generate_image(&mut self, prompt: &str) -> Result<ImageResult, GenerationError> {
        self.submit(&ImageRequest::new(prompt)).await
    }

    /// # Errors
    ///
    /// See [`AuthenticatedPipeline::call`].
    pub async fn generate_video(&mut self, prompt: &str) -> Result<VideoResult, GenerationError> {
        self.submit(&VideoRequest::new(prompt)).await
    }

    /// # Errors
    ///
    /// See [`AuthenticatedPipeline::call`].
    pub async fn generate_veo(&mut self, prompt: &str) -> Result<VideoResult, GenerationError> {
        self.submit(&VideoRequest::veo(prompt)).await
    }

    /// # Errors
    ///
    /// See [`AuthenticatedPipeline::call`].
    pub async fn generate_music(&mut self, prompt: &str) -> Result<MusicResult, GenerationError> {
        self.submit(&MusicRequest::new(prompt)).await
    }

    /// # Errors
    ///
    /// See [`AuthenticatedPipeline::call`].
    pub async fn generate_avatar(&mut self, text: &str) -> Result<VideoResult, GenerationError> {
        self.submit(&AvatarRequest::new(text)).await
    }

    /// Regenerate the framed region (or the whole surface) from `prompt` and
    /// place the result on the canvas.
    ///
    /// Nothing is inserted unless every step succeeds.
    ///
    /// # Errors
    ///
    /// `Validation` and `Unauthenticated` before any capture or request,
    /// `Capture` if the region cannot be exported, `InvalidResult` if the
    /// returned image cannot be fetched or decoded, otherwise as
    /// [`AuthenticatedPipeline::call`].
    pub async fn generate_canvas(&mut self, prompt: &str) -> Result<CanvasResult, GenerationError> {
        require("prompt", prompt)?;
        if !self.session.is_authenticated() {
            return Err(GenerationError::Unauthenticated);
        }

        let region = self.engine.capture_region(self.rasterizer.as_ref())?;
        let request = CanvasRequest::new(prompt, region.to_data_url()?);
        let result: ImageResult = self.submit(&request).await?;

        let bytes = self
            .pipeline
            .transport()
            .fetch_bytes(&result.image_url)
            .await
            .map_err(|e| GenerationError::InvalidResult(e.to_string()))?;
        let pixels = image::load_from_memory(&bytes)
            .map_err(|e| GenerationError::InvalidResult(format!("undecodable image: {e}")))?
            .to_rgba8();

        let (id, actions) = self
            .engine
            .place_result(ImagePayload::new(pixels, Some(result.image_url.clone())));
        tracing::info!(%id, url = %result.image_url, "canvas result placed");
        Ok(CanvasResult { id, image_url: result.image_url, message: result.message, actions })
    }

    async fn submit<Q, T>(&mut self, request: &Q) -> Result<T, GenerationError>
    where
        Q: GenerationRequest + Sync,
        T: DeserializeOwned,
    {
        let body = request.to_body()?;
        let response = self.pipeline.call(&mut self.session, Q::PATH, body).await?;
        tracing::info!(path = Q::PATH, balance = ?self.session.balance(), "request completed");
        parse_result(response)
    }

    // --- Accessors ---

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    #[must_use]
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn balance(&self) -> Option<f64> {
        self.session.balance()
    }
}
