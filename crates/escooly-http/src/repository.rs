//! Auth endpoints.

use serde_json::{Value, json};
use tracing::{debug, instrument};

use escooly_core::error::Error;
use escooly_core::{Credentials, UserProfile};

use crate::client::{ApiClient, ApiRequest};
use crate::endpoints::{self, AuthResponse, Envelope, LOGIN, LOGOUT, ME, REFRESH};

/// Translates auth intents into calls on the shared [`ApiClient`].
///
/// The repository holds no state of its own; persisting what it returns is
/// the [`SessionManager`](crate::SessionManager)'s job.
#[derive(Debug, Clone)]
pub struct AuthRepository {
    client: ApiClient,
}

impl AuthRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token and the user's profile.
    ///
    /// Missing credentials fail locally without a request.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, Error> {
        credentials.validate()?;
        debug!("Logging in");

        let request = ApiRequest::post(LOGIN).json(json!({
            "email": credentials.email().trim(),
            "password": credentials.password(),
        }));

        let envelope: Envelope<AuthResponse> = self.client.send(request).await?;
        Ok(envelope.into_inner())
    }

    /// Tell the server the token is no longer in use.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), Error> {
        debug!("Logging out");
        self.client.send_empty(ApiRequest::post(LOGOUT)).await
    }

    /// Trade the current token for a fresh one.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AuthResponse, Error> {
        debug!("Refreshing token");
        let envelope: Envelope<AuthResponse> = self
            .client
            .send(ApiRequest::post(REFRESH).json(json!({})))
            .await?;
        Ok(envelope.into_inner())
    }

    /// Fetch the signed-in user's profile.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, Error> {
        debug!("Fetching profile");
        let body: Value = self.client.send(ApiRequest::get(ME)).await?;
        Ok(endpoints::profile_from(body))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}
