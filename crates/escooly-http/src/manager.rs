//! Session state machine.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use escooly_core::error::{Error, InvalidInputError, PreconditionError};
use escooly_core::{AuthState, Credentials, Session, SessionStore, UserProfile};

use crate::client::ApiClient;
use crate::endpoints::AuthResponse;
use crate::repository::AuthRepository;

/// Reactive auth state backed by the persistent store.
///
/// The store is the source of truth. The state held here is a cache of it,
/// refreshed by every operation below and dropped to
/// [`AuthState::Unauthenticated`] as soon as the client reports that a 401
/// wiped the store.
///
/// State starts as [`AuthState::Unknown`]; call [`restore`](Self::restore)
/// at startup. Changes are published on a `watch` channel, see
/// [`subscribe`](Self::subscribe).
pub struct SessionManager {
    client: ApiClient,
    repository: AuthRepository,
    store: Arc<dyn SessionStore>,
    state: watch::Sender<AuthState>,
    seen_expirations: AtomicU64,
    // Serializes operations that write the store.
    ops: Mutex<()>,
}

impl SessionManager {
    /// Create a manager over the client's store.
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self {
            repository: AuthRepository::new(client.clone()),
            store: Arc::clone(client.store()),
            seen_expirations: AtomicU64::new(client.expirations()),
            client,
            state,
            ops: Mutex::new(()),
        }
    }

    /// Current state.
    pub fn state(&self) -> AuthState {
        self.reconcile();
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.reconcile();
        self.state.borrow().is_authenticated()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.reconcile();
        self.state.borrow().user().cloned()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.reconcile();
        self.state.subscribe()
    }

    pub fn repository(&self) -> &AuthRepository {
        &self.repository
    }

    /// Check the store for a session left by a previous run.
    ///
    /// A store that cannot be read counts as signed out.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> AuthState {
        let _guard = self.ops.lock().await;

        let observed = self.client.expirations();
        let state = match self.store.load_session().await {
            Ok(Some(session)) => AuthState::Authenticated { user: session.user },
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "Could not read stored session, treating as signed out");
                AuthState::Unauthenticated
            }
        };

        debug!(authenticated = state.is_authenticated(), "Session restored");
        self.publish(state, observed);
        self.state()
    }

    /// Sign in and persist the session.
    ///
    /// On any failure the state is left as it was and the error is returned,
    /// so the caller can map field errors onto its form.
    #[instrument(skip(self, email, password))]
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthResponse, Error> {
        let credentials = Credentials::new(email, password);
        let _guard = self.ops.lock().await;

        let response = self.repository.login(&credentials).await.inspect_err(|e| {
            warn!(error = %e, "Login failed");
        })?;

        if response.access_token.is_empty() {
            return Err(InvalidInputError::Response {
                message: "no access token received".to_string(),
            }
            .into());
        }

        let session = Session::new(
            response.access_token.clone(),
            response.token_type.clone(),
            response.user.clone(),
        );
        let observed = self.client.expirations();
        self.store.save_session(&session).await?;

        self.publish(
            AuthState::Authenticated {
                user: response.user.clone(),
            },
            observed,
        );
        info!("Logged in");
        Ok(response)
    }

    /// Sign out locally, telling the server if it is reachable.
    ///
    /// Always ends signed out with an empty store, whatever the remote call
    /// or the store report.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let _guard = self.ops.lock().await;

        if let Err(e) = self.repository.logout().await {
            warn!(error = %e, "Logout request failed");
        }

        let observed = self.client.expirations();
        if let Err(e) = self.store.clear_session().await {
            warn!(error = %e, "Failed to clear stored session");
        }

        self.publish(AuthState::Unauthenticated, observed);
        info!("Logged out");
    }

    /// Replace the stored token with a fresh one from the server.
    ///
    /// The current user is kept unless the server sends a new profile.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AuthResponse, Error> {
        let _guard = self.ops.lock().await;

        let current = self
            .store
            .load_session()
            .await?
            .ok_or(PreconditionError::NoSession)?;

        let response = self.repository.refresh().await?;
        if response.access_token.is_empty() {
            return Err(InvalidInputError::Response {
                message: "no access token received".to_string(),
            }
            .into());
        }

        let user = response.user.clone().or(current.user);
        let session = Session::new(
            response.access_token.clone(),
            response.token_type.clone(),
            user.clone(),
        );
        let observed = self.client.expirations();
        self.store.save_session(&session).await?;

        self.publish(AuthState::Authenticated { user }, observed);
        info!("Token refreshed");
        Ok(response)
    }

    /// Fetch the profile from the server and store it with the current token.
    #[instrument(skip(self))]
    pub async fn refresh_profile(&self) -> Result<UserProfile, Error> {
        let _guard = self.ops.lock().await;

        let current = self
            .store
            .load_session()
            .await?
            .ok_or(PreconditionError::NoSession)?;

        let user = self.repository.me().await?;
        let session = Session {
            user: Some(user.clone()),
            ..current
        };
        let observed = self.client.expirations();
        self.store.save_session(&session).await?;

        self.publish(
            AuthState::Authenticated {
                user: Some(user.clone()),
            },
            observed,
        );
        debug!("Profile refreshed");
        Ok(user)
    }

    /// Publish a state derived from the store as it was when the expiry
    /// counter read `observed`. A 401 handled after that point is picked up
    /// by the next [`reconcile`](Self::reconcile).
    fn publish(&self, state: AuthState, observed: u64) {
        self.seen_expirations.store(observed, Ordering::SeqCst);
        self.state.send_replace(state);
    }

    /// Drop to signed out if a 401 cleared the store since we last looked.
    fn reconcile(&self) {
        let current = self.client.expirations();
        let seen = self.seen_expirations.swap(current, Ordering::SeqCst);
        if current == seen {
            return;
        }

        self.state.send_if_modified(|state| {
            if state.is_authenticated() {
                info!("Session expired on the server, signing out locally");
                *state = AuthState::Unauthenticated;
                true
            } else {
                false
            }
        });
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("client", &self.client)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
