//! Shared HTTP request pipeline.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use escooly_core::error::{Error, InvalidInputError};
use escooly_core::{Notifier, RequestBody, SessionStore};

use crate::config::ClientConfig;
use crate::encode::{self, EncodedBody};
use crate::failure::{self, Failure};

/// One outbound call, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<RequestBody>,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn json(self, value: Value) -> Self {
        self.body(RequestBody::Json(value))
    }

    /// Add a header. A `Content-Type` set here is dropped when the body
    /// goes out as multipart, so the boundary is always correct.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// The HTTP client adapter.
///
/// Every request goes through the same steps: the stored access token is
/// attached as a bearer header, the body is encoded (multipart when a form
/// carries a file), and failures are classified, reported through the
/// [`Notifier`], and returned as an [`Error`]. A 401 response also wipes the
/// stored session.
///
/// Cloning is cheap; clones share the connection pool, store and notifier.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    expirations: AtomicU64,
}

impl ApiClient {
    /// Build a client. Call once at startup and share the result.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| InvalidInputError::Other {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                store,
                notifier,
                expirations: AtomicU64::new(0),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The store tokens are read from and cleared in.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// Number of 401 responses handled so far.
    pub fn expirations(&self) -> u64 {
        self.inner.expirations.load(Ordering::SeqCst)
    }

    /// Send a request and decode the JSON response body.
    ///
    /// An empty body decodes as JSON `null`.
    pub async fn send<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, Error> {
        let path = request.path.clone();
        let bytes = self.execute(request).await?;

        let decoded = if is_blank(&bytes) {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_slice(&bytes)
        };
        decoded.map_err(|e| {
            InvalidInputError::Response {
                message: format!("{}: {}", path, e),
            }
            .into()
        })
    }

    /// Send a request whose response body is ignored, whatever its format.
    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), Error> {
        self.execute(request).await.map(|_| ())
    }

    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, Error> {
        let ApiRequest {
            method,
            path,
            body,
            mut headers,
        } = request;
        let url = self.inner.config.base_url.endpoint(&path);

        self.authorize(&mut headers).await;
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }

        let mut builder = self.inner.http.request(method.clone(), &url);
        if let Some(body) = body {
            builder = match encode::encode(body).await? {
                EncodedBody::Json(value) => {
                    trace!(body = %value, "request body");
                    builder.json(&value)
                }
                EncodedBody::Multipart(form) => {
                    headers.remove(CONTENT_TYPE);
                    debug!("Sending multipart body");
                    builder.multipart(form)
                }
            };
        }

        debug!(%method, %url, "Request");

        let response = match builder.headers(headers).send().await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(failure::from_transport(&err)).await),
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return Err(self.fail(failure::from_transport(&err)).await),
        };

        debug!(%method, %url, status = status.as_u16(), "Response");

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let body = if is_blank(&bytes) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        trace!(%body, "error body");

        Err(self.fail(failure::from_response(status.as_u16(), body)).await)
    }

    /// Attach the stored access token. A store that cannot be read leaves
    /// the request unauthenticated.
    async fn authorize(&self, headers: &mut HeaderMap) {
        let token = match self.inner.store.access_token().await {
            Ok(Some(token)) => token,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Could not read access token, sending unauthenticated");
                return;
            }
        };

        match HeaderValue::from_str(&token.bearer_header()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored access token is not a valid header value"),
        }
    }

    /// Apply a failure's side effects and hand back its error.
    async fn fail(&self, failure: Failure) -> Error {
        let Failure {
            error,
            notification,
            expires_session,
        } = failure;

        if expires_session {
            if let Err(e) = self.inner.store.clear_session().await {
                warn!(error = %e, "Failed to clear expired session");
            }
            self.inner.expirations.fetch_add(1, Ordering::SeqCst);
        }

        warn!(error = %error, "Request failed");
        self.inner.notifier.notify(notification);
        error
    }
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("timeout", &self.inner.config.timeout)
            .finish()
    }
}
