//! escooly-core - Core session types and traits.
//!
//! Everything the client needs to describe an authenticated session lives
//! here: credentials, tokens, the user profile, the error taxonomy, and the
//! [`SessionStore`] and [`Notifier`] seams that the HTTP layer is built on.

pub mod body;
pub mod credentials;
pub mod error;
pub mod field_errors;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use body::{FilePart, FileSource, FormField, RequestBody};
pub use credentials::Credentials;
pub use error::Error;
pub use field_errors::FieldErrors;
pub use session::{AuthState, Session, UserProfile};
pub use tokens::{AccessToken, TokenType};
pub use traits::{
    MemoryStore, Notification, NotificationLevel, Notifier, SessionStore, StorageKey,
    TracingNotifier,
};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
