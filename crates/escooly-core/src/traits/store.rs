//! Persistent session store trait.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::error::StorageError;
use crate::session::{Session, UserProfile};
use crate::tokens::{AccessToken, TokenType};

/// Keys of the session namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageKey {
    AuthToken,
    /// Never written. Older installs stored a copy of the access token
    /// here, so it is still removed on clear.
    RefreshToken,
    TokenType,
    UserData,
}

impl StorageKey {
    /// Every key in the namespace.
    pub const ALL: [StorageKey; 4] = [
        StorageKey::AuthToken,
        StorageKey::RefreshToken,
        StorageKey::TokenType,
        StorageKey::UserData,
    ];

    /// The key's name in the backing store.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AuthToken => "auth_token",
            StorageKey::RefreshToken => "refresh_token",
            StorageKey::TokenType => "token_type",
            StorageKey::UserData => "user_data",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value storage that outlives the process.
///
/// Implementors provide the three key-level operations. The rest of the
/// client only uses the session-level methods, which keep the four keys
/// consistent with each other.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read one key.
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Write several keys in one operation.
    async fn set(&self, entries: &[(StorageKey, String)]) -> Result<(), StorageError>;

    /// Remove several keys in one operation. Missing keys are not an error.
    async fn remove(&self, keys: &[StorageKey]) -> Result<(), StorageError>;

    /// The stored access token, if any.
    async fn access_token(&self) -> Result<Option<AccessToken>, StorageError> {
        Ok(self
            .get(StorageKey::AuthToken)
            .await?
            .filter(|token| !token.is_empty())
            .map(AccessToken::new))
    }

    /// Load the stored session.
    ///
    /// Returns `None` unless both the token and the user data are present.
    /// Undecodable user data is reported as [`StorageError::Corrupt`].
    async fn load_session(&self) -> Result<Option<Session>, StorageError> {
        let Some(token) = self.access_token().await? else {
            return Ok(None);
        };
        let Some(user_data) = self.get(StorageKey::UserData).await? else {
            return Ok(None);
        };

        let user: Option<UserProfile> =
            serde_json::from_str(&user_data).map_err(|e| StorageError::Corrupt {
                key: StorageKey::UserData.to_string(),
                reason: e.to_string(),
            })?;

        let token_type = self
            .get(StorageKey::TokenType)
            .await?
            .filter(|t| !t.is_empty())
            .map(TokenType::new)
            .unwrap_or_default();

        Ok(Some(Session::new(token, token_type, user)))
    }

    /// Persist a session in a single write.
    async fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        let user_data = serde_json::to_string(&session.user).map_err(|e| StorageError::Corrupt {
            key: StorageKey::UserData.to_string(),
            reason: e.to_string(),
        })?;

        self.set(&[
            (
                StorageKey::AuthToken,
                session.access_token.as_str().to_string(),
            ),
            (StorageKey::TokenType, session.token_type.as_str().to_string()),
            (StorageKey::UserData, user_data),
        ])
        .await?;

        debug!("Session saved");
        Ok(())
    }

    /// Remove every session key.
    async fn clear_session(&self) -> Result<(), StorageError> {
        self.remove(&StorageKey::ALL).await?;
        debug!("Session cleared");
        Ok(())
    }
}

/// Process-local store, for tests and sessions that should not persist.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<StorageKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StorageError {
        StorageError::io("memory store", "lock poisoned")
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(&key).cloned())
    }

    async fn set(&self, new_entries: &[(StorageKey, String)]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        for (key, value) in new_entries {
            entries.insert(*key, value.clone());
        }
        Ok(())
    }

    async fn remove(&self, keys: &[StorageKey]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}
