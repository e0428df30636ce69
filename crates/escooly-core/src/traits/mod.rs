//! Core traits for session persistence and user notifications.

mod notify;
mod store;

pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use store::{MemoryStore, SessionStore, StorageKey};
