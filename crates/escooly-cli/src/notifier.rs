//! Terminal rendering of user notifications.

use colored::Colorize;

use escooly_core::{Notification, NotificationLevel, Notifier};

/// Writes notifications to stderr as coloured one-liners.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", render(&notification));
    }
}

fn render(notification: &Notification) -> String {
    let marker = match notification.level {
        NotificationLevel::Success => "✓".green(),
        NotificationLevel::Error => "✗".red(),
        NotificationLevel::Info => "•".blue(),
    };

    if notification.description.is_empty() {
        format!("{} {}", marker, notification.title.bold())
    } else {
        format!(
            "{} {}: {}",
            marker,
            notification.title.bold(),
            notification.description
        )
    }
}
