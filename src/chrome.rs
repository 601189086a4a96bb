use serde::Deserialize;
use tokio::sync::mpsc;

use crate::types::User;

/// Labels prefixed to an item number in the title bar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TitleLabels {
    pub issue: String,
    pub pull_request: String,
}

impl Default for TitleLabels {
    fn default() -> Self {
        Self {
            issue: "Issue #".to_string(),
            pull_request: "Pull Request #".to_string(),
        }
    }
}

impl TitleLabels {
    pub fn title(&self, number: u64, pull_request: bool) -> String {
        let label = if pull_request {
            &self.pull_request
        } else {
            &self.issue
        };
        format!("{}{}", label, number)
    }
}

/// Title, subtitle and owner shown around the current page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chrome {
    pub title: String,
    pub subtitle: Option<String>,
    pub owner: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChromeEvent {
    TitleChanged(String),
    SubtitleChanged(Option<String>),
    OwnerChanged(Option<User>),
}

/// Holds the chrome state and fans every change out to subscribers.
/// Receivers see their stream close when the bus is dropped.
#[derive(Debug, Default)]
pub struct ChromeBus {
    state: Chrome,
    subscribers: Vec<mpsc::UnboundedSender<ChromeEvent>>,
}

impl ChromeBus {
    pub fn state(&self) -> &Chrome {
        &self.state
    }

    /// Subscribe to chrome changes. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ChromeEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn set_title(&mut self, title: String) {
        if self.state.title != title {
            self.state.title = title.clone();
            self.emit(ChromeEvent::TitleChanged(title));
        }
    }

    pub fn set_subtitle(&mut self, subtitle: Option<String>) {
        if self.state.subtitle != subtitle {
            self.state.subtitle = subtitle.clone();
            self.emit(ChromeEvent::SubtitleChanged(subtitle));
        }
    }

    pub fn set_owner(&mut self, owner: Option<User>) {
        if self.state.owner != owner {
            self.state.owner = owner.clone();
            self.emit(ChromeEvent::OwnerChanged(owner));
        }
    }

    fn emit(&mut self, event: ChromeEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_uses_pull_request_label() {
        let labels = TitleLabels::default();
        assert_eq!(labels.title(7, true), "Pull Request #7");
        assert_eq!(labels.title(42, false), "Issue #42");
    }

    #[test]
    fn title_does_not_depend_on_call_order() {
        let labels = TitleLabels::default();
        let first = labels.title(42, false);
        labels.title(7, true);
        assert_eq!(labels.title(42, false), first);
    }

    #[test]
    fn subscribers_receive_changes_only() {
        let mut bus = ChromeBus::default();
        let mut rx = bus.subscribe();

        bus.set_title("Issue #1".to_string());
        bus.set_title("Issue #1".to_string());
        bus.set_owner(Some(User::new("alice")));

        assert_eq!(rx.try_recv().unwrap(), ChromeEvent::TitleChanged("Issue #1".into()));
        assert_eq!(
            rx.try_recv().unwrap(),
            ChromeEvent::OwnerChanged(Some(User::new("alice")))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut bus = ChromeBus::default();
        let rx = bus.subscribe();
        drop(rx);
        bus.set_subtitle(Some("alice/repo1".to_string()));
        assert!(bus.subscribers.is_empty());
    }

    #[test]
    fn dropping_bus_closes_stream() {
        let mut bus = ChromeBus::default();
        let mut rx = bus.subscribe();
        drop(bus);
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
