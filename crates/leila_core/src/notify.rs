//! Notification channels fed by the article observer pass.
//!
//! # Responsibility
//! - Define the `Notifier` sink contract invoked by `Article::add_reader`.
//! - Provide e-mail and SMS channels that record deliveries in an outbox.
//!
//! # Invariants
//! - Channels never mutate the entity graph.
//! - Log lines carry metadata only, never reader or article names.

use log::info;
use std::cell::RefCell;
use std::fmt::{Debug, Display, Formatter};

/// Notice delivered to one subscriber when another reader joins an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderJoined {
    pub article: String,
    pub category: String,
    /// Existing subscriber receiving this notice.
    pub subscriber: String,
    /// Reader whose join triggered the notice.
    pub joined: String,
}

impl Display for ReaderJoined {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "to {}: {} joined \"{}\" ({})",
            self.subscriber, self.joined, self.article, self.category
        )
    }
}

/// Observer sink attached to articles.
pub trait Notifier: Debug {
    fn channel(&self) -> &'static str;
    fn notify(&self, notice: &ReaderJoined);
}

#[derive(Debug, Default)]
struct Outbox {
    sent: RefCell<Vec<String>>,
}

impl Outbox {
    fn deliver(&self, channel: &'static str, notice: &ReaderJoined) {
        self.sent.borrow_mut().push(notice.to_string());
        info!(
            "event=notify module=notify channel={channel} status=ok outbox_len={}",
            self.sent.borrow().len()
        );
    }

    fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }
}

/// E-mail channel.
#[derive(Debug, Default)]
pub struct EmailNotifier {
    outbox: Outbox,
}

impl EmailNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered messages, in delivery order.
    pub fn sent(&self) -> Vec<String> {
        self.outbox.sent()
    }
}

impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    fn notify(&self, notice: &ReaderJoined) {
        self.outbox.deliver(self.channel(), notice);
    }
}

/// SMS channel.
#[derive(Debug, Default)]
pub struct SmsNotifier {
    outbox: Outbox,
}

impl SmsNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<String> {
        self.outbox.sent()
    }
}

impl Notifier for SmsNotifier {
    fn channel(&self) -> &'static str {
        "sms"
    }

    fn notify(&self, notice: &ReaderJoined) {
        self.outbox.deliver(self.channel(), notice);
    }
}

#[cfg(test)]
mod tests {
    use super::{EmailNotifier, Notifier, ReaderJoined, SmsNotifier};

    fn notice() -> ReaderJoined {
        ReaderJoined {
            article: "punic wars".to_string(),
            category: "rome".to_string(),
            subscriber: "Alice".to_string(),
            joined: "Bob".to_string(),
        }
    }

    #[test]
    fn channels_record_rendered_notices() {
        let email = EmailNotifier::new();
        let sms = SmsNotifier::new();

        email.notify(&notice());
        sms.notify(&notice());
        sms.notify(&notice());

        assert_eq!(email.sent(), vec!["to Alice: Bob joined \"punic wars\" (rome)"]);
        assert_eq!(sms.sent().len(), 2);
        assert_eq!(email.channel(), "email");
        assert_eq!(sms.channel(), "sms");
    }
}
