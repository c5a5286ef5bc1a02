use crate::domain::model::{MailMessage, NotifyOutcome, RunSummary};
use crate::domain::ports::MailTransport;

const DISPLAY_DATE: &str = "%m/%d/%Y";

pub struct Notifier<M: MailTransport> {
    transport: M,
    sender: String,
    recipient: String,
}

impl<M: MailTransport> Notifier<M> {
    pub fn new(transport: M, sender: &str, recipient: &str) -> Self {
        Self {
            transport,
            sender: sender.to_string(),
            recipient: recipient.to_string(),
        }
    }

    pub fn compose(&self, summary: &RunSummary) -> MailMessage {
        compose_summary(&self.sender, &self.recipient, summary)
    }

    /// Best effort: a delivery failure comes back as [`NotifyOutcome::Failed`].
    pub async fn notify(&self, summary: &RunSummary) -> NotifyOutcome {
        let message = self.compose(summary);
        match self.transport.send(&message).await {
            Ok(()) => NotifyOutcome::Sent {
                recipient: self.recipient.clone(),
            },
            Err(e) => NotifyOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

pub fn compose_summary(sender: &str, recipient: &str, summary: &RunSummary) -> MailMessage {
    let start = summary.window_start.format(DISPLAY_DATE);
    let end = summary.window_end.format(DISPLAY_DATE);
    let plural = if summary.record_count == 1 { "" } else { "s" };

    let subject = format!(
        "Transit dataset sync: {} record{} from the last window",
        summary.record_count, plural
    );

    let html_body = format!(
        "<html><body>\
         <p>The transit dataset sync finished.</p>\
         <ul>\
         <li><b>Window:</b> {start} to {end}</li>\
         <li><b>Records:</b> {count}</li>\
         </ul>\
         <p><a href=\"{url}\">Open the spreadsheet</a></p>\
         </body></html>",
        start = start,
        end = end,
        count = summary.record_count,
        url = summary.destination.url,
    );

    MailMessage {
        from: sender.to_string(),
        to: recipient.to_string(),
        subject,
        html_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DestinationRef;
    use crate::utils::error::{Result, SyncError};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<MailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, message: &MailMessage) -> Result<()> {
            if self.fail {
                return Err(SyncError::MailError {
                    message: "535 authentication rejected".to_string(),
                });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn summary(count: usize) -> RunSummary {
        RunSummary {
            window_start: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            window_end: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            record_count: count,
            destination: DestinationRef {
                id: "abc123".to_string(),
                url: "https://docs.google.com/spreadsheets/d/abc123".to_string(),
            },
        }
    }

    #[test]
    fn test_message_states_count_window_and_link() {
        let message = compose_summary("bot@example.org", "ops@example.org", &summary(2));

        assert!(message.subject.contains("2 records"));
        assert!(message.html_body.contains("06/01/2024 to 07/01/2024"));
        assert!(message.html_body.contains("<b>Records:</b> 2"));
        assert!(message
            .html_body
            .contains("https://docs.google.com/spreadsheets/d/abc123"));
        assert_eq!(message.from, "bot@example.org");
        assert_eq!(message.to, "ops@example.org");
    }

    #[test]
    fn test_singular_subject() {
        let message = compose_summary("a@example.org", "b@example.org", &summary(1));
        assert!(message.subject.contains("1 record from"));
    }

    #[tokio::test]
    async fn test_notify_sends_one_message() {
        let notifier = Notifier::new(RecordingTransport::default(), "bot@example.org", "ops@example.org");

        let outcome = notifier.notify(&summary(3)).await;

        assert_eq!(
            outcome,
            NotifyOutcome::Sent {
                recipient: "ops@example.org".to_string()
            }
        );
        assert_eq!(notifier.transport.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported_not_raised() {
        let transport = RecordingTransport {
            fail: true,
            ..Default::default()
        };
        let notifier = Notifier::new(transport, "bot@example.org", "ops@example.org");

        let outcome = notifier.notify(&summary(3)).await;

        assert!(matches!(outcome, NotifyOutcome::Failed { reason } if reason.contains("535")));
    }
}
