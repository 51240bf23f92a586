use std::sync::Arc;

use anyhow::Result;
use lettre::{
    message::{Mailbox, MessageBuilder},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

pub struct Mailer {
    from: Mailbox,
    smtp_transport: Arc<SmtpTransport>,
    payload_rx: mpsc::UnboundedReceiver<MailPayload>,
}

impl Mailer {
    pub fn new(
        smtp_host: &str,
        smtp_username: &str,
        smtp_password: &str,
        sender: &str,
    ) -> Result<(Self, MailSender)> {
        fb_log::info(Some("⚡"), "[Mailer] Initializing component");

        let (payload_tx, payload_rx) = mpsc::unbounded_channel();

        let smtp_transport = SmtpTransport::relay(smtp_host)?
            .credentials(Credentials::new(
                smtp_username.to_owned(),
                smtp_password.to_owned(),
            ))
            .build();

        Ok((
            Self {
                from: sender.parse()?,
                smtp_transport: Arc::new(smtp_transport),
                payload_rx,
            },
            MailSender::new(payload_tx),
        ))
    }

    pub fn run_none() -> JoinHandle<()> {
        fb_log::info(Some("⏩"), "[Mailer] Skipping component");

        tokio::spawn(async {})
    }

    pub fn run(mut self, cancel_token: CancellationToken) -> JoinHandle<()> {
        fb_log::info(Some("💫"), "[Mailer] Running component");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    payload = self.payload_rx.recv() => {
                        let Some(payload) = payload else {
                            break;
                        };
                        let message = match build_message(Message::builder().from(self.from.clone()), payload) {
                            Ok(message) => message,
                            Err(err) => {
                                fb_log::error(None, format!("[Mailer] Failed to build message: {err}"));
                                continue;
                            }
                        };
                        let smtp_transport = self.smtp_transport.clone();
                        match tokio::task::spawn_blocking(move || smtp_transport.send(&message)).await {
                            Ok(Ok(_)) => (),
                            Ok(Err(err)) => fb_log::error(None, format!("[Mailer] Failed to send mail: {err}")),
                            Err(err) => fb_log::error(None, format!("[Mailer] Sending task failed: {err}")),
                        }
                    }
                }
            }

            fb_log::info(None, "[Mailer] Shutting down component");
        })
    }
}

fn build_message(builder: MessageBuilder, payload: MailPayload) -> Result<Message> {
    Ok(builder
        .to(payload.to.parse()?)
        .subject(payload.subject)
        .body(payload.body)?)
}

#[derive(Clone)]
pub struct MailSender {
    payload_tx: mpsc::UnboundedSender<MailPayload>,
}

impl MailSender {
    pub fn new(payload_tx: mpsc::UnboundedSender<MailPayload>) -> Self {
        Self { payload_tx }
    }

    pub fn send(&self, payload: MailPayload) -> Result<()> {
        self.payload_tx.send(payload)?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct MailPayload {
    to: String,
    subject: String,
    body: String,
}

impl MailPayload {
    pub fn new(to: &str, subject: &str, body: &str) -> Self {
        Self {
            to: to.to_owned(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        }
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_queues_payloads() {
        let (payload_tx, mut payload_rx) = mpsc::unbounded_channel();
        let sender = MailSender::new(payload_tx);

        sender
            .send(MailPayload::new("funder@example.com", "Receipt", "Thanks"))
            .unwrap();

        let payload = payload_rx.try_recv().unwrap();
        assert_eq!(payload.to(), "funder@example.com");
        assert_eq!(payload.subject(), "Receipt");
    }

    #[test]
    fn rejects_invalid_recipient() {
        let builder = Message::builder().from("Fundbase <noreply@example.com>".parse().unwrap());
        assert!(build_message(builder, MailPayload::new("not an address", "s", "b")).is_err());
    }
}
