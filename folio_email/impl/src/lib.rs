use std::time::Duration;

use anyhow::{anyhow, Context};
use folio_email_contracts::{Email, EmailService};
use folio_models::email_address::EmailAddressWithName;
use lettre::{
    message::{header, MultiPart},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    send_timeout: Duration,
}

impl EmailServiceImpl {
    pub fn new(
        url: &str,
        from: EmailAddressWithName,
        send_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)
            .context("Failed to parse smtp url")?
            .build();

        Ok(Self {
            from,
            transport,
            send_timeout,
        })
    }

    fn build_message(&self, email: Email) -> anyhow::Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .subject(email.subject);
        if let Some(reply_to) = email.reply_to {
            builder = builder.reply_to(reply_to.0);
        }

        match email.html {
            Some(html) => builder
                .multipart(MultiPart::alternative_plain_html(email.text, html))
                .map_err(Into::into),
            None => builder
                .header(header::ContentType::TEXT_PLAIN)
                .body(email.text)
                .map_err(Into::into),
        }
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<bool> {
        let message = self.build_message(email)?;

        // The smtp transport gets its own deadline so a hanging provider
        // cannot stall the inbound http request indefinitely.
        tokio::time::timeout(self.send_timeout, self.transport.send(message))
            .await
            .map_err(|_| anyhow!("Smtp transport did not respond within {:?}", self.send_timeout))?
            .map(|response| response.is_positive())
            .map_err(Into::into)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}
