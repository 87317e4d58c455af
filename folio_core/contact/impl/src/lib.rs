use std::sync::Arc;

use folio_core_contact_contracts::{ContactSendMessageError, ContactService};
use folio_email_contracts::{Email, EmailService};
use folio_models::{contact::ContactMessage, email_address::EmailAddressWithName};

#[derive(Debug, Clone)]
pub struct ContactServiceImpl<Email> {
    email: Email,
    config: ContactServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ContactServiceConfig {
    /// Operator address all contact messages are relayed to.
    pub recipient: Arc<EmailAddressWithName>,
}

impl<Email> ContactServiceImpl<Email> {
    pub fn new(email: Email, config: ContactServiceConfig) -> Self {
        Self { email, config }
    }
}

impl<EmailS> ContactService for ContactServiceImpl<EmailS>
where
    EmailS: EmailService,
{
    async fn send_message(&self, message: ContactMessage) -> Result<(), ContactSendMessageError> {
        let email = Email {
            recipient: (*self.config.recipient).clone(),
            subject: format!("[Contact Form] {}", *message.subject),
            text: text_body(&message),
            html: Some(html_body(&message)),
            // Replies should reach the submitter, not the service.
            reply_to: Some(message.author.email.into()),
        };

        if !self.email.send(email).await? {
            return Err(ContactSendMessageError::Send);
        }

        Ok(())
    }
}

fn text_body(message: &ContactMessage) -> String {
    format!(
        "New message from contact form\n\nName: {}\nEmail: {}\nSubject: {}\nMessage:\n{}",
        *message.author.name, message.author.email, *message.subject, *message.content
    )
}

fn html_body(message: &ContactMessage) -> String {
    format!(
        "<div style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2>New message from contact form</h2>\
         <p><strong>Name:</strong> {}</p>\
         <p><strong>Email:</strong> {}</p>\
         <p><strong>Subject:</strong> {}</p>\
         <p><strong>Message:</strong></p>\
         <p>{}</p>\
         </div>",
        escape_html(&message.author.name),
        escape_html(message.author.email.as_str()),
        escape_html(&message.subject),
        escape_html(&message.content),
    )
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
