use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::email_address::EmailAddress;

pub static CONTACT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s]+$").unwrap());

/// A fully validated contact form submission.
///
/// A value of this type only exists if all four fields passed validation,
/// so it can be handed to the email transport as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub author: ContactMessageAuthor,
    pub subject: ContactMessageSubject,
    pub content: ContactMessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessageAuthor {
    pub name: ContactMessageAuthorName,
    pub email: EmailAddress,
}

#[nutype(
    sanitize(trim),
    validate(len_char_min = 2, len_char_max = 50, regex = CONTACT_NAME_REGEX),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageAuthorName(String);

#[nutype(
    sanitize(trim),
    validate(len_char_min = 3, len_char_max = 100),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageSubject(String);

#[nutype(
    sanitize(trim),
    validate(len_char_min = 10, len_char_max = 500),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageContent(String);

/// The raw, unvalidated wire payload of `POST /api/contact`.
///
/// Shared between the service (request body) and the submission client
/// (request serialization and local validation input).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Subject => "subject",
            ContactField::Message => "message",
        }
        .fmt(f)
    }
}

/// One failed field with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFieldError {
    pub param: ContactField,
    pub msg: String,
}

pub const NAME_LENGTH_ERROR: &str = "Name must be between 2 and 50 characters";
pub const NAME_LETTERS_ERROR: &str = "Name can only contain letters";
pub const EMAIL_ERROR: &str = "Invalid email address";
pub const SUBJECT_LENGTH_ERROR: &str = "Subject must be between 3 and 100 characters";
pub const MESSAGE_LENGTH_ERROR: &str = "Message must be between 10 and 500 characters";

impl ContactMessage {
    /// Validates all four fields and reports every failure, not just the
    /// first one.
    pub fn validate(fields: &ContactFormFields) -> Result<Self, Vec<ContactFieldError>> {
        let mut errors = Vec::new();

        let name = ContactMessageAuthorName::try_new(fields.name.clone())
            .map_err(|err| {
                errors.push(ContactFieldError {
                    param: ContactField::Name,
                    msg: match err {
                        ContactMessageAuthorNameError::LenCharMinViolated
                        | ContactMessageAuthorNameError::LenCharMaxViolated => NAME_LENGTH_ERROR,
                        ContactMessageAuthorNameError::RegexViolated => NAME_LETTERS_ERROR,
                    }
                    .into(),
                })
            })
            .ok();

        let email = fields
            .email
            .trim()
            .parse::<EmailAddress>()
            .map_err(|_| {
                errors.push(ContactFieldError {
                    param: ContactField::Email,
                    msg: EMAIL_ERROR.into(),
                })
            })
            .ok();

        let subject = ContactMessageSubject::try_new(fields.subject.clone())
            .map_err(|_| {
                errors.push(ContactFieldError {
                    param: ContactField::Subject,
                    msg: SUBJECT_LENGTH_ERROR.into(),
                })
            })
            .ok();

        let content = ContactMessageContent::try_new(fields.message.clone())
            .map_err(|_| {
                errors.push(ContactFieldError {
                    param: ContactField::Message,
                    msg: MESSAGE_LENGTH_ERROR.into(),
                })
            })
            .ok();

        match (name, email, subject, content) {
            (Some(name), Some(email), Some(subject), Some(content)) => Ok(Self {
                author: ContactMessageAuthor { name, email },
                subject,
                content,
            }),
            _ => Err(errors),
        }
    }
}
