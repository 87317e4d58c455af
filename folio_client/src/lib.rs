//! Client half of the contact form: owns the field values and the
//! submission lifecycle from user input to terminal UI state.

use std::time::Duration;

use folio_models::contact::{ContactFieldError, ContactFormFields, ContactMessage};

pub use crate::api::{ContactApi, HttpContactApi, SubmitOutcome};

pub mod api;

pub const DEFAULT_DWELL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Success { message: String },
    Error(SubmissionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Per-field validation errors reported by the service.
    Fields(Vec<ContactFieldError>),
    /// Quota exhausted; distinct from field errors so the UI can show a
    /// "try again later" message.
    RateLimited { message: String },
    /// Generic failure: transport error, unexpected status, or an
    /// unstructured error body.
    Other { message: String },
}

/// One contact form instance.
///
/// State transitions are strictly linear per attempt: `Idle` →
/// `Submitting` → `Success` or `Error`, and both terminal states return
/// to `Idle` after the dwell duration ([`Self::finish_dwell`]). Field
/// values are cleared on success and preserved on every failure so the
/// user can correct and resubmit.
#[derive(Debug)]
pub struct SubmissionForm<Api> {
    api: Api,
    pub fields: ContactFormFields,
    state: SubmissionState,
    field_errors: Vec<ContactFieldError>,
    dwell: Duration,
}

impl<Api: ContactApi> SubmissionForm<Api> {
    pub fn new(api: Api) -> Self {
        Self::with_dwell(api, DEFAULT_DWELL)
    }

    pub fn with_dwell(api: Api, dwell: Duration) -> Self {
        Self {
            api,
            fields: ContactFormFields::default(),
            state: SubmissionState::Idle,
            field_errors: Vec::new(),
            dwell,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Inline errors for rendering next to the fields; populated by both
    /// local and remote validation failures.
    pub fn field_errors(&self) -> &[ContactFieldError] {
        &self.field_errors
    }

    /// Runs one submission attempt: local validation, then exactly one
    /// network call. A call while a submission is in flight is ignored.
    ///
    /// Local validation failures never reach the service and leave the
    /// state unchanged; only the inline field errors are updated.
    pub async fn submit(&mut self) {
        if self.state == SubmissionState::Submitting {
            return;
        }
        self.field_errors.clear();

        if let Err(errors) = ContactMessage::validate(&self.fields) {
            self.field_errors = errors;
            return;
        }

        self.state = SubmissionState::Submitting;
        let outcome = self.api.submit(self.fields.clone()).await;

        self.state = match outcome {
            SubmitOutcome::Accepted { message } => {
                self.fields = ContactFormFields::default();
                SubmissionState::Success { message }
            }
            SubmitOutcome::Rejected(errors) => {
                self.field_errors = errors.clone();
                SubmissionState::Error(SubmissionError::Fields(errors))
            }
            SubmitOutcome::RateLimited { message } => {
                SubmissionState::Error(SubmissionError::RateLimited { message })
            }
            SubmitOutcome::Failed { message } => {
                SubmissionState::Error(SubmissionError::Other { message })
            }
        };
    }

    /// Waits out the dwell duration and returns the form to `Idle`.
    /// Applies to both `Success` and `Error`; a no-op otherwise.
    pub async fn finish_dwell(&mut self) {
        if !matches!(
            self.state,
            SubmissionState::Success { .. } | SubmissionState::Error(_)
        ) {
            return;
        }
        tokio::time::sleep(self.dwell).await;
        self.state = SubmissionState::Idle;
    }

    #[cfg(test)]
    fn set_state(&mut self, state: SubmissionState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use folio_models::contact::{ContactField, EMAIL_ERROR, MESSAGE_LENGTH_ERROR};
    use pretty_assertions::assert_eq;

    use super::{api::MockContactApi, *};

    fn valid_fields() -> ContactFormFields {
        ContactFormFields {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            subject: "Hello".into(),
            message: "This is a test message.".into(),
        }
    }

    fn form(api: MockContactApi) -> SubmissionForm<MockContactApi> {
        let mut form = SubmissionForm::with_dwell(api, Duration::ZERO);
        form.fields = valid_fields();
        form
    }

    #[tokio::test]
    async fn success_clears_fields_and_dwells_back_to_idle() {
        // Arrange
        let api = MockContactApi::new().with_submit(
            valid_fields(),
            SubmitOutcome::Accepted {
                message: "Message sent successfully".into(),
            },
        );
        let mut form = form(api);

        // Act
        form.submit().await;

        // Assert
        assert_eq!(
            *form.state(),
            SubmissionState::Success {
                message: "Message sent successfully".into()
            }
        );
        assert_eq!(form.fields, ContactFormFields::default());

        form.finish_dwell().await;
        assert_eq!(*form.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn local_validation_failure_makes_no_network_call() {
        // Arrange: no expectations on the api, so any call panics.
        let mut form = form(MockContactApi::new());
        form.fields.email = "not-an-email".into();

        // Act
        form.submit().await;

        // Assert
        assert_eq!(*form.state(), SubmissionState::Idle);
        assert_eq!(
            form.field_errors(),
            [ContactFieldError {
                param: ContactField::Email,
                msg: EMAIL_ERROR.into(),
            }]
        );
        assert_eq!(form.fields.name, "Jane Doe");
    }

    #[tokio::test]
    async fn remote_field_errors_preserve_field_values() {
        // Arrange
        let errors = vec![ContactFieldError {
            param: ContactField::Message,
            msg: MESSAGE_LENGTH_ERROR.into(),
        }];
        let api = MockContactApi::new()
            .with_submit(valid_fields(), SubmitOutcome::Rejected(errors.clone()));
        let mut form = form(api);

        // Act
        form.submit().await;

        // Assert
        assert_eq!(
            *form.state(),
            SubmissionState::Error(SubmissionError::Fields(errors.clone()))
        );
        assert_eq!(form.field_errors(), errors);
        assert_eq!(form.fields, valid_fields());
    }

    #[tokio::test]
    async fn rate_limited() {
        // Arrange
        let api = MockContactApi::new().with_submit(
            valid_fields(),
            SubmitOutcome::RateLimited {
                message: "Too many contact requests, please try again later".into(),
            },
        );
        let mut form = form(api);

        // Act
        form.submit().await;

        // Assert
        assert_eq!(
            *form.state(),
            SubmissionState::Error(SubmissionError::RateLimited {
                message: "Too many contact requests, please try again later".into()
            })
        );
        assert_eq!(form.fields, valid_fields());
    }

    #[tokio::test]
    async fn generic_failure_dwells_back_to_idle() {
        // Arrange
        let api = MockContactApi::new().with_submit(
            valid_fields(),
            SubmitOutcome::Failed {
                message: api::GENERIC_FAILURE.into(),
            },
        );
        let mut form = form(api);

        // Act
        form.submit().await;

        // Assert
        assert_eq!(
            *form.state(),
            SubmissionState::Error(SubmissionError::Other {
                message: api::GENERIC_FAILURE.into()
            })
        );

        form.finish_dwell().await;
        assert_eq!(*form.state(), SubmissionState::Idle);
        assert_eq!(form.fields, valid_fields());
    }

    #[tokio::test]
    async fn submit_is_ignored_while_in_flight() {
        // Arrange: no expectations on the api.
        let mut form = form(MockContactApi::new());
        form.set_state(SubmissionState::Submitting);

        // Act
        form.submit().await;

        // Assert
        assert_eq!(*form.state(), SubmissionState::Submitting);
    }

    #[tokio::test]
    async fn error_state_accepts_a_new_submit() {
        // Arrange
        let api = MockContactApi::new().with_submit(
            valid_fields(),
            SubmitOutcome::Accepted {
                message: "Message sent successfully".into(),
            },
        );
        let mut form = form(api);
        form.set_state(SubmissionState::Error(SubmissionError::Other {
            message: api::GENERIC_FAILURE.into(),
        }));

        // Act
        form.submit().await;

        // Assert
        assert_eq!(
            *form.state(),
            SubmissionState::Success {
                message: "Message sent successfully".into()
            }
        );
    }
}
