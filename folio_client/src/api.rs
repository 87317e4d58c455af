use std::future::Future;

use folio_models::contact::{ContactFieldError, ContactFormFields};
use serde::Deserialize;
use url::Url;

/// One submission attempt against the contact endpoint.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait ContactApi: Send + Sync + 'static {
    fn submit(&self, form: ContactFormFields) -> impl Future<Output = SubmitOutcome> + Send;
}

/// Everything the form state machine needs to know about a response.
///
/// Transport failures (timeout, dns, connection refused) are folded into
/// [`SubmitOutcome::Failed`]: the client cannot distinguish them from a
/// broken service, so they map to the same terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { message: String },
    Rejected(Vec<ContactFieldError>),
    RateLimited { message: String },
    Failed { message: String },
}

pub const GENERIC_FAILURE: &str =
    "Something went wrong while sending your message. Please try again or reach out directly.";
pub const ACCEPTED_FALLBACK: &str = "Message sent successfully";
pub const RATE_LIMITED_FALLBACK: &str = "Too many contact requests, please try again later";

/// [`ContactApi`] implementation against the bundled submission service.
#[derive(Debug, Clone)]
pub struct HttpContactApi {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpContactApi {
    /// `base_url` must end with a trailing slash for the endpoint path to
    /// resolve correctly.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ConfirmationBody {
    message: String,
}

#[derive(Deserialize)]
struct ErrorsBody {
    errors: Vec<ContactFieldError>,
}

impl ContactApi for HttpContactApi {
    async fn submit(&self, form: ContactFormFields) -> SubmitOutcome {
        let url = match self.base_url.join("api/contact") {
            Ok(url) => url,
            Err(err) => {
                tracing::error!("failed to resolve contact endpoint url: {err}");
                return SubmitOutcome::Failed {
                    message: GENERIC_FAILURE.into(),
                };
            }
        };

        let response = match self.client.post(url).json(&form).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("contact submission failed: {err}");
                return SubmitOutcome::Failed {
                    message: GENERIC_FAILURE.into(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            let message = response
                .json::<ConfirmationBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| ACCEPTED_FALLBACK.into());
            return SubmitOutcome::Accepted { message };
        }

        match status {
            reqwest::StatusCode::BAD_REQUEST => match response.json::<ErrorsBody>().await {
                Ok(body) => SubmitOutcome::Rejected(body.errors),
                // Not the structured validation shape, so treat it like
                // any other service failure.
                Err(_) => SubmitOutcome::Failed {
                    message: GENERIC_FAILURE.into(),
                },
            },
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let message = response
                    .json::<ConfirmationBody>()
                    .await
                    .map(|body| body.message)
                    .unwrap_or_else(|_| RATE_LIMITED_FALLBACK.into());
                SubmitOutcome::RateLimited { message }
            }
            _ => SubmitOutcome::Failed {
                message: GENERIC_FAILURE.into(),
            },
        }
    }
}

#[cfg(any(test, feature = "mock"))]
impl MockContactApi {
    pub fn with_submit(mut self, form: ContactFormFields, outcome: SubmitOutcome) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(form))
            .return_once(move |_| Box::pin(std::future::ready(outcome)));
        self
    }
}
