use anyhow::Context;
use folio_config::EmailConfig;
use folio_email_impl::EmailServiceImpl;

/// Set up the smtp transport.
pub fn connect(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    EmailServiceImpl::new(
        &config.smtp_url,
        config.from.clone(),
        config.send_timeout.into(),
    )
    .context("Failed to set up smtp transport")
}
