use std::sync::Arc;

use anyhow::Context;
use folio_api_rest::{RealIpConfig, RestServer, RestServerConfig};
use folio_config::Config;
use folio_core_contact_impl::{ContactServiceConfig, ContactServiceImpl};
use folio_core_health_impl::HealthServiceImpl;
use folio_email_contracts::EmailService;
use folio_ratelimit_memory::{MemoryRateLimiter, MemoryRateLimiterConfig};
use tracing::info;

use crate::email;

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to smtp server");
    let email = email::connect(&config.email)?;
    email.ping().await?;

    let contact = ContactServiceImpl::new(
        email.clone(),
        ContactServiceConfig {
            recipient: Arc::new(config.contact.email.clone()),
        },
    );
    let health = HealthServiceImpl::new(email);
    let rate_limit = MemoryRateLimiter::new(MemoryRateLimiterConfig {
        quota: config.rate_limit.quota,
        window: config.rate_limit.window.into(),
    });

    let allowed_origin = config
        .cors
        .allowed_origin
        .origin()
        .ascii_serialization()
        .parse()
        .context("Failed to parse allowed cors origin")?;

    let server = RestServer::new(
        health,
        contact,
        rate_limit,
        RestServerConfig {
            allowed_origin,
            real_ip: config.http.real_ip.as_ref().map(|real_ip| {
                Arc::new(RealIpConfig {
                    header: real_ip.header.clone(),
                    set_from: real_ip.set_from,
                })
            }),
        },
    );

    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve(config.http.host, config.http.port).await
}
