use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{http::HeaderValue, Router};
use folio_core_contact_contracts::ContactService;
use folio_core_health_contracts::HealthService;
use folio_ratelimit_contracts::RateLimitService;
use tokio::net::TcpListener;

use crate::routes::contact::ContactState;

mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Health, Contact, RateLimit> {
    health: Health,
    contact: Contact,
    rate_limit: RateLimit,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    /// Origin allowed to call the api cross-origin (the frontend).
    pub allowed_origin: HeaderValue,
    pub real_ip: Option<Arc<RealIpConfig>>,
}

/// Trust configuration for resolving the client ip behind a reverse proxy.
#[derive(Debug)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

impl<Health, Contact, RateLimit> RestServer<Health, Contact, RateLimit>
where
    Health: HealthService,
    Contact: ContactService,
    RateLimit: RateLimitService,
{
    pub fn new(
        health: Health,
        contact: Contact,
        rate_limit: RateLimit,
        config: RestServerConfig,
    ) -> Self {
        Self {
            health,
            contact,
            rate_limit,
            config,
        }
    }

    pub async fn serve(self, host: IpAddr, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let listener = TcpListener::bind((host, port)).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(Into::into)
    }

    fn router(self) -> Router<()> {
        let router = Router::new()
            .merge(routes::health::router(self.health.into()))
            .merge(routes::contact::router(
                ContactState {
                    contact: self.contact,
                    rate_limit: self.rate_limit,
                }
                .into(),
            ));

        // Layer order matters: the client ip and request id extensions must
        // exist before the trace span is created, and the panic handler
        // wraps everything.
        let router = middlewares::trace::add(router);
        let router = middlewares::request_id::add(router);
        let router = middlewares::client_ip::add(self.config.real_ip)(router);
        let router = middlewares::cors::add(self.config.allowed_origin)(router);
        middlewares::panic_handler::add(router)
    }
}
