//! HTTP server configuration object.

use std::net::SocketAddr;

use user_service::config::ServiceConfig;

/// Listener settings for [`super::create_server`].
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Listen on `bind_addr`.
    #[must_use]
    pub const fn new(bind_addr: SocketAddr) -> Self {
        Self { bind_addr }
    }
}

impl From<&ServiceConfig> for ServerConfig {
    fn from(config: &ServiceConfig) -> Self {
        Self::new(config.bind_addr())
    }
}
