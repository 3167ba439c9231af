//! The single entry point for obtaining security services.
//!
//! 获取安全服务的唯一入口。

use std::sync::{Arc, OnceLock};

use crate::algorithms::CryptoProvider;
use crate::config::ServiceConfig;
use crate::service::SecurityService;

static PROVIDER: OnceLock<CryptoProvider> = OnceLock::new();

/// A factory for creating independent security services.
///
/// The process-wide algorithm table is registered on first use; every service
/// handed out afterwards shares it but owns its own repository registry.
///
/// 用于创建相互独立的安全服务的工厂。
///
/// 进程级算法表在首次使用时注册；之后创建的每个服务共享该表，但拥有各自的仓库注册表。
#[derive(Debug, Default, Clone, Copy)]
pub struct SecurityServiceFactory;

impl SecurityServiceFactory {
    /// Creates a new `SecurityServiceFactory`.
    pub fn new() -> Self {
        Self
    }

    /// The registered algorithm table, initialising it on first call.
    pub fn provider(&self) -> &'static CryptoProvider {
        PROVIDER.get_or_init(|| {
            let provider = CryptoProvider::builtin();
            tracing::debug!(transforms = ?provider.transform_names(), "cryptography provider registered");
            provider
        })
    }

    /// A new, unconfigured service.
    pub fn new_service(&self) -> SecurityService {
        self.new_service_with(ServiceConfig::builder().build())
    }

    /// A new service starting from `config`.
    pub fn new_service_with(&self, config: Arc<ServiceConfig>) -> SecurityService {
        SecurityService::new(self.provider(), config)
    }
}
