use std::sync::Arc;

use crate::algorithms::AlgorithmDescriptor;
use crate::output::TextEncoding;

/// Immutable settings a service instance starts with.
///
/// 服务实例启动时使用的不可变设置。
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    algorithm: Option<AlgorithmDescriptor>,
    default_encoding: TextEncoding,
}

impl ServiceConfig {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// The algorithm the service is configured with before any
    /// `set_algorithm` call.
    pub fn algorithm(&self) -> Option<&AlgorithmDescriptor> {
        self.algorithm.as_ref()
    }

    /// The encoding outputs use for `get_as_string`.
    pub fn default_encoding(&self) -> TextEncoding {
        self.default_encoding
    }
}

/// Builds a shared [`ServiceConfig`].
pub struct ConfigBuilder {
    algorithm: Option<AlgorithmDescriptor>,
    default_encoding: TextEncoding,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            algorithm: None,
            default_encoding: TextEncoding::Utf8,
        }
    }

    pub fn algorithm(mut self, algorithm: AlgorithmDescriptor) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn default_encoding(mut self, encoding: TextEncoding) -> Self {
        self.default_encoding = encoding;
        self
    }

    pub fn build(self) -> Arc<ServiceConfig> {
        Arc::new(ServiceConfig {
            algorithm: self.algorithm,
            default_encoding: self.default_encoding,
        })
    }
}
