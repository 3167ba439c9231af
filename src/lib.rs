//! `seal-exchange` is a synchronous hybrid encryption, signing and
//! verification service. Payloads are exchanged between a local and a partner
//! party, each identified by an alias inside one or more registered key
//! repositories.
//!
//! Bulk data is encrypted under a fresh symmetric session key, the session key
//! is wrapped under the receiver's public key, and signatures always cover the
//! plaintext. Results are carried in an [`Output`] that renders to a
//! length-prefixed, Base64 wire format.
//!
//! `seal-exchange` 是一个同步的混合加密、签名与验证服务。

pub mod algorithms;
pub mod config;
pub mod error;
pub mod factory;
pub mod keys;
pub mod output;
pub mod provider;
pub mod registry;
pub mod service;

pub use error::{Error, ErrorKind, Result};
pub use output::{Output, OutputType};

pub mod prelude {
    pub use crate::algorithms::{AlgorithmDescriptor, SignatureAlgorithm};
    pub use crate::config::ServiceConfig;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::factory::SecurityServiceFactory;
    pub use crate::keys::{PrivateKey, PublicKey};
    pub use crate::output::{FramedOutput, Output, OutputType, RawOutput, TextEncoding};
    pub use crate::provider::memory::{MemoryRepository, MemoryRepositorySource, StaticCertificate};
    pub use crate::provider::{Alias, CertificateHandler, KeyRepository, RepositorySource};
    pub use crate::service::SecurityService;
}
