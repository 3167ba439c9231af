//! Defines the traits for the external key repositories and certificates the
//! service resolves aliases against.
//!
//! 定义服务用于解析别名的外部密钥仓库和证书 trait。
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretBox};

use crate::error::{BoxError, Result};
use crate::keys::{PrivateKey, PublicKey};

pub mod memory;

/// A named identity inside a key repository, with an optional password that
/// protects its private key.
///
/// 密钥仓库中的一个命名身份，带有可选的私钥保护密码。
pub struct Alias {
    name: String,
    password: Option<SecretBox<str>>,
}

impl Alias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretBox::new(password.into().into_boxed_str()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exposes the password for a repository that needs it to unlock a key.
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|p| p.expose_secret())
    }
}

impl Clone for Alias {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            password: self
                .password
                .as_ref()
                .map(|p| SecretBox::new(p.expose_secret().to_owned().into_boxed_str())),
        }
    }
}

impl std::fmt::Debug for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alias")
            .field("name", &self.name)
            .field("has_password", &self.password.is_some())
            .finish()
    }
}

impl std::fmt::Display for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Alias {
    fn from(name: &str) -> Self {
        Alias::new(name)
    }
}

impl From<String> for Alias {
    fn from(name: String) -> Self {
        Alias::new(name)
    }
}

/// A resolved certificate.
///
/// Users can implement this to bridge an existing certificate library; the
/// service only asks the questions below and performs no chain or revocation
/// checking of its own.
///
/// 已解析的证书。
///
/// 用户可以实现此 trait 以桥接现有的证书库；服务只调用下列方法，不自行做证书链或吊销检查。
pub trait CertificateHandler: Send + Sync {
    /// Whether the certificate may currently be used.
    ///
    /// 证书当前是否可用。
    fn is_valid(&self) -> bool;

    /// The subject public key.
    fn public_key(&self) -> PublicKey;

    /// The key algorithm of the subject public key, e.g. `RSA`.
    /// Selects the key-wrap scheme.
    fn key_algorithm(&self) -> String;

    /// The signature algorithm name, e.g. `SHA256withRSA`.
    fn signature_algorithm(&self) -> String;

    /// The dotted OID form of the signature algorithm, used when the name is
    /// unknown to the provider.
    fn signature_algorithm_oid(&self) -> String;
}

/// Resolves aliases to private keys and certificates.
///
/// Errors returned from these methods are surfaced to callers as repository
/// errors with the returned error attached as the cause.
///
/// 将别名解析为私钥和证书。
///
/// 这些方法返回的错误会作为仓库错误暴露给调用者，并附带原始错误。
pub trait KeyRepository: Send + Sync {
    /// Whether this repository holds any material under `alias`.
    fn contains_alias(&self, alias: &Alias) -> std::result::Result<bool, BoxError>;

    /// Looks up the certificate stored under `alias`.
    fn certificate(
        &self,
        alias: &Alias,
    ) -> std::result::Result<Arc<dyn CertificateHandler>, BoxError>;

    /// Looks up the private key stored under `alias`, unlocking it with the
    /// alias password when one is required.
    fn private_key(&self, alias: &Alias) -> std::result::Result<PrivateKey, BoxError>;
}

/// A repository registration: an identity plus the means of opening the
/// repository it names.
///
/// 仓库注册项：一个标识以及打开其所指仓库的方式。
pub trait RepositorySource {
    /// The identity the repository is registered under.
    fn id(&self) -> &str;

    /// Opens the repository. Failures are reported as repository errors.
    fn resolve(&self) -> Result<Arc<dyn KeyRepository>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_debug_hides_password() {
        let alias = Alias::new("alice").with_password("hunter2");
        assert_eq!(alias.password(), Some("hunter2"));
        let printed = format!("{alias:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
        assert_eq!(alias.clone().password(), Some("hunter2"));
    }
}
