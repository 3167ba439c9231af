//! This module defines the key handles consumed by the service.
//!
//! 这个模块定义了服务使用的密钥句柄。

use rand::rngs::OsRng;
use rand::RngCore;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use crate::error::ProviderError;

/// A private key resolved from a key repository.
///
/// 从密钥仓库解析出的私钥。
#[derive(Clone)]
pub enum PrivateKey {
    Rsa(RsaPrivateKey),
}

impl PrivateKey {
    /// Generates a fresh RSA private key of the given modulus size.
    ///
    /// 生成给定模长的新 RSA 私钥。
    pub fn generate_rsa(bits: usize) -> Result<Self, ProviderError> {
        Ok(Self::Rsa(RsaPrivateKey::new(&mut OsRng, bits)?))
    }

    /// Derives the matching public key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Rsa(sk) => PublicKey::Rsa(sk.to_public_key()),
        }
    }

    /// The key algorithm name, as a certificate would report it.
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Rsa(_) => "RSA",
        }
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa(sk) => f
                .debug_struct("PrivateKey")
                .field("algorithm", &"RSA")
                .field("bits", &(sk.size() * 8))
                .finish_non_exhaustive(),
        }
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(sk: RsaPrivateKey) -> Self {
        Self::Rsa(sk)
    }
}

/// A public key taken from a certificate.
///
/// 取自证书的公钥。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
}

impl PublicKey {
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Rsa(_) => "RSA",
        }
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(pk: RsaPublicKey) -> Self {
        Self::Rsa(pk)
    }
}

/// The ephemeral symmetric key generated for a single encrypt call.
/// The bytes are wiped when the key is dropped.
///
/// 为单次加密调用生成的临时对称密钥。密钥被丢弃时字节会被清零。
pub struct SessionKey(Zeroizing<Vec<u8>>);

impl SessionKey {
    /// Generates `len` random bytes from the operating system.
    pub(crate) fn random(len: usize) -> Self {
        let mut bytes = Zeroizing::new(vec![0u8; len]);
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Rebuilds a session key from unwrapped bytes.
    pub(crate) fn from_bytes(bytes: Zeroizing<Vec<u8>>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_keys_are_fresh() {
        let a = SessionKey::random(16);
        let b = SessionKey::random(16);
        assert_eq!(a.len(), 16);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_private_key_debug_shows_only_size() {
        let key = PrivateKey::generate_rsa(1024).unwrap();
        let printed = format!("{key:?}");
        assert!(printed.contains("bits: 1024"));
        assert!(!printed.contains("d:"));
    }

    #[test]
    fn test_session_key_debug_hides_bytes() {
        let key = SessionKey::from_bytes(Zeroizing::new(vec![0xAB; 4]));
        let printed = format!("{key:?}");
        assert!(printed.contains("len: 4"));
        assert!(!printed.contains("171"));
    }
}
