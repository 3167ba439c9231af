//! Asymmetric key-wrap schemes used to protect the session key.
//!
//! 用于保护会话密钥的非对称密钥包装方案。

use rand::rngs::OsRng;
use rsa::{Oaep, Pkcs1v15Encrypt};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::ProviderError;
use crate::keys::{PrivateKey, PublicKey, SessionKey};

/// A key-wrap scheme selected by the receiver certificate's key algorithm.
///
/// 由接收方证书的密钥算法选择的密钥包装方案。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyWrapAlgorithm {
    /// RSAES-PKCS1-v1_5, the scheme behind a bare `RSA` key algorithm.
    RsaPkcs1v15,
    /// RSAES-OAEP with SHA-256 and MGF1-SHA-256.
    RsaOaepSha256,
}

impl KeyWrapAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            KeyWrapAlgorithm::RsaPkcs1v15 => "RSA",
            KeyWrapAlgorithm::RsaOaepSha256 => "RSA/ECB/OAEPWithSHA-256AndMGF1Padding",
        }
    }

    /// Wraps the raw session-key bytes under the receiver's public key.
    ///
    /// 使用接收方公钥包装原始会话密钥字节。
    pub fn wrap_key(&self, pk: &PublicKey, key: &SessionKey) -> Result<Vec<u8>, ProviderError> {
        let PublicKey::Rsa(pk) = pk;
        let wrapped = match self {
            KeyWrapAlgorithm::RsaPkcs1v15 => pk.encrypt(&mut OsRng, Pkcs1v15Encrypt, key.as_bytes())?,
            KeyWrapAlgorithm::RsaOaepSha256 => {
                pk.encrypt(&mut OsRng, Oaep::new::<Sha256>(), key.as_bytes())?
            }
        };
        Ok(wrapped)
    }

    /// Recovers the session key from its wrapped form.
    ///
    /// 从包装形式恢复会话密钥。
    pub fn unwrap_key(&self, sk: &PrivateKey, wrapped: &[u8]) -> Result<SessionKey, ProviderError> {
        let PrivateKey::Rsa(sk) = sk;
        let raw = match self {
            KeyWrapAlgorithm::RsaPkcs1v15 => sk.decrypt(Pkcs1v15Encrypt, wrapped)?,
            KeyWrapAlgorithm::RsaOaepSha256 => sk.decrypt(Oaep::new::<Sha256>(), wrapped)?,
        };
        Ok(SessionKey::from_bytes(Zeroizing::new(raw)))
    }
}
