//! RSASSA-PKCS1-v1_5 signature schemes, named the way certificates name them.
//!
//! RSASSA-PKCS1-v1_5 签名方案，命名方式与证书一致。

use rsa::Pkcs1v15Sign;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::ProviderError;
use crate::keys::{PrivateKey, PublicKey};

/// A signature algorithm as reported by a certificate handler.
///
/// 证书处理器报告的签名算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    Sha1WithRsa,
    Sha256WithRsa,
    Sha384WithRsa,
    Sha512WithRsa,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 4] = [
        SignatureAlgorithm::Sha1WithRsa,
        SignatureAlgorithm::Sha256WithRsa,
        SignatureAlgorithm::Sha384WithRsa,
        SignatureAlgorithm::Sha512WithRsa,
    ];

    /// The standard name, e.g. `SHA256withRSA`.
    pub fn name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1WithRsa => "SHA1withRSA",
            SignatureAlgorithm::Sha256WithRsa => "SHA256withRSA",
            SignatureAlgorithm::Sha384WithRsa => "SHA384withRSA",
            SignatureAlgorithm::Sha512WithRsa => "SHA512withRSA",
        }
    }

    /// The dotted object identifier of the algorithm.
    pub fn oid(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1WithRsa => "1.2.840.113549.1.1.5",
            SignatureAlgorithm::Sha256WithRsa => "1.2.840.113549.1.1.11",
            SignatureAlgorithm::Sha384WithRsa => "1.2.840.113549.1.1.12",
            SignatureAlgorithm::Sha512WithRsa => "1.2.840.113549.1.1.13",
        }
    }

    /// Signs `message`. The message is hashed here; callers pass plaintext.
    ///
    /// 对消息签名。消息在此处计算摘要；调用者传入明文。
    pub fn sign(&self, sk: &PrivateKey, message: &[u8]) -> Result<Vec<u8>, ProviderError> {
        let PrivateKey::Rsa(sk) = sk;
        let (scheme, digest) = self.prehash(message);
        Ok(sk.sign(scheme, &digest)?)
    }

    /// Checks `signature` over `message`. A mismatch is reported as `Ok(false)`,
    /// never as an error.
    ///
    /// 校验消息上的签名。不匹配时返回 `Ok(false)` 而非错误。
    pub fn verify(
        &self,
        pk: &PublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, ProviderError> {
        let PublicKey::Rsa(pk) = pk;
        let (scheme, digest) = self.prehash(message);
        match pk.verify(scheme, &digest, signature) {
            Ok(()) => Ok(true),
            Err(rsa::Error::Verification) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn prehash(&self, message: &[u8]) -> (Pkcs1v15Sign, Vec<u8>) {
        match self {
            SignatureAlgorithm::Sha1WithRsa => {
                (Pkcs1v15Sign::new::<Sha1>(), Sha1::digest(message).to_vec())
            }
            SignatureAlgorithm::Sha256WithRsa => {
                (Pkcs1v15Sign::new::<Sha256>(), Sha256::digest(message).to_vec())
            }
            SignatureAlgorithm::Sha384WithRsa => {
                (Pkcs1v15Sign::new::<Sha384>(), Sha384::digest(message).to_vec())
            }
            SignatureAlgorithm::Sha512WithRsa => {
                (Pkcs1v15Sign::new::<Sha512>(), Sha512::digest(message).to_vec())
            }
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
