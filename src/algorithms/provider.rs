//! The process-wide table of transforms, key-wrap schemes and signature
//! schemes the service can execute, resolved by name.
//!
//! 服务可执行的变换、密钥包装方案和签名方案的进程级表，按名称解析。

use std::collections::HashMap;

use super::asymmetric::KeyWrapAlgorithm;
use super::descriptor::AlgorithmDescriptor;
use super::signature::SignatureAlgorithm;
use super::symmetric::{normalize_transform, CipherMode, SymmetricCipher};
use crate::error::ProviderError;

/// Name → algorithm lookup tables. Built once by the service factory and
/// shared by every service instance.
///
/// 名称到算法的查找表。由服务工厂构建一次并由所有服务实例共享。
#[derive(Debug)]
pub struct CryptoProvider {
    transforms: HashMap<String, CipherMode>,
    key_wraps: HashMap<String, KeyWrapAlgorithm>,
    signatures: HashMap<String, SignatureAlgorithm>,
    signature_oids: HashMap<&'static str, SignatureAlgorithm>,
}

impl CryptoProvider {
    /// Builds the table of built-in algorithms.
    pub fn builtin() -> Self {
        let transforms = [
            ("AES/CBC/PKCS5PADDING", CipherMode::Cbc),
            ("AES/CBC/PKCS7PADDING", CipherMode::Cbc),
            ("AES/GCM/NOPADDING", CipherMode::Gcm),
        ]
        .into_iter()
        .map(|(name, mode)| (name.to_string(), mode))
        .collect();

        let key_wraps = [
            ("RSA", KeyWrapAlgorithm::RsaPkcs1v15),
            ("RSA/ECB/PKCS1PADDING", KeyWrapAlgorithm::RsaPkcs1v15),
            ("RSA/ECB/OAEPWITHSHA-256ANDMGF1PADDING", KeyWrapAlgorithm::RsaOaepSha256),
            ("RSA-OAEP-256", KeyWrapAlgorithm::RsaOaepSha256),
        ]
        .into_iter()
        .map(|(name, algorithm)| (name.to_string(), algorithm))
        .collect();

        let signatures = SignatureAlgorithm::ALL
            .into_iter()
            .map(|algorithm| (algorithm.name().to_ascii_uppercase(), algorithm))
            .collect();
        let signature_oids = SignatureAlgorithm::ALL
            .into_iter()
            .map(|algorithm| (algorithm.oid(), algorithm))
            .collect();

        Self {
            transforms,
            key_wraps,
            signatures,
            signature_oids,
        }
    }

    /// Resolves the bulk cipher named by a descriptor.
    ///
    /// 解析描述符指定的批量加密算法。
    pub fn symmetric(&self, descriptor: &AlgorithmDescriptor) -> Result<SymmetricCipher, ProviderError> {
        let mode = self
            .transforms
            .get(&normalize_transform(descriptor))
            .copied()
            .ok_or_else(|| ProviderError::NoSuchTransform(descriptor.transform_name().to_string()))?;
        SymmetricCipher::new(mode, descriptor.key_length_bits(), descriptor.transform_name())
    }

    /// Resolves the key-wrap scheme for a certificate key algorithm.
    pub fn key_wrap(&self, key_algorithm: &str) -> Result<KeyWrapAlgorithm, ProviderError> {
        self.key_wraps
            .get(&key_algorithm.trim().to_ascii_uppercase())
            .copied()
            .ok_or_else(|| ProviderError::NoSuchKeyWrap(key_algorithm.to_string()))
    }

    /// Resolves a signature algorithm by name, falling back to its object
    /// identifier when the name is unknown.
    ///
    /// 按名称解析签名算法；名称未知时回退到对象标识符。
    pub fn signature(&self, name: &str, oid: &str) -> Result<SignatureAlgorithm, ProviderError> {
        if let Some(algorithm) = self.signatures.get(&name.trim().to_ascii_uppercase()) {
            return Ok(*algorithm);
        }
        tracing::trace!(name, oid, "signature name unknown, trying object identifier");
        self.signature_oids
            .get(oid.trim())
            .copied()
            .ok_or_else(|| ProviderError::NoSuchSignature {
                name: name.to_string(),
                oid: oid.to_string(),
            })
    }

    /// Names of the registered bulk transforms, sorted.
    pub fn transform_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_lookup_is_case_insensitive() {
        let provider = CryptoProvider::builtin();
        let cipher = provider
            .symmetric(&AlgorithmDescriptor::new("aes/cbc/pkcs5padding", 128))
            .unwrap();
        assert_eq!(cipher.mode(), CipherMode::Cbc);
        assert_eq!(cipher.key_size(), 16);
    }

    #[test]
    fn test_unknown_transform_and_length() {
        let provider = CryptoProvider::builtin();
        assert!(matches!(
            provider.symmetric(&AlgorithmDescriptor::new("DES/CBC/PKCS5Padding", 56)),
            Err(ProviderError::NoSuchTransform(_))
        ));
        assert!(matches!(
            provider.symmetric(&AlgorithmDescriptor::new("AES/GCM/NoPadding", 192)),
            Err(ProviderError::InvalidKeyLength { bits: 192, .. })
        ));
    }

    #[test]
    fn test_signature_falls_back_to_oid() {
        let provider = CryptoProvider::builtin();
        assert_eq!(
            provider.signature("SHA256withRSA", "").unwrap(),
            SignatureAlgorithm::Sha256WithRsa
        );
        assert_eq!(
            provider
                .signature("RSASSA-PKCS1-SHA384", "1.2.840.113549.1.1.12")
                .unwrap(),
            SignatureAlgorithm::Sha384WithRsa
        );
        assert!(provider.signature("Ed448", "1.3.101.113").is_err());
    }

    #[test]
    fn test_key_wrap_lookup() {
        let provider = CryptoProvider::builtin();
        assert_eq!(provider.key_wrap("rsa").unwrap(), KeyWrapAlgorithm::RsaPkcs1v15);
        assert_eq!(
            provider.key_wrap("RSA-OAEP-256").unwrap(),
            KeyWrapAlgorithm::RsaOaepSha256
        );
        assert!(provider.key_wrap("EC").is_err());
    }
}
