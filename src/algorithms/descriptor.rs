//! The algorithm descriptor that selects the bulk cipher of a service.
//!
//! 选择服务批量加密算法的算法描述符。

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Names the symmetric transform and key length used for bulk encryption.
///
/// The descriptor is a plain value holder and performs no validation; an
/// unknown transform or key length is reported when the descriptor is first
/// used by an encrypt or decrypt call.
///
/// 命名用于批量加密的对称变换和密钥长度。
///
/// 描述符只是一个值容器，不做任何校验；未知的变换或密钥长度会在首次用于加密或解密时报告。
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlgorithmDescriptor {
    transform_name: String,
    key_length_bits: u32,
}

impl AlgorithmDescriptor {
    /// Creates a descriptor such as `("AES/CBC/PKCS5Padding", 128)`.
    pub fn new(transform_name: impl Into<String>, key_length_bits: u32) -> Self {
        Self {
            transform_name: transform_name.into(),
            key_length_bits,
        }
    }

    /// The full transform name, e.g. `AES/GCM/NoPadding`.
    pub fn transform_name(&self) -> &str {
        &self.transform_name
    }

    pub fn key_length_bits(&self) -> u32 {
        self.key_length_bits
    }

    /// The key-generation algorithm: the part of the transform name before the
    /// first `/`, or the whole name when it has no `/`.
    ///
    /// 密钥生成算法：变换名中第一个 `/` 之前的部分。
    pub fn key_algorithm(&self) -> &str {
        self.transform_name
            .split_once('/')
            .map_or(self.transform_name.as_str(), |(algorithm, _)| algorithm)
    }
}

impl std::fmt::Display for AlgorithmDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} bits)", self.transform_name, self.key_length_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_algorithm_is_prefix_before_slash() {
        let descriptor = AlgorithmDescriptor::new("AES/CBC/PKCS5Padding", 128);
        assert_eq!(descriptor.key_algorithm(), "AES");
        assert_eq!(descriptor.key_length_bits(), 128);
        assert_eq!(descriptor.to_string(), "AES/CBC/PKCS5Padding (128 bits)");
    }

    #[test]
    fn test_key_algorithm_without_slash() {
        let descriptor = AlgorithmDescriptor::new("AES", 256);
        assert_eq!(descriptor.key_algorithm(), "AES");
    }

    #[test]
    fn test_no_validation_on_construction() {
        let descriptor = AlgorithmDescriptor::new("Blowfish/XYZ", 7);
        assert_eq!(descriptor.transform_name(), "Blowfish/XYZ");
        assert_eq!(descriptor.key_algorithm(), "Blowfish");
    }
}
