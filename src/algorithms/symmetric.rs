//! Symmetric bulk ciphers selected by an [`AlgorithmDescriptor`].
//!
//! 由 [`AlgorithmDescriptor`] 选择的对称批量加密算法。

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use super::descriptor::AlgorithmDescriptor;
use crate::error::ProviderError;
use crate::keys::SessionKey;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const CBC_IV_SIZE: usize = 16;
const GCM_NONCE_SIZE: usize = 12;

/// The block-cipher mode of a transform.
///
/// 变换的分组密码模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    /// CBC with PKCS#5/PKCS#7 padding and a random 16-byte IV.
    Cbc,
    /// GCM with a random 12-byte nonce and the tag appended to the ciphertext.
    Gcm,
}

impl CipherMode {
    /// The IV length this mode generates and expects.
    pub fn iv_size(&self) -> usize {
        match self {
            CipherMode::Cbc => CBC_IV_SIZE,
            CipherMode::Gcm => GCM_NONCE_SIZE,
        }
    }

    fn supports_key_bits(&self, bits: u32) -> bool {
        match self {
            CipherMode::Cbc => matches!(bits, 128 | 192 | 256),
            CipherMode::Gcm => matches!(bits, 128 | 256),
        }
    }
}

/// A resolved symmetric cipher: a mode plus a validated key length.
///
/// 已解析的对称密码：模式加上经过校验的密钥长度。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymmetricCipher {
    mode: CipherMode,
    key_bits: u32,
}

impl SymmetricCipher {
    /// Pairs a mode with a key length, rejecting lengths the mode cannot use.
    pub fn new(mode: CipherMode, key_bits: u32, transform: &str) -> Result<Self, ProviderError> {
        if !mode.supports_key_bits(key_bits) {
            return Err(ProviderError::InvalidKeyLength {
                algorithm: transform.to_string(),
                bits: key_bits,
            });
        }
        Ok(Self { mode, key_bits })
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn key_size(&self) -> usize {
        (self.key_bits / 8) as usize
    }

    /// Generates a fresh random session key of this cipher's length.
    ///
    /// 生成一个与该密码长度相同的全新随机会话密钥。
    pub fn generate_key(&self) -> SessionKey {
        SessionKey::random(self.key_size())
    }

    /// Encrypts `plaintext` under `key` with a freshly generated IV.
    /// Returns the IV and the ciphertext.
    ///
    /// 使用新生成的 IV 加密明文，返回 IV 和密文。
    pub fn encrypt(
        &self,
        key: &SessionKey,
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), ProviderError> {
        self.check_key(key)?;
        let mut iv = vec![0u8; self.mode.iv_size()];
        OsRng.fill_bytes(&mut iv);
        let key = key.as_bytes();

        let ciphertext = match (self.mode, self.key_bits) {
            (CipherMode::Cbc, 128) => Aes128CbcEnc::new_from_slices(key, &iv)
                .map_err(|_| self.key_length_error())?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            (CipherMode::Cbc, 192) => Aes192CbcEnc::new_from_slices(key, &iv)
                .map_err(|_| self.key_length_error())?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            (CipherMode::Cbc, _) => Aes256CbcEnc::new_from_slices(key, &iv)
                .map_err(|_| self.key_length_error())?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            (CipherMode::Gcm, 128) => Aes128Gcm::new_from_slice(key)
                .map_err(|_| self.key_length_error())?
                .encrypt(Nonce::from_slice(&iv), plaintext)
                .map_err(seal_error)?,
            (CipherMode::Gcm, _) => Aes256Gcm::new_from_slice(key)
                .map_err(|_| self.key_length_error())?
                .encrypt(Nonce::from_slice(&iv), plaintext)
                .map_err(seal_error)?,
        };
        Ok((iv, ciphertext))
    }

    /// Decrypts `ciphertext` under `key` with the carried IV.
    ///
    /// 使用携带的 IV 解密密文。
    pub fn decrypt(
        &self,
        key: &SessionKey,
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        self.check_key(key)?;
        if iv.len() != self.mode.iv_size() {
            return Err(ProviderError::InvalidIvLength {
                expected: self.mode.iv_size(),
                actual: iv.len(),
            });
        }
        let key = key.as_bytes();

        match (self.mode, self.key_bits) {
            (CipherMode::Cbc, 128) => Aes128CbcDec::new_from_slices(key, iv)
                .map_err(|_| self.key_length_error())?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| ProviderError::BadPadding),
            (CipherMode::Cbc, 192) => Aes192CbcDec::new_from_slices(key, iv)
                .map_err(|_| self.key_length_error())?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| ProviderError::BadPadding),
            (CipherMode::Cbc, _) => Aes256CbcDec::new_from_slices(key, iv)
                .map_err(|_| self.key_length_error())?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| ProviderError::BadPadding),
            (CipherMode::Gcm, 128) => Aes128Gcm::new_from_slice(key)
                .map_err(|_| self.key_length_error())?
                .decrypt(Nonce::from_slice(iv), ciphertext)
                .map_err(|_| ProviderError::TagMismatch),
            (CipherMode::Gcm, _) => Aes256Gcm::new_from_slice(key)
                .map_err(|_| self.key_length_error())?
                .decrypt(Nonce::from_slice(iv), ciphertext)
                .map_err(|_| ProviderError::TagMismatch),
        }
    }

    fn check_key(&self, key: &SessionKey) -> Result<(), ProviderError> {
        if key.len() != self.key_size() {
            return Err(ProviderError::InvalidKeyLength {
                algorithm: format!("{:?}", self.mode),
                bits: (key.len() * 8) as u32,
            });
        }
        Ok(())
    }

    fn key_length_error(&self) -> ProviderError {
        ProviderError::InvalidKeyLength {
            algorithm: format!("{:?}", self.mode),
            bits: self.key_bits,
        }
    }
}

/// AEAD failures while encrypting; the tag is only checked on decryption.
fn seal_error(_: aes_gcm::Error) -> ProviderError {
    ProviderError::SealFailed
}

/// The upper-case transform name used as the provider lookup key.
pub(crate) fn normalize_transform(descriptor: &AlgorithmDescriptor) -> String {
    descriptor.transform_name().trim().to_ascii_uppercase()
}
