//! The security service: encrypt, sign and verify payloads exchanged between
//! key-repository aliases.
//!
//! 安全服务：对在密钥仓库别名之间交换的负载进行加密、签名和验证。

use std::sync::Arc;

use parking_lot::RwLock;

use crate::algorithms::{AlgorithmDescriptor, CryptoProvider};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::keys::PrivateKey;
use crate::output::framed::MAX_FIELD_LEN;
use crate::output::{FramedOutput, Output, RawOutput};
use crate::provider::{Alias, CertificateHandler, RepositorySource};
use crate::registry::KeyRepositoryRegistry;

/// Encrypts, signs and verifies payloads using keys resolved from the
/// registered key repositories.
///
/// A service needs an algorithm and at least one repository before `encrypt`
/// or `verify` can succeed; `sign` needs only a repository. All operations run
/// on the caller's thread. Instances are `Send + Sync`: concurrent operations
/// share the registry for reading, registration takes it exclusively.
///
/// 使用从已注册密钥仓库解析出的密钥对负载进行加密、签名和验证。
///
/// 在 `encrypt` 或 `verify` 成功之前，服务需要一个算法和至少一个仓库；`sign` 只需要仓库。
/// 所有操作都在调用者线程上执行。
pub struct SecurityService {
    provider: &'static CryptoProvider,
    registry: KeyRepositoryRegistry,
    algorithm: RwLock<Option<AlgorithmDescriptor>>,
    config: Arc<ServiceConfig>,
}

impl SecurityService {
    pub(crate) fn new(provider: &'static CryptoProvider, config: Arc<ServiceConfig>) -> Self {
        Self {
            provider,
            registry: KeyRepositoryRegistry::new(),
            algorithm: RwLock::new(config.algorithm().cloned()),
            config,
        }
    }

    /// Resolves `source` and registers it for alias lookups.
    ///
    /// 解析 `source` 并将其注册用于别名查找。
    pub fn register_repository(&self, source: &dyn RepositorySource) -> Result<()> {
        self.registry.register(source)
    }

    /// Removes the repository registered under `id`; unknown ids are ignored.
    pub fn remove_repository(&self, id: &str) -> bool {
        self.registry.remove(id)
    }

    /// Registered repository identities in scan order.
    pub fn repository_ids(&self) -> Vec<String> {
        self.registry.ids()
    }

    /// Replaces the bulk algorithm for subsequent calls.
    pub fn set_algorithm(&self, descriptor: AlgorithmDescriptor) {
        tracing::debug!(algorithm = %descriptor, "algorithm set");
        *self.algorithm.write() = Some(descriptor);
    }

    pub fn algorithm(&self) -> Option<AlgorithmDescriptor> {
        self.algorithm.read().clone()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Encrypts `payload` from `sender` to `receiver`.
    ///
    /// A fresh session key is generated for every call, used to encrypt the
    /// payload, and wrapped under the receiver certificate's public key. The
    /// receiver certificate is checked for validity before any cryptographic
    /// work happens.
    ///
    /// 将 `payload` 从 `sender` 加密给 `receiver`。
    ///
    /// 每次调用都会生成新的会话密钥，用于加密负载，并使用接收方证书公钥进行包装。
    /// 在任何密码学操作之前都会检查接收方证书的有效性。
    pub fn encrypt(&self, payload: &[u8], sender: &Alias, receiver: &Alias) -> Result<Output> {
        let algorithm = self
            .algorithm()
            .ok_or_else(|| Error::encryption("no algorithm configured; set_algorithm must be called before encrypt"))?;

        // Resolved only so an unknown or locked sender fails before any
        // cryptographic work; the sender key itself is not used to encrypt.
        let _sender_key = self.registry.private_key(sender)?;
        let receiver_cert = self.valid_certificate(receiver)?;

        let cipher = self.provider.symmetric(&algorithm).map_err(|e| {
            Error::encryption_caused_by(format!("cannot use algorithm {algorithm}"), e)
        })?;
        let key_algorithm = receiver_cert.key_algorithm();
        let key_wrap = self.provider.key_wrap(&key_algorithm).map_err(|e| {
            Error::encryption_caused_by(format!("cannot wrap keys for '{receiver}'"), e)
        })?;

        let session_key = cipher.generate_key();
        let (iv, ciphertext) = cipher
            .encrypt(&session_key, payload)
            .map_err(|e| Error::encryption_caused_by("bulk encryption failed", e))?;
        if ciphertext.len() > MAX_FIELD_LEN {
            return Err(Error::encryption(format!(
                "ciphertext of {} bytes exceeds the framing limit",
                ciphertext.len()
            )));
        }
        let wrapped_key = key_wrap
            .wrap_key(&receiver_cert.public_key(), &session_key)
            .map_err(|e| Error::encryption_caused_by("session key wrapping failed", e))?;

        let mut output = FramedOutput::new(self.config.default_encoding());
        output.set_encrypted(iv, wrapped_key, ciphertext);
        tracing::debug!(
            sender = %sender,
            receiver = %receiver,
            algorithm = %algorithm,
            key_wrap = key_wrap.name(),
            "payload encrypted"
        );
        Ok(Output::Framed(output))
    }

    /// Signs the plaintext `payload` as `sender`.
    ///
    /// Without `prior`, a new signed output carrying the plaintext is created.
    /// With `prior`, the signature is attached to it; `prior` must support
    /// signatures, i.e. be an output this service frames.
    ///
    /// 以 `sender` 身份对明文 `payload` 签名。
    ///
    /// 没有 `prior` 时创建携带明文的新签名输出；有 `prior` 时将签名附加到其上，
    /// 且 `prior` 必须支持签名。
    pub fn sign(&self, payload: &[u8], sender: &Alias, prior: Option<Output>) -> Result<Output> {
        let sender_key = self.registry.private_key(sender)?;
        let sender_cert = self.valid_certificate(sender)?;

        let mut output = match prior {
            None => FramedOutput::new(self.config.default_encoding()),
            Some(prior) => prior.into_signable().map_err(|other| {
                Error::encryption(format!(
                    "unrecognised output kind: {} output does not support signatures",
                    other.output_type()
                ))
            })?,
        };
        if payload.len() > MAX_FIELD_LEN {
            return Err(Error::encryption(format!(
                "payload of {} bytes exceeds the framing limit",
                payload.len()
            )));
        }

        let signature_algorithm = self
            .provider
            .signature(
                &sender_cert.signature_algorithm(),
                &sender_cert.signature_algorithm_oid(),
            )
            .map_err(|e| Error::encryption_caused_by(format!("cannot sign as '{sender}'"), e))?;
        let signature = signature_algorithm
            .sign(&sender_key, payload)
            .map_err(|e| Error::encryption_caused_by("signing failed", e))?;

        output.set_signed(signature, payload);
        tracing::debug!(
            sender = %sender,
            signature_algorithm = %signature_algorithm,
            output_type = %output.output_type(),
            "payload signed"
        );
        Ok(Output::Framed(output))
    }

    /// Encrypts `payload` to `receiver`, then signs the plaintext as `sender`.
    pub fn encrypt_and_sign(&self, payload: &[u8], sender: &Alias, receiver: &Alias) -> Result<Output> {
        let encrypted = self.encrypt(payload, sender, receiver)?;
        self.sign(payload, sender, Some(encrypted))
    }

    /// Opens a framed `payload` addressed to `receiver` and checks the
    /// signature of `sender`, if one is present. Returns the recovered
    /// plaintext.
    ///
    /// Decryption always happens first: signatures cover plaintext, never
    /// ciphertext. A payload without a signature verifies trivially.
    ///
    /// 打开发给 `receiver` 的帧负载，并在存在签名时校验 `sender` 的签名，返回恢复出的明文。
    ///
    /// 总是先解密：签名覆盖的是明文而非密文。没有签名的负载直接视为验证通过。
    pub fn verify(&self, payload: &[u8], receiver: &Alias, sender: &Alias) -> Result<Output> {
        let algorithm = self
            .algorithm()
            .ok_or_else(|| Error::verification("no algorithm configured; set_algorithm must be called before verify"))?;

        let (receiver_key, receiver_cert) = self.registry.key_pair(receiver)?;
        let sender_cert = self.valid_certificate(sender)?;

        let framed = FramedOutput::split(payload)
            .map_err(|e| Error::verification_caused_by("malformed payload", e))?;
        let plaintext = self.decrypt(
            &framed,
            receiver,
            &receiver_key,
            receiver_cert.as_deref(),
            &algorithm,
        )?;

        if let Some(signature) = framed.signature() {
            let signature_algorithm = self
                .provider
                .signature(
                    &sender_cert.signature_algorithm(),
                    &sender_cert.signature_algorithm_oid(),
                )
                .map_err(|e| {
                    Error::verification_caused_by(format!("cannot verify signatures of '{sender}'"), e)
                })?;
            let verified = signature_algorithm
                .verify(&sender_cert.public_key(), &plaintext, signature)
                .map_err(|e| Error::verification_caused_by("signature check failed", e))?;
            if !verified {
                tracing::warn!(sender = %sender, receiver = %receiver, "signature mismatch");
                return Err(Error::verification(format!(
                    "signature of '{sender}' does not match the payload"
                )));
            }
        }

        tracing::debug!(
            sender = %sender,
            receiver = %receiver,
            output_type = %framed.output_type(),
            "payload verified"
        );
        Ok(Output::Raw(
            RawOutput::plain(plaintext).with_default_encoding(self.config.default_encoding()),
        ))
    }

    /// Recovers the plaintext body of a parsed payload. Without a wrapped
    /// session key the body already is plaintext.
    ///
    /// The wrap scheme comes from the receiver's own certificate, taken from
    /// the same repository as `receiver_key`, or from the key itself when that
    /// repository holds no certificate.
    fn decrypt(
        &self,
        framed: &FramedOutput,
        receiver: &Alias,
        receiver_key: &PrivateKey,
        receiver_cert: Option<&dyn CertificateHandler>,
        algorithm: &AlgorithmDescriptor,
    ) -> Result<Vec<u8>> {
        let body = framed.body().unwrap_or_default();
        let Some(wrapped_key) = framed.wrapped_session_key() else {
            return Ok(body.to_vec());
        };

        let cipher = self.provider.symmetric(algorithm).map_err(|e| {
            Error::decryption_caused_by(format!("cannot use algorithm {algorithm}"), e)
        })?;
        let key_algorithm = match receiver_cert {
            Some(cert) => cert.key_algorithm(),
            None => {
                tracing::debug!(
                    receiver = %receiver,
                    key_algorithm = receiver_key.algorithm(),
                    "no receiver certificate, using the private key algorithm"
                );
                receiver_key.algorithm().to_string()
            }
        };
        let key_wrap = self.provider.key_wrap(&key_algorithm).map_err(|e| {
            Error::decryption_caused_by(format!("cannot unwrap keys for '{receiver}'"), e)
        })?;

        let session_key = key_wrap
            .unwrap_key(receiver_key, wrapped_key)
            .map_err(|e| Error::decryption_caused_by("session key unwrapping failed", e))?;
        cipher
            .decrypt(&session_key, framed.iv().unwrap_or_default(), body)
            .map_err(|e| Error::decryption_caused_by("bulk decryption failed", e))
    }

    /// Resolves the certificate of `alias` and rejects it unless it is valid.
    fn valid_certificate(&self, alias: &Alias) -> Result<Arc<dyn CertificateHandler>> {
        let certificate = self.registry.certificate(alias)?;
        if !certificate.is_valid() {
            tracing::warn!(alias = %alias, "certificate failed validation");
            return Err(Error::certificate(format!("certificate for '{alias}' is not valid")));
        }
        Ok(certificate)
    }
}

impl std::fmt::Debug for SecurityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityService")
            .field("registry", &self.registry)
            .field("algorithm", &*self.algorithm.read())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
