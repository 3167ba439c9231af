//! An in-memory key repository and certificate handler, for applications that
//! already hold their key material and for tests.
//!
//! 内存中的密钥仓库和证书处理器，适用于已持有密钥材料的应用和测试。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretBox};

use super::{Alias, CertificateHandler, KeyRepository, RepositorySource};
use crate::algorithms::SignatureAlgorithm;
use crate::error::{BoxError, Result};
use crate::keys::{PrivateKey, PublicKey};

/// A certificate described by plain values, valid inside a fixed time window.
///
/// 由普通值描述的证书，在固定时间窗口内有效。
#[derive(Clone, Debug)]
pub struct StaticCertificate {
    public_key: PublicKey,
    key_algorithm: String,
    signature_algorithm: String,
    signature_algorithm_oid: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

impl StaticCertificate {
    /// A certificate for `public_key` signed with `algorithm`, valid from now
    /// for one year.
    pub fn new(public_key: PublicKey, algorithm: SignatureAlgorithm) -> Self {
        let now = Utc::now();
        Self {
            key_algorithm: public_key.algorithm().to_string(),
            public_key,
            signature_algorithm: algorithm.name().to_string(),
            signature_algorithm_oid: algorithm.oid().to_string(),
            not_before: now,
            not_after: now + Duration::days(365),
        }
    }

    pub fn with_validity(mut self, not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Self {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }

    /// Overrides the key algorithm, e.g. to select OAEP key wrapping.
    pub fn with_key_algorithm(mut self, key_algorithm: impl Into<String>) -> Self {
        self.key_algorithm = key_algorithm.into();
        self
    }

    /// Overrides the reported signature algorithm name and OID.
    pub fn with_signature_algorithm(
        mut self,
        name: impl Into<String>,
        oid: impl Into<String>,
    ) -> Self {
        self.signature_algorithm = name.into();
        self.signature_algorithm_oid = oid.into();
        self
    }
}

impl CertificateHandler for StaticCertificate {
    fn is_valid(&self) -> bool {
        let now = Utc::now();
        self.not_before <= now && now <= self.not_after
    }

    fn public_key(&self) -> PublicKey {
        self.public_key.clone()
    }

    fn key_algorithm(&self) -> String {
        self.key_algorithm.clone()
    }

    fn signature_algorithm(&self) -> String {
        self.signature_algorithm.clone()
    }

    fn signature_algorithm_oid(&self) -> String {
        self.signature_algorithm_oid.clone()
    }
}

#[derive(Default)]
struct Entry {
    private_key: Option<PrivateKey>,
    password: Option<SecretBox<str>>,
    certificate: Option<Arc<dyn CertificateHandler>>,
}

/// A key repository holding its entries in memory.
///
/// 将条目保存在内存中的密钥仓库。
#[derive(Default)]
pub struct MemoryRepository {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a private key and the certificate of its public half.
    ///
    /// 保存一个私钥及其公钥对应的证书。
    pub fn insert_key_pair(
        &self,
        alias: impl Into<String>,
        private_key: PrivateKey,
        certificate: impl CertificateHandler + 'static,
    ) {
        let mut entries = self.entries.write();
        let entry = entries.entry(alias.into()).or_default();
        entry.private_key = Some(private_key);
        entry.certificate = Some(Arc::new(certificate));
    }

    /// Stores a private key that can only be read with `password`.
    pub fn insert_protected_key(
        &self,
        alias: impl Into<String>,
        private_key: PrivateKey,
        password: impl Into<String>,
    ) {
        let mut entries = self.entries.write();
        let entry = entries.entry(alias.into()).or_default();
        entry.private_key = Some(private_key);
        entry.password = Some(SecretBox::new(password.into().into_boxed_str()));
    }

    /// Stores a certificate only, as for a partner whose private key is not held.
    pub fn insert_certificate(
        &self,
        alias: impl Into<String>,
        certificate: Arc<dyn CertificateHandler>,
    ) {
        let mut entries = self.entries.write();
        entries.entry(alias.into()).or_default().certificate = Some(certificate);
    }

    pub fn remove(&self, alias: &str) -> bool {
        self.entries.write().remove(alias).is_some()
    }

    /// Wraps the repository into a source registrable under `id`.
    pub fn into_source(self, id: impl Into<String>) -> MemoryRepositorySource {
        MemoryRepositorySource::new(id, Arc::new(self))
    }
}

impl KeyRepository for MemoryRepository {
    fn contains_alias(&self, alias: &Alias) -> std::result::Result<bool, BoxError> {
        Ok(self.entries.read().contains_key(alias.name()))
    }

    fn certificate(
        &self,
        alias: &Alias,
    ) -> std::result::Result<Arc<dyn CertificateHandler>, BoxError> {
        self.entries
            .read()
            .get(alias.name())
            .and_then(|entry| entry.certificate.clone())
            .ok_or_else(|| format!("no certificate stored under alias '{alias}'").into())
    }

    fn private_key(&self, alias: &Alias) -> std::result::Result<PrivateKey, BoxError> {
        let entries = self.entries.read();
        let entry = entries
            .get(alias.name())
            .ok_or_else(|| format!("alias '{alias}' not found"))?;
        if let Some(expected) = &entry.password {
            if alias.password() != Some(expected.expose_secret()) {
                return Err(format!("wrong password for alias '{alias}'").into());
            }
        }
        entry
            .private_key
            .clone()
            .ok_or_else(|| format!("no private key stored under alias '{alias}'").into())
    }
}

/// Registers a shared [`MemoryRepository`] under a fixed identity.
///
/// 以固定标识注册一个共享的 [`MemoryRepository`]。
#[derive(Clone)]
pub struct MemoryRepositorySource {
    id: String,
    repository: Arc<MemoryRepository>,
}

impl MemoryRepositorySource {
    pub fn new(id: impl Into<String>, repository: Arc<MemoryRepository>) -> Self {
        Self {
            id: id.into(),
            repository,
        }
    }

    pub fn repository(&self) -> &Arc<MemoryRepository> {
        &self.repository
    }
}

impl RepositorySource for MemoryRepositorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn resolve(&self) -> Result<Arc<dyn KeyRepository>> {
        Ok(self.repository.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn test_key() -> &'static PrivateKey {
        static KEY: OnceLock<PrivateKey> = OnceLock::new();
        KEY.get_or_init(|| PrivateKey::generate_rsa(1024).unwrap())
    }

    #[test]
    fn test_key_pair_lookup() {
        let repo = MemoryRepository::new();
        let key = test_key().clone();
        let cert = StaticCertificate::new(key.public_key(), SignatureAlgorithm::Sha256WithRsa);
        repo.insert_key_pair("alice", key, cert);

        let alice = Alias::new("alice");
        assert!(repo.contains_alias(&alice).unwrap());
        assert!(!repo.contains_alias(&Alias::new("mallory")).unwrap());

        let cert = repo.certificate(&alice).unwrap();
        assert!(cert.is_valid());
        assert_eq!(cert.key_algorithm(), "RSA");
        assert_eq!(cert.signature_algorithm(), "SHA256withRSA");
        assert_eq!(cert.signature_algorithm_oid(), "1.2.840.113549.1.1.11");
        assert_eq!(cert.public_key(), test_key().public_key());
        assert!(repo.private_key(&alice).is_ok());
    }

    #[test]
    fn test_password_protected_key() {
        let repo = MemoryRepository::new();
        repo.insert_protected_key("vault", test_key().clone(), "s3cret");

        assert!(repo.private_key(&Alias::new("vault")).is_err());
        assert!(repo
            .private_key(&Alias::new("vault").with_password("wrong"))
            .is_err());
        assert!(repo
            .private_key(&Alias::new("vault").with_password("s3cret"))
            .is_ok());
        assert!(repo.certificate(&Alias::new("vault")).is_err());
    }

    #[test]
    fn test_reprotecting_replaces_password() {
        let repo = MemoryRepository::new();
        repo.insert_protected_key("vault", test_key().clone(), "first");
        repo.insert_protected_key("vault", test_key().clone(), "second");

        let entries = repo.entries.read();
        let stored = entries["vault"].password.as_ref().unwrap();
        assert_eq!(stored.expose_secret(), "second");
        drop(entries);

        assert!(repo
            .private_key(&Alias::new("vault").with_password("first"))
            .is_err());
        assert!(repo
            .private_key(&Alias::new("vault").with_password("second"))
            .is_ok());
    }

    #[test]
    fn test_expired_certificate_is_invalid() {
        let now = Utc::now();
        let cert = StaticCertificate::new(test_key().public_key(), SignatureAlgorithm::Sha256WithRsa)
            .with_validity(now - Duration::days(30), now - Duration::days(1));
        assert!(!cert.is_valid());
    }
}
