//! The per-service registry of key repositories.
//!
//! 每个服务实例独有的密钥仓库注册表。

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{BoxError, Error, Result};
use crate::keys::PrivateKey;
use crate::provider::{Alias, CertificateHandler, KeyRepository, RepositorySource};

/// Ordered map from repository identity to repository proxy.
///
/// Lookups scan repositories in registration order. Readers clone the proxies
/// they need out of the lock, so a slow repository never blocks registration.
///
/// 从仓库标识到仓库代理的有序映射。
///
/// 查找按注册顺序扫描仓库。读取方会把所需代理克隆出锁外，因此慢速仓库不会阻塞注册。
#[derive(Default)]
pub struct KeyRepositoryRegistry {
    repositories: RwLock<IndexMap<String, Arc<dyn KeyRepository>>>,
}

impl KeyRepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `source` and stores its proxy. An identity that is already
    /// registered keeps its scan position and gets the new proxy.
    ///
    /// 解析 `source` 并保存其代理。已注册的标识保持原扫描位置并替换为新代理。
    pub fn register(&self, source: &dyn RepositorySource) -> Result<()> {
        let id = source.id().to_string();
        let repository = source.resolve().map_err(|e| match e {
            Error::Repository { .. } => e,
            other => Error::repository_caused_by(
                format!("failed to resolve key repository '{id}'"),
                other,
            ),
        })?;
        let replaced = self.repositories.write().insert(id.clone(), repository);
        tracing::debug!(repository = %id, replaced = replaced.is_some(), "registered key repository");
        Ok(())
    }

    /// Removes a repository. Removing an unknown identity is a no-op.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.repositories.write().shift_remove(id).is_some();
        if removed {
            tracing::debug!(repository = %id, "removed key repository");
        }
        removed
    }

    /// Registered identities in scan order.
    pub fn ids(&self) -> Vec<String> {
        self.repositories.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.repositories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.read().is_empty()
    }

    /// Finds the first repository, in registration order, that holds `alias`.
    ///
    /// 按注册顺序查找第一个包含 `alias` 的仓库。
    fn locate(&self, alias: &Alias) -> Result<(String, Arc<dyn KeyRepository>)> {
        let snapshot: Vec<(String, Arc<dyn KeyRepository>)> = self
            .repositories
            .read()
            .iter()
            .map(|(id, repository)| (id.clone(), Arc::clone(repository)))
            .collect();

        let mut last_failure: Option<BoxError> = None;
        for (id, repository) in snapshot {
            match repository.contains_alias(alias) {
                Ok(true) => return Ok((id, repository)),
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(repository = %id, alias = %alias, error = %e, "alias lookup failed");
                    last_failure = Some(e);
                }
            }
        }

        let message = format!("alias '{alias}' not found in any registered key repository");
        Err(match last_failure {
            Some(cause) => Error::repository_caused_by(message, cause),
            None => Error::repository(message),
        })
    }

    /// Resolves the private key stored under `alias`.
    pub fn private_key(&self, alias: &Alias) -> Result<PrivateKey> {
        let (id, repository) = self.locate(alias)?;
        read_private_key(&id, repository.as_ref(), alias)
    }

    /// Resolves the private key stored under `alias` together with the
    /// certificate held next to it in the same repository, if there is one.
    ///
    /// 解析 `alias` 下的私钥，以及同一仓库中与之并存的证书（如果有）。
    pub fn key_pair(
        &self,
        alias: &Alias,
    ) -> Result<(PrivateKey, Option<Arc<dyn CertificateHandler>>)> {
        let (id, repository) = self.locate(alias)?;
        let private_key = read_private_key(&id, repository.as_ref(), alias)?;
        let certificate = match repository.certificate(alias) {
            Ok(certificate) => Some(certificate),
            Err(e) => {
                tracing::debug!(repository = %id, alias = %alias, error = %e, "no certificate next to private key");
                None
            }
        };
        Ok((private_key, certificate))
    }

    /// Resolves the certificate stored under `alias`. A repository that holds
    /// the alias but no certificate yields a certificate error.
    pub fn certificate(&self, alias: &Alias) -> Result<Arc<dyn CertificateHandler>> {
        let (id, repository) = self.locate(alias)?;
        repository.certificate(alias).map_err(|e| {
            Error::certificate_caused_by(
                format!("no certificate for '{alias}' in repository '{id}'"),
                e,
            )
        })
    }
}

fn read_private_key(id: &str, repository: &dyn KeyRepository, alias: &Alias) -> Result<PrivateKey> {
    repository.private_key(alias).map_err(|e| {
        Error::repository_caused_by(
            format!("cannot read private key '{alias}' from repository '{id}'"),
            e,
        )
    })
}

impl std::fmt::Debug for KeyRepositoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRepositoryRegistry")
            .field("repositories", &self.ids())
            .finish()
    }
}
