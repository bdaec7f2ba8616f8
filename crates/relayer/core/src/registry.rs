//! Mapping from chain id to the client of that chain.

use crate::{AlloyChainClient, ChainClient, RegistryError, SubmissionQueue};
use alloy_primitives::ChainId;
use alloy_signer_local::PrivateKeySigner;
use futures::future::try_join_all;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use url::Url;

/// Everything the relayer needs to act on one chain.
#[derive(Debug)]
pub struct DomainHandle {
    chain_id: ChainId,
    client: Arc<dyn ChainClient>,
    submissions: SubmissionQueue,
}

impl DomainHandle {
    /// Creates a handle and spawns the submission queue of the chain.
    pub fn new(chain_id: ChainId, client: Arc<dyn ChainClient>, cancel: CancellationToken) -> Self {
        let submissions = SubmissionQueue::spawn(chain_id, client.clone(), cancel);
        Self { chain_id, client, submissions }
    }

    /// Returns the chain id.
    pub const fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Returns the RPC client of the chain.
    pub fn client(&self) -> &dyn ChainClient {
        self.client.as_ref()
    }

    /// Returns the submission queue of the chain.
    pub const fn submissions(&self) -> &SubmissionQueue {
        &self.submissions
    }
}

/// The set of chains the relayer serves, keyed by chain id.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Default)]
pub struct ChainRegistry {
    domains: HashMap<ChainId, Arc<DomainHandle>>,
}

impl ChainRegistry {
    /// Connects to every endpoint and registers it under the chain id it reports.
    pub async fn connect(
        urls: &[Url],
        signer: PrivateKeySigner,
        cancel: CancellationToken,
    ) -> Result<Self, RegistryError> {
        if urls.is_empty() {
            return Err(RegistryError::NoEndpoints);
        }

        let clients = try_join_all(urls.iter().map(|url| {
            let signer = signer.clone();
            async move {
                AlloyChainClient::connect(url.clone(), signer)
                    .await
                    .map_err(|source| RegistryError::Connect { url: url.clone(), source })
            }
        }))
        .await?;

        Self::from_clients(
            clients.into_iter().map(|client| {
                (client.resolved_chain_id(), Arc::new(client) as Arc<dyn ChainClient>)
            }),
            cancel,
        )
    }

    /// Registers already connected clients.
    ///
    /// Fails without spawning anything if two clients share a chain id.
    pub fn from_clients(
        clients: impl IntoIterator<Item = (ChainId, Arc<dyn ChainClient>)>,
        cancel: CancellationToken,
    ) -> Result<Self, RegistryError> {
        let clients = clients.into_iter().collect::<Vec<_>>();
        if clients.is_empty() {
            return Err(RegistryError::NoEndpoints);
        }
        let mut seen = HashSet::with_capacity(clients.len());
        if let Some((chain_id, _)) = clients.iter().find(|(chain_id, _)| !seen.insert(*chain_id)) {
            return Err(RegistryError::DuplicateChain(*chain_id));
        }

        let domains = clients
            .into_iter()
            .map(|(chain_id, client)| {
                info!(target: "relayer::registry", chain_id, "Registered chain");
                (chain_id, Arc::new(DomainHandle::new(chain_id, client, cancel.clone())))
            })
            .collect();
        Ok(Self { domains })
    }

    /// Returns the handle of the given chain.
    pub fn get(&self, chain_id: ChainId) -> Result<&Arc<DomainHandle>, RegistryError> {
        self.domains.get(&chain_id).ok_or(RegistryError::UnknownChain(chain_id))
    }

    /// Returns the handles of all registered chains.
    pub fn domains(&self) -> impl Iterator<Item = &Arc<DomainHandle>> {
        self.domains.values()
    }

    /// Returns the ids of all registered chains.
    pub fn chain_ids(&self) -> Vec<ChainId> {
        let mut ids = self.domains.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of registered chains.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Returns `true` if no chain is registered.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
