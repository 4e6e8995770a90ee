//! One chain's endpoints, tried in priority order until one answers.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use futures::future::try_join_all;

use crate::client::EvmRpcClient;
use crate::contract::{Contract, ContractBinding};
use crate::error::ReadError;
use crate::outcome::Outcome;
use crate::types::{Block, ChainDescriptor, Log, LogFilter, TransactionReceipt};

/// Failover read access to one chain.
///
/// Holds one client per endpoint in the descriptor's order and a cache of
/// registered contract bindings keyed by lower-cased address.
pub struct ProviderSet {
    descriptor: ChainDescriptor,
    clients: Vec<Arc<dyn EvmRpcClient>>,
    contracts: RwLock<HashMap<String, Arc<ContractBinding>>>,
}

impl ProviderSet {
    /// Build a provider set from already-constructed clients, one per
    /// `descriptor.rpc` entry and in the same order.
    pub fn new(
        descriptor: ChainDescriptor,
        clients: Vec<Arc<dyn EvmRpcClient>>,
    ) -> Result<Self, ReadError> {
        if clients.is_empty() {
            return Err(ReadError::NoEndpoints {
                chain: descriptor.name,
            });
        }
        if clients.len() != descriptor.rpc.len() {
            return Err(ReadError::Config(format!(
                "chain '{}' lists {} endpoints but {} clients were given",
                descriptor.name,
                descriptor.rpc.len(),
                clients.len()
            )));
        }
        Ok(Self {
            descriptor,
            clients,
            contracts: RwLock::new(HashMap::new()),
        })
    }

    /// Build a provider set by creating one client per endpoint URL.
    pub fn connect_with<F>(descriptor: ChainDescriptor, mut make_client: F) -> Result<Self, ReadError>
    where
        F: FnMut(&str) -> Result<Arc<dyn EvmRpcClient>, ReadError>,
    {
        let clients = descriptor
            .rpc
            .iter()
            .map(|url| make_client(url))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(descriptor, clients)
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn chain_id(&self) -> u64 {
        self.descriptor.chain_id
    }

    /// Endpoint URLs in priority order.
    pub fn endpoints(&self) -> &[String] {
        &self.descriptor.rpc
    }

    pub fn descriptor(&self) -> &ChainDescriptor {
        &self.descriptor
    }

    // ─── Failover ─────────────────────────────────────────────────────────────

    /// Run `op` against each endpoint in priority order and return the first
    /// value produced.
    ///
    /// `Ok(Some(_))` stops the iteration. `Ok(None)` (endpoint had nothing)
    /// and `Err(_)` (endpoint failed) move on to the next endpoint. Endpoints
    /// are tried one at a time.
    pub async fn try_on_each_endpoint<T, F, Fut>(&self, mut op: F) -> Outcome<T>
    where
        F: FnMut(Arc<dyn EvmRpcClient>) -> Fut,
        Fut: Future<Output = Result<Option<T>, ReadError>>,
    {
        let chain = self.name();
        let mut attempts = 0;
        let mut answered = false;
        let mut last_error = None;

        for client in &self.clients {
            attempts += 1;
            match op(Arc::clone(client)).await {
                Ok(Some(value)) => return Outcome::Found(value),
                Ok(None) => {
                    answered = true;
                    tracing::debug!(chain, url = client.url(), attempt = attempts, "endpoint had no value");
                }
                Err(e) => {
                    tracing::warn!(
                        chain,
                        url = client.url(),
                        attempt = attempts,
                        error = %e,
                        "endpoint failed, trying next"
                    );
                    last_error = Some(e.to_string());
                }
            }
        }

        if answered {
            Outcome::Empty { attempts }
        } else {
            let last_error = last_error.unwrap_or_default();
            tracing::error!(chain, attempts, error = %last_error, "all endpoints failed");
            Outcome::Exhausted {
                attempts,
                last_error,
            }
        }
    }

    // ─── Chain reads ──────────────────────────────────────────────────────────

    /// Latest block number.
    pub async fn get_block_number(&self) -> Result<u64, ReadError> {
        self.try_on_each_endpoint(|client| async move { client.get_block_number().await.map(Some) })
            .await
            .into_result(self.name(), || "latest block number".into())
    }

    /// Block by number. Never cached.
    pub async fn get_block(&self, number: u64) -> Result<Block, ReadError> {
        self.try_on_each_endpoint(move |client| async move { client.get_block(number).await })
            .await
            .into_result(self.name(), || format!("block {number}"))
    }

    /// `eth_getLogs` on the first endpoint that answers. An empty list is a
    /// valid answer; results are never merged across endpoints.
    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, ReadError> {
        self.try_on_each_endpoint(move |client| async move { client.get_logs(filter).await.map(Some) })
            .await
            .into_result(self.name(), || "logs".into())
    }

    pub async fn get_transaction_receipt(&self, hash: &str) -> Result<TransactionReceipt, ReadError> {
        self.try_on_each_endpoint(move |client| async move { client.get_transaction_receipt(hash).await })
            .await
            .into_result(self.name(), || format!("receipt for {hash}"))
    }

    /// Receipts for the transactions that emitted `logs`, in log order.
    /// Each lookup fails over independently; lookups run concurrently.
    pub async fn receipts_for_logs(&self, logs: &[Log]) -> Result<Vec<TransactionReceipt>, ReadError> {
        try_join_all(
            logs.iter()
                .map(|log| self.get_transaction_receipt(&log.transaction_hash)),
        )
        .await
    }

    // ─── Contracts ────────────────────────────────────────────────────────────

    /// Register `abi` for `address`, replacing any earlier binding.
    pub fn add_contract(&self, address: &str, abi: Arc<JsonAbi>) {
        let binding = Arc::new(ContractBinding::new(address, abi));
        tracing::debug!(chain = self.name(), address = binding.address(), "contract registered");
        self.contracts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(binding.address().to_string(), binding);
    }

    /// The registered binding for `address`, if any.
    pub fn contract(&self, address: &str) -> Option<Contract<'_>> {
        let key = address.to_ascii_lowercase();
        let binding = self
            .contracts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned()?;
        Some(Contract::new(binding, self))
    }

    /// A transient binding for `address`. Not added to the cache.
    pub fn bind(&self, address: &str, abi: Arc<JsonAbi>) -> Contract<'_> {
        Contract::new(Arc::new(ContractBinding::new(address, abi)), self)
    }

    /// Number of registered contract bindings.
    pub fn contract_count(&self) -> usize {
        self.contracts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Call a view method of `address`.
    ///
    /// A registered binding takes precedence over `abi`. Otherwise a transient
    /// binding is built from `abi` for this call only.
    pub async fn read_contract(
        &self,
        address: &str,
        abi: &Arc<JsonAbi>,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ReadError> {
        let contract = match self.contract(address) {
            Some(contract) => contract,
            None => {
                tracing::debug!(chain = self.name(), address, "unregistered contract, binding ad hoc");
                self.bind(address, Arc::clone(abi))
            }
        };
        contract.read(method, args).await
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet")
            .field("name", &self.descriptor.name)
            .field("chain_id", &self.descriptor.chain_id)
            .field("endpoints", &self.descriptor.rpc)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers `get_block_number` with a fixed result and records calls.
    struct Scripted {
        url: String,
        answer: Result<u64, ()>,
        journal: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EvmRpcClient for Scripted {
        fn url(&self) -> &str {
            &self.url
        }
        async fn call(&self, _to: &str, _data: &[u8]) -> Result<Vec<u8>, ReadError> {
            unimplemented!()
        }
        async fn get_logs(&self, _f: &LogFilter) -> Result<Vec<Log>, ReadError> {
            self.journal.lock().unwrap().push(self.url.clone());
            Ok(vec![])
        }
        async fn get_block_number(&self) -> Result<u64, ReadError> {
            self.journal.lock().unwrap().push(self.url.clone());
            self.answer
                .map_err(|_| TransportError::Http("connection refused".into()).into())
        }
        async fn get_block(&self, _n: u64) -> Result<Option<Block>, ReadError> {
            self.journal.lock().unwrap().push(self.url.clone());
            Ok(None)
        }
        async fn get_transaction_receipt(
            &self,
            _h: &str,
        ) -> Result<Option<TransactionReceipt>, ReadError> {
            unimplemented!()
        }
    }

    fn set(answers: &[Result<u64, ()>]) -> (ProviderSet, Arc<Mutex<Vec<String>>>) {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let urls: Vec<String> = (0..answers.len()).map(|i| format!("https://rpc{i}")).collect();
        let clients = urls
            .iter()
            .zip(answers)
            .map(|(url, answer)| {
                Arc::new(Scripted {
                    url: url.clone(),
                    answer: *answer,
                    journal: journal.clone(),
                }) as Arc<dyn EvmRpcClient>
            })
            .collect();
        let set = ProviderSet::new(ChainDescriptor::new("testnet", urls, 1), clients).unwrap();
        (set, journal)
    }

    #[test]
    fn empty_endpoint_list_rejected() {
        let err = ProviderSet::new(ChainDescriptor::new("none", vec![], 1), vec![]).unwrap_err();
        assert!(matches!(err, ReadError::NoEndpoints { .. }));
    }

    #[test]
    fn client_count_must_match_endpoints() {
        let (a, _) = set(&[Ok(1)]);
        let clients = a.clients.clone();
        let descriptor = ChainDescriptor::new("x", vec!["https://a".into(), "https://b".into()], 1);
        assert!(matches!(
            ProviderSet::new(descriptor, clients),
            Err(ReadError::Config(_))
        ));
    }

    #[tokio::test]
    async fn first_success_stops_iteration() {
        let (set, journal) = set(&[Err(()), Err(()), Ok(77), Ok(99)]);
        assert_eq!(set.get_block_number().await.unwrap(), 77);
        assert_eq!(
            *journal.lock().unwrap(),
            vec!["https://rpc0", "https://rpc1", "https://rpc2"]
        );
    }

    #[tokio::test]
    async fn zero_is_returned_not_skipped() {
        let (set, journal) = set(&[Ok(0), Ok(5)]);
        assert_eq!(set.get_block_number().await.unwrap(), 0);
        assert_eq!(journal.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn all_failures_exhaust() {
        let (set, journal) = set(&[Err(()), Err(()), Err(())]);
        let err = set.get_block_number().await.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(journal.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn null_answers_are_not_found() {
        let (set, journal) = set(&[Ok(1), Ok(1)]);
        let err = set.get_block(12).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(journal.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_log_list_is_an_answer() {
        let (set, journal) = set(&[Ok(1), Ok(1)]);
        assert!(set.get_logs(&LogFilter::default()).await.unwrap().is_empty());
        assert_eq!(journal.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn outcome_reports_attempts() {
        let (set, _) = set(&[Err(()), Err(())]);
        let outcome = set
            .try_on_each_endpoint(|c| async move { c.get_block_number().await.map(Some) })
            .await;
        assert_eq!(outcome.attempts(), Some(2));
        assert!(!outcome.is_found());
    }
}
