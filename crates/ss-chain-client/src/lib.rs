use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ss_api_types::WalletAddress;
use std::rc::Rc;

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x7129bEBB8D52d1DC0AB69fa4e70337445900F173";
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;

/// Where the storage contract lives and how much gas a `set` may burn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContractConfig {
    pub address: String,
    pub gas_limit: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONTRACT_ADDRESS.to_owned(),
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

impl ContractConfig {
    pub fn overrides(&self) -> CallOverrides {
        CallOverrides {
            gas_limit: self.gas_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOverrides {
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Injected wallet (account authorization plus signing).
///
/// Browser objects are not `Send`, so neither are these futures.
#[async_trait(?Send)]
pub trait WalletProvider {
    fn is_available(&self) -> bool;
    async fn request_accounts(&self) -> Result<Vec<WalletAddress>>;
    fn bind_contract(&self, signer: &WalletAddress, contract: &ContractConfig) -> Result<Rc<dyn StorageContract>>;
}

/// Contract binding exposing the single `set(string)` call.
#[async_trait(?Send)]
pub trait StorageContract {
    async fn set(&self, value: &str, overrides: CallOverrides) -> Result<Box<dyn PendingTransaction>>;
}

#[async_trait(?Send)]
pub trait PendingTransaction {
    fn tx_hash(&self) -> &str;
    /// Resolves once the transaction is mined; errors if it reverted or the provider failed.
    async fn wait(&self) -> Result<TxReceipt>;
}
