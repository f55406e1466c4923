use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use ss_api_types::WalletAddress;
use ss_chain_client::{
    CallOverrides, ContractConfig, PendingTransaction, StorageContract, TxReceipt, WalletProvider,
};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod abi;

/// EIP-1193 `request({ method, params })` surface of an injected provider.
#[async_trait(?Send)]
pub trait Eip1193Transport {
    fn is_available(&self) -> bool;
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
    /// Pause between receipt polls.
    async fn sleep(&self, duration: Duration);
}

/// Wallet provider speaking JSON-RPC through an injected EIP-1193 object.
pub struct EvmWalletProvider<T> {
    transport: Rc<T>,
    poll_interval: Duration,
}

impl<T> EvmWalletProvider<T> {
    pub fn new(transport: Rc<T>, poll_interval: Duration) -> Self {
        Self {
            transport,
            poll_interval,
        }
    }
}

#[async_trait(?Send)]
impl<T> WalletProvider for EvmWalletProvider<T>
where
    T: Eip1193Transport + 'static,
{
    fn is_available(&self) -> bool {
        self.transport.is_available()
    }

    async fn request_accounts(&self) -> Result<Vec<WalletAddress>> {
        let result = self
            .transport
            .request("eth_requestAccounts", json!([]))
            .await
            .context("eth_requestAccounts")?;

        let accounts: Vec<String> =
            serde_json::from_value(result).context("eth_requestAccounts parse")?;
        Ok(accounts.into_iter().map(WalletAddress).collect())
    }

    fn bind_contract(&self, signer: &WalletAddress, contract: &ContractConfig) -> Result<Rc<dyn StorageContract>> {
        if !self.transport.is_available() {
            bail!("wallet provider disappeared");
        }

        Ok(Rc::new(EvmStorageContract {
            transport: self.transport.clone(),
            signer: signer.clone(),
            address: contract.address.clone(),
            poll_interval: self.poll_interval,
        }))
    }
}

pub struct EvmStorageContract<T> {
    transport: Rc<T>,
    signer: WalletAddress,
    address: String,
    poll_interval: Duration,
}

#[async_trait(?Send)]
impl<T> StorageContract for EvmStorageContract<T>
where
    T: Eip1193Transport + 'static,
{
    async fn set(&self, value: &str, overrides: CallOverrides) -> Result<Box<dyn PendingTransaction>> {
        let tx = json!({
            "from": self.signer.as_str(),
            "to": self.address,
            "data": abi::set_call_data(value),
            "gas": format!("0x{:x}", overrides.gas_limit),
        });

        let result = self
            .transport
            .request("eth_sendTransaction", json!([tx]))
            .await
            .context("eth_sendTransaction")?;

        let tx_hash = result
            .as_str()
            .ok_or_else(|| anyhow!("eth_sendTransaction returned {result}"))?
            .to_owned();
        info!(tx_hash = %tx_hash, contract = %self.address, "set transaction sent");

        Ok(Box::new(EvmPendingTransaction {
            transport: self.transport.clone(),
            tx_hash,
            poll_interval: self.poll_interval,
        }))
    }
}

pub struct EvmPendingTransaction<T> {
    transport: Rc<T>,
    tx_hash: String,
    poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptResponse {
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[async_trait(?Send)]
impl<T> PendingTransaction for EvmPendingTransaction<T>
where
    T: Eip1193Transport + 'static,
{
    fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    async fn wait(&self) -> Result<TxReceipt> {
        let mut polls: u64 = 0;
        loop {
            let result = self
                .transport
                .request("eth_getTransactionReceipt", json!([self.tx_hash]))
                .await
                .context("eth_getTransactionReceipt")?;

            if result.is_null() {
                polls += 1;
                debug!(tx_hash = %self.tx_hash, polls, "receipt not available yet");
                self.transport.sleep(self.poll_interval).await;
                continue;
            }

            let receipt: ReceiptResponse =
                serde_json::from_value(result).context("eth_getTransactionReceipt parse")?;

            // Pre-Byzantium receipts carry no status field.
            if let Some(status) = receipt.status.as_deref() {
                if abi::parse_quantity(status) != Some(1) {
                    warn!(tx_hash = %self.tx_hash, status, "transaction reverted");
                    bail!("transaction {} reverted", self.tx_hash);
                }
            }

            let block_number = receipt.block_number.as_deref().and_then(abi::parse_quantity);
            info!(tx_hash = %self.tx_hash, ?block_number, "transaction confirmed");
            return Ok(TxReceipt {
                tx_hash: self.tx_hash.clone(),
                block_number,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";
    const TX_HASH: &str = "0xabc123";

    #[derive(Default)]
    struct ScriptedTransport {
        available: bool,
        responses: RefCell<VecDeque<Result<Value>>>,
        calls: RefCell<Vec<(String, Value)>>,
        sleeps: RefCell<u32>,
    }

    impl ScriptedTransport {
        fn with(responses: Vec<Result<Value>>) -> Rc<Self> {
            Rc::new(Self {
                available: true,
                responses: RefCell::new(responses.into()),
                ..Self::default()
            })
        }
    }

    #[async_trait(?Send)]
    impl Eip1193Transport for ScriptedTransport {
        fn is_available(&self) -> bool {
            self.available
        }

        async fn request(&self, method: &str, params: Value) -> Result<Value> {
            self.calls.borrow_mut().push((method.to_owned(), params));
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no scripted response for {method}")))
        }

        async fn sleep(&self, _duration: Duration) {
            *self.sleeps.borrow_mut() += 1;
        }
    }

    fn provider(transport: &Rc<ScriptedTransport>) -> EvmWalletProvider<ScriptedTransport> {
        EvmWalletProvider::new(transport.clone(), Duration::from_millis(1))
    }

    #[tokio::test]
    async fn request_accounts_maps_addresses() -> Result<()> {
        let transport = ScriptedTransport::with(vec![Ok(json!([ACCOUNT]))]);

        let accounts = provider(&transport).request_accounts().await?;

        assert_eq!(accounts, vec![WalletAddress::from(ACCOUNT)]);
        assert_eq!(transport.calls.borrow()[0].0, "eth_requestAccounts");
        Ok(())
    }

    #[tokio::test]
    async fn rejected_authorization_is_an_error() {
        let transport = ScriptedTransport::with(vec![Err(anyhow!("User rejected the request."))]);

        let err = provider(&transport).request_accounts().await.unwrap_err();

        assert!(format!("{err:#}").contains("User rejected"));
    }

    #[tokio::test]
    async fn set_sends_encoded_call_with_gas_ceiling() -> Result<()> {
        let transport = ScriptedTransport::with(vec![Ok(json!(TX_HASH))]);
        let contract = provider(&transport)
            .bind_contract(&WalletAddress::from(ACCOUNT), &ContractConfig::default())?;

        let pending = contract.set("42", CallOverrides { gas_limit: 1_000_000 }).await?;

        assert_eq!(pending.tx_hash(), TX_HASH);
        let calls = transport.calls.borrow();
        let (method, params) = &calls[0];
        assert_eq!(method, "eth_sendTransaction");
        let tx = &params[0];
        assert_eq!(tx["from"], ACCOUNT);
        assert_eq!(tx["to"], ss_chain_client::DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(tx["gas"], "0xf4240");
        let data = tx["data"].as_str().expect("data is a string");
        assert!(data.starts_with("0x4ed3885e"));
        assert_eq!(data.len(), 2 + 2 * (4 + 96));
        Ok(())
    }

    #[tokio::test]
    async fn wait_polls_until_receipt_appears() -> Result<()> {
        let transport = ScriptedTransport::with(vec![
            Ok(json!(TX_HASH)),
            Ok(Value::Null),
            Ok(Value::Null),
            Ok(json!({ "status": "0x1", "blockNumber": "0x10" })),
        ]);
        let contract = provider(&transport)
            .bind_contract(&WalletAddress::from(ACCOUNT), &ContractConfig::default())?;

        let pending = contract.set("42", CallOverrides { gas_limit: 21_000 }).await?;
        let receipt = pending.wait().await?;

        assert_eq!(receipt.tx_hash, TX_HASH);
        assert_eq!(receipt.block_number, Some(16));
        assert_eq!(*transport.sleeps.borrow(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn reverted_receipt_fails_wait() -> Result<()> {
        let transport = ScriptedTransport::with(vec![
            Ok(json!(TX_HASH)),
            Ok(json!({ "status": "0x0", "blockNumber": "0x11" })),
        ]);
        let contract = provider(&transport)
            .bind_contract(&WalletAddress::from(ACCOUNT), &ContractConfig::default())?;

        let pending = contract.set("42", CallOverrides { gas_limit: 21_000 }).await?;
        let err = pending.wait().await.unwrap_err();

        assert!(err.to_string().contains("reverted"));
        Ok(())
    }

    #[tokio::test]
    async fn binding_requires_an_available_provider() {
        let transport = Rc::new(ScriptedTransport::default());

        let result = provider(&transport)
            .bind_contract(&WalletAddress::from(ACCOUNT), &ContractConfig::default());

        assert!(result.is_err());
    }
}
