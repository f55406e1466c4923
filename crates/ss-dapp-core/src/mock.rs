use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use ss_api_types::{HistoryEntry, TxStatus, WalletAddress};
use ss_chain_client::{CallOverrides, ContractConfig, PendingTransaction, StorageContract, TxReceipt, WalletProvider};
use ss_storage::{HistoryStore, InMemoryStore, KeyValueStore};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::oneshot;

use crate::{Confirmation, DappConfig, DappContext, Notice, Notifier};

pub fn account_x() -> WalletAddress {
    WalletAddress::from("0x1111111111111111111111111111111111111111")
}

pub fn account_y() -> WalletAddress {
    WalletAddress::from("0x2222222222222222222222222222222222222222")
}

/// How the next `set` call plays out.
pub enum Outcome {
    Confirm,
    Revert,
    Reject,
    /// Resolves when the test sends; `true` confirms, anything else fails.
    Deferred(oneshot::Receiver<bool>),
}

#[derive(Default)]
pub struct MockContract {
    outcomes: RefCell<VecDeque<Outcome>>,
    calls: RefCell<Vec<(String, u64)>>,
}

impl MockContract {
    pub fn push(&self, outcome: Outcome) {
        self.outcomes.borrow_mut().push_back(outcome);
    }

    pub fn calls(&self) -> Vec<(String, u64)> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

#[async_trait(?Send)]
impl StorageContract for MockContract {
    async fn set(&self, value: &str, overrides: CallOverrides) -> Result<Box<dyn PendingTransaction>> {
        let count = {
            let mut calls = self.calls.borrow_mut();
            calls.push((value.to_owned(), overrides.gas_limit));
            calls.len()
        };
        let outcome = self.outcomes.borrow_mut().pop_front().unwrap_or(Outcome::Confirm);
        if matches!(outcome, Outcome::Reject) {
            bail!("user rejected transaction");
        }

        Ok(Box::new(MockPending {
            tx_hash: format!("0xtx{count}"),
            outcome: RefCell::new(Some(outcome)),
        }))
    }
}

struct MockPending {
    tx_hash: String,
    outcome: RefCell<Option<Outcome>>,
}

#[async_trait(?Send)]
impl PendingTransaction for MockPending {
    fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    async fn wait(&self) -> Result<TxReceipt> {
        let outcome = self.outcome.borrow_mut().take();
        let confirmed = match outcome {
            Some(Outcome::Confirm) => true,
            Some(Outcome::Deferred(rx)) => rx.await.unwrap_or(false),
            Some(Outcome::Revert) | Some(Outcome::Reject) => false,
            None => bail!("receipt already awaited"),
        };

        if !confirmed {
            return Err(anyhow!("transaction {} reverted", self.tx_hash));
        }
        Ok(TxReceipt {
            tx_hash: self.tx_hash.clone(),
            block_number: Some(1),
        })
    }
}

pub struct MockWallet {
    available: Cell<bool>,
    accounts: RefCell<Vec<WalletAddress>>,
    auth_error: RefCell<Option<String>>,
    binding_fails: Cell<bool>,
    requests: Cell<usize>,
    bound: RefCell<Vec<WalletAddress>>,
    pub contract: Rc<MockContract>,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            available: Cell::new(true),
            accounts: RefCell::new(vec![account_x()]),
            auth_error: RefCell::new(None),
            binding_fails: Cell::new(false),
            requests: Cell::new(0),
            bound: RefCell::new(Vec::new()),
            contract: Rc::new(MockContract::default()),
        }
    }
}

impl MockWallet {
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    pub fn reject_authorization(&self, reason: &str) {
        *self.auth_error.borrow_mut() = Some(reason.to_owned());
    }

    pub fn fail_binding(&self, fails: bool) {
        self.binding_fails.set(fails);
    }

    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    pub fn bound_accounts(&self) -> Vec<WalletAddress> {
        self.bound.borrow().clone()
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockWallet {
    fn is_available(&self) -> bool {
        self.available.get()
    }

    async fn request_accounts(&self) -> Result<Vec<WalletAddress>> {
        self.requests.set(self.requests.get() + 1);
        if let Some(reason) = self.auth_error.borrow().clone() {
            bail!(reason);
        }
        Ok(self.accounts.borrow().clone())
    }

    fn bind_contract(&self, signer: &WalletAddress, _contract: &ContractConfig) -> Result<Rc<dyn StorageContract>> {
        self.bound.borrow_mut().push(signer.clone());
        if self.binding_fails.get() {
            bail!("contract code not found");
        }
        Ok(self.contract.clone())
    }
}

pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
    accept: Cell<bool>,
    prompts: Cell<usize>,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self {
            notices: RefCell::new(Vec::new()),
            accept: Cell::new(true),
            prompts: Cell::new(0),
        }
    }
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn answer(&self, accept: bool) {
        self.accept.set(accept);
    }

    pub fn prompts(&self) -> usize {
        self.prompts.get()
    }
}

#[async_trait(?Send)]
impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }

    async fn confirm(&self, _request: Confirmation) -> bool {
        self.prompts.set(self.prompts.get() + 1);
        self.accept.get()
    }
}

pub struct Harness {
    pub ctx: DappContext,
    pub wallet: Rc<MockWallet>,
    pub notifier: Rc<RecordingNotifier>,
    storage: Rc<InMemoryStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(DappConfig::default())
    }

    pub fn with_config(config: DappConfig) -> Self {
        let wallet = Rc::new(MockWallet::default());
        let notifier = Rc::new(RecordingNotifier::default());
        let storage = Rc::new(InMemoryStore::new());
        let ctx = DappContext::new(config, wallet.clone(), storage.clone(), notifier.clone());
        Self {
            ctx,
            wallet,
            notifier,
            storage,
        }
    }

    pub fn seed(&self, account: &WalletAddress, entries: &[(&str, TxStatus)]) {
        let mut store = HistoryStore::new(self.storage.clone());
        store.load(account).expect("seed load");
        for (value, status) in entries {
            let id = store.append(value).expect("seed append");
            if status.is_settled() {
                store.settle(account, id, *status).expect("seed settle");
            }
        }
    }

    pub fn seed_raw(&self, account: &WalletAddress, raw: &str) {
        self.storage.set(account.as_str(), raw).expect("seed raw");
    }

    /// What a fresh load of `account` would see.
    pub fn stored(&self, account: &WalletAddress) -> Vec<HistoryEntry> {
        let mut store = HistoryStore::new(self.storage.clone());
        store.load(account).expect("stored log loads");
        store.entries().to_vec()
    }
}
