use ss_api_types::{EntryId, TxStatus};
use ss_chain_client::{CallOverrides, StorageContract, TxReceipt};
use tracing::{debug, info, warn};

use crate::{DappContext, DappError, Notice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub entry_id: EntryId,
    pub tx_hash: String,
}

/// Issues `set` with a fixed gas ceiling and waits for the receipt.
pub struct ContractGateway {
    overrides: CallOverrides,
}

impl ContractGateway {
    pub fn new(overrides: CallOverrides) -> Self {
        Self { overrides }
    }

    pub async fn dispatch(&self, contract: &dyn StorageContract, value: &str) -> Result<TxReceipt, DappError> {
        let pending = contract
            .set(value, self.overrides)
            .await
            .map_err(|err| DappError::TransactionFailure(format!("{err:#}")))?;

        debug!(tx_hash = pending.tx_hash(), "awaiting confirmation");
        pending
            .wait()
            .await
            .map_err(|err| DappError::TransactionFailure(format!("{err:#}")))
    }
}

impl DappContext {
    /// Record `input_value` as Pending, send it to the contract and settle the entry with
    /// the outcome.
    ///
    /// The entry always settles in the log of the account that submitted it, even if the
    /// wallet switched accounts while the transaction was in flight.
    pub async fn submit(&self, input_value: &str) -> Result<SubmitReceipt, DappError> {
        let started = {
            let mut state = self.state.borrow_mut();
            let contract = state.session.binding();
            let account = state.session.account().cloned();
            match (contract, account) {
                (Some(contract), Some(account)) => state
                    .history
                    .append(input_value)
                    .map(|entry_id| (contract, account, entry_id))
                    .map_err(DappError::from),
                _ => Err(DappError::NotInitialized),
            }
        };
        let (contract, account, entry_id) = started.map_err(|err| self.fail(err))?;
        self.changed();
        info!(account = %account, entry = %entry_id, value = input_value, "submitting value");

        let outcome = self.gateway.dispatch(contract.as_ref(), input_value).await;
        let status = match &outcome {
            Ok(_) => TxStatus::Completed,
            Err(_) => TxStatus::Error,
        };

        let settled = self
            .state
            .borrow_mut()
            .history
            .settle(&account, entry_id, status);
        match settled {
            Ok(true) => debug!(entry = %entry_id, status = %status, "entry settled"),
            Ok(false) => debug!(entry = %entry_id, "entry removed before it settled"),
            Err(err) => warn!(entry = %entry_id, "failed to record outcome: {err}"),
        }
        self.changed();

        match outcome {
            Ok(receipt) => {
                info!(entry = %entry_id, tx_hash = %receipt.tx_hash, "value confirmed");
                Ok(SubmitReceipt {
                    entry_id,
                    tx_hash: receipt.tx_hash,
                })
            }
            Err(err) => {
                warn!(entry = %entry_id, "submission failed: {err}");
                Err(self.fail(err))
            }
        }
    }

    /// Last locally confirmed value; not a live read of contract storage.
    pub fn current_value(&self) -> Option<String> {
        self.state
            .borrow()
            .history
            .latest_completed()
            .map(|entry| entry.input_value.clone())
    }

    pub fn show_current_value(&self) -> Option<String> {
        let value = self.current_value();
        self.notifier.notify(Notice::CurrentValue(value.clone()));
        value
    }
}
