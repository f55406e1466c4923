use ss_api_types::WalletAddress;
use ss_chain_client::StorageContract;
use std::rc::Rc;
use tracing::{info, warn};

use crate::{DappContext, DappError, Notice};

const BINDING_FAILED: &str = "Error initializing contract. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected(WalletAddress),
}

/// What the host should do after a chain change reset the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionReset {
    Reload,
    InPlace,
}

pub struct Session {
    state: SessionState,
    binding: Option<Rc<dyn StorageContract>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
            binding: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn account(&self) -> Option<&WalletAddress> {
        match &self.state {
            SessionState::Connected(account) => Some(account),
            SessionState::Disconnected => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected(_))
    }

    pub fn binding(&self) -> Option<Rc<dyn StorageContract>> {
        self.binding.clone()
    }

    pub fn establish(&mut self, account: WalletAddress, binding: Option<Rc<dyn StorageContract>>) {
        self.state = SessionState::Connected(account);
        self.binding = binding;
    }

    /// Returns the account that was connected, if any.
    pub fn teardown(&mut self) -> Option<WalletAddress> {
        self.binding = None;
        match std::mem::replace(&mut self.state, SessionState::Disconnected) {
            SessionState::Connected(account) => Some(account),
            SessionState::Disconnected => None,
        }
    }
}

impl DappContext {
    pub async fn connect(&self) -> Result<WalletAddress, DappError> {
        if !self.wallet.is_available() {
            warn!("no wallet extension available");
            return Err(self.fail(DappError::ExtensionUnavailable));
        }

        let accounts = match self.wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                warn!("wallet authorization failed: {err:#}");
                return Err(self.fail(DappError::AuthorizationDenied(format!("{err:#}"))));
            }
        };

        let Some(account) = accounts.into_iter().next() else {
            return Err(self.fail(DappError::AuthorizationDenied(
                "wallet returned no accounts".to_owned(),
            )));
        };

        self.activate(&account)?;
        Ok(account)
    }

    pub fn disconnect(&self) {
        if let Some(account) = self.teardown() {
            info!(account = %account, "wallet disconnected");
            self.notifier.notify(Notice::Disconnected);
        }
        self.changed();
    }

    /// Single connect/disconnect control.
    pub async fn toggle_connection(&self) -> Result<(), DappError> {
        if self.is_connected() {
            self.disconnect();
            Ok(())
        } else {
            self.connect().await.map(|_| ())
        }
    }

    /// Wallet `accountsChanged`. An empty list means the wallet locked or revoked access.
    pub fn on_accounts_changed(&self, accounts: Vec<WalletAddress>) -> Result<(), DappError> {
        match accounts.into_iter().next() {
            Some(account) => {
                info!(account = %account, "wallet account changed");
                self.activate(&account)
            }
            None => {
                if let Some(account) = self.teardown() {
                    info!(account = %account, "wallet reported no accounts; session closed");
                }
                self.changed();
                Ok(())
            }
        }
    }

    /// Wallet `chainChanged`: full session reset. Persisted history is keyed by account and
    /// survives.
    pub fn on_chain_changed(&self) -> SessionReset {
        let previous = self.teardown();
        self.state.borrow_mut().error_message = None;
        info!(account = ?previous, "chain changed; session reset");
        self.changed();

        if self.config.reload_on_chain_change {
            SessionReset::Reload
        } else {
            SessionReset::InPlace
        }
    }

    /// Connected transition shared by `connect` and `accountsChanged`.
    fn activate(&self, account: &WalletAddress) -> Result<(), DappError> {
        let binding = match self.wallet.bind_contract(account, &self.config.contract) {
            Ok(binding) => Some(binding),
            Err(err) => {
                warn!(account = %account, "contract binding failed: {err:#}");
                None
            }
        };
        let bound = binding.is_some();

        let loaded = {
            let mut state = self.state.borrow_mut();
            match state.history.load(account) {
                Ok(()) => {
                    state.session.establish(account.clone(), binding);
                    state.edit = None;
                    state.error_message = (!bound).then(|| BINDING_FAILED.to_owned());
                    Ok(())
                }
                Err(err) => {
                    state.session.teardown();
                    state.history.unload();
                    state.edit = None;
                    Err(err)
                }
            }
        };

        if let Err(err) = loaded {
            warn!(account = %account, "history load failed: {err}");
            return Err(self.fail(err.into()));
        }

        info!(account = %account, bound, "wallet session established");
        self.changed();
        Ok(())
    }

    fn teardown(&self) -> Option<WalletAddress> {
        let mut state = self.state.borrow_mut();
        state.history.unload();
        state.edit = None;
        state.session.teardown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Harness, account_x, account_y};
    use ss_api_types::TxStatus;

    #[test]
    fn session_starts_disconnected() {
        let session = Session::new();

        assert_eq!(session.state(), &SessionState::Disconnected);
        assert!(session.binding().is_none());
    }

    #[tokio::test]
    async fn connect_without_extension_changes_nothing() {
        let h = Harness::new();
        h.wallet.set_available(false);

        let err = h.ctx.connect().await.unwrap_err();

        assert!(matches!(err, DappError::ExtensionUnavailable));
        assert!(!h.ctx.is_connected());
        assert_eq!(h.wallet.request_count(), 0);
        assert_eq!(
            h.ctx.error_message().as_deref(),
            Some("Please install MetaMask browser extension to interact")
        );
    }

    #[tokio::test]
    async fn rejected_authorization_stays_disconnected() {
        let h = Harness::new();
        h.wallet.reject_authorization("User rejected the request.");

        let err = h.ctx.connect().await.unwrap_err();

        assert!(matches!(err, DappError::AuthorizationDenied(reason) if reason.contains("User rejected")));
        assert!(!h.ctx.is_connected());
        assert!(h.ctx.history().is_empty());
    }

    #[tokio::test]
    async fn connect_loads_history_and_binds_contract() -> anyhow::Result<()> {
        let h = Harness::new();
        h.seed(&account_x(), &[("A", TxStatus::Completed), ("B", TxStatus::Error)]);

        let account = h.ctx.connect().await?;

        assert_eq!(account, account_x());
        assert_eq!(h.ctx.account(), Some(account_x()));
        assert_eq!(h.ctx.history().len(), 2);
        assert_eq!(h.wallet.bound_accounts(), vec![account_x()]);
        assert!(h.ctx.error_message().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn disconnect_clears_session_but_not_storage() -> anyhow::Result<()> {
        let h = Harness::new();
        h.ctx.connect().await?;
        h.ctx.submit("42").await?;

        h.ctx.disconnect();

        assert!(!h.ctx.is_connected());
        assert!(h.ctx.history().is_empty());
        assert_eq!(h.notifier.notices(), vec![Notice::Disconnected]);
        assert_eq!(h.stored(&account_x()).len(), 1);

        let err = h.ctx.submit("43").await.unwrap_err();
        assert!(matches!(err, DappError::NotInitialized));
        Ok(())
    }

    #[tokio::test]
    async fn toggle_connects_then_disconnects() -> anyhow::Result<()> {
        let h = Harness::new();

        h.ctx.toggle_connection().await?;
        assert!(h.ctx.is_connected());

        h.ctx.toggle_connection().await?;
        assert!(!h.ctx.is_connected());
        Ok(())
    }

    #[tokio::test]
    async fn account_switch_swaps_history_wholesale() -> anyhow::Result<()> {
        let h = Harness::new();
        h.seed(&account_x(), &[("x1", TxStatus::Completed), ("x2", TxStatus::Pending)]);
        h.ctx.connect().await?;
        let original = h.ctx.history();
        assert_eq!(original.len(), 2);

        h.ctx.on_accounts_changed(vec![account_y()])?;
        assert_eq!(h.ctx.account(), Some(account_y()));
        assert!(h.ctx.history().is_empty());

        h.ctx.on_accounts_changed(vec![account_x()])?;
        assert_eq!(h.ctx.history(), original);
        assert_eq!(h.wallet.bound_accounts(), vec![account_x(), account_y(), account_x()]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_accounts_list_closes_session() -> anyhow::Result<()> {
        let h = Harness::new();
        h.ctx.connect().await?;

        h.ctx.on_accounts_changed(Vec::new())?;

        assert!(!h.ctx.is_connected());
        assert!(h.notifier.notices().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn chain_change_resets_and_reports_host_action() -> anyhow::Result<()> {
        let h = Harness::new();
        h.ctx.connect().await?;
        h.ctx.submit("42").await?;

        assert_eq!(h.ctx.on_chain_changed(), SessionReset::Reload);
        assert!(!h.ctx.is_connected());
        assert_eq!(h.stored(&account_x()).len(), 1);

        let h = Harness::with_config(crate::DappConfig {
            reload_on_chain_change: false,
            ..crate::DappConfig::default()
        });
        assert_eq!(h.ctx.on_chain_changed(), SessionReset::InPlace);
        Ok(())
    }

    #[tokio::test]
    async fn binding_failure_still_connects_but_blocks_submit() -> anyhow::Result<()> {
        let h = Harness::new();
        h.wallet.fail_binding(true);

        h.ctx.connect().await?;
        assert!(h.ctx.is_connected());
        assert_eq!(h.ctx.error_message().as_deref(), Some(BINDING_FAILED));

        let err = h.ctx.submit("42").await.unwrap_err();
        assert!(matches!(err, DappError::NotInitialized));
        assert!(h.ctx.history().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_history_aborts_the_transition() {
        let h = Harness::new();
        h.seed_raw(&account_x(), "{ broken");

        let err = h.ctx.connect().await.unwrap_err();

        assert!(matches!(err, DappError::History(_)));
        assert!(!h.ctx.is_connected());
    }
}
