use ss_api_types::{HistoryEntry, WalletAddress};
use ss_chain_client::WalletProvider;
use ss_storage::{HistoryStore, KeyValueStore};
use std::cell::RefCell;
use std::rc::Rc;

use crate::editor::EditCursor;
use crate::gateway::ContractGateway;
use crate::session::Session;
use crate::{DappConfig, DappError, Notifier};

pub(crate) struct DappState {
    pub(crate) session: Session,
    pub(crate) history: HistoryStore,
    pub(crate) edit: Option<EditCursor>,
    pub(crate) error_message: Option<String>,
}

/// Application context: one session, its contract binding and the active account's history.
///
/// State lives behind a `RefCell`; no borrow is held across an `.await`, so `submit` calls
/// may interleave with each other and with wallet events.
pub struct DappContext {
    pub(crate) config: DappConfig,
    pub(crate) wallet: Rc<dyn WalletProvider>,
    pub(crate) notifier: Rc<dyn Notifier>,
    pub(crate) gateway: ContractGateway,
    pub(crate) state: RefCell<DappState>,
    listener: RefCell<Option<Rc<dyn Fn()>>>,
}

impl DappContext {
    pub fn new(
        config: DappConfig,
        wallet: Rc<dyn WalletProvider>,
        storage: Rc<dyn KeyValueStore>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        let gateway = ContractGateway::new(config.contract.overrides());
        Self {
            config,
            wallet,
            notifier,
            gateway,
            state: RefCell::new(DappState {
                session: Session::new(),
                history: HistoryStore::new(storage),
                edit: None,
                error_message: None,
            }),
            listener: RefCell::new(None),
        }
    }

    /// Called after every state change, once no borrow of the state is outstanding.
    pub fn set_change_listener(&self, listener: impl Fn() + 'static) {
        *self.listener.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn account(&self) -> Option<WalletAddress> {
        self.state.borrow().session.account().cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().session.is_connected()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.borrow().history.entries().to_vec()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.borrow().error_message.clone()
    }

    pub fn clear_error(&self) {
        self.state.borrow_mut().error_message = None;
        self.changed();
    }

    pub(crate) fn changed(&self) {
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener();
        }
    }

    /// Surface `err` as the user-visible message and hand it back.
    pub(crate) fn fail(&self, err: DappError) -> DappError {
        self.state.borrow_mut().error_message = Some(err.to_string());
        self.changed();
        err
    }
}
