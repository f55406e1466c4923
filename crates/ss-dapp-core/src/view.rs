use serde::Serialize;
use ss_api_types::{EntryId, TxStatus};

use crate::DappContext;

pub const CONNECT_LABEL: &str = "Connect Wallet";
pub const DISCONNECT_LABEL: &str = "Disconnect Wallet";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub index: usize,
    pub id: EntryId,
    pub input_value: String,
    pub status: TxStatus,
    pub editing: bool,
    /// Uncommitted text, only for the row in edit mode.
    pub draft: Option<String>,
}

/// Everything the page needs for one render, derived from the context in a single borrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub connected: bool,
    pub connect_label: &'static str,
    pub account: Option<String>,
    pub rows: Vec<HistoryRow>,
    pub error_message: Option<String>,
}

impl ViewModel {
    pub fn can_submit(&self) -> bool {
        self.connected
    }
}

impl DappContext {
    pub fn view(&self) -> ViewModel {
        let state = self.state.borrow();
        let connected = state.session.is_connected();
        let editing = state.edit.as_ref();

        let rows = state
            .history
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let draft = editing
                    .filter(|cursor| cursor.index == index)
                    .map(|cursor| cursor.draft.clone());
                HistoryRow {
                    index,
                    id: entry.id,
                    input_value: entry.input_value.clone(),
                    status: entry.status,
                    editing: draft.is_some(),
                    draft,
                }
            })
            .collect();

        ViewModel {
            connected,
            connect_label: if connected { DISCONNECT_LABEL } else { CONNECT_LABEL },
            account: state.session.account().map(|account| account.to_string()),
            rows,
            error_message: state.error_message.clone(),
        }
    }
}
