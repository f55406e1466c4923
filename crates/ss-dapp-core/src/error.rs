use ss_storage::HistoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DappError {
    #[error("Please install MetaMask browser extension to interact")]
    ExtensionUnavailable,
    #[error("wallet authorization denied: {0}")]
    AuthorizationDenied(String),
    #[error("Contract is not initialized. Please connect your wallet.")]
    NotInitialized,
    #[error("transaction failed: {0}")]
    TransactionFailure(String),
    #[error("history index {index} is out of range (log has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no history entry is being edited")]
    NoEditInProgress,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    History(HistoryError),
}

impl From<HistoryError> for DappError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::IndexOutOfRange { index, len } => DappError::IndexOutOfRange { index, len },
            other => DappError::History(other),
        }
    }
}
