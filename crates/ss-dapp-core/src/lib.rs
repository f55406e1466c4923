//! Wallet session, contract call gateway and per-account submission history for the
//! SimpleStore dApp.
//!
//! Everything hangs off one [`DappContext`], which the host creates once and drives from UI
//! events and wallet events. The context is single-threaded: futures it returns are not `Send`
//! and may overlap on one event loop.

pub mod config;
pub mod context;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod session;
pub mod view;

#[cfg(test)]
mod mock;

pub use config::DappConfig;
pub use context::DappContext;
pub use editor::{DeleteOutcome, EditCursor};
pub use error::DappError;
pub use gateway::{ContractGateway, SubmitReceipt};
pub use notify::{Confirmation, Notice, NoticeLevel, Notifier};
pub use session::{Session, SessionReset, SessionState};
pub use view::{HistoryRow, ViewModel};
