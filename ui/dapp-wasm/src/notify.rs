//! Modal notices backed by the browser's blocking dialogs.

use async_trait::async_trait;
use ss_dapp_core::{Confirmation, Notice, Notifier};
use tracing::warn;

pub struct BrowserNotifier;

#[async_trait(?Send)]
impl Notifier for BrowserNotifier {
    fn notify(&self, notice: Notice) {
        let Some(window) = crate::dom::window() else {
            return;
        };
        let text = format!("{}\n\n{}", notice.title(), notice.message());
        if let Err(err) = window.alert_with_message(&text) {
            warn!("alert failed: {err:?}");
        }
    }

    async fn confirm(&self, request: Confirmation) -> bool {
        let Some(window) = crate::dom::window() else {
            return false;
        };
        let text = format!(
            "{}\n\n{}\n\nOK: {}    Cancel: {}",
            request.title(),
            request.message(),
            request.accept_label(),
            request.cancel_label()
        );
        window.confirm_with_message(&text).unwrap_or(false)
    }
}
