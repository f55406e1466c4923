//! Page controller: UI handlers delegating to the dApp context.

use crate::dom::{self, Elements};
use crate::render;
use ss_dapp_core::{DappContext, DeleteOutcome};
use std::rc::Rc;
use tracing::{debug, warn};

pub struct App {
    pub els: Elements,
    pub ctx: DappContext,
}

impl App {
    pub fn new(els: Elements, ctx: DappContext) -> Rc<Self> {
        Rc::new(Self { els, ctx })
    }

    /// Re-render on every context change. Holds a weak handle so the context does not keep
    /// itself alive.
    pub fn install_change_listener(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        self.ctx.set_change_listener(move || {
            if let Some(app) = weak.upgrade() {
                app.render();
            }
        });
    }

    pub fn render(&self) {
        render::render(&self.els, &self.ctx.view());
    }

    pub async fn on_toggle_connection(&self) {
        if let Err(err) = self.ctx.toggle_connection().await {
            warn!("connect failed: {err}");
        }
    }

    pub async fn on_submit(&self) {
        let value = dom::get_input_value(&self.els.value_input);
        match self.ctx.submit(&value).await {
            Ok(receipt) => debug!(tx_hash = %receipt.tx_hash, "submit finished"),
            Err(err) => warn!("submit failed: {err}"),
        }
    }

    pub fn on_show_current_value(&self) {
        self.ctx.show_current_value();
    }

    pub fn on_dismiss_error(&self) {
        self.ctx.clear_error();
    }

    pub async fn on_row_action(&self, action: &str, index: usize) {
        let result = match action {
            "edit" => self.ctx.start_edit(index),
            "save" => self.ctx.save_edit(),
            "cancel" => {
                self.ctx.cancel_edit();
                Ok(())
            }
            "delete" => match self.ctx.request_delete(index).await {
                Ok(DeleteOutcome::Deleted(entry)) => {
                    debug!(entry = %entry.id, "row deleted");
                    Ok(())
                }
                Ok(DeleteOutcome::Cancelled) => Ok(()),
                Err(err) => Err(err),
            },
            other => {
                debug!(action = other, "unknown row action");
                Ok(())
            }
        };
        if let Err(err) = result {
            warn!(action, index, "row action failed: {err}");
        }
    }

    pub fn on_draft_input(&self, text: &str) {
        if let Err(err) = self.ctx.update_draft(text) {
            debug!("draft ignored: {err}");
        }
    }
}
