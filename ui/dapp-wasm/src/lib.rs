//! SimpleStore dApp WASM frontend.
//!
//! Binds the page, builds one [`ss_dapp_core::DappContext`] on top of the injected wallet and
//! `localStorage`, and re-renders whenever the context reports a change.

pub mod app;
pub mod dom;
pub mod ethereum;
pub mod events;
pub mod logging;
pub mod notify;
pub mod render;
pub mod storage;

use ss_api_types::WalletAddress;
use ss_chain_evm::EvmWalletProvider;
use ss_dapp_core::{DappConfig, DappContext, SessionReset};
use ss_storage::{InMemoryStore, KeyValueStore};
use std::rc::Rc;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;

const CONFIG_ELEMENT_ID: &str = "dappConfig";

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let (config, config_error) = read_config();
    logging::init(&config.log_filter);
    if let Some(err) = config_error {
        warn!("ignoring page configuration: {err}");
    }

    let els = dom::Elements::bind()?;

    let ethereum = Rc::new(ethereum::InjectedEthereum::detect());
    let wallet = Rc::new(EvmWalletProvider::new(ethereum.clone(), config.receipt_poll_interval()));
    let backend: Rc<dyn KeyValueStore> = match storage::BrowserStorage::open() {
        Ok(store) => Rc::new(store),
        Err(err) => {
            warn!("localStorage unavailable, history will not survive a reload: {err:#}");
            Rc::new(InMemoryStore::new())
        }
    };
    let ctx = DappContext::new(config, wallet, backend, Rc::new(notify::BrowserNotifier));

    let app = app::App::new(els, ctx);
    app.install_change_listener();
    subscribe_wallet_events(&app, &ethereum);
    events::bind_events(&app);
    app.render();

    info!(available = ethereum.is_present(), "dapp initialised");
    Ok(())
}

/// Settings from `<script id="dappConfig" type="application/json">`, defaults when absent.
fn read_config() -> (DappConfig, Option<String>) {
    let Some(raw) = dom::by_id(CONFIG_ELEMENT_ID).and_then(|el| el.text_content()) else {
        return (DappConfig::default(), None);
    };
    match DappConfig::from_json(&raw) {
        Ok(config) => (config, None),
        Err(err) => (DappConfig::default(), Some(err.to_string())),
    }
}

fn subscribe_wallet_events(app: &Rc<app::App>, ethereum: &ethereum::InjectedEthereum) {
    {
        let app = app.clone();
        ethereum.on("accountsChanged", move |payload: JsValue| {
            let decoded = serde_wasm_bindgen::from_value(payload)
                .map_err(|err| err.to_string())
                .and_then(accounts_from_payload);
            let accounts = match decoded {
                Ok(accounts) => accounts,
                Err(err) => {
                    warn!("ignoring malformed accountsChanged payload: {err}");
                    return;
                }
            };
            if let Err(err) = app.ctx.on_accounts_changed(accounts) {
                warn!("account change failed: {err}");
            }
        });
    }

    {
        let app = app.clone();
        ethereum.on("chainChanged", move |_: JsValue| {
            if app.ctx.on_chain_changed() == SessionReset::Reload {
                dom::reload_page();
            }
        });
    }
}

/// `accountsChanged` carries an array of address strings. Anything else is rejected rather
/// than read as "no accounts", which would close the session.
fn accounts_from_payload(payload: serde_json::Value) -> Result<Vec<WalletAddress>, String> {
    let accounts: Vec<String> = serde_json::from_value(payload).map_err(|err| err.to_string())?;
    Ok(accounts.into_iter().map(WalletAddress).collect())
}
