//! Injected `window.ethereum` provider (EIP-1193).

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use ss_chain_evm::Eip1193Transport;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[derive(Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
    params: &'a Value,
}

pub struct InjectedEthereum {
    provider: Option<JsValue>,
}

impl InjectedEthereum {
    /// Looks up `window.ethereum` once; extensions inject it before page scripts run.
    pub fn detect() -> Self {
        let provider = crate::dom::window()
            .and_then(|window| Reflect::get(&window, &JsValue::from_str("ethereum")).ok())
            .filter(|value| !value.is_undefined() && !value.is_null());
        Self { provider }
    }

    pub fn is_present(&self) -> bool {
        self.provider.is_some()
    }

    /// Subscribe to a provider event. Listeners live for the lifetime of the page.
    pub fn on(&self, event: &str, handler: impl FnMut(JsValue) + 'static) {
        let Some(provider) = &self.provider else {
            return;
        };
        let Ok(on) = method(provider, "on") else {
            tracing::warn!(event, "provider has no `on` method");
            return;
        };

        let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(JsValue)>);
        if let Err(err) = on.call2(provider, &JsValue::from_str(event), cb.as_ref().unchecked_ref()) {
            tracing::warn!(event, "event subscription failed: {}", describe(&err));
        }
        cb.forget();
    }
}

#[async_trait(?Send)]
impl Eip1193Transport for InjectedEthereum {
    fn is_available(&self) -> bool {
        self.is_present()
    }

    async fn request(&self, method_name: &str, params: Value) -> Result<Value> {
        let Some(provider) = &self.provider else {
            bail!("no injected ethereum provider");
        };

        let args = RequestArguments {
            method: method_name,
            params: &params,
        };
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let args = args
            .serialize(&serializer)
            .map_err(|err| anyhow!("encoding {method_name} arguments: {err}"))?;

        let promise = method(provider, "request")?
            .call1(provider, &args)
            .map_err(|err| anyhow!("{method_name}: {}", describe(&err)))?;
        let result = JsFuture::from(Promise::from(promise))
            .await
            .map_err(|err| anyhow!("{method_name}: {}", describe(&err)))?;

        if result.is_undefined() || result.is_null() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|err| anyhow!("decoding {method_name} result: {err}"))
    }

    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

fn method(provider: &JsValue, name: &str) -> Result<Function> {
    Reflect::get(provider, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or_else(|| anyhow!("provider has no `{name}` method"))
}

/// Provider errors are `{ code, message }` objects; fall back to their debug form.
fn describe(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    let message = Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|value| value.as_string());
    let code = Reflect::get(err, &JsValue::from_str("code"))
        .ok()
        .and_then(|value| value.as_f64());
    match (message, code) {
        (Some(message), Some(code)) => format!("{message} (code {code})"),
        (Some(message), None) => message,
        _ => format!("{err:?}"),
    }
}
