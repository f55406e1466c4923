//! DOM element bindings.
//!
//! All fields are resolved once at startup. The history table body is re-rendered wholesale;
//! its buttons are reached through `data-action`/`data-index` attributes.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, Window};

// ── Helpers ──

pub fn window() -> Option<Window> {
    web_sys::window()
}

fn doc() -> Option<Document> {
    window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn set_inner_html(el: &Element, html: &str) {
    el.set_inner_html(html);
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value()
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn set_hidden(el: &HtmlElement, hidden: bool) {
    el.set_hidden(hidden);
}

/// Nearest `[data-action]` ancestor of an event target, with its action and row index.
pub fn action_target(target: Option<web_sys::EventTarget>) -> Option<(String, usize)> {
    let el = target?.dyn_into::<Element>().ok()?;
    let actionable = el.closest("[data-action]").ok()??;
    let action = actionable.get_attribute("data-action")?;
    let index = actionable.get_attribute("data-index")?.parse().ok()?;
    Some((action, index))
}

pub fn reload_page() {
    if let Some(window) = window() {
        let _ = window.location().reload();
    }
}

/// Minimal escaping for text interpolated into rendered HTML.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Element references ──

#[derive(Clone)]
pub struct Elements {
    pub connect_btn: HtmlButtonElement,
    pub account_label: Element,
    pub value_input: HtmlInputElement,
    pub submit_btn: HtmlButtonElement,
    pub current_value_btn: HtmlButtonElement,
    pub history_body: Element,
    pub error_box: HtmlElement,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_input {
    ($id:expr) => {
        by_id_typed::<HtmlInputElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing input #{}", $id)))?
    };
}

macro_rules! get_button {
    ($id:expr) => {
        by_id_typed::<HtmlButtonElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing button #{}", $id)))?
    };
}

macro_rules! get_html {
    ($id:expr) => {
        by_id_typed::<HtmlElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing html element #{}", $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after DOMContentLoaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            connect_btn: get_button!("connectBtn"),
            account_label: get_el!("accountLabel"),
            value_input: get_input!("valueInput"),
            submit_btn: get_button!("submitBtn"),
            current_value_btn: get_button!("currentValueBtn"),
            history_body: get_el!("historyBody"),
            error_box: get_html!("errorBox"),
        })
    }
}
