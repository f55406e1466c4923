//! Event binding.
//!
//! Wires all UI event listeners once at startup. History rows are re-rendered, so their
//! buttons and draft inputs are handled by listeners on the table body.

use crate::app::App;
use crate::dom;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Helper: attach async click handler to an element.
macro_rules! on_click_async {
    ($el:expr, $app:expr, $handler:expr) => {{
        let app = $app.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let app2 = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&app2).await;
            });
        }) as Box<dyn FnMut(_)>);
        listen(&$el, "click", cb.as_ref());
        cb.forget();
    }};
}

/// Helper: attach sync click handler.
macro_rules! on_click {
    ($el:expr, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::MouseEvent)>);
        listen(&$el, "click", cb.as_ref());
        cb.forget();
    }};
}

fn listen(target: &web_sys::EventTarget, event: &str, callback: &JsValue) {
    if let Err(err) = target.add_event_listener_with_callback(event, callback.unchecked_ref()) {
        warn!(event, "listener registration failed: {err:?}");
    }
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(app: &Rc<App>) {
    let els = &app.els;

    on_click_async!(els.connect_btn, app, App::on_toggle_connection);
    on_click_async!(els.submit_btn, app, App::on_submit);
    {
        let app2 = app.clone();
        on_click!(els.current_value_btn, move |_: web_sys::MouseEvent| {
            app2.on_show_current_value();
        });
    }
    {
        let app2 = app.clone();
        on_click!(els.error_box, move |_: web_sys::MouseEvent| {
            app2.on_dismiss_error();
        });
    }

    // ── History rows ──
    {
        let app2 = app.clone();
        let cb = Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
            let Some((action, index)) = dom::action_target(e.target()) else {
                return;
            };
            let app3 = app2.clone();
            wasm_bindgen_futures::spawn_local(async move {
                app3.on_row_action(&action, index).await;
            });
        }) as Box<dyn FnMut(_)>);
        listen(&els.history_body, "click", cb.as_ref());
        cb.forget();
    }
    {
        let app2 = app.clone();
        let cb = Closure::wrap(Box::new(move |e: web_sys::Event| {
            let Some(input) = e
                .target()
                .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok())
                .filter(|input| input.has_attribute("data-draft"))
            else {
                return;
            };
            app2.on_draft_input(&input.value());
        }) as Box<dyn FnMut(_)>);
        listen(&els.history_body, "input", cb.as_ref());
        cb.forget();
    }
}
