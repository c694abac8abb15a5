//! interop.rs
//!
//! Yew hook that loads Stripe.js v3 at runtime (no inline JS).
//!
//! `use_stripejs()` injects a single
//! `<script id="stripejs-sdk" src="https://js.stripe.com/v3/" defer>` into
//! `<head>` on first use, returns `false` until the script's `load` event
//! fires, then `true` on every subsequent call. Components gate mounting of
//! the secure fields on the returned flag.

use wasm_bindgen::{prelude::Closure, JsCast, JsValue};
use web_sys::js_sys::Reflect;
use web_sys::HtmlScriptElement;
use yew::functional::hook;
use yew::prelude::*;

const SCRIPT_ID: &str = "stripejs-sdk";
const SCRIPT_SRC: &str = "https://js.stripe.com/v3/";

/// Load Stripe.js exactly once and track readiness.
///
/// Returns `false` while the script is being fetched and parsed, `true` once
/// `window.Stripe` exists. Every component using the hook shares the same
/// script tag.
#[hook]
pub fn use_stripejs() -> bool {
    // Already present, e.g. loaded by another component or a previous page.
    let loaded = use_state(|| {
        web_sys::window()
            .map(|win| Reflect::has(&win, &JsValue::from_str("Stripe")).unwrap_or(false))
            .unwrap_or(false)
    });

    {
        let loaded = loaded.clone();
        use_effect(move || {
            if !*loaded {
                let document = web_sys::window()
                    .expect("no window")
                    .document()
                    .expect("no document");

                if document.get_element_by_id(SCRIPT_ID).is_none() {
                    let script: HtmlScriptElement = document
                        .create_element("script")
                        .expect("create script")
                        .dyn_into()
                        .expect("cast script");

                    script.set_id(SCRIPT_ID);
                    script.set_src(SCRIPT_SRC);
                    script.set_defer(true);

                    let onload = Closure::wrap(Box::new(move || {
                        loaded.set(true);
                    }) as Box<dyn Fn()>);
                    script.set_onload(Some(onload.as_ref().unchecked_ref()));
                    // Leak: the closure must outlive this render, until the
                    // script's load event fires.
                    onload.forget();

                    document
                        .head()
                        .expect("head missing")
                        .append_child(&script)
                        .expect("append script");
                }
            }
            || ()
        });
    }

    *loaded
}
