//! Hooks the host page provides on `window`:
//!
//! - `__STATUS_CONFIG__ = { apiBaseUrl, reloadDelayMs }`
//! - `__STATUS_AUTH__ = { organization: { id, name } | null, getToken({ template, organizationId }) }`
//!
//! `getToken` may return a string, `null`, or a promise of either.

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use status_core::auth::{Organization, TokenProvider, TokenRequest};
use status_core::http::DEFAULT_BASE_URL;
use status_core::stream::DEFAULT_RELOAD_DELAY;
use std::time::Duration;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{EventSource, EventSourceInit, MessageEvent};

fn host_object(name: &str) -> Result<JsValue, String> {
    let window = web_sys::window().ok_or_else(|| "window not available".to_string())?;
    let value = Reflect::get(&window, &JsValue::from_str(name))
        .map_err(|_| format!("failed to access {name}"))?;
    if value.is_undefined() || value.is_null() {
        return Err(format!("{name} is not installed"));
    }
    Ok(value)
}

fn field(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

pub fn api_base_url() -> String {
    host_object("__STATUS_CONFIG__")
        .ok()
        .and_then(|config| field(&config, "apiBaseUrl"))
        .and_then(|v| v.as_string())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn reload_delay() -> Duration {
    host_object("__STATUS_CONFIG__")
        .ok()
        .and_then(|config| field(&config, "reloadDelayMs"))
        .and_then(|v| v.as_f64())
        .filter(|ms| *ms >= 0.0)
        .map(|ms| Duration::from_millis(ms as u64))
        .unwrap_or(DEFAULT_RELOAD_DELAY)
}

/// The organization the signed-in user has selected, if any.
pub fn active_organization() -> Option<Organization> {
    let auth = host_object("__STATUS_AUTH__").ok()?;
    let org = field(&auth, "organization")?;
    match serde_wasm_bindgen::from_value(org) {
        Ok(org) => Some(org),
        Err(e) => {
            warn!(error = %e, "unreadable organization from identity hook");
            None
        }
    }
}

async fn request_token(request: &TokenRequest) -> Result<Option<String>, String> {
    let auth = host_object("__STATUS_AUTH__")?;
    let get_token = field(&auth, "getToken")
        .filter(|v| v.is_function())
        .ok_or_else(|| "__STATUS_AUTH__.getToken is not a function".to_string())?
        .unchecked_into::<Function>();
    let args = request
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| e.to_string())?;
    let js = get_token
        .call1(&auth, &args)
        .map_err(|e| format!("getToken failed: {e:?}"))?;
    let value = JsFuture::from(Promise::resolve(&js))
        .await
        .map_err(|e| format!("getToken rejected: {e:?}"))?;
    Ok(value.as_string())
}

/// Asks the identity hook for a token on every call.
pub struct BrowserTokenProvider;

#[async_trait(?Send)]
impl TokenProvider for BrowserTokenProvider {
    async fn token(&self, request: &TokenRequest) -> status_core::Result<Option<String>> {
        // A broken hook is the same as no session: the caller reports "No token".
        match request_token(request).await {
            Ok(token) => Ok(token),
            Err(e) => {
                warn!(error = %e, "identity hook unavailable");
                Ok(None)
            }
        }
    }
}

/// An open `EventSource`. Dropping it closes the connection.
pub struct LiveStream {
    source: EventSource,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(web_sys::Event)>,
}

impl LiveStream {
    /// Stops the connection without releasing the handlers, so it is safe
    /// to call from inside one of them.
    pub fn close(&self) {
        self.source.close();
    }
}

impl Drop for LiveStream {
    fn drop(&mut self) {
        self.source.set_onmessage(None);
        self.source.set_onerror(None);
        self.source.close();
    }
}

pub fn open_event_source(
    url: &str,
    mut handle_message: impl FnMut(String) + 'static,
    mut handle_error: impl FnMut() + 'static,
) -> Result<LiveStream, String> {
    let init = EventSourceInit::new();
    init.set_with_credentials(true);
    let source = EventSource::new_with_event_source_init_dict(url, &init)
        .map_err(|e| format!("failed to open event stream: {e:?}"))?;

    let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
        if let Some(data) = event.data().as_string() {
            handle_message(data);
        }
    });
    source.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

    let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        handle_error();
    });
    source.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    Ok(LiveStream {
        source,
        _on_message: on_message,
        _on_error: on_error,
    })
}

pub fn schedule_reload(delay: Duration) {
    leptos::set_timeout(
        || {
            if let Some(window) = web_sys::window() {
                let _ = window.location().reload();
            }
        },
        delay,
    );
}
