//! WASM-specific JavaScript bridge functions
//!
//! Reads the globals the game client injects into the NUI page
//! (`invokeNative`, `GetParentResourceName`, `nuiMode`). Only meaningful on
//! WebAssembly targets; native builds report direct host access.

use crate::environment::HostSignals;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use js_sys::{Function, Reflect};

#[cfg(target_arch = "wasm32")]
use web_sys::window;

#[cfg(target_arch = "wasm32")]
fn global_value(name: &str) -> Option<JsValue> {
    let win = window()?;
    Reflect::get(&JsValue::from(win), &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

#[cfg(target_arch = "wasm32")]
fn has_global_function(name: &str) -> bool {
    global_value(name).map(|v| v.is_function()).unwrap_or(false)
}

/// Gather host signals from `window` once at startup.
#[cfg(target_arch = "wasm32")]
pub fn read_host_signals() -> HostSignals {
    let Some(win) = window() else {
        return HostSignals::default();
    };
    let native_bridge_present =
        has_global_function("invokeNative") || has_global_function("GetParentResourceName");
    let mode_flag = global_value("nuiMode").and_then(|v| v.as_bool());
    let origin_scheme = win
        .location()
        .protocol()
        .ok()
        .map(|p| p.trim_end_matches(':').to_ascii_lowercase());

    HostSignals {
        native_bridge_present,
        mode_flag,
        origin_scheme,
    }
}

/// Resource name reported by the host, used to build request URLs.
#[cfg(target_arch = "wasm32")]
pub fn parent_resource_name() -> Option<String> {
    let f = global_value("GetParentResourceName")?;
    if !f.is_function() {
        return None;
    }
    Function::from(f)
        .call0(&JsValue::UNDEFINED)
        .ok()
        .and_then(|v| v.as_string())
        .filter(|s| !s.is_empty())
}

// Native processes talk to the host directly: no page origin, no globals.
#[cfg(not(target_arch = "wasm32"))]
pub fn read_host_signals() -> HostSignals {
    HostSignals {
        native_bridge_present: true,
        mode_flag: None,
        origin_scheme: None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn parent_resource_name() -> Option<String> {
    None
}
