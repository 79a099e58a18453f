//! Browser bindings.
//!
//! The host page keeps the persisted session in `localStorage["auth"]` and
//! passes that raw string in; results come back as JSON strings.

use plantbio_core::models::auth::Role;
use plantbio_core::routing::{GatePolicy, RouteGuard, RouteTable, match_path};
use plantbio_core::session::persist;
use wasm_bindgen::prelude::*;

/// Returns the version of the plantbio_wasm package.
#[wasm_bindgen]
pub fn version() -> String {
    plantbio_core::version().to_string()
}

/// Routes visible to `role` (or to a signed-out visitor), as a JSON array.
#[wasm_bindgen(js_name = filterRoutes)]
pub fn filter_routes(role: Option<String>) -> Result<String, JsValue> {
    let role = role.map(Role::from);
    let routes = RouteTable::application().for_role(role.as_ref());
    serde_json::to_string(&routes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// View name rendered for `path`, if `role` may reach any.
#[wasm_bindgen(js_name = matchPath)]
pub fn match_view(path: &str, role: Option<String>) -> Option<String> {
    let role = role.map(Role::from);
    let routes = RouteTable::application().for_role(role.as_ref());
    match_path(&routes, path).map(|found| found.view)
}

/// Guard decision for `path` given the persisted session record, as JSON
/// (`{"action":"render"}` or `{"action":"redirect","to":...,"replace":...}`).
#[wasm_bindgen(js_name = evaluateGuard)]
pub fn evaluate_guard(
    path: &str,
    persisted_auth: Option<String>,
    legacy_gate: bool,
) -> Result<String, JsValue> {
    let session = persist::restore(persisted_auth.as_deref());
    let policy = if legacy_gate {
        GatePolicy::LegacySubstring
    } else {
        GatePolicy::PublicAllowList
    };
    let decision = RouteGuard::with_policy(policy).evaluate(&session, path);
    serde_json::to_string(&decision).map_err(|e| JsValue::from_str(&e.to_string()))
}
