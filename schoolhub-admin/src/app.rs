use schoolhub_core::HubApp;
use serde_json::Value;

use crate::services::AdminParams;

/// Environment overrides use this prefix: `SCHOOLHUB__HTTP__PORT` -> `http.port`.
pub const ENV_PREFIX: &str = "SCHOOLHUB__";

const DEFAULTS: [(&str, &str); 6] = [
    ("http.host", "127.0.0.1"),
    ("http.port", "3040"),
    ("app.env", "development"),
    ("store.enabled", "true"),
    ("schools.onDelete", "restrict"),
    ("exams.passMark", "50"),
];

/// Defaults, then environment, then explicit overrides.
pub fn admin_app(overrides: &[(&str, &str)]) -> HubApp<Value, AdminParams> {
    let app: HubApp<Value, AdminParams> = HubApp::new();
    for (key, value) in DEFAULTS {
        app.set(key, value);
    }

    let from_env = app.load_env(ENV_PREFIX);
    if from_env > 0 {
        tracing::debug!(count = from_env, "applied config from environment");
    }

    for (key, value) in overrides {
        app.set(*key, *value);
    }
    app
}
