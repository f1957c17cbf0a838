//! # Configuration
//!
//! A flat string key/value store. Applications set defaults with
//! `app.set()` and hooks read them through a [`HubConfigSnapshot`].
//!
//! ```rust
//! use schoolhub_core::HubApp;
//! let app = HubApp::<(), ()>::new();
//!
//! app.set("exams.passMark", "50");
//! assert_eq!(app.get("exams.passMark"), Some("50".to_string()));
//! ```
//!
//! ## Environment overrides
//! `apply_env` maps prefixed variables onto dotted keys:
//!
//! ```bash
//! export SCHOOLHUB__HTTP__PORT=8080   # -> http.port
//! ```
//!
//! Only the part after the prefix is rewritten: segments are lower-cased
//! except for the first letter following `_` inside a segment, so
//! `SCHOOLHUB__SCHOOLS__ON_DELETE` becomes `schools.onDelete`.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct HubConfig {
    values: HashMap<String, String>,
}

impl HubConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Overlay variables starting with `prefix`. Returns how many applied.
    pub fn apply_env<I>(&mut self, prefix: &str, vars: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut applied = 0;
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                self.set(env_key_to_config_key(stripped), value);
                applied += 1;
            }
        }
        applied
    }

    pub fn snapshot(&self) -> HubConfigSnapshot {
        HubConfigSnapshot::new(self.values.clone())
    }
}

fn env_key_to_config_key(raw: &str) -> String {
    raw.split("__")
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let mut out = String::with_capacity(segment.len());
            let mut upper_next = false;
            for ch in segment.chars() {
                if ch == '_' {
                    upper_next = true;
                } else if upper_next {
                    out.extend(ch.to_uppercase());
                    upper_next = false;
                } else {
                    out.extend(ch.to_lowercase());
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Clone, Default)]
pub struct HubConfigSnapshot {
    map: HashMap<String, String>,
}

impl HubConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.trim().parse::<f64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse::<bool>().ok())
    }
}
