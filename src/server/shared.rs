//! Shared props: data merged into every page regardless of component.
//!
//! The store is accumulate-only. `share` merges at the top level, overwriting
//! keys that already exist; nothing is ever removed. The store is dropped with
//! its scope: the request (default) or, for [`SharedScope::Process`], never.
//!
//! Handlers and upstream middleware reach the store through request
//! extensions:
//!
//! ```ignore
//! use axum::extract::Extension;
//! use inertia_axum_http::SharedProps;
//! use serde_json::json;
//!
//! async fn auth_middleware(Extension(shared): Extension<SharedProps>, /* ... */) {
//!     shared.share("auth", json!({"user": "ann"}));
//! }
//! ```
//!
//! [`SharedScope::Process`]: crate::SharedScope::Process

use crate::types::Props;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Handle to a shared-props store.
///
/// Cloning yields another handle to the same store.
#[derive(Clone, Debug, Default)]
pub struct SharedProps {
    inner: Arc<Mutex<Props>>,
}

impl SharedProps {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `props`.
    #[must_use]
    pub fn with_props(props: Props) -> Self {
        Self {
            inner: Arc::new(Mutex::new(props)),
        }
    }

    /// Process-wide store for `share_key`.
    ///
    /// Every call with the same key returns a handle to the same map. Data
    /// shared through it is visible to all concurrent requests.
    #[must_use]
    pub fn process(share_key: &str) -> Self {
        static REGISTRY: OnceLock<RwLock<HashMap<String, SharedProps>>> = OnceLock::new();
        let registry = REGISTRY.get_or_init(|| RwLock::new(HashMap::new()));

        if let Some(existing) = registry.read().get(share_key) {
            return existing.clone();
        }
        registry
            .write()
            .entry(share_key.to_string())
            .or_default()
            .clone()
    }

    /// Share a single value under `key`, replacing any previous value.
    pub fn share(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.lock().insert(key.into(), value.into());
    }

    /// Shallow-merge `props` into the store; incoming keys win.
    pub fn share_many(&self, props: Props) {
        let mut inner = self.inner.lock();
        for (key, value) in props {
            inner.insert(key, value);
        }
    }

    /// Look up a shared value.
    ///
    /// An exact top-level key is tried first, so keys containing dots still
    /// resolve. Otherwise the key is read as a dotted path into nested
    /// objects, e.g. `"auth.user.name"`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let inner = self.inner.lock();
        if let Some(value) = inner.get(key) {
            return Some(value.clone());
        }

        let mut segments = key.split('.');
        let mut current = inner.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current.clone())
    }

    /// Snapshot of the whole store.
    #[must_use]
    pub fn all(&self) -> Props {
        self.inner.lock().clone()
    }

    /// Whether nothing has been shared yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Props {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_share_accumulates() {
        let shared = SharedProps::new();
        shared.share_many(obj(json!({"a": 1})));
        shared.share_many(obj(json!({"b": 2})));
        assert_eq!(Value::Object(shared.all()), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_share_overwrites() {
        let shared = SharedProps::new();
        shared.share_many(obj(json!({"a": 1})));
        shared.share_many(obj(json!({"a": 2})));
        assert_eq!(Value::Object(shared.all()), json!({"a": 2}));
    }

    #[test]
    fn test_share_single_key() {
        let shared = SharedProps::new();
        shared.share("flash", json!({"success": "Saved"}));
        shared.share("appName", "Demo");
        assert_eq!(shared.get("appName"), Some(json!("Demo")));
        assert_eq!(shared.get("flash"), Some(json!({"success": "Saved"})));
    }

    #[test]
    fn test_top_level_merge_is_shallow() {
        let shared = SharedProps::new();
        shared.share("auth", json!({"user": "ann", "role": "admin"}));
        shared.share("auth", json!({"user": "bob"}));
        assert_eq!(shared.get("auth"), Some(json!({"user": "bob"})));
    }

    #[test]
    fn test_dotted_lookup() {
        let shared = SharedProps::new();
        shared.share("auth", json!({"user": {"name": "ann"}}));
        shared.share("a.b", 7);
        assert_eq!(shared.get("auth.user.name"), Some(json!("ann")));
        assert_eq!(shared.get("a.b"), Some(json!(7)));
        assert_eq!(shared.get("auth.user.email"), None);
        assert_eq!(shared.get("missing"), None);
    }

    #[test]
    fn test_clone_shares_store() {
        let first = SharedProps::new();
        let second = first.clone();
        second.share("k", 1);
        assert_eq!(first.get("k"), Some(json!(1)));
    }

    #[test]
    fn test_process_scope_by_key() {
        let a = SharedProps::process("shared-test-a");
        a.share("x", 1);
        assert_eq!(SharedProps::process("shared-test-a").get("x"), Some(json!(1)));
        assert!(SharedProps::process("shared-test-b").is_empty());
    }
}
