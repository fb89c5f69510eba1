//! The Inertia page object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prop mapping carried by a page.
pub type Props = Map<String, Value>;

/// The page object exchanged with the client.
///
/// Serialized as the JSON body of navigation responses and embedded in the
/// root view's `data-page` attribute on initial loads. Built fresh for every
/// render call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Client-side component name, e.g. `"Users/Index"`.
    pub component: String,
    /// Shared props merged with the render call's props.
    pub props: Props,
    /// Request path and query.
    pub url: String,
    /// Current asset version token.
    pub version: String,
}

impl Page {
    /// Create a page. `props` should already carry the shared props; see [`merge_props`].
    pub fn new(
        component: impl Into<String>,
        props: Props,
        url: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            props,
            url: url.into(),
            version: version.into(),
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Merge call-site props over shared props.
///
/// The merge is shallow: a local key replaces the shared value wholesale,
/// nested objects are not combined. Shared key order is kept, new local keys
/// are appended.
#[must_use]
pub fn merge_props(shared: Props, local: Props) -> Props {
    let mut merged = shared;
    for (key, value) in local {
        merged.insert(key, value);
    }
    merged
}
