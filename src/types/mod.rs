//! Core Inertia protocol types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Page`] | The `{component, props, url, version}` page object |
//! | [`Props`] | Prop mapping (a JSON object) |
//! | [`RequestKind`] | Initial load vs. Inertia navigation |
//! | [`PartialReload`] | Prop keys requested by a partial reload |

mod page;
mod partial;

pub use page::{merge_props, Page, Props};
pub use partial::PartialReload;

use crate::protocol;
use http::HeaderMap;

/// How an incoming request is classified.
///
/// Derived from the presence of the `X-Inertia` request header; never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    /// First request of a browsing session; the response is a full HTML document.
    InitialLoad,
    /// Client-side navigation; the response is the JSON page object.
    InertiaNavigation,
}

impl RequestKind {
    /// Classify a request from its headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        if protocol::is_inertia_request(headers) {
            RequestKind::InertiaNavigation
        } else {
            RequestKind::InitialLoad
        }
    }

    /// Whether this is an Inertia navigation.
    #[inline]
    #[must_use]
    pub fn is_navigation(self) -> bool {
        self == RequestKind::InertiaNavigation
    }
}
