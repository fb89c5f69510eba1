//! Axum server integration.
//!
//! # Module Organization
//!
//! ```text
//! server/
//! ├── config     - InertiaConfig, SharedScope, CsrfConfig
//! ├── csrf       - CSRF token bridge
//! ├── middleware - InertiaLayer: entry and exit hooks
//! ├── negotiate  - response negotiation pipeline
//! ├── render     - Inertia extractor (page rendering)
//! ├── shared     - shared props store
//! └── view       - root view for initial loads
//! ```

pub mod config;
pub mod csrf;
mod middleware;
pub mod negotiate;
mod render;
mod shared;
pub mod view;

pub use config::{CsrfConfig, InertiaConfig, SharedScope};
pub use csrf::CsrfBridge;
pub use middleware::{InertiaContext, InertiaLayer};
pub use negotiate::{Outcome, RequestInfo};
pub use render::Inertia;
pub use shared::SharedProps;
pub use view::RootView;
