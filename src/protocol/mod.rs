//! Protocol constants and header helpers.
//!
//! See <https://inertiajs.com/the-protocol> for the client side of the contract.
//!
//! # Status Codes
//!
//! - `409 Conflict` - asset version mismatch on a GET navigation
//! - `303 See Other` - replaces `302 Found` after PUT, PATCH and DELETE
//! - `400 Bad Request` - missing or invalid CSRF token

pub mod constants;
mod headers;

pub use headers::*;
