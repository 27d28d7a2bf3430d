//! Client-side state and HTTP access for frontends written against this API.

mod api;
mod store;

pub use api::*;
pub use store::*;
