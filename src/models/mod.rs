pub mod common;
pub mod dashboard;
pub mod item;
pub mod order;
pub mod user;

pub use common::*;
pub use dashboard::*;
pub use item::*;
pub use order::*;
pub use user::*;
