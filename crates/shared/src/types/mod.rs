//! Common types used across the application.

pub mod id;
pub mod money;
pub mod nullable;
pub mod pagination;
pub mod time;

pub use id::*;
pub use money::Money;
pub use pagination::{PageMeta, PageRequest, PageResponse};
