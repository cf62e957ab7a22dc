//! Shared types.

mod ordering;
mod response;

pub use ordering::Ordering;
pub use response::{Created, NoContent};
