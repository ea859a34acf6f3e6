//! Error types

mod bulk;
mod fetch;
mod remote;

pub use bulk::*;
pub use fetch::*;
pub use remote::*;
