//! Card catalog and session config loading.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
