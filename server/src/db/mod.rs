//! Database module for PostgreSQL persistence.

mod audit;
mod pool;
mod records;
mod users;

pub use audit::*;
pub use pool::*;
pub use records::*;
pub use users::*;
