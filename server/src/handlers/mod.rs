//! Request handlers for the admin API.

mod edits;
mod export;
mod forms;
mod records;
mod submissions;
mod users;

pub use edits::*;
pub use export::*;
pub use forms::*;
pub use records::*;
pub use submissions::*;
pub use users::*;
