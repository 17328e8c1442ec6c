//! Core domain entities
//!
//! Pure data structures with validation helpers - no I/O or external
//! dependencies.

mod account;
pub mod result;

pub use account::{Account, AccountId};
pub use result::{Error, ErrorKind, OperationResult, Result};
