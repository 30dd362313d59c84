pub mod errors;
pub mod student;

pub use errors::{LoadError, SaveError, StoreError, ValidationError};
