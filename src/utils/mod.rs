pub mod file_ops;
pub mod scanner;
pub mod validation;

pub use file_ops::*;
pub use validation::{SqlValidator, ValidationResult};
