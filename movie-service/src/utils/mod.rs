pub mod validation;

pub use validation::{ValidatedPath, ValidatedQuery};
