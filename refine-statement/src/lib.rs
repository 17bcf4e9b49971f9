//! refine-statement: credit statement transformer, refinement options and
//! non-fatal warning reporting

pub mod options;
pub mod transformer;
pub mod warnings;

pub use options::TransformOptions;
pub use transformer::{Refinement, StatementTransformer};
pub use warnings::TransformWarning;
