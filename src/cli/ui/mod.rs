//! Terminal output helpers

mod output;

pub use output::Output;
