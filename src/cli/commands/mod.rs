pub mod analyze;
pub mod competitors;
pub mod config;
pub mod coverage;
pub mod expand;
pub mod key;
