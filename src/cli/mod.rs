pub mod commands;
pub mod report;
pub mod ui;
pub mod util;

pub use util::CommandContext;
