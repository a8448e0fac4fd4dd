//! CLI command handlers, one per file.

mod fetch;
mod list;
mod plan;

pub use fetch::run_fetch;
pub use list::run_list;
pub use plan::run_plan;
