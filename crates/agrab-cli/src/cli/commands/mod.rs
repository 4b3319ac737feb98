//! CLI command handlers, one file per subcommand.

mod check;
mod get;
mod info;

pub use check::run_check;
pub use get::{run_get, GetOptions};
pub use info::run_info;
