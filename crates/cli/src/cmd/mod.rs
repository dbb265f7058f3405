mod build;
mod check;
mod helper;
mod plan;
mod report;

pub use build::cmd_build;
pub use check::cmd_check;
pub use helper::cmd_helper;
pub use plan::cmd_plan;
