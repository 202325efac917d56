//! Subcommands of the `teeter` binary

pub mod evaluate;
pub mod reset;
pub mod simulate;
pub mod status;
pub mod train;
