//! One module per `passhero` subcommand.

pub mod add;
pub mod change;
pub mod completions;
pub mod delete;
pub mod get;
pub mod init;
pub mod list;
pub mod rekey;
pub mod version;
