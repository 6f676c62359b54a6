//! `passhero version`: display version information.

use console::style;

use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    println!(
        "{} {}",
        style("passhero").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style(env!("CARGO_PKG_DESCRIPTION")).dim());
    Ok(())
}
