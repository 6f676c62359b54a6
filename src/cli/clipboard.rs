//! Temporary clipboard copies for `passhero get --copy`.

use std::thread;
use std::time::Duration;

use arboard::Clipboard;
use tracing::debug;

use crate::cli::output;
use crate::errors::{PassHeroError, Result};

/// Put `text` on the clipboard, wait `clear_after`, then clear it again
/// unless something else has been copied meanwhile.
///
/// A zero duration leaves the text on the clipboard.
pub fn copy_temporarily(text: &str, clear_after: Duration) -> Result<()> {
    let mut clipboard =
        Clipboard::new().map_err(|e| PassHeroError::ClipboardError(e.to_string()))?;
    clipboard
        .set_text(text.to_owned())
        .map_err(|e| PassHeroError::ClipboardError(e.to_string()))?;

    if clear_after.is_zero() {
        output::success("Copied to clipboard.");
        return Ok(());
    }

    output::success(&format!(
        "Copied to clipboard; clearing in {}s.",
        clear_after.as_secs()
    ));
    thread::sleep(clear_after);

    match clipboard.get_text() {
        Ok(current) if current == text => {
            clipboard
                .clear()
                .map_err(|e| PassHeroError::ClipboardError(e.to_string()))?;
            output::info("Clipboard cleared.");
        }
        _ => debug!("clipboard changed since copy; leaving it alone"),
    }

    Ok(())
}
