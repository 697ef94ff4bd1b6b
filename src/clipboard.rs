//! Clipboard publishing via arboard.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Replace the system clipboard contents with `text`.
///
/// Failure here is surfaced to the caller but must not be treated as fatal:
/// by the time we publish, the transcript has already been produced and
/// printed.
pub fn publish(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("no clipboard service available")?;
    clipboard
        .set_text(text.to_string())
        .context("failed to set clipboard contents")?;
    Ok(())
}
