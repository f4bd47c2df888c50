use std::path::Path;

use anyhow::Context as _;
use tracing::warn;

use crate::error::{LoopsmithError, LoopsmithResult};

/// Fixed content of the playback engine script; every artifact carries the
/// same bytes.
pub const PLAYER_SCRIPT: &str = include_str!("looper.js");

/// Emitted in place of the vendor runtime when it cannot be read at build
/// time. The artifact still opens; the player just will not run until the
/// library is supplied.
pub const VENDOR_PLACEHOLDER: &str = concat!(
    "/* jquery.min.js could not be bundled when this loop was built.\n",
    " * Download it from: https://cdnjs.cloudflare.com/ajax/libs/jquery/3.6.0/jquery.min.js\n",
    " * and save it over this file, or add this tag to index.htm instead:\n",
    " * <script src=\"https://cdnjs.cloudflare.com/ajax/libs/jquery/3.6.0/jquery.min.js\"></script>\n",
    " */\n"
);

/// Script assets the builder embeds into each artifact's `src/` folder.
#[derive(Clone, Debug)]
pub struct RuntimeAssets {
    pub player_script: &'static str,
    pub vendor_script: String,
}

impl RuntimeAssets {
    /// Load the vendor runtime from `vendor_path`. Unavailability degrades to
    /// the placeholder; it never fails a build.
    pub fn load(vendor_path: Option<&Path>) -> Self {
        let vendor_script = match read_vendor_script(vendor_path) {
            Ok(text) => text,
            Err(err) => {
                warn!(%err, "emitting vendor placeholder");
                VENDOR_PLACEHOLDER.to_string()
            }
        };
        Self {
            player_script: PLAYER_SCRIPT,
            vendor_script,
        }
    }

    /// Assets with the placeholder vendor script, for callers that never
    /// bundle the real library.
    pub fn placeholder() -> Self {
        Self {
            player_script: PLAYER_SCRIPT,
            vendor_script: VENDOR_PLACEHOLDER.to_string(),
        }
    }
}

fn read_vendor_script(path: Option<&Path>) -> LoopsmithResult<String> {
    let Some(path) = path else {
        return Err(LoopsmithError::asset_unavailable(
            "no vendor script path configured",
        ));
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read vendor script '{}'", path.display()))
        .map_err(|err| LoopsmithError::asset_unavailable(format!("{err:#}")))?;
    if text.trim().is_empty() {
        return Err(LoopsmithError::asset_unavailable(format!(
            "vendor script '{}' is empty",
            path.display()
        )));
    }
    Ok(text)
}
