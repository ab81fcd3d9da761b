//! Embedded viewer assets.
//!
//! The dashboard page is embedded from the crate's `assets/` directory at
//! compile time, so the viewer binary has no external file dependencies.
//! With the `debug-embed` feature the file is read from disk at runtime,
//! which keeps dashboard iteration recompile-free during development.

use rust_embed::RustEmbed;

/// Embedded files from `crates/core/assets/`.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/assets"]
pub struct ViewerAssets;

/// The dashboard HTML page served at `/`.
pub fn dashboard_page() -> String {
    ViewerAssets::get("dashboard.html")
        .map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
        .unwrap_or_else(|| "<html><body>dashboard asset missing</body></html>".to_string())
}
