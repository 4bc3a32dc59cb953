//! Static SPA assets.
//!
//! Serves the frontend build from a configured directory. Unknown paths
//! fall back to `index.html` so client-side routing works; if no build is
//! present the fallback itself returns 404.

use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// A service that serves files from `static_dir` with SPA fallback.
pub fn frontend_service(static_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")))
}
