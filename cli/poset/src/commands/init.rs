//! `poset init` — write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::manifest::{PosetManifest, MANIFEST_NAME};

/// Create `poset.toml` in `dir`.
pub fn run(dir: &Path) -> Result<()> {
    let path = dir.join(MANIFEST_NAME);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    fs::write(&path, PosetManifest::template())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}
