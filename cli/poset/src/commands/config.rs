//! `poset config` — show the effective configuration.

use std::path::Path;

use anyhow::Result;

use crate::manifest::PosetManifest;

/// Print the configuration found from `dir` (or the defaults) as TOML.
pub fn run(dir: &Path) -> Result<()> {
    match PosetManifest::find_and_load(dir)? {
        Some((manifest, found)) => {
            println!("# from {}", found.display());
            print!("{}", manifest.to_toml()?);
        }
        None => {
            println!("# defaults (no poset.toml found)");
            print!("{}", PosetManifest::default().to_toml()?);
        }
    }
    Ok(())
}
