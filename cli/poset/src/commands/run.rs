//! `poset run` — execute a script of engine operations.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use poset_core::{PosetEngine, TraceMode};

use crate::manifest::{OutputFormat, PosetManifest};
use crate::script;

/// Options gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions<'a> {
    /// Script path; stdin when `None`.
    pub input: Option<&'a Path>,
    /// Force the stderr trace on.
    pub trace: bool,
    /// Override the configured output format.
    pub format: Option<OutputFormat>,
}

/// Merge command-line overrides into the loaded configuration.
pub fn effective(mut manifest: PosetManifest, options: &RunOptions<'_>) -> PosetManifest {
    if options.trace {
        manifest.engine.trace = TraceMode::Stderr;
    }
    if let Some(format) = options.format {
        manifest.output.format = format;
    }
    manifest
}

/// Run the script named in `options` with configuration found from `cwd`.
pub fn run(cwd: &Path, options: &RunOptions<'_>) -> Result<()> {
    let manifest = effective(PosetManifest::load_or_default(cwd)?, options);
    let mut engine = PosetEngine::new(manifest.engine.clone());
    let format = manifest.output.format;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match options.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening {}", path.display()))?;
            script::run(&mut engine, BufReader::new(file), &mut out, format)
                .with_context(|| format!("running {}", path.display()))?;
        }
        None => {
            script::run(&mut engine, io::stdin().lock(), &mut out, format)
                .context("running script from stdin")?;
        }
    }
    Ok(())
}
