//! `poset.toml` configuration file.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use poset_core::EngineConfig;
use serde::{Deserialize, Serialize};

/// File name searched for by [`PosetManifest::find_and_load`].
pub const MANIFEST_NAME: &str = "poset.toml";

/// Top-level configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosetManifest {
    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Script output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// How script results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One plain value per line.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (expected text or json)")),
        }
    }
}

/// Output section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Result format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl PosetManifest {
    /// Search upward from `start_dir` for a `poset.toml`, returning it along
    /// with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_NAME);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: PosetManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Load the nearest manifest, or defaults when there is none.
    pub fn load_or_default(start_dir: &Path) -> Result<Self> {
        Ok(Self::find_and_load(start_dir)?
            .map(|(manifest, _)| manifest)
            .unwrap_or_default())
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing poset.toml")
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("serializing configuration")
    }

    /// Default file written by `poset init`.
    pub fn template() -> String {
        r#"[engine]
# Diagnostic trace destination: "off" or "stderr".
trace = "off"

[output]
# Result format: "text" or "json".
format = "text"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poset_core::TraceMode;

    #[test]
    fn parse_full_manifest() {
        let manifest = PosetManifest::from_str(
            r#"
[engine]
trace = "stderr"

[output]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(manifest.engine.trace, TraceMode::Stderr);
        assert_eq!(manifest.output.format, OutputFormat::Json);
    }

    #[test]
    fn parse_empty_manifest() {
        let manifest = PosetManifest::from_str("").unwrap();
        assert_eq!(manifest, PosetManifest::default());
    }

    #[test]
    fn reject_unknown_trace_mode() {
        assert!(PosetManifest::from_str("[engine]\ntrace = \"loud\"\n").is_err());
    }

    #[test]
    fn template_is_valid_toml() {
        let manifest = PosetManifest::from_str(&PosetManifest::template()).unwrap();
        assert_eq!(manifest, PosetManifest::default());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut manifest = PosetManifest::default();
        manifest.output.format = OutputFormat::Json;
        let text = manifest.to_toml().unwrap();
        assert_eq!(PosetManifest::from_str(&text).unwrap(), manifest);
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_NAME), "[output]\nformat = \"json\"\n").unwrap();

        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (manifest, found_dir) = PosetManifest::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(manifest.output.format, OutputFormat::Json);
        assert_eq!(found_dir, dir.path());
    }

    #[test]
    fn find_and_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_NAME), "not toml [[[").unwrap();
        let err = PosetManifest::find_and_load(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }
}
