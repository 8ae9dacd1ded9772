//! Output helpers for CLI commands.
//!
//! Guards the destination file, writes rendered YAML, and formats the
//! one-line summary printed after a transformation.

use std::path::Path;

use bundlekit_common::constants::{REDUCE_OUTPUT_PREFIX, REDUCE_OUTPUT_RANDOM_LEN};
use bundlekit_common::error::{BundleError, Result};
use bundlekit_compose::Transformed;

/// Fails with [`BundleError::OutputAlreadyExists`] unless `path` is free or
/// `overwrite` is set.
///
/// # Errors
///
/// Returns an error if the file exists and overwriting was not requested.
pub fn ensure_writable(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(BundleError::OutputAlreadyExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Serializes the bundle to YAML and writes it to `path`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_bundle(path: &Path, result: &Transformed) -> Result<()> {
    let yaml = result.bundle.to_yaml()?;
    std::fs::write(path, yaml).map_err(|e| BundleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), "bundle written");
    Ok(())
}

/// Default reduce output name: `out_` plus random hex, with a `.yaml` suffix.
#[must_use]
pub fn random_output_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    let suffix: String = id.chars().take(REDUCE_OUTPUT_RANDOM_LEN).collect();
    format!("{REDUCE_OUTPUT_PREFIX}{suffix}.yaml")
}

/// Human-readable summary of a transformation result.
#[must_use]
pub fn format_summary(path: &Path, result: &Transformed) -> String {
    let services = result.bundle.services.len();
    let relations = result.bundle.relations.len();
    let mut counts = vec![
        format!("{services} {}", plural(services, "service", "services")),
        format!("{relations} {}", plural(relations, "relation", "relations")),
    ];
    let warnings = result.warnings.len();
    if warnings > 0 {
        counts.push(format!("{warnings} {}", plural(warnings, "warning", "warnings")));
    }
    format!("wrote {} ({})", path.display(), counts.join(", "))
}

const fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
