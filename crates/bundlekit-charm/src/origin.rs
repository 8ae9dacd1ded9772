//! Deployment targets and origin pointers.
//!
//! A target names a series and an OpenStack release (optionally a pocket).
//! When the release is the one the series ships natively, no cloud archive
//! is needed and no origin is produced.

use std::fmt;
use std::str::FromStr;

use bundlekit_common::error::BundleError;

/// Series paired with the OpenStack release it ships in the main archive.
pub const NATIVE_RELEASES: &[(&str, &str)] = &[
    ("precise", "essex"),
    ("trusty", "icehouse"),
    ("xenial", "mitaka"),
    ("yakkety", "newton"),
    ("zesty", "ocata"),
    ("artful", "pike"),
    ("bionic", "queens"),
];

/// Returns the release natively shipped with `series`, if known.
#[must_use]
pub fn native_release(series: &str) -> Option<&'static str> {
    NATIVE_RELEASES
        .iter()
        .find(|(s, _)| *s == series)
        .map(|(_, release)| *release)
}

/// Computes the origin pointer for a series/release/pocket combination.
///
/// Returns `None` when the release is native to the series and no pocket
/// was requested.
#[must_use]
pub fn origin_for(series: &str, release: &str, pocket: Option<&str>) -> Option<String> {
    if pocket.is_none() && native_release(series) == Some(release) {
        tracing::debug!(series, release, "release is native to series, no origin");
        return None;
    }
    let mut origin = format!("cloud:{series}-{release}");
    if let Some(pocket) = pocket {
        origin.push('/');
        origin.push_str(pocket);
    }
    Some(origin)
}

/// A parsed `<series>-<release>[-<pocket>]` target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// Ubuntu series, e.g. `xenial`.
    pub series: String,
    /// OpenStack release, e.g. `mitaka`.
    pub release: String,
    /// Optional archive pocket, e.g. `proposed`.
    pub pocket: Option<String>,
}

impl Target {
    /// Builds a target from its parts.
    pub fn new(series: impl Into<String>, release: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            release: release.into(),
            pocket: None,
        }
    }

    /// Origin pointer for this target, or `None` when native.
    #[must_use]
    pub fn origin(&self) -> Option<String> {
        origin_for(&self.series, &self.release, self.pocket.as_deref())
    }
}

impl FromStr for Target {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(BundleError::malformed(format!("invalid target \"{s}\"")));
        }
        if native_release(parts[0]).is_none() {
            return Err(BundleError::malformed(format!(
                "invalid target \"{s}\", \"{}\" is not a known series",
                parts[0]
            )));
        }
        match parts.as_slice() {
            [series, release] => Ok(Self::new(*series, *release)),
            [series, release, pocket] => Ok(Self {
                pocket: Some((*pocket).to_string()),
                ..Self::new(*series, *release)
            }),
            _ => Err(BundleError::malformed(format!(
                "invalid target \"{s}\", expected <series>-<release>[-<pocket>]"
            ))),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.series, self.release)?;
        if let Some(ref pocket) = self.pocket {
            write!(f, "-{pocket}")?;
        }
        Ok(())
    }
}
