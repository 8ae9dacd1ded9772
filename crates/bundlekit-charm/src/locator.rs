//! Charm locator construction.

use bundlekit_common::error::{BundleError, Result};

/// Channels a locator can be built for.
pub const SUPPORTED_CHANNELS: &[&str] = &["stable", "next", "github"];

const OPENSTACK_PROJECT: &str = "openstack";
const OPENSTACK_CHARM_PREFIX: &str = "charm-";
const OPENSTACK_CHARMERS_NEXT_USER: &str = "openstack-charmers-next";
const STORE_SCHEME: &str = "cs:";

/// Builds the canonical locator of charm `name` on `channel`.
///
/// - `stable`: `cs:[~user/][series/]name`
/// - `next`: `cs:~openstack-charmers-next/[series/]name` (ignores `user`)
/// - `github`: `git://github.com/<user or openstack>/charm-<name>`
///
/// # Errors
///
/// Returns [`BundleError::InvalidChannel`] for any other channel.
pub fn locate(name: &str, channel: &str, series: Option<&str>, user: Option<&str>) -> Result<String> {
    match channel {
        "github" => {
            let owner = user.unwrap_or(OPENSTACK_PROJECT);
            Ok(format!(
                "git://github.com/{owner}/{OPENSTACK_CHARM_PREFIX}{name}"
            ))
        }
        "stable" | "next" => {
            let user = if channel == "next" {
                Some(OPENSTACK_CHARMERS_NEXT_USER)
            } else {
                user
            };
            let mut segments = Vec::with_capacity(3);
            if let Some(user) = user {
                segments.push(format!("~{user}"));
            }
            if let Some(series) = series {
                segments.push(series.to_string());
            }
            segments.push(name.to_string());
            Ok(format!("{STORE_SCHEME}{}", segments.join("/")))
        }
        other => Err(BundleError::InvalidChannel {
            channel: other.to_string(),
        }),
    }
}

/// Default charm reference for a service with no explicit `charm`.
#[must_use]
pub fn default_charm_ref(name: &str) -> String {
    format!("{STORE_SCHEME}{name}")
}
