//! System-wide constants and defaults.

/// Default series for rendered bundles.
pub const DEFAULT_SERIES: &str = "xenial";

/// Default OpenStack release for rendered bundles.
pub const DEFAULT_RELEASE: &str = "mitaka";

/// Default charm channel.
pub const DEFAULT_CHANNEL: &str = "stable";

/// Default destination of `render`.
pub const DEFAULT_DESTINATION: &str = "rendered.yaml";

/// Prefix of the auto-generated `reduce` output file name.
pub const REDUCE_OUTPUT_PREFIX: &str = "out_";

/// Number of random characters in the auto-generated output file name.
pub const REDUCE_OUTPUT_RANDOM_LEN: usize = 8;

/// Sentinel accepted by `--services` meaning every service.
pub const ALL_SERVICES: &str = "ALL";

/// Base URL of the charm store API.
pub const DEFAULT_CHARMSTORE_URL: &str = "https://api.jujucharms.com/charmstore";

/// Charm store API version segment.
pub const CHARMSTORE_API_VERSION: &str = "v5";

/// Option key carrying the origin for charms of the uses-source class.
pub const SOURCE_KEY: &str = "source";

/// Option key carrying the origin for charms of the uses-origin class.
pub const OPENSTACK_ORIGIN_KEY: &str = "openstack-origin";

/// Minimum unit count of an HA-capable service.
pub const HA_MIN_UNITS: u32 = 3;
