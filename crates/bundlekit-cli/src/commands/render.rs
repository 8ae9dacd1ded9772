//! `bundlekit render`: produce a deployable bundle for a target.

use std::path::PathBuf;

use anyhow::Context;
use bundlekit_charm::{CharmStoreClient, MetadataSource, StaticCharmDescriptor};
use bundlekit_common::config::ToolConfig;
use bundlekit_common::constants::{
    DEFAULT_CHANNEL, DEFAULT_DESTINATION, DEFAULT_RELEASE, DEFAULT_SERIES,
};
use bundlekit_compose::render::{self, RenderRequest, RenderSource};
use bundlekit_compose::{Bundle, Document};
use clap::{ArgGroup, Args};

use crate::output;

/// Arguments for the `render` command.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["bundle", "generate"])))]
pub struct RenderArgs {
    /// Bundle or variant document to render.
    #[arg(short = 'b', long)]
    pub bundle: Option<PathBuf>,

    /// Generate the bundle from the base OpenStack catalogue.
    #[arg(short = 'g', long)]
    pub generate: bool,

    /// Override files, applied in order (last wins).
    #[arg(short = 'o', long, num_args = 1..)]
    pub overrides: Vec<PathBuf>,

    /// Destination file.
    #[arg(short = 'd', long, default_value = DEFAULT_DESTINATION)]
    pub destination: PathBuf,

    /// Series used when the target does not name one.
    #[arg(short = 's', long, default_value = DEFAULT_SERIES)]
    pub series: String,

    /// Release used for the origin when no target is given.
    #[arg(short = 'r', long, default_value = DEFAULT_RELEASE)]
    pub release: String,

    /// Rebuild every charm locator for this channel (stable, next, github).
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_CHANNEL)]
    pub channel: Option<String>,

    /// Store user owning the charms.
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Target to resolve, e.g. `trusty-mitaka` or `xenial-ocata-proposed`.
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Charm location override as `service=url`; repeatable.
    #[arg(short = 'L', long = "location", value_parser = parse_location)]
    pub locations: Vec<(String, String)>,

    /// Add hacluster subordinates to HA-capable services.
    #[arg(long)]
    pub ha: bool,

    /// Skip charm store lookups.
    #[arg(long)]
    pub offline: bool,

    /// Overwrite the destination file if it exists.
    #[arg(short = 'y', long = "yes-overwrite")]
    pub yes_overwrite: bool,
}

fn parse_location(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, url)) if !name.trim().is_empty() && !url.trim().is_empty() => {
            Ok((name.trim().to_string(), url.trim().to_string()))
        }
        _ => Err(format!("expected service=url, got '{raw}'")),
    }
}

/// Executes the `render` command.
///
/// # Errors
///
/// Returns an error if the destination exists, an input or override file
/// is missing or malformed, or the target cannot be resolved.
pub fn execute(args: RenderArgs) -> anyhow::Result<()> {
    output::ensure_writable(&args.destination, args.yes_overwrite)?;

    let source = match args.bundle {
        Some(ref path) => RenderSource::Document(
            super::load_document(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
        ),
        None => RenderSource::Generate,
    };

    let overrides = args
        .overrides
        .iter()
        .map(|path| {
            super::read_input(path)
                .and_then(|text| Document::parse_bundle(&text))
                .with_context(|| format!("failed to load override {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<Bundle>>>()?;

    let mut request = RenderRequest::new(source);
    request.target = args.target;
    request.series = args.series;
    request.release = args.release;
    request.channel = args.channel;
    request.user = args.user;
    request.locations = args.locations;
    request.ha = args.ha;
    request.overrides = overrides;

    let config = ToolConfig::from_env();
    let store = (args.ha && !(args.offline || config.offline))
        .then(|| CharmStoreClient::from_config(&config));
    if args.ha && store.is_none() {
        tracing::info!("offline, HA augmentation will be skipped");
    }

    let result = render::render(
        &request,
        &StaticCharmDescriptor,
        store.as_ref().map(|s| s as &dyn MetadataSource),
    )?;

    output::write_bundle(&args.destination, &result)?;
    super::report_warnings(&result.warnings);
    println!("{}", output::format_summary(&args.destination, &result));
    Ok(())
}
