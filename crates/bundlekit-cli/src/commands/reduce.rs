//! `bundlekit reduce`: extract a subset of services from a bundle.

use std::path::PathBuf;

use anyhow::Context;
use bundlekit_charm::StaticCharmDescriptor;
use bundlekit_common::constants::ALL_SERVICES;
use bundlekit_common::error::BundleError;
use bundlekit_common::warning::Warning;
use bundlekit_compose::graph::GroupPolicy;
use bundlekit_compose::reducer::{self, InheritancePolicy, ReduceOptions};
use bundlekit_compose::{Bundle, Document, inherit};
use clap::{Args, ValueEnum};

use crate::output;

/// How a group relation of more than two endpoints is read.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupArg {
    /// Every endpoint relates to every other.
    #[default]
    Clique,
    /// The first endpoint relates to each of the others.
    Star,
}

impl From<GroupArg> for GroupPolicy {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::Clique => Self::Clique,
            GroupArg::Star => Self::Star,
        }
    }
}

/// What `--remove-inheritance` does to a service carrying `inherits`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InheritanceArg {
    /// Drop the whole service.
    #[default]
    DropService,
    /// Keep the service and strip the field.
    StripField,
}

impl From<InheritanceArg> for InheritancePolicy {
    fn from(arg: InheritanceArg) -> Self {
        match arg {
            InheritanceArg::DropService => Self::DropService,
            InheritanceArg::StripField => Self::StripField,
        }
    }
}

/// Arguments for the `reduce` command.
#[derive(Args, Debug)]
pub struct ReduceArgs {
    /// Input bundle (or variant document) file.
    #[arg(short = 'i', long = "in-file")]
    pub in_file: PathBuf,

    /// Output file. Defaults to `out_<random>.yaml`.
    #[arg(short = 'o', long = "out-file")]
    pub out_file: Option<PathBuf>,

    /// Overwrite the output file if it exists.
    #[arg(short = 'y', long = "yes-overwrite")]
    pub yes_overwrite: bool,

    /// Comma-separated services to keep, or `ALL`.
    #[arg(short = 's', long, default_value = ALL_SERVICES)]
    pub services: String,

    /// Comma-separated services to drop.
    #[arg(short = 'e', long)]
    pub exclude: Option<String>,

    /// Target to resolve when the input is a variant document.
    #[arg(short = 't', long = "render-target")]
    pub render_target: Option<String>,

    /// Do not pull in directly related services.
    #[arg(long = "exclude-related", visible_alias = "Xr")]
    pub exclude_related: bool,

    /// Strip `constraints` from every kept service.
    #[arg(long = "remove-constraints", visible_alias = "Xc")]
    pub remove_constraints: bool,

    /// Strip placement directives (`to`) from every kept service.
    #[arg(long = "remove-placements", visible_alias = "Xp")]
    pub remove_placements: bool,

    /// Handle services that carry `inherits` per `--inheritance-policy`.
    #[arg(long = "remove-inheritance", visible_alias = "Xi")]
    pub remove_inheritance: bool,

    /// Policy applied by `--remove-inheritance`.
    #[arg(long, value_enum, default_value_t = InheritanceArg::DropService)]
    pub inheritance_policy: InheritanceArg,

    /// Reading of group relations.
    #[arg(long, value_enum, default_value_t = GroupArg::Clique)]
    pub group_policy: GroupArg,
}

impl ReduceArgs {
    /// Builds the core reducer options from the flags.
    #[must_use]
    pub fn options(&self) -> ReduceOptions {
        let mut options = if self.services.trim().eq_ignore_ascii_case(ALL_SERVICES) {
            ReduceOptions::default()
        } else {
            ReduceOptions::including(super::split_services(&self.services))
        };
        if let Some(ref exclude) = self.exclude {
            options.exclude.extend(super::split_services(exclude));
        }
        options.exclude_related = self.exclude_related;
        options.remove_constraints = self.remove_constraints;
        options.remove_placements = self.remove_placements;
        options.remove_inheritance = self.remove_inheritance;
        options.inheritance_policy = self.inheritance_policy.into();
        options.group_policy = self.group_policy.into();
        options
    }
}

/// Executes the `reduce` command.
///
/// # Errors
///
/// Returns an error if the output exists, the input is missing or
/// malformed, or the target cannot be resolved.
pub fn execute(args: ReduceArgs) -> anyhow::Result<()> {
    let out_file = args
        .out_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(output::random_output_name()));
    output::ensure_writable(&out_file, args.yes_overwrite)?;

    let document = super::load_document(&args.in_file)
        .with_context(|| format!("failed to load {}", args.in_file.display()))?;

    let mut warnings = Vec::new();
    let bundle = source_bundle(document, args.render_target.as_deref(), &mut warnings)?;

    let options = args.options();
    tracing::info!(
        include = options.include.len(),
        exclude = options.exclude.len(),
        related = !options.exclude_related,
        "reducing bundle"
    );
    let mut result = reducer::reduce(&bundle, &options);
    warnings.append(&mut result.warnings);
    result.warnings = warnings;

    output::write_bundle(&out_file, &result)?;
    super::report_warnings(&result.warnings);
    println!("{}", output::format_summary(&out_file, &result));
    Ok(())
}

fn source_bundle(
    document: Document,
    target: Option<&str>,
    warnings: &mut Vec<Warning>,
) -> Result<Bundle, BundleError> {
    match document {
        Document::Bundle(bundle) => {
            if let Some(target) = target {
                tracing::warn!(requested = target, "input is a plain bundle, ignoring target");
            }
            Ok(bundle)
        }
        Document::Variants(variants) => {
            let Some(target) = target else {
                return Err(BundleError::malformed(
                    "variant document requires --render-target",
                ));
            };
            let resolved = inherit::resolve(&variants, target, &StaticCharmDescriptor)?;
            warnings.extend(resolved.warnings);
            Ok(resolved.bundle)
        }
    }
}
