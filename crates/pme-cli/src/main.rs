//! PME CLI
//!
//! Command-line interface for auditing scenario coverage and running
//! generated property/event probes.

#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use pme_cli::{
    OPTIONS_ENV, PolicyOptions, args_with_env_options, audit, audit_json, audit_markdown,
    build_policies, load_registry, load_scenarios, run_autotest,
};
use pme_meta::TypeRef;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "pme")]
#[command(about = "PME conformance and coverage harness", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum AuditFormat {
    Markdown,
    Json,
}

#[derive(Args)]
struct PolicyArgs {
    /// YAML policy file applied before the switches below
    #[arg(long)]
    policies: Option<PathBuf>,

    /// Missing operations do not fail the run
    #[arg(long)]
    ignore_missing: bool,

    /// Stop after the first group with a failure
    #[arg(long)]
    stop_on_group_failure: bool,

    /// Stop after the first failing scenario
    #[arg(long)]
    stop_on_scenario_failure: bool,

    /// Only run scenarios safe before the target's resource is realized
    #[arg(long)]
    pre_handle: bool,

    /// Exclude the scenarios of ancestor-level groups
    #[arg(long)]
    no_base: bool,

    /// Skip the out-of-range enumeration probes
    #[arg(long)]
    no_enum_bounds_test: bool,

    /// Tolerate events that have no trigger
    #[arg(long)]
    tolerate_missing_trigger: bool,

    /// Name scenarios by qualified signature
    #[arg(long)]
    full_names: bool,

    /// Seed for random probe values
    #[arg(long)]
    seed: Option<u64>,

    /// Property the generator skips (repeatable)
    #[arg(long = "exclude-property", value_name = "NAME")]
    exclude_properties: Vec<String>,

    /// Event the generator skips (repeatable)
    #[arg(long = "exclude-event", value_name = "NAME")]
    exclude_events: Vec<String>,
}

impl From<PolicyArgs> for PolicyOptions {
    fn from(args: PolicyArgs) -> Self {
        Self {
            policy_file: args.policies,
            ignore_missing: args.ignore_missing,
            stop_on_group_failure: args.stop_on_group_failure,
            stop_on_scenario_failure: args.stop_on_scenario_failure,
            pre_handle: args.pre_handle,
            no_base: args.no_base,
            no_enum_bounds_test: args.no_enum_bounds_test,
            tolerate_missing_trigger: args.tolerate_missing_trigger,
            full_names: args.full_names,
            seed: args.seed,
            exclude_properties: args.exclude_properties,
            exclude_events: args.exclude_events,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build scenario groups and report coverage without running anything
    Audit {
        /// Type registry manifest (YAML)
        #[arg(long)]
        types: PathBuf,

        /// Scenario manifest (YAML)
        #[arg(long)]
        scenarios: PathBuf,

        /// Target type
        #[arg(long)]
        target: String,

        /// Test-suite type
        #[arg(long)]
        suite: String,

        /// Output format
        #[arg(long, value_enum, default_value = "markdown")]
        format: AuditFormat,

        /// Property dropped from the expected operations (repeatable)
        #[arg(long = "exclude-property", value_name = "NAME")]
        exclude_properties: Vec<String>,

        /// Event dropped from the expected operations (repeatable)
        #[arg(long = "exclude-event", value_name = "NAME")]
        exclude_events: Vec<String>,
    },

    /// Run generated probes against an in-memory realization of the target
    Autotest {
        /// Type registry manifest (YAML)
        #[arg(long)]
        types: PathBuf,

        /// Target type
        #[arg(long)]
        target: String,

        /// Test-suite type
        #[arg(long)]
        suite: String,

        /// Output directory for reports
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,
    },
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let extra = std::env::var(OPTIONS_ENV).ok();
    let cli = Cli::parse_from(args_with_env_options(std::env::args(), extra.as_deref()));

    match cli.command {
        Commands::Audit {
            types,
            scenarios,
            target,
            suite,
            format,
            exclude_properties,
            exclude_events,
        } => run_audit(
            &types,
            &scenarios,
            &target,
            &suite,
            format,
            exclude_properties,
            exclude_events,
        ),
        Commands::Autotest {
            types,
            target,
            suite,
            output,
            policy,
        } => run_autotest_command(&types, &target, &suite, &output, policy.into()),
    }
}

fn run_audit(
    types: &Path,
    scenarios: &Path,
    target: &str,
    suite: &str,
    format: AuditFormat,
    exclude_properties: Vec<String>,
    exclude_events: Vec<String>,
) {
    let registry = load_registry(types).unwrap_or_else(|e| exit_with(&e));
    let manifest = load_scenarios(scenarios).unwrap_or_else(|e| exit_with(&e));
    let mut exclusions = pme_engine::ExclusionSet::new();
    exclusions.excluded_properties.extend(exclude_properties);
    exclusions.excluded_events.extend(exclude_events);

    let (target, suite) = (TypeRef::new(target), TypeRef::new(suite));
    let groups = audit(&registry, &manifest.scenarios, &target, &suite, exclusions)
        .unwrap_or_else(|e| exit_with(&e));

    match format {
        AuditFormat::Markdown => println!("{}", audit_markdown(&groups, &target, &suite)),
        AuditFormat::Json => match audit_json(&groups) {
            Ok(json) => println!("{json}"),
            Err(e) => exit_with(&e),
        },
    }
}

fn run_autotest_command(
    types: &Path,
    target: &str,
    suite: &str,
    output: &Path,
    options: PolicyOptions,
) {
    let registry = load_registry(types).unwrap_or_else(|e| exit_with(&e));
    let policies = build_policies(&options).unwrap_or_else(|e| exit_with(&e));
    let report = run_autotest(&registry, &TypeRef::new(target), &TypeRef::new(suite), policies)
        .unwrap_or_else(|e| exit_with(&e));

    match pme_report::write_reports(&report, output) {
        Ok(files) => info!(markdown = %files.markdown.display(), junit = %files.junit.display(), "reports written"),
        Err(e) => exit_with(&format!("Error writing reports: {e}")),
    }

    println!(
        "{}: {} passed / {} failed / {} total (seed {})",
        if report.is_pass() { "PASS" } else { "FAIL" },
        report.passed(),
        report.failed(),
        report.total(),
        report.seed
    );
    if !report.is_pass() {
        std::process::exit(1);
    }
}

fn exit_with(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}
