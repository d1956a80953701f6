//! forge, a small build tool driven by flow-YAML manifests.
//!
//! Loads `forge.yaml`, projects it into typed configuration records, and
//! either prints a manifest summary or reports which targets are stale. A
//! malformed manifest is rendered as a caret-annotated diagnostic on stderr
//! and the process exits with status 1.

mod config;
mod stale;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use tracing::{info, warn};
use yaml_flow::{Arena, diag};

use config::ForgeConfig;

#[derive(Parser)]
#[command(name = "forge", version, about = "A small build tool driven by flow-YAML manifests")]
struct Cli {
    /// Path to the build manifest.
    #[arg(default_value = "forge.yaml")]
    manifest: PathBuf,

    /// Report which targets are stale instead of printing the summary.
    #[arg(long)]
    check: bool,

    /// Restrict the run to one named target.
    #[arg(long)]
    target: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let arena = Arena::new();
    let root = match yaml_flow::parse_path(&cli.manifest, &arena) {
        Ok(root) => root,
        Err(err) => {
            eprint!("{}", diag::report(&err, &cli.manifest));
            return ExitCode::FAILURE;
        }
    };
    let config = match ForgeConfig::from_root(&root) {
        Ok(config) => config,
        Err(err) => {
            eprint!("{}", diag::report(&err, &cli.manifest));
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("forge: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &ForgeConfig) -> anyhow::Result<ExitCode> {
    info!(
        package = config.package.as_deref().unwrap_or("<unnamed>"),
        targets = config.targets.len(),
        "manifest loaded"
    );

    if let Some(name) = &cli.target {
        if !config.targets.iter().any(|t| &t.name == name) {
            anyhow::bail!("no target named `{name}` in the manifest");
        }
    }

    if cli.check {
        check_targets(cli, config)?;
    } else {
        print_summary(config);
    }
    Ok(ExitCode::SUCCESS)
}

fn check_targets(cli: &Cli, config: &ForgeConfig) -> anyhow::Result<()> {
    let target_dir = config
        .workspace
        .as_ref()
        .and_then(|w| w.target.as_deref())
        .unwrap_or("target");

    for target in &config.targets {
        if let Some(wanted) = &cli.target {
            if &target.name != wanted {
                continue;
            }
        }
        let Some(main) = &target.main else {
            warn!(name = %target.name, "target has no main source, skipping");
            continue;
        };

        let out = Path::new(target_dir).join(&target.name);
        let mut deps = vec![PathBuf::from(main)];

        // The compiler leaves a rule file next to the artifact on -MD builds.
        let depfile = out.with_extension("d");
        if depfile.exists() {
            let extracted = stale::read_depfile(&depfile)
                .with_context(|| format!("reading depfile {}", depfile.display()))?;
            deps.extend(extracted.into_iter().map(PathBuf::from));
        }

        let stale = stale::needs_rebuild(&out, &deps)
            .with_context(|| format!("checking target `{}`", target.name))?;
        println!(
            "{}: {}",
            target.name,
            if stale { "stale" } else { "up to date" }
        );
    }
    Ok(())
}

fn print_summary(config: &ForgeConfig) {
    println!("package:     {}", config.package.as_deref().unwrap_or("-"));
    println!("version:     {}", config.version.as_deref().unwrap_or("-"));
    if let Some(author) = &config.author {
        println!("author:      {author}");
    }
    if let Some(description) = &config.description {
        println!("description: {description}");
    }

    if let Some(workspace) = &config.workspace {
        println!("workspace:");
        println!("  libs:   {}", workspace.libs.as_deref().unwrap_or("-"));
        println!("  target: {}", workspace.target.as_deref().unwrap_or("-"));
    }

    if !config.targets.is_empty() {
        println!("targets:");
        for target in &config.targets {
            println!(
                "  {} ({})",
                target.name,
                target.kind.as_deref().unwrap_or("binary")
            );
            if let Some(main) = &target.main {
                println!("    main: {main}");
            }
            if !target.arch.is_empty() {
                println!("    arch: {}", target.arch.join(", "));
            }
        }
    }

    if let Some(build) = &config.build {
        println!("build:");
        println!("  compiler: {}", build.compiler.as_deref().unwrap_or("-"));
        println!("  cstd:     {}", build.cstd.as_deref().unwrap_or("-"));
        for (name, value) in &build.macros {
            println!("  macro {name} = {value}");
        }
        for (name, arg) in &build.arguments {
            println!("  argument {name} ({} commands)", arg.commands.len());
        }
        for dep in &build.deps {
            println!(
                "  dep {} ({})",
                dep.name.as_deref().unwrap_or("-"),
                dep.kind.as_deref().unwrap_or("-")
            );
        }
    }

    if !config.profiles.is_empty() {
        println!("profiles:");
        let mut names: Vec<&String> = config.profiles.keys().collect();
        names.sort();
        for name in names {
            println!("  {name}: {}", config.profiles[name].join(" "));
        }
    }
}
