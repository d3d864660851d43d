use anyhow::{Context, Result};
use clap::Parser;
use dotprof::{cli::Cli, dot_output, invocation::Profile, workload};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load the profile from JSON or record the synthetic workload
fn load_profile(args: &Cli) -> Result<Profile> {
    match &args.input {
        Some(path) => Profile::from_file(path)
            .with_context(|| format!("Failed to load profile from {}", path.display())),
        None => Ok(workload::hash_workload(args.size)),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    // Configuration errors surface before any profile is touched
    let config = args.dot_config()?;

    let profile = load_profile(&args)?;

    if let Some(path) = &args.save_profile {
        profile
            .to_file(path)
            .with_context(|| format!("Failed to save profile to {}", path.display()))?;
    }

    dot_output::write_profile_file(&profile, &config, &args.output)?;

    Ok(())
}
