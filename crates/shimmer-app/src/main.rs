mod args;

use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use shimmer_core::{load_config_from, ShimmerConfig};
use shimmer_runtime_glow::CancelToken;

use crate::args::{parse_args, Args, ArgsOutcome, USAGE};

fn main() {
    initialise_tracing();

    let args = match parse_args(std::env::args().skip(1)) {
        ArgsOutcome::Run(args) => args,
        ArgsOutcome::Help => {
            print!("{USAGE}");
            return;
        }
        ArgsOutcome::Usage(msg) => {
            eprintln!("{msg}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("[shimmer] error: {e:#}");
        std::process::exit(1);
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Config file first, then command-line overrides, then validation of the merged result.
fn build_config(args: &Args) -> Result<ShimmerConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_config_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ShimmerConfig::default(),
    };

    if let Some(v) = &args.vert {
        cfg.vertex_shader = Some(v.clone());
    }
    if let Some(f) = &args.frag {
        cfg.fragment_shader = Some(f.clone());
    }
    if args.watch {
        cfg.watch = true;
    }

    cfg.validate(Path::new("<command line>"))?;
    Ok(cfg)
}

fn run(args: Args) -> Result<()> {
    let cfg = build_config(&args)?;
    tracing::info!(?cfg, "starting shimmer");
    shimmer_host_winit::run(cfg, CancelToken::new()).context("renderer failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args {
            frag: Some("wave.frag".into()),
            watch: true,
            ..Args::default()
        };
        let cfg = build_config(&args).expect("valid");
        assert_eq!(cfg.fragment_shader, Some("wave.frag".into()));
        assert!(cfg.watch);
        assert_eq!(cfg.width, ShimmerConfig::default().width);
    }

    #[test]
    fn watch_without_any_shader_is_rejected() {
        let args = Args {
            watch: true,
            ..Args::default()
        };
        let err = build_config(&args).expect_err("must fail");
        assert!(format!("{err:#}").contains("watch requires"));
    }

    #[test]
    fn missing_config_file_mentions_its_path() {
        let args = Args {
            config: Some("/no/such/shimmer.json".into()),
            ..Args::default()
        };
        let err = build_config(&args).expect_err("must fail");
        assert!(format!("{err:#}").contains("/no/such/shimmer.json"));
    }
}
