use std::path::PathBuf;

/// Command-line overrides layered on top of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub vert: Option<PathBuf>,
    pub frag: Option<PathBuf>,
    pub watch: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsOutcome {
    Run(Args),
    Help,
    Usage(String),
}

pub const USAGE: &str = "\
Usage:
  shimmer [--config PATH] [--vert PATH] [--frag PATH] [--watch]

Options:
  --config PATH   JSON config file (all keys optional)
  --vert PATH     vertex shader source (default: embedded)
  --frag PATH     fragment shader source (default: embedded)
  --watch         reload a shader stage when its file changes
  --help, -h      Show this help and exit

Logging is controlled with RUST_LOG (default: info).
";

pub fn parse_args(args: impl IntoIterator<Item = String>) -> ArgsOutcome {
    let mut args = args.into_iter();
    let mut out = Args::default();

    while let Some(a) = args.next() {
        let mut path_for = |flag: &str| match args.next() {
            Some(v) => Ok(PathBuf::from(v)),
            None => Err(format!("{flag} needs a value")),
        };
        match a.as_str() {
            "--config" => match path_for("--config") {
                Ok(p) => out.config = Some(p),
                Err(e) => return ArgsOutcome::Usage(e),
            },
            "--vert" => match path_for("--vert") {
                Ok(p) => out.vert = Some(p),
                Err(e) => return ArgsOutcome::Usage(e),
            },
            "--frag" => match path_for("--frag") {
                Ok(p) => out.frag = Some(p),
                Err(e) => return ArgsOutcome::Usage(e),
            },
            "--watch" => out.watch = true,
            "--help" | "-h" => return ArgsOutcome::Help,
            _ => return ArgsOutcome::Usage(format!("Unknown arg: {a}")),
        }
    }

    ArgsOutcome::Run(out)
}
