use std::env;
use std::path::PathBuf;

use crate::dataset::DatasetTag;

#[derive(Debug, Default)]
pub struct CliOptions {
    /// Override files with their tags, in command-line order.
    pub overrides: Vec<(PathBuf, DatasetTag)>,
    /// `--file` values with no `--tag` after them.
    pub untagged_files: Vec<PathBuf>,
    pub push: bool,
    pub config: Option<PathBuf>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--file" | "-f" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --file (expected a path)")?;
                i = take_tagged_file(args, i, PathBuf::from(path), &mut opts)?;
            }
            _ if arg.starts_with("--file=") => {
                let path = PathBuf::from(&arg["--file=".len()..]);
                i = take_tagged_file(args, i, path, &mut opts)?;
            }
            "--tag" | "-t" => {
                return Err("--tag must directly follow --file <path>".to_string());
            }
            "--push" | "-p" => opts.push = true,
            "--config" | "-c" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(opts)
}

/// Consumes an optional `--tag <tag>` after the file at `args[i]` and
/// returns the index of the last consumed argument.
fn take_tagged_file(
    args: &[String],
    mut i: usize,
    path: PathBuf,
    opts: &mut CliOptions,
) -> Result<usize, String> {
    let tag_follows = matches!(args.get(i + 1).map(String::as_str), Some("--tag" | "-t"));
    if !tag_follows {
        opts.untagged_files.push(path);
        return Ok(i);
    }
    i += 2;
    let raw = args.next_or_err(i, "missing value for --tag (expected a dataset tag)")?;
    let tag = raw.parse::<DatasetTag>().map_err(|e| e.to_string())?;
    opts.overrides.push((path, tag));
    Ok(i)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("lead-estimate: municipal energy consumption, expenditure and emissions estimates");
    eprintln!();
    eprintln!("Usage: lead-estimate [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -f, --file <path> -t, --tag <tag>   Use <path> (under $FILES_PATH/data) for dataset <tag>");
    eprintln!("  -c, --config <path>                 Load run configuration from a TOML file");
    eprintln!("  -p, --push                          Write sector tables to the relational store");
    eprintln!("  -h, --help                          Show this help message");
    eprintln!();
    let tags: Vec<&str> = DatasetTag::ALL.iter().map(|t| t.as_str()).collect();
    eprintln!("Tags: {}", tags.join(", "));
}
