//! LEAD estimate entry point: environment, CLI and config wiring around the sector runner.

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use log::{info, warn};

use lead_estimate::cli;
use lead_estimate::config::EstimateConfig;
use lead_estimate::dataset::{FileResolver, OverrideFile};
use lead_estimate::publish::publish_sector;
use lead_estimate::runner::run_sectors;
use lead_estimate::sector::Sector;

/// Root of the data, defaults and output directories.
const FILES_PATH_VAR: &str = "FILES_PATH";

fn load_config(path: Option<&Path>) -> EstimateConfig {
    let config = match path {
        Some(path) => match EstimateConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => EstimateConfig::default(),
    };

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };

    if opts.push {
        eprintln!("error: --push is not supported: no relational store is configured");
        process::exit(1);
    }

    let Some(root) = env::var_os(FILES_PATH_VAR).map(PathBuf::from) else {
        eprintln!("error: {FILES_PATH_VAR} is not set");
        process::exit(1);
    };

    let config = load_config(opts.config.as_deref());

    for path in &opts.untagged_files {
        warn!("ignoring {}: --file must be followed by --tag", path.display());
    }

    let data_dir = root.join("data");
    let overrides = opts
        .overrides
        .into_iter()
        .map(|(path, tag)| OverrideFile {
            path: data_dir.join(path),
            tag,
        })
        .collect();
    let resolver = FileResolver::new(overrides, root.join(&config.defaults_dir));

    let output_dir = root.join("output").join("sectors");
    let mut failed = false;
    for run in run_sectors(&Sector::ALL, &config, &resolver) {
        match run.outcome {
            Ok(table) => {
                if let Err(e) = publish_sector(&output_dir, run.sector, &table) {
                    eprintln!("error: failed to publish {}: {e}", run.sector);
                    failed = true;
                }
            }
            Err(_) => failed = true,
        }
    }

    if failed {
        process::exit(1);
    }
    info!("Done");
}
