//! Fiber bundle generator CLI
//!
//! Runs a JSON job describing a centerline, generator parameters and
//! constraint surfaces, and writes the resulting bundle.
//!
//! # Usage
//!
//! ```bash
//! # Generate and write the bundle as JSON next to the job
//! bundle-cli job.json
//! # Creates: job.bundle.json
//!
//! # Choose outputs explicitly
//! bundle-cli job.json --out fibers.json --trk fibers.trk
//! ```

mod job;

use std::path::{Path, PathBuf};
use std::process;

use bundle_core::{BundleError, Result};
use bundle_mesh::FiberBundle;

use crate::job::Job;

fn print_usage() {
    eprintln!(
        r#"Fiber bundle generator CLI

USAGE:
    bundle-cli <job.json> [--out <bundle.json>] [--trk <bundle.trk>] [--seed <n>]

ARGS:
    <job.json>      Job file: centerline, params, surfaces, TrackVis reference

OPTIONS:
    --out           Write the bundle as JSON (default: <job>.bundle.json)
    --trk           Write the bundle as TrackVis; needs a reference in the job
    --seed          Override the random seed of the job
    --help          Show this help message

Set RUST_LOG=debug for per-stage details.
"#
    );
}

struct Options {
    job: PathBuf,
    json_out: Option<PathBuf>,
    trk_out: Option<PathBuf>,
    seed: Option<u64>,
}

fn parse_args(args: &[String]) -> std::result::Result<Options, String> {
    let mut job = None;
    let mut json_out = None;
    let mut trk_out = None;
    let mut seed = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => {
                let value = iter.next().ok_or("--out requires a path")?;
                json_out = Some(PathBuf::from(value));
            }
            "--trk" => {
                let value = iter.next().ok_or("--trk requires a path")?;
                trk_out = Some(PathBuf::from(value));
            }
            "--seed" => {
                let value = iter.next().ok_or("--seed requires a number")?;
                let parsed = value
                    .parse()
                    .map_err(|_| format!("invalid seed '{}'", value))?;
                seed = Some(parsed);
            }
            other if other.starts_with("--") => return Err(format!("unknown option '{}'", other)),
            other => {
                if job.is_some() {
                    return Err(format!("unexpected argument '{}'", other));
                }
                job = Some(PathBuf::from(other));
            }
        }
    }

    let job: PathBuf = job.ok_or("missing required argument <job.json>")?;
    if json_out.is_none() && trk_out.is_none() {
        json_out = Some(job.with_extension("bundle.json"));
    }
    Ok(Options {
        job,
        json_out,
        trk_out,
        seed,
    })
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        process::exit(0);
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}\n", message);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(options: &Options) -> Result<()> {
    if !options.job.exists() {
        return Err(BundleError::InvalidInput(format!(
            "job file does not exist: {}",
            options.job.display()
        )));
    }
    let mut job = Job::from_path(&options.job)?;
    if options.seed.is_some() {
        job.params.seed = options.seed;
    }
    log::info!("Running job {}", options.job.display());

    let bundle = job.run()?;

    if let Some(path) = &options.json_out {
        write_json(path, &bundle)?;
    }
    if let Some(path) = &options.trk_out {
        let reference = job
            .reference
            .as_ref()
            .ok_or_else(|| BundleError::InvalidInput("TrackVis export needs a reference in the job".into()))?
            .build()?;
        bundle_trk::save_trk(path, &bundle, &reference, job.coordinate_system)?;
    }

    eprintln!(
        "Generated {} fibers ({} points)",
        bundle.fiber_count(),
        bundle.point_count()
    );
    Ok(())
}

fn write_json(path: &Path, bundle: &FiberBundle) -> Result<()> {
    let text = serde_json::to_string(bundle)?;
    std::fs::write(path, text)?;
    log::info!("Saved bundle JSON to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_output_next_to_job() {
        let options = parse_args(&args(&["jobs/arc.json"])).unwrap();
        assert_eq!(options.json_out, Some(PathBuf::from("jobs/arc.bundle.json")));
        assert!(options.trk_out.is_none());
    }

    #[test]
    fn test_explicit_outputs_and_seed() {
        let options =
            parse_args(&args(&["job.json", "--trk", "out.trk", "--seed", "17"])).unwrap();
        assert!(options.json_out.is_none());
        assert_eq!(options.trk_out, Some(PathBuf::from("out.trk")));
        assert_eq!(options.seed, Some(17));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.json", "b.json"])).is_err());
        assert!(parse_args(&args(&["a.json", "--seed", "x"])).is_err());
        assert!(parse_args(&args(&["a.json", "--out"])).is_err());
        assert!(parse_args(&args(&["a.json", "--bogus"])).is_err());
    }

    #[test]
    fn test_run_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let job_path = dir.path().join("job.json");
        std::fs::write(
            &job_path,
            r#"{
                "centerline": { "points": [[0, 0, 0], [20, 0, 0]] },
                "params": { "fiber_count": 3 },
                "reference": { "dimensions": [50, 50, 50], "voxel_size": [1, 1, 1] }
            }"#,
        )
        .unwrap();
        let options = Options {
            job: job_path,
            json_out: Some(dir.path().join("bundle.json")),
            trk_out: Some(dir.path().join("bundle.trk")),
            seed: Some(3),
        };
        run(&options).unwrap();

        let text = std::fs::read_to_string(dir.path().join("bundle.json")).unwrap();
        let bundle: FiberBundle = serde_json::from_str(&text).unwrap();
        assert_eq!(bundle.fiber_count(), 3);
        let trk = bundle_trk::load_trk(dir.path().join("bundle.trk"), Default::default()).unwrap();
        assert_eq!(trk.bundle.fiber_count(), 3);
    }
}
