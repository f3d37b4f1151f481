use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the S3-to-SQS ETL pipeline workspace",
    long_about = "A unified CLI for testing, CI checks, and packaging the\n\
                  list/split/transform Lambda functions of the ETL pipeline."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run unit and integration tests for both pipeline crates
    Test,
    /// Run CI checks (fmt, clippy, tests, lambda build)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build and package the pipeline Lambdas as Terraform zip inputs
    ServerlessPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Directory receiving one zip per Lambda
        #[arg(long, env = "ETL_LAMBDA_DIST_DIR", default_value = "infra/lambda_etl/dist")]
        dist_dir: String,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build every Lambda binary for the host
    Lambdas,
    /// Run check + lambdas
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

const LAMBDA_PACKAGE: &str = "etl_pipeline_lambda";

/// Binary name and the zip it is packaged into.
const LAMBDA_BINARIES: [(&str, &str); 3] = [
    ("list_pages_lambda", "list_pages.zip"),
    ("split_page_lambda", "split_page.zip"),
    ("transform_lambda", "transform.zip"),
];

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_serverless_lambdas(target: &str, profile: BuildProfile, dist_dir: &Path) {
    if let Some(installed) = installed_rust_targets() {
        if !installed.iter().any(|line| line == target) {
            eprintln!("error: rust target `{target}` is missing; run `rustup target add {target}`");
            exit(1);
        }
    }

    step("Build pipeline lambda binaries");

    let mut cargo_args = vec!["build", "-p", LAMBDA_PACKAGE, "--target", target];
    for (bin, _) in LAMBDA_BINARIES {
        cargo_args.extend(["--bin", bin]);
    }
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package Terraform lambda zip artifacts");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    for (bin, zip_name) in LAMBDA_BINARIES {
        let zip_path = dist_dir.join(zip_name);
        let binary = fs::read(target_dir.join(bin))
            .unwrap_or_else(|error| panic!("missing `{bin}` build output: {error}"));
        write_bootstrap_zip(&binary, &zip_path)
            .unwrap_or_else(|error| panic!("failed to write {}: {error}", zip_path.display()));
        eprintln!("- {} ({} bytes)", zip_path.display(), binary.len());
    }
}

/// Installed rustup targets, or `None` when rustup is unavailable.
fn installed_rust_targets() -> Option<Vec<String>> {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;

    Some(
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .collect(),
    )
}

/// Writes `binary` as the executable `bootstrap` entry the provided.al2023
/// runtime expects.
fn write_bootstrap_zip(binary: &[u8], zip_path: &Path) -> zip::result::ZipResult<()> {
    let mut zip = ZipWriter::new(fs::File::create(zip_path)?);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)?;
    zip.write_all(binary)?;
    zip.finish()?;
    Ok(())
}

// ── CI jobs ────────────────────────────────────────────────────────

fn run_tests() {
    step("Test etl_pipeline_core");
    run_cargo(&["test", "-p", "etl_pipeline_core"]);

    step("Test etl_pipeline_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);
}

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    run_tests();
}

fn ci_lambdas() {
    step("Build lambda binaries");
    run_cargo(&["build", "-p", LAMBDA_PACKAGE, "--bins"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Test => run_tests(),
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Lambdas => ci_lambdas(),
                CiJob::All => {
                    ci_check();
                    ci_lambdas();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::ServerlessPackage {
            target,
            profile,
            dist_dir,
        } => {
            package_serverless_lambdas(&target, profile, Path::new(&dist_dir));
        }
    }
}
