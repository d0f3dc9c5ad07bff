use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "manifest_sync_lambda";
const LAMBDA_BINARY: &str = "manifest_resolver";
/// Entry name the `provided.al2023` runtime executes.
const BOOTSTRAP_ENTRY: &str = "bootstrap";

const TEST_STEPS: &[(&str, &[&str])] = &[
    ("Test manifest_sync_core", &["test", "-p", "manifest_sync_core"]),
    ("Test manifest_sync_lambda", &["test", "-p", LAMBDA_PACKAGE]),
];

const LINT_STEPS: &[(&str, &[&str])] = &[
    ("Check formatting", &["fmt", "--all", "--", "--check"]),
    (
        "Clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    ),
];

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the manifest-sync workspace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks
    Ci {
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build the resolver and zip it as a Lambda `bootstrap`
    LambdaPackage {
        /// Target triple of the Lambda architecture
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build without `--release`
        #[arg(long)]
        debug: bool,
        /// Directory receiving `manifest_resolver.zip`
        #[arg(long, default_value = "dist")]
        dist_dir: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Tests only
    Test,
}

/// One packaged resolver build.
struct LambdaArtifact {
    target: String,
    release: bool,
    dist_dir: PathBuf,
}

impl LambdaArtifact {
    fn binary_path(&self) -> PathBuf {
        let profile_dir = if self.release { "release" } else { "debug" };
        Path::new("target")
            .join(&self.target)
            .join(profile_dir)
            .join(LAMBDA_BINARY)
    }

    fn zip_path(&self) -> PathBuf {
        self.dist_dir.join(format!("{LAMBDA_BINARY}.zip"))
    }

    fn build(&self) -> Result<(), String> {
        let mut args = vec![
            "build",
            "-p",
            LAMBDA_PACKAGE,
            "--bin",
            LAMBDA_BINARY,
            "--target",
            self.target.as_str(),
        ];
        if self.release {
            args.push("--release");
        }
        cargo(&args)
    }

    fn package(&self) -> Result<PathBuf, String> {
        let binary_path = self.binary_path();
        let binary = fs::read(&binary_path).map_err(|error| {
            format!("failed to read lambda binary '{}': {error}", binary_path.display())
        })?;

        fs::create_dir_all(&self.dist_dir).map_err(|error| {
            format!("failed to create '{}': {error}", self.dist_dir.display())
        })?;
        let zip_path = self.zip_path();
        let file = fs::File::create(&zip_path)
            .map_err(|error| format!("failed to create '{}': {error}", zip_path.display()))?;

        let mut archive = ZipWriter::new(file);
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o755);
        archive
            .start_file(BOOTSTRAP_ENTRY, options)
            .and_then(|()| archive.write_all(&binary).map_err(Into::into))
            .and_then(|()| archive.finish().map(|_| ()))
            .map_err(|error| format!("failed to write '{}': {error}", zip_path.display()))?;

        Ok(zip_path)
    }
}

fn cargo(args: &[&str]) -> Result<(), String> {
    eprintln!("+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .map_err(|error| format!("failed to execute cargo: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("`cargo {}` exited with {status}", args.join(" ")))
    }
}

fn run_steps(steps: &[(&str, &[&str])]) -> Result<(), String> {
    for (label, args) in steps {
        eprintln!("\n=== {label} ===");
        cargo(args)?;
    }
    Ok(())
}

fn run(command: Commands) -> Result<(), String> {
    match command {
        Commands::Ci { job } => {
            if matches!(job, CiJob::Check) {
                run_steps(LINT_STEPS)?;
            }
            run_steps(TEST_STEPS)?;
            eprintln!("\nCI job passed.");
        }
        Commands::LambdaPackage {
            target,
            debug,
            dist_dir,
        } => {
            let artifact = LambdaArtifact {
                target,
                release: !debug,
                dist_dir,
            };
            artifact.build()?;
            let zip_path = artifact.package()?;
            eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(message) = run(cli.command) {
        eprintln!("error: {message}");
        exit(1);
    }
}
