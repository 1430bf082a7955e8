use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for cdg-rs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Quick checks before commit (fmt, clippy)
    Check {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        #[arg(long)]
        ignored: bool,
        /// Run only packet parsing tests
        #[arg(long)]
        packet: bool,
        /// Run only canvas tests
        #[arg(long)]
        canvas: bool,
        /// Run only instruction handler tests
        #[arg(long)]
        instructions: bool,
        /// Run only decoder tests
        #[arg(long)]
        decoder: bool,
    },
    /// Run benchmarks
    Bench,
    /// Decode a .cdg file with the player binary
    Decode {
        /// Path to the .cdg file
        cdg_path: String,
        /// Directory to write frames to
        #[arg(short, long)]
        output: Option<String>,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Pre-commit hook (fmt, clippy, test)
    PreCommit,
    /// Install git hooks
    InstallHooks,
}

/// Selection of library test modules
#[derive(Clone, Copy, Default)]
struct TestFilter {
    packet: bool,
    canvas: bool,
    instructions: bool,
    decoder: bool,
}

impl TestFilter {
    fn modules(self) -> Vec<(&'static str, &'static str)> {
        [
            (self.packet, "packet", "Packet"),
            (self.canvas, "canvas", "Canvas"),
            (self.instructions, "instructions", "Instruction"),
            (self.decoder, "decoder", "Decoder"),
        ]
        .into_iter()
        .filter(|(enabled, _, _)| *enabled)
        .map(|(_, path, name)| (path, name))
        .collect()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_ci(verbose),
        Commands::Check { verbose } => run_check(verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test {
            doc,
            ignored,
            packet,
            canvas,
            instructions,
            decoder,
        } => run_test(
            doc,
            ignored,
            TestFilter {
                packet,
                canvas,
                instructions,
                decoder,
            },
        ),
        Commands::Bench => run_bench(),
        Commands::Decode {
            cdg_path,
            output,
            release,
        } => run_decode(&cdg_path, output.as_deref(), release),
        Commands::PreCommit => run_pre_commit(),
        Commands::InstallHooks => install_hooks(),
    }
}

fn run_ci(verbose: bool) -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;
    run_task("Build", || run_build(false), verbose)?;
    run_task(
        "Test",
        || run_test(false, false, TestFilter::default()),
        verbose,
    )?;
    run_task(
        "Doc Test",
        || run_test(true, false, TestFilter::default()),
        verbose,
    )?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_check(verbose: bool) -> Result<()> {
    println!("{}", "=== Running Quick Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ Checks passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("fmt").arg("--all");

    if check {
        cmd.arg("--").arg("--check");
    }

    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("clippy").arg("--workspace").arg("--all-targets");

    if fix {
        cmd.arg("--fix");
    } else {
        cmd.arg("--").arg("-D").arg("warnings");
    }

    execute_command(&mut cmd)
}

fn run_build(release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("build");

    if release {
        cmd.arg("--release");
    }

    execute_command(&mut cmd)
}

fn cargo_test(ignored: bool, configure: impl FnOnce(&mut Command)) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("test");
    configure(&mut cmd);

    if ignored {
        cmd.arg("--").arg("--ignored");
    }

    execute_command(&mut cmd)
}

fn run_test(doc: bool, ignored: bool, filter: TestFilter) -> Result<()> {
    if doc {
        return cargo_test(ignored, |cmd| {
            cmd.arg("--doc");
        });
    }

    let modules = filter.modules();
    if modules.is_empty() {
        return cargo_test(ignored, |_| {});
    }

    // Run each module's tests sequentially
    let mut failed = Vec::new();

    for (module_path, module_name) in &modules {
        println!("{} Running {} tests...", "→".blue(), module_name.bold());

        match cargo_test(ignored, |cmd| {
            cmd.arg("--lib").arg(format!("{}::", module_path));
        }) {
            Ok(_) => println!("{} {} tests passed\n", "✓".green(), module_name),
            Err(e) => {
                println!("{} {} tests failed\n", "✗".red(), module_name);
                if modules.len() == 1 {
                    return Err(e);
                }
                failed.push(*module_name);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Module tests failed: {}", failed.join(", "))
    }
}

fn run_bench() -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("bench");

    execute_command(&mut cmd)
}

fn run_decode(cdg_path: &str, output: Option<&str>, release: bool) -> Result<()> {
    println!("{}", "=== Decode ===".bold().blue());

    if !Path::new(cdg_path).exists() {
        println!(
            "{} CD+G file not found: {}",
            "✗".red().bold(),
            cdg_path.yellow()
        );
        anyhow::bail!("CD+G file not found");
    }

    // Verify file has .cdg extension
    if !cdg_path.to_lowercase().ends_with(".cdg") {
        println!("{} File does not have .cdg extension", "⚠".yellow().bold());
    }

    // A .cdg file is a whole number of 24-byte packets
    let size = std::fs::metadata(cdg_path)?.len();
    if size % 24 != 0 {
        println!(
            "{} File size {} is not a multiple of 24; the tail will be ignored",
            "⚠".yellow().bold(),
            size
        );
    }

    println!("{} CD+G file: {}", "✓".green(), cdg_path.cyan());
    println!(
        "{} Packets: {}",
        "→".blue(),
        (size / 24).to_string().bold()
    );
    println!(
        "{} Build mode: {}",
        "→".blue(),
        if release {
            "release".green().bold()
        } else {
            "debug".yellow().bold()
        }
    );
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.arg("run").arg("--bin").arg("cdg-rs");

    if release {
        cmd.arg("--release");
    }

    cmd.arg("--").arg(cdg_path);
    if let Some(dir) = output {
        cmd.arg(dir);
    }

    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        println!("\n{} Decode failed", "✗".red().bold());
        anyhow::bail!("Decode failed with exit code: {}", status);
    }

    let elapsed = start.elapsed();
    println!(
        "\n{} Decoded in {}",
        "✓".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_pre_commit() -> Result<()> {
    println!("{}", "=== Pre-commit Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), false)?;
    run_task("Clippy", || run_clippy(false), false)?;
    run_task(
        "Test",
        || run_test(false, false, TestFilter::default()),
        false,
    )?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ Pre-commit checks passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn install_hooks() -> Result<()> {
    use std::fs;

    println!("{}", "Installing git hooks...".bold());

    let hook_content = r#"#!/bin/sh
# Auto-generated by cargo x install-hooks
set -e

echo "Running pre-commit checks..."
cargo x pre-commit
"#;

    let hook_path = Path::new(".git/hooks/pre-commit");
    if let Some(dir) = hook_path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(hook_path, hook_content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(hook_path, perms)?;
    }

    println!("{}", "✓ Git hooks installed".green());
    println!("  Pre-commit hook will run: fmt, clippy, test");

    Ok(())
}

fn run_task<F>(name: &str, task: F, verbose: bool) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(_) => {
            let suffix = if verbose {
                format!("({:.2}s)", start.elapsed().as_secs_f64())
            } else {
                String::new()
            };
            println!("{} {}", "✓".green().bold(), suffix);
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
