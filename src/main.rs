use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};

use autoinstall::core::config::{CliOverrides, ResolvedConfig, load_config, resolve};
use autoinstall::install::{InstallError, InstallPlan, RunSummary};
use autoinstall::tui;
use autoinstall::tui::components::header::TITLE;

const EXIT_FAILURE: u8 = 1;
const EXIT_USER_ABORT: u8 = 130;

#[derive(Parser)]
#[command(
    name = "autoinstall",
    about = "Installs Arch Linux packages one by one behind a live terminal display"
)]
struct Args {
    /// Packages to install with pacman (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    packages: Option<Vec<String>>,

    /// Packages to install from the AUR (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    aur: Option<Vec<String>>,

    /// Answer confirmation prompts from the keyboard
    #[arg(long, conflicts_with = "non_interactive")]
    interactive: bool,

    /// Pass the confirm flag and never prompt
    #[arg(long)]
    non_interactive: bool,

    /// AUR helper command, e.g. "paru"
    #[arg(long)]
    helper: Option<String>,

    /// Config file (default: ~/.autoinstall/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start without waiting for Enter
    #[arg(short, long)]
    yes: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        let interactive = if self.non_interactive {
            Some(false)
        } else if self.interactive {
            Some(true)
        } else {
            None
        };
        CliOverrides {
            primary_packages: self.packages.clone(),
            aur_packages: self.aur.clone(),
            interactive,
            alternate_tool: self.helper.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    let config = resolve(&file_config, &args.overrides());

    // The terminal belongs to the TUI, so logs go to a file.
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    match File::create(&config.log_file) {
        Ok(log_file) => {
            let _ = WriteLogger::init(config.log_level, log_config, log_file);
        }
        Err(e) => eprintln!("Warning: cannot open {}: {e}", config.log_file.display()),
    }
    log::info!("autoinstall starting up");
    log::debug!("Resolved config: {:?}", config);

    let plan = InstallPlan {
        primary: config.primary_packages.clone(),
        aur: config.aur_packages.clone(),
    };
    if plan.is_empty() {
        println!("Nothing to install.");
        return ExitCode::SUCCESS;
    }

    print_plan(&config, &plan);
    if !args.yes && io::stdin().is_terminal() {
        wait_for_start().await;
    }

    match tui::run(&config, &plan).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(InstallError::UserAbort) => {
            println!("\nInstallation cancelled.");
            ExitCode::from(EXIT_USER_ABORT)
        }
        Err(e) => {
            log::error!("Run failed: {}", e);
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn print_plan(config: &ResolvedConfig, plan: &InstallPlan) {
    println!("{TITLE}");
    println!("{}", "=".repeat(50));
    println!("Will install {} regular packages", plan.primary.len());
    if !plan.aur.is_empty() {
        println!(
            "Will install {} AUR packages with {}",
            plan.aur.len(),
            config.alternate_tool.join(" ")
        );
    }
    println!("\nPress Enter to start or Ctrl+C to cancel...");
}

/// Blocks until Enter. Ctrl+C here ends the process before anything ran.
async fn wait_for_start() {
    let read = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().read_line(&mut line).map(|_| ())
    });

    tokio::select! {
        result = read => {
            if let Ok(Err(e)) = result {
                log::warn!("Failed to read start confirmation: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Cancelled before start");
            println!("\nInstallation cancelled.");
            // The blocking stdin read cannot be cancelled, so leave without
            // waiting for the runtime to wind down.
            std::process::exit(i32::from(EXIT_USER_ABORT));
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "\nInstallation finished: {} successful, {} failed",
        summary.successful(),
        summary.failed()
    );
    for result in summary.failed_packages() {
        println!("  ✗ {} (exit code: {})", result.package, result.exit_code);
    }
}
