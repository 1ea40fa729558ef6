//! hwinfo CLI
//!
//! Without a subcommand, starts the interactive single-key menu.
//! `probe` and `report` run non-destructive probes and print the results.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use hwinfo::error::AppError;
use hwinfo::logging::{default_log_dir, init_logging, LOG_LEVELS};
use hwinfo::platform::SystemProvider;
use hwinfo::provider::ActionProvider;
use hwinfo::report::{format_records, record};
use hwinfo::tui::{self, Theme};
use hwinfo::types::{OutputFormat, Probe, ProbeConfig, ProbeRecord};

#[derive(Parser)]
#[command(name = "hwinfo")]
#[command(about = "Probe and prepare macOS hardware from a single-key menu")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    machine: MachineArgs,

    /// Disable colors in the interactive menu
    #[arg(long, global = true)]
    no_color: bool,

    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info", value_parser = LOG_LEVELS)]
    log_level: String,

    /// Directory for hwinfo.log (default: user cache directory)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

/// Machine-specific settings. Unset flags keep the built-in defaults.
#[derive(Args)]
struct MachineArgs {
    /// Host used by the ping test
    #[arg(long, global = true)]
    ping_host: Option<String>,

    /// Wi-Fi interface passed to airportd
    #[arg(long, global = true)]
    wifi_interface: Option<String>,

    /// Wi-Fi network to join
    #[arg(long, global = true)]
    wifi_ssid: Option<String>,

    /// WPA2 passphrase for the Wi-Fi network
    #[arg(long, global = true)]
    wifi_password: Option<String>,

    /// Script run by the OS install flow
    #[arg(long, global = true)]
    install_script: Option<PathBuf>,

    /// Disk erased by the format commands
    #[arg(long, global = true)]
    target_disk: Option<String>,

    /// Device checked for a Fusion Drive container
    #[arg(long, global = true)]
    fusion_disk: Option<String>,

    /// Name given to a freshly erased volume
    #[arg(long, global = true)]
    volume_name: Option<String>,

    /// Scratch file for the write test
    #[arg(long, global = true)]
    write_test_file: Option<PathBuf>,

    /// Number of 2 MiB blocks the write test writes
    #[arg(long, global = true)]
    write_test_count: Option<u32>,
}

impl MachineArgs {
    fn into_config(self) -> ProbeConfig {
        let mut config = ProbeConfig::default();
        if let Some(host) = self.ping_host {
            config.ping_host = host;
        }
        if let Some(interface) = self.wifi_interface {
            config.wifi.interface = interface;
        }
        config.wifi.ssid = self.wifi_ssid;
        config.wifi.password = self.wifi_password;
        if let Some(script) = self.install_script {
            config.install_script = script;
        }
        if let Some(disk) = self.target_disk {
            config.target_disk = disk;
        }
        if let Some(disk) = self.fusion_disk {
            config.fusion_disk = disk;
        }
        if let Some(name) = self.volume_name {
            config.volume_name = name;
        }
        if let Some(path) = self.write_test_file {
            config.write_test.path = path;
        }
        if let Some(count) = self.write_test_count {
            config.write_test.count = count;
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single non-destructive probe and print its result
    Probe {
        /// Which probe to run
        #[arg(value_enum)]
        probe: ProbeArg,

        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },

    /// Print a CPU / RAM / GPU / disk summary
    Report {
        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormatArg,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ProbeArg {
    Cpu,
    Ram,
    Gpu,
    Hdd,
    Ping,
    Wifi,
    WriteTest,
}

impl From<ProbeArg> for Probe {
    fn from(arg: ProbeArg) -> Self {
        match arg {
            ProbeArg::Cpu => Probe::Cpu,
            ProbeArg::Ram => Probe::Ram,
            ProbeArg::Gpu => Probe::Gpu,
            ProbeArg::Hdd => Probe::Hdd,
            ProbeArg::Ping => Probe::Ping,
            ProbeArg::Wifi => Probe::Wifi,
            ProbeArg::WriteTest => Probe::WriteTest,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.unwrap_or_else(default_log_dir);
    let _log_guard = match init_logging(&log_dir, &cli.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {}", e);
            None
        }
    };

    let provider = SystemProvider::new(cli.machine.into_config());
    let theme = if cli.no_color { Theme::PLAIN } else { Theme::DEFAULT };

    let result = match cli.command {
        None => tui::run(&provider, theme),
        Some(Commands::Probe { probe, format }) => cmd_probe(&provider, probe.into(), format.into()),
        Some(Commands::Report { format }) => cmd_report(&provider, format.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "exiting with failure");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// PROGRESS HELPERS
// ============================================================================

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn cmd_probe(provider: &SystemProvider, probe: Probe, format: OutputFormat) -> Result<(), AppError> {
    let result = if format == OutputFormat::Human {
        let sp = spinner(&format!("Running {} probe...", probe.label()));
        let result = provider.run(probe);
        sp.finish_and_clear();
        result
    } else {
        provider.run(probe)
    };

    // Human failures are reported once, by main.
    if result.is_ok() || format == OutputFormat::Json {
        print_records(&[record(probe, &result)], format);
    }

    result.map(|_| ()).map_err(AppError::from)
}

fn cmd_report(provider: &SystemProvider, format: OutputFormat) -> Result<(), AppError> {
    let records = if format == OutputFormat::Human {
        let sp = spinner("Probing hardware...");
        let records = collect_summary(provider);
        sp.finish_and_clear();
        records
    } else {
        collect_summary(provider)
    };

    print_records(&records, format);
    Ok(())
}

/// Run the read-only summary probes in parallel, keeping their order.
fn collect_summary<P: ActionProvider + Sync>(provider: &P) -> Vec<ProbeRecord> {
    Probe::SUMMARY
        .par_iter()
        .map(|&probe| record(probe, &provider.run(probe)))
        .collect()
}

fn print_records(records: &[ProbeRecord], format: OutputFormat) {
    let out = format_records(records, format);
    match format {
        OutputFormat::Human => print!("{}", out),
        OutputFormat::Json => println!("{}", out),
    }
}
