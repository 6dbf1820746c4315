//! PunchGuard CLI - Device-side location and clock trust checks.
//!
//! This binary provides a command-line interface to run the PunchGuard
//! evaluators against the local machine and display the verdicts.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use punchguard_core::config::GuardConfig;
use punchguard_core::monitor::AntiCheatMonitor;
use punchguard_core::signals::{DeviceSignals, SystemSignals};
use punchguard_core::time_trust::{
    FIRST_RUN_SCORE_OFFLINE, FIRST_RUN_SCORE_ONLINE, RELIABILITY_HEALTHY_THRESHOLD,
    TIME_SKEW_THRESHOLD_MS,
};
use punchguard_core::types::{LocationProvider, LocationSample, LocationStatus};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// PunchGuard - Device-side trust checks for time-punch hosts.
///
/// PunchGuard scores what the device reports before a punch is accepted:
/// - Location Trust: Score a position fix and classify it (valid,
///   suspicious, fake)
/// - Clock Reliability: Track reboots, data clears, and manual clock
///   changes across process restarts
/// - Integrity Scan: Probe for root binaries and emulator giveaways
#[derive(Parser)]
#[command(name = "punchguard")]
#[command(version = VERSION)]
#[command(about = "Device-side location and clock trust checks")]
#[command(long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe for root and emulator indicators and report the timezone
    Scan,

    /// Run the clock reliability pass against persisted state
    Clock {
        /// Directory holding the reliability record
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Treat the device as online for the first-run baseline
        #[arg(long)]
        network: bool,

        /// Override the boot id read from the platform
        #[arg(long)]
        boot_id: Option<String>,

        /// Override the boot count read from the platform
        #[arg(long)]
        boot_count: Option<i32>,

        /// Apply a trusted network time (epoch ms) after the pass
        #[arg(long)]
        ntp_time: Option<i64>,
    },

    /// Score a single position fix
    Score {
        /// Latitude in degrees
        #[arg(long)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long)]
        lng: f64,

        /// Altitude in meters
        #[arg(long)]
        altitude: Option<f64>,

        /// Ground speed in m/s
        #[arg(long)]
        speed: Option<f64>,

        /// Horizontal accuracy radius in meters
        #[arg(long, default_value = "10.0")]
        accuracy: f64,

        /// Provider name (gps, network, anything else)
        #[arg(long, default_value = "gps")]
        provider: String,

        /// Satellites used in the fix
        #[arg(long, default_value = "0")]
        satellites: u32,

        /// Mark the fix as coming from a mock provider
        #[arg(long)]
        mock: bool,
    },

    /// Show system information and scoring thresholds
    Info,
}

fn print_banner() {
    println!(
        r#"
  ____                       _      ____                     _
 |  _ \ _   _ _ __    ___  | |__  / ___| _   _  __ _ _ __ __| |
 | |_) | | | | '_ \  / __| | '_ \| |  _ | | | |/ _` | '__/ _` |
 |  __/| |_| | | | || (__  | | | | |_| || |_| | (_| | | | (_| |
 |_|    \__,_|_| |_| \___| |_| |_|\____| \__,_|\__,_|_|  \__,_|

  Device-Side Location and Clock Trust for Time-Punch Hosts
  Version: {}
"#,
        VERSION
    );
}

fn print_explanation() {
    println!(
        r#"
WHAT IS PUNCHGUARD?
===================

PunchGuard is the device-side trust layer for time-punch hosts. Before a
punch is accepted, it checks what the device is claiming:

  1. LOCATION TRUST
     Scores each position fix from 100 down: mock providers, missing
     satellites, and absent altitude each cost points. The verdict
     classifies the fix as VALID, SUSPICIOUS, or FAKE.

  2. CLOCK RELIABILITY
     Tracks the device clock across reboots and data clears with a
     persisted score. Uncorrected events plus disabled automatic time
     settings, or a large skew against network time, flag cheating.

  3. INTEGRITY SCAN
     Probes for su binaries, root manager installs, and emulator
     giveaway files. No scoring, just indicators.

USAGE
=====

  punchguard scan     Probe for root and emulator indicators
  punchguard clock    Run the clock reliability pass
  punchguard score    Score a single position fix
  punchguard info     Show system capabilities and thresholds

For more information: https://github.com/punchguard/punchguard
"#
    );
}

fn run_scan(json: bool) {
    let monitor = AntiCheatMonitor::new(GuardConfig::default());
    let report = monitor.security_report();
    let timezone = monitor.timezone_report();

    if json {
        let output = serde_json::json!({
            "security": report,
            "timezone": timezone,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return;
    }

    println!("\nINTEGRITY SCAN");
    println!("==============\n");

    println!("Platform:");
    println!("  OS:   {}", report.os);
    println!("  Arch: {}", report.arch);
    println!();

    println!("Timezone:");
    println!("  Id:     {}", display_or_unknown(&timezone.id));
    println!("  Offset: {}ms", timezone.offset_millis);
    println!("  DST:    {}", timezone.dst_active);
    println!();

    if report.rooted {
        println!(
            "  \x1b[31m[FAIL]\x1b[0m Root indicator found: {}",
            report.root_method.as_deref().unwrap_or("unknown")
        );
    } else {
        println!("  \x1b[32m[PASS]\x1b[0m No root indicators found");
    }

    if report.emulator {
        println!("  \x1b[31m[FAIL]\x1b[0m Emulator giveaway file present");
    } else {
        println!("  \x1b[32m[PASS]\x1b[0m No emulator indicators found");
    }
}

fn run_clock(
    state_dir: Option<PathBuf>,
    network: bool,
    boot_id: Option<String>,
    boot_count: Option<i32>,
    ntp_time: Option<i64>,
    json: bool,
) {
    let signals = SystemSignals::new();
    let monitor = AntiCheatMonitor::new(GuardConfig {
        storage_dir: state_dir,
        ..GuardConfig::default()
    });

    let boot_id = boot_id.unwrap_or_else(|| signals.boot_id());
    let boot_count = boot_count.unwrap_or_else(|| signals.boot_count());

    let init = monitor.start_with_boot(&boot_id, boot_count, network);

    if let Some(time) = ntp_time {
        monitor.correct_with_network_time(time, "cli");
    }

    let verdict = monitor.check_cheating();

    if json {
        let output = serde_json::json!({
            "init": init,
            "cheating": verdict,
            "telemetry": monitor.telemetry(),
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return;
    }

    println!("\nCLOCK RELIABILITY");
    println!("=================\n");

    println!("Boot Identity:");
    println!("  Boot Id:    {}", display_or_unknown(&init.current_boot_id));
    println!("  Boot Count: {}", init.current_boot_count);
    println!();

    println!("State:");
    println!("  Score:     {}", verdict.reliability_value);
    println!("  First Run: {}", init.is_first_run);
    println!("  Rebooted:  {}", verdict.is_rebooted);
    println!("  Cleared:   {}", verdict.is_cleared);
    println!("  Skew:      {}ms", verdict.time_skew);
    println!();

    if verdict.is_cheating_time {
        println!("  \x1b[31m[FAIL]\x1b[0m Clock flagged: {}", verdict.cheating_reason);
    } else {
        println!("  \x1b[32m[PASS]\x1b[0m Clock looks trustworthy");
    }
}

fn run_score(sample: &LocationSample, json: bool) {
    let monitor = AntiCheatMonitor::new(GuardConfig::default());
    let verdict = monitor.on_location_update(sample);

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict).unwrap());
        return;
    }

    println!("\nLOCATION TRUST");
    println!("==============\n");

    println!("Fix:");
    println!("  Coordinates: {:.6}, {:.6}", verdict.latitude, verdict.longitude);
    println!("  Provider:    {:?}", verdict.provider);
    println!("  Satellites:  {}", verdict.satellites);
    println!();

    println!("Verdict:");
    println!("  Score:  {}", verdict.trust_score);
    let status_color = match verdict.status {
        LocationStatus::Valid => "\x1b[32m",
        LocationStatus::Suspicious => "\x1b[33m",
        _ => "\x1b[31m",
    };
    println!("  Status: {}{:?}\x1b[0m", status_color, verdict.status);
    if let Some(ref error) = verdict.error {
        println!("  Error:  {}", error);
    }

    if !verdict.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &verdict.warnings {
            println!("  - {}", warning);
        }
    }
}

fn show_system_info() {
    println!("\nSYSTEM INFORMATION");
    println!("==================\n");

    println!("PunchGuard Version: {}", VERSION);
    println!();

    println!("Platform:");
    println!("  OS: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!();

    let signals = SystemSignals::new();
    println!("Live Signals:");
    println!("  Boot Id:    {}", display_or_unknown(&signals.boot_id()));
    println!("  Boot Count: {}", signals.boot_count());
    println!("  Timezone:   {}", display_or_unknown(&signals.time_zone_id()));
    println!();

    println!("Clock Thresholds:");
    println!("  First-run score (online):  {}", FIRST_RUN_SCORE_ONLINE);
    println!("  First-run score (offline): {}", FIRST_RUN_SCORE_OFFLINE);
    println!("  Healthy score above:       {}", RELIABILITY_HEALTHY_THRESHOLD);
    println!("  Tolerated skew:            {}ms", TIME_SKEW_THRESHOLD_MS);
}

fn display_or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "(unknown)"
    } else {
        value
    }
}

fn main() {
    let cli = Cli::parse();

    let json_output = cli.format == "json";

    // Initialize logging (suppress for JSON output)
    if json_output {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_target(false)
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_target(false)
            .init();
    }

    match cli.command {
        Some(Commands::Scan) => {
            if !json_output {
                print_banner();
            }
            run_scan(json_output);
        },
        Some(Commands::Clock {
            state_dir,
            network,
            boot_id,
            boot_count,
            ntp_time,
        }) => {
            if !json_output {
                print_banner();
            }
            run_clock(state_dir, network, boot_id, boot_count, ntp_time, json_output);
        },
        Some(Commands::Score {
            lat,
            lng,
            altitude,
            speed,
            accuracy,
            provider,
            satellites,
            mock,
        }) => {
            if !json_output {
                print_banner();
            }
            let provider = match provider.as_str() {
                "gps" => LocationProvider::Gps,
                "network" => LocationProvider::Network,
                _ => LocationProvider::Other,
            };
            let sample = LocationSample {
                latitude: lat,
                longitude: lng,
                altitude,
                speed_mps: speed,
                bearing: None,
                accuracy,
                provider,
                satellites,
                from_mock_provider: mock,
                fix_time_ms: SystemSignals::new().system_time_ms(),
            };
            run_score(&sample, json_output);
        },
        Some(Commands::Info) => {
            print_banner();
            show_system_info();
        },
        None => {
            // No command - show help
            print_banner();
            print_explanation();
        },
    }
}
