//! CLI entry point for biodaq.
//!
//! Runs a device session against the simulated transport, since the vendor
//! BLE stack is an external collaborator. Two subcommands:
//!
//! - `stream`: scripted streaming session: connect, enable capture modes,
//!   stream every modality for a while, report what was captured.
//! - `device`: device-command smoke run: SDK mode, on-device recording
//!   control, clock sync.
//!
//! ```bash
//! biodaq stream --seconds 5
//! biodaq device
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::sync::Arc;
use std::time::Duration;

use biodaq::config::Settings;
use biodaq::core::Modality;
use biodaq::session::{SessionActor, SessionHandle};
use biodaq::transport::mock::MockTransport;

#[derive(Parser)]
#[command(name = "biodaq")]
#[command(about = "Single-device biosensor streaming session manager", long_about = None)]
struct Cli {
    /// Configuration name under config/ (falls back to built-in defaults)
    #[arg(long)]
    config: Option<String>,

    /// Device identifier override
    #[arg(long)]
    device: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted streaming session against the simulated transport
    Stream {
        /// Seconds to stream before stopping
        #[arg(long, default_value = "5")]
        seconds: u64,

        /// Print the capture summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Exercise the device command set against the simulated transport
    Device,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(name) => Settings::new(Some(name))?,
        None => Settings::default(),
    };
    if let Some(device) = cli.device {
        settings.device_id = device;
        settings.validate()?;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&settings.log_level),
    )
    .init();

    match cli.command {
        Commands::Stream { seconds, json } => run_stream_session(&settings, seconds, json).await,
        Commands::Device => run_device_commands(&settings).await,
    }
}

async fn connect_and_wait(handle: &SessionHandle) -> Result<()> {
    handle.connect().await?;
    let mut snapshots = handle.watch();
    snapshots
        .wait_for(|snapshot| snapshot.connection.is_connected())
        .await?;
    Ok(())
}

async fn run_stream_session(settings: &Settings, seconds: u64, json: bool) -> Result<()> {
    let transport = MockTransport::simulated();
    let (handle, task) = SessionActor::spawn(Arc::new(transport), settings);

    connect_and_wait(&handle).await?;

    handle.set_recording_mode(true).await?;
    handle.set_live_mode(true).await?;
    for modality in Modality::ALL {
        handle.start_stream(modality).await?;
    }

    info!("Streaming for {} seconds", seconds);
    tokio::time::sleep(Duration::from_secs(seconds)).await;

    for modality in Modality::ALL {
        handle.stop_stream(modality).await?;
    }
    handle.set_recording_mode(false).await?;

    let buffers = handle.export_buffers().await?;
    let snapshot = handle.snapshot();

    if json {
        let summary = serde_json::json!({
            "device": settings.device_id,
            "buffer_counts": buffers.counts(),
            "live_slots": snapshot.live_slots,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let counts = buffers.counts();
        println!("Capture summary for {}:", settings.device_id);
        println!("  ecg samples: {}", counts.ecg);
        println!("  acc samples: {}", counts.acc);
        println!("  hr samples:  {}", counts.hr);
        println!(
            "  last live hr: {} bpm (R-R {} ms)",
            snapshot.live_slots.hr, snapshot.live_slots.rr_ms
        );
    }

    handle.disconnect().await?;
    handle.shutdown().await?;
    task.await?;
    Ok(())
}

async fn run_device_commands(settings: &Settings) -> Result<()> {
    let transport = MockTransport::simulated();
    let (handle, task) = SessionActor::spawn(Arc::new(transport), settings);

    connect_and_wait(&handle).await?;

    handle.set_sdk_mode(true).await?;
    handle.start_device_recording().await?;
    if let Some(status) = handle.recording_status().await? {
        println!(
            "Recording ongoing: {} entry: {}",
            status.ongoing, status.entry_id
        );
    }
    handle.stop_device_recording().await?;
    handle.synchronize_clock().await?;
    handle.set_sdk_mode(false).await?;

    handle.disconnect().await?;
    handle.shutdown().await?;
    task.await?;
    Ok(())
}
