//! herald - MQTT speech announcer entry point

use clap::Parser;
use herald::announce::Announcer;
use herald::config::{AnnouncerConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_QOS, DEFAULT_TOPIC};
use herald::error::HeraldError;
use herald::logging::init_default_logging;
use herald::session::Session;
use herald::shutdown;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Announce MQTT messages through a text-to-speech command
#[derive(Parser)]
#[command(name = "herald")]
#[command(about = "Subscribes to an MQTT topic filter and speaks matching payloads")]
#[command(version)]
struct Cli {
    /// Broker host
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Broker port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Topic filter to subscribe to
    #[arg(short, long, default_value = DEFAULT_TOPIC)]
    topic: String,

    /// Subscription QoS level (0-2)
    #[arg(short, long, default_value_t = DEFAULT_QOS)]
    qos: u8,

    /// Executable invoked with the message text as its sole argument
    /// (default: espeak)
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> AnnouncerConfig {
        AnnouncerConfig {
            host: self.host,
            port: self.port,
            topic: self.topic,
            qos: self.qos,
            script: self.script,
            verbose: self.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_default_logging(cli.verbose);

    let config = cli.into_config();
    if let Err(e) = config.validate() {
        error!("invalid configuration: {e}");
        return exit_code(HeraldError::from(e).exit_code());
    }

    match run(config).await {
        Ok(rc) => exit_code(rc),
        Err(e) => {
            error!("{e}");
            exit_code(e.exit_code())
        }
    }
}

async fn run(config: AnnouncerConfig) -> Result<i32, HeraldError> {
    info!(version = env!("CARGO_PKG_VERSION"), "starting herald");

    let (shutdown_tx, shutdown_rx) = shutdown::shutdown_channel();
    tokio::spawn(shutdown::watch_signals(shutdown_tx));

    let announcer = Announcer::new(config.script.clone());
    let session = Session::new(config, announcer, shutdown_rx);
    let rc = session.run().await?;

    info!(rc, "shutdown complete");
    Ok(rc)
}

fn exit_code(rc: i32) -> ExitCode {
    // Broker return codes fit in a byte in practice; anything else still
    // has to read as a failure.
    ExitCode::from(u8::try_from(rc).unwrap_or(1))
}
