//! htt-decode diagnostic binary
//!
//! Decodes hex dumps of host/target messages, firmware event envelopes and
//! wake packets captured from a driver log.

use clap::{Parser, Subcommand, ValueEnum};
use htt_wow::host::{parse_envelope, FirmwareEvent};
use htt_wow::packet::{summarize, summarize_mgmt};
use htt_wow::protocol::{decode, decode_t2h, layout_of};
use htt_wow::{
    classify, AddressWidth, Config, Direction, Dispatcher, NegotiatedCaps, SessionCaps,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Decode host/target messages and wake events
#[derive(Parser, Debug)]
#[command(name = "htt-decode", version, about)]
struct Args {
    /// Path to configuration file (overrides default search paths)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode one catalog message
    Msg {
        /// Message direction
        #[arg(short, long, value_enum)]
        direction: DirectionArg,
        /// Decode bus addresses as two words
        #[arg(long)]
        addr64: bool,
        /// Message bytes in hex
        hex: String,
    },
    /// Decode a firmware event envelope and dispatch it
    Event {
        /// Decode bus addresses as two words
        #[arg(long)]
        addr64: bool,
        /// Envelope bytes in hex
        hex: String,
    },
    /// Classify an Ethernet frame
    Classify {
        /// Frame bytes in hex
        hex: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    H2t,
    T2h,
}

impl From<DirectionArg> for Direction {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::H2t => Direction::HostToTarget,
            DirectionArg::T2h => Direction::TargetToHost,
        }
    }
}

fn width(addr64: bool) -> AddressWidth {
    if addr64 {
        AddressWidth::Addr64
    } else {
        AddressWidth::Addr32
    }
}

fn parse_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let cleaned: String = input
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(cleaned)
}

fn load_config(path: Option<&PathBuf>) -> Config {
    let result = match path {
        Some(path) => Config::load_file(path).map(|c| (c, vec![path.clone()])),
        None => Config::load(),
    };
    match result {
        Ok((config, loaded_paths)) => {
            for path in &loaded_paths {
                info!(path = %path.display(), "Loaded config file");
            }
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_msg(direction: Direction, width: AddressWidth, bytes: &[u8]) {
    match decode(direction, bytes, width) {
        Ok(msg) => {
            let msg_type = msg.message_type();
            println!("{} ({} bytes, {} addresses)", msg_type, bytes.len(), width);
            let layout = layout_of(msg_type);
            println!("layout: {} header {} bytes", layout.name, layout.header_len(width));
            println!("{:#?}", msg);
        }
        Err(e) => {
            error!(direction = %direction, len = bytes.len(), error = %e, "Failed to decode message");
            std::process::exit(1);
        }
    }
}

fn run_event(config: &Config, width: AddressWidth, bytes: &[u8]) {
    let event = match parse_envelope(bytes) {
        Ok(event) => event,
        Err(e) => {
            error!(len = bytes.len(), error = %e, "Failed to parse event envelope");
            std::process::exit(1);
        }
    };

    match event {
        FirmwareEvent::Htt { vdev_id, message } => match decode_t2h(message, width) {
            Ok(msg) => println!("vdev={} indication {:#?}", vdev_id, msg),
            Err(e) => {
                error!(vdev_id = vdev_id, error = %e, "Failed to decode indication");
                std::process::exit(1);
            }
        },
        FirmwareEvent::Wake(wake) => {
            let caps = Arc::new(SessionCaps::new());
            let negotiated = NegotiatedCaps {
                address_width: width,
                ..Default::default()
            };
            // A fresh cell cannot already hold a value.
            let _ = caps.publish(negotiated);

            let dispatcher = Dispatcher::with_session_caps(config.host.dispatch(), caps);
            match dispatcher.dispatch(&wake) {
                Ok(decoded) => {
                    println!("{}", decoded);
                    println!("{:#?}", decoded.body);
                }
                Err(e) => println!("dispatch failed: {}", e),
            }
            let stats = dispatcher.get_wake_stats(wake.vdev_id);
            println!("{:#?}", stats);
            println!("rejected events: {}", dispatcher.rejected_events());
        }
    }
}

fn run_classify(frame: &[u8]) {
    let protocol = classify(frame);
    println!("{}", protocol);
    println!("{}", summarize(frame));
    if let Some(mgmt) = summarize_mgmt(frame) {
        println!("as 802.11: {}", mgmt);
    }
}

fn main() {
    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let hex_input = match &args.command {
        Command::Msg { hex, .. } | Command::Event { hex, .. } | Command::Classify { hex } => hex,
    };
    let bytes = match parse_hex(hex_input) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Invalid hex input: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Msg {
            direction, addr64, ..
        } => run_msg(direction.into(), width(addr64), &bytes),
        Command::Event { addr64, .. } => {
            let config = load_config(args.config.as_ref());
            run_event(&config, width(addr64), &bytes);
        }
        Command::Classify { .. } => run_classify(&bytes),
    }
}
