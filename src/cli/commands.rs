use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sweynscan", version, about = "BLE link-layer DoS and recovery test harness")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the link-layer length-field fuzzing campaign
    Length(LengthArgs),
    /// Run the pairing key-size fuzzing sweep
    Pairing(PairingArgs),
    /// Check device availability without perturbing it
    Probe(ProbeArgs),
}

#[derive(Args, Clone)]
pub struct TargetArgs {
    /// Serial port of the fuzzing radio (e.g. COM74 or /dev/ttyACM0)
    pub serial_port: String,

    /// Target BLE device address (AA:BB:CC:DD:EE:FF)
    pub address: String,

    /// Capture file to write (defaults to a timestamped name)
    pub capture: Option<String>,

    /// Control socket of the external fuzzing engine
    #[arg(long, default_value = "127.0.0.1:9600")]
    pub control: String,
}

#[derive(Args, Clone)]
pub struct LengthArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// max_rx_bytes values to test; zero probes the SweynTooth-style floor,
    /// 251 is the protocol-valid control
    #[arg(long, value_delimiter = ',', default_values_t = [0u16, 3000, 251])]
    pub values: Vec<u16>,
}

#[derive(Args, Clone)]
pub struct PairingArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Largest key size to test
    #[arg(long, default_value_t = 16)]
    pub start_key_size: u8,

    /// Smallest key size to test
    #[arg(long, default_value_t = 7)]
    pub end_key_size: u8,
}

#[derive(Args, Clone)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Number of scan/connect rounds
    #[arg(long, default_value_t = 5)]
    pub rounds: u32,
}
