//! Client for the external fuzzing engine's control socket. The engine owns
//! the radio and the packet capture; this side only exchanges newline-
//! delimited commands and consumes responses as opaque text.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

use tracing::{debug, info};

use super::{FuzzEngine, RadioResponse};
use crate::errors::HarnessError;

/// Response read timeout. Generous because a perturbed device can stall the
/// engine's supervision timeout before it reports back.
const READ_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RemoteEngine {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl RemoteEngine {
    /// Connect to the engine's control socket and bind it to a serial port
    /// and target device address. Fails loudly; failed collaborator
    /// initialization is the one error that terminates the process.
    pub fn open(control_addr: &str, serial_port: &str, address: &str) -> Result<Self, HarnessError> {
        let stream = TcpStream::connect(control_addr)
            .map_err(|e| HarnessError::Collaborator(format!("cannot reach fuzzing engine at {control_addr}: {e}")))?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(HarnessError::Io)?;

        let writer = stream
            .try_clone()
            .map_err(HarnessError::Io)?;
        let mut engine = Self {
            reader: BufReader::new(stream),
            writer,
        };

        let port = normalize_serial_port(serial_port);
        let reply = engine.command(&format!("open {port} {address}"))?;
        if reply.is_failure() {
            return Err(HarnessError::Collaborator(format!(
                "engine refused to open {port} for {address}"
            )));
        }

        info!(port = %port, address = %address, "Fuzzing engine attached");
        Ok(engine)
    }

    fn command(&mut self, cmd: &str) -> Result<RadioResponse, HarnessError> {
        debug!(command = cmd, "Sending engine command");
        writeln!(self.writer, "{cmd}").map_err(|e| {
            HarnessError::Collaborator(format!("engine write failed: {e}"))
        })?;
        self.writer
            .flush()
            .map_err(|e| HarnessError::Collaborator(format!("engine flush failed: {e}")))?;

        let mut line = String::new();
        let n = self
            .reader
            .read_line(&mut line)
            .map_err(|e| HarnessError::Collaborator(format!("engine read failed: {e}")))?;
        if n == 0 {
            return Err(HarnessError::Collaborator("engine closed the control socket".into()));
        }

        let line = line.trim_end();
        debug!(reply = line, "Engine reply");
        Ok(match line {
            "ERROR" => RadioResponse::ErrorSentinel,
            "" | "EMPTY" => RadioResponse::Empty,
            text => RadioResponse::Packet(text.to_string()),
        })
    }
}

impl FuzzEngine for RemoteEngine {
    fn scan(&mut self) -> Result<RadioResponse, HarnessError> {
        self.command("scan_req")
    }

    fn connect(&mut self) -> Result<RadioResponse, HarnessError> {
        self.command("connection_request")
    }

    fn send_length_fuzz(&mut self, max_rx_bytes: u16) -> Result<RadioResponse, HarnessError> {
        self.command(&format!("length_request max_rx_bytes={max_rx_bytes}"))
    }

    fn send_pairing_fuzz(&mut self, max_key_size: u8) -> Result<RadioResponse, HarnessError> {
        self.command(&format!("pairing_request max_key_size={max_key_size}"))
    }

    fn terminate(&mut self) -> Result<(), HarnessError> {
        self.command("termination_indication").map(|_| ())
    }

    fn save_capture(&mut self, filename: &str) -> Result<(), HarnessError> {
        let reply = self.command(&format!("save_pcap {filename}"))?;
        if reply.is_failure() {
            return Err(HarnessError::Collaborator(format!(
                "engine failed to save capture {filename}"
            )));
        }
        Ok(())
    }
}

/// Normalize a serial-port name for the host platform. Accepts bare numbers
/// and Windows-style COM names on Linux.
pub fn normalize_serial_port(port: &str) -> String {
    if cfg!(windows) {
        if port.chars().all(|c| c.is_ascii_digit()) {
            format!("COM{port}")
        } else if !port.to_uppercase().starts_with("COM") {
            format!("COM{port}")
        } else {
            port.to_uppercase()
        }
    } else if port.to_uppercase().starts_with("COM") {
        let digits: String = port.chars().filter(|c| c.is_ascii_digit()).collect();
        format!("/dev/ttyACM{digits}")
    } else {
        port.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(windows))]
    fn test_com_name_maps_to_ttyacm() {
        assert_eq!(normalize_serial_port("COM74"), "/dev/ttyACM74");
        assert_eq!(normalize_serial_port("com3"), "/dev/ttyACM3");
    }

    #[test]
    #[cfg(not(windows))]
    fn test_device_path_passes_through() {
        assert_eq!(normalize_serial_port("/dev/ttyUSB0"), "/dev/ttyUSB0");
    }
}
