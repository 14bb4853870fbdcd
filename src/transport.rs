use crate::error::{LinkError, Result};
use log::{debug, info};
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

/// Byte-stream primitive the session runs on. The protocol layer never
/// touches a port directly, which keeps the whole request/response logic
/// testable against [`ScriptedTransport`] without hardware.
pub trait Transport {
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Reads up to `n` bytes, blocking until they arrive or the transport's
    /// timeout elapses. Returning fewer than `n` bytes (a short read) is not
    /// an error at this layer; the caller decides what a short read means.
    fn read(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Discards any unread input residue.
    fn flush_input(&mut self) -> Result<()>;
}

/// Picks the first USB serial port on the machine. Good enough for a bench
/// with a single devkit plugged in; pass an explicit port name otherwise.
pub fn find_usb_port() -> Result<String> {
    let ports = serialport::available_ports()
        .map_err(|e| LinkError::TransportUnavailable(e.to_string()))?;

    for port in ports {
        if let SerialPortType::UsbPort(_) = port.port_type {
            info!("Chosen port {}", port.port_name);
            return Ok(port.port_name);
        }
    }

    Err(LinkError::TransportUnavailable(
        "no USB serial port found".into(),
    ))
}

/// A physical serial port, 8N1 with no flow control.
///
/// `write_gap` inserts a pause after every write. The target drains its
/// receive FIFO in an interrupt handler with no flow control at all, so the
/// bare per-sample frames of a waveform upload need pacing or the FIFO
/// overruns. That is a property of this link, not of the protocol.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    write_gap: Option<Duration>,
}

impl SerialTransport {
    pub fn open(
        name: &str,
        baud: u32,
        timeout: Duration,
        write_gap: Option<Duration>,
    ) -> Result<Self> {
        let port = serialport::new(name, baud)
            .timeout(timeout)
            .flow_control(FlowControl::None)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .data_bits(DataBits::Eight)
            .open()
            .map_err(|e| LinkError::TransportUnavailable(format!("{name}: {e}")))?;

        info!("Opened {name} at {baud} bps");
        Ok(Self { port, write_gap })
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        if let Some(gap) = self.write_gap {
            std::thread::sleep(gap);
        }
        Ok(())
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; n];
        let mut got = 0;

        while got < n {
            match self.port.read(&mut out[got..]) {
                Ok(0) => break,
                Ok(k) => got += k,
                // A timeout just ends the read; the caller sees a short read.
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }

        out.truncate(got);
        debug!("read {got}/{n} bytes");
        Ok(out)
    }

    fn flush_input(&mut self) -> Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(|e| LinkError::Io(std::io::Error::other(e)))
    }
}

/// In-memory transport for deterministic protocol tests: records every
/// byte written and replays a scripted response queue, truncating reads to
/// whatever remains (which is exactly how a timed-out serial read looks).
#[derive(Default)]
pub struct ScriptedTransport {
    pub written: Vec<u8>,
    pub pending: Vec<u8>,
    pub flushes: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues bytes the "device" will answer with on subsequent reads.
    pub fn script(mut self, response: &[u8]) -> Self {
        self.pending.extend_from_slice(response);
        self
    }
}

impl Transport for ScriptedTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let take = n.min(self.pending.len());
        let out = self.pending.drain(..take).collect();
        Ok(out)
    }

    fn flush_input(&mut self) -> Result<()> {
        self.pending.clear();
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_transport_truncates_short_reads() {
        let mut t = ScriptedTransport::new().script(&[1, 2, 3]);
        assert_eq!(t.read(5).unwrap(), vec![1, 2, 3]);
        assert_eq!(t.read(5).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn scripted_transport_records_writes_in_order() {
        let mut t = ScriptedTransport::new();
        t.write(&[0x01]).unwrap();
        t.write(&[0x02, 0x03]).unwrap();
        assert_eq!(t.written, vec![0x01, 0x02, 0x03]);
    }
}
