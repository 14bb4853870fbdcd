//! Host-side terminal for a serial-linked embedded DSP target.
//!
//! A small command-tagged little-endian protocol carries scalar
//! configuration values and fixed-length sampled waveforms over a byte
//! stream. This crate provides the frame codec, the multi-tone waveform
//! synthesizer, the receive-side analysis (DC removal and magnitude
//! spectrum) and the blocking session controller that ties them to a
//! [`transport::Transport`].

pub mod analysis;
pub mod error;
pub mod protocol;
pub mod session;
pub mod synth;
pub mod transport;

pub use analysis::{SpectrumBin, remove_dc, spectrum};
pub use error::{LinkError, Result};
pub use protocol::Command;
pub use session::{
    RX_WAVEFORM_SAMPLES, SamplingConfig, SessionController, TX_WAVEFORM_SAMPLES,
};
pub use synth::{ToneComponent, Waveform, generate};
pub use transport::{ScriptedTransport, SerialTransport, Transport, find_usb_port};
