use crate::error::{LinkError, Result};
use crate::protocol;
use crate::synth::{self, ToneComponent, Waveform};
use crate::transport::Transport;
use log::info;
use std::ops::RangeInclusive;

/// Samples per host-generated (transmit) waveform. Matches the target's DAC
/// buffer length.
pub const TX_WAVEFORM_SAMPLES: usize = 200;
/// Samples per device-reported (receive) waveform. Matches the target's ADC
/// buffer length.
pub const RX_WAVEFORM_SAMPLES: usize = 100;

/// Sampling state shared with the target. Threaded explicitly through the
/// session calls; it is only ever mutated by a push or pull of the scalar,
/// or by recording the fundamental of an uploaded waveform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub fundamental_hz: f64,
    pub sampling_parameter: i16,
    pub dac_resolution_bits: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            fundamental_hz: 60.0,
            sampling_parameter: 100,
            dac_resolution_bits: 12,
        }
    }
}

impl SamplingConfig {
    /// Labeling rate for spectrum bins: sampling parameter times the
    /// fundamental. Configured, not measured.
    pub fn effective_sample_rate_hz(&self) -> f64 {
        self.sampling_parameter as f64 * self.fundamental_hz
    }
}

/// Drives the four protocol operations over a transport, one blocking
/// request at a time. The protocol has no request IDs, so exactly one
/// operation may be outstanding; responses are matched to requests purely
/// by position, and a response is accepted wholesale or not at all.
pub struct SessionController<T: Transport> {
    transport: T,
    scalar_bounds: RangeInclusive<i16>,
}

impl<T: Transport> SessionController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            scalar_bounds: 0..=100,
        }
    }

    pub fn with_scalar_bounds(mut self, bounds: RangeInclusive<i16>) -> Self {
        self.scalar_bounds = bounds;
        self
    }

    /// Sends the sampling parameter to the target. No response is expected.
    /// The bound is checked before a single byte goes out.
    pub fn push_scalar(&mut self, value: i16, config: &mut SamplingConfig) -> Result<()> {
        if !self.scalar_bounds.contains(&value) {
            return Err(LinkError::InvalidUserInput(format!(
                "scalar {value} outside allowed range {}..={}",
                self.scalar_bounds.start(),
                self.scalar_bounds.end()
            )));
        }

        self.transport.write(&protocol::encode_scalar_push(value))?;
        config.sampling_parameter = value;
        info!("Pushed sampling parameter {value}");
        Ok(())
    }

    /// Asks the target for its sampling parameter and waits for the bare
    /// 2-byte reply. Any input residue is flushed whether the read was
    /// complete or short.
    pub fn pull_scalar(&mut self, config: &mut SamplingConfig) -> Result<i16> {
        self.transport
            .write(&protocol::encode_scalar_pull_request())?;

        let raw = self.transport.read(2)?;
        self.transport.flush_input()?;

        let value = protocol::decode_i16(&raw)?;
        config.sampling_parameter = value;
        info!("Pulled sampling parameter {value}");
        Ok(value)
    }

    /// Synthesizes one 200-sample cycle from the tone list and uploads it:
    /// a header frame announcing the count, then each sample as a bare
    /// 2-byte frame, in order. Pacing between sample frames is the
    /// transport's concern. Returns the generated waveform for inspection.
    ///
    /// The first-entered tone becomes the recorded fundamental, while the
    /// synthesis period is anchored to the lowest frequency; the two differ
    /// when tones are entered out of frequency order. Kept as-is to match
    /// the deployed target firmware.
    pub fn push_waveform(
        &mut self,
        tones: &[ToneComponent],
        config: &mut SamplingConfig,
    ) -> Result<Waveform> {
        let wave = synth::generate(tones, TX_WAVEFORM_SAMPLES, config.dac_resolution_bits)?;

        let count = i16::try_from(wave.len())
            .map_err(|_| LinkError::EncodingOverflow(wave.len() as i64))?;
        self.transport
            .write(&protocol::encode_waveform_push_header(count))?;
        for &sample in &wave {
            self.transport.write(&protocol::encode_sample(sample))?;
        }

        config.fundamental_hz = tones[0].frequency_hz;
        info!("Pushed {count}-sample waveform");
        Ok(wave)
    }

    /// Requests the target's captured waveform: exactly 100 samples, 200
    /// bytes, no header. All-or-nothing; a short response discards the
    /// whole transfer. Every call re-sends the request frame, nothing is
    /// cached.
    pub fn pull_waveform(&mut self) -> Result<Waveform> {
        self.transport
            .write(&protocol::encode_waveform_pull_request())?;

        let raw = self.transport.read(RX_WAVEFORM_SAMPLES * 2)?;
        let wave = protocol::decode_i16_sequence(&raw, RX_WAVEFORM_SAMPLES)?;
        info!("Pulled {}-sample waveform", wave.len());
        Ok(wave)
    }
}
