use crate::error::{LinkError, Result};

/// One sinusoid contributing additively to a synthesized waveform.
/// Amplitude is normalized to full DAC scale; values above 1.0 are allowed
/// and simply saturate during quantization.
#[derive(Debug, Clone, Copy)]
pub struct ToneComponent {
    pub frequency_hz: f64,
    pub amplitude: f64,
}

/// A run of 16-bit samples, one protocol transfer's worth.
pub type Waveform = Vec<i16>;

/// Builds one cycle of a multi-tone waveform, quantized to DAC codes.
///
/// The cycle duration is anchored to the LOWEST frequency among the tones,
/// regardless of entry order, so the slowest component completes exactly one
/// period across `cycle_samples` points. Each sample is biased to mid-scale,
/// saturated to `[0, 2^bits - 1]` and rounded, so every emitted code is a
/// valid DAC value.
pub fn generate(
    tones: &[ToneComponent],
    cycle_samples: usize,
    dac_resolution_bits: u32,
) -> Result<Waveform> {
    if tones.is_empty() {
        return Err(LinkError::InvalidUserInput(
            "at least one tone is required".into(),
        ));
    }
    for tone in tones {
        if !(tone.frequency_hz > 0.0) {
            return Err(LinkError::InvalidUserInput(format!(
                "tone frequency must be positive, got {}",
                tone.frequency_hz
            )));
        }
    }

    let max_dac_val = ((1u32 << dac_resolution_bits) - 1) as f64;
    let half_scale = max_dac_val / 2.0;

    let lowest = tones
        .iter()
        .map(|t| t.frequency_hz)
        .fold(f64::INFINITY, f64::min);
    let period = 1.0 / lowest;
    let ts = period / cycle_samples as f64;

    let mut out = Waveform::with_capacity(cycle_samples);
    for i in 0..cycle_samples {
        let t = i as f64 * ts;
        let mut raw = half_scale;
        for tone in tones {
            raw += tone.amplitude
                * half_scale
                * (2.0 * std::f64::consts::PI * tone.frequency_hz * t).sin();
        }
        // Saturate before rounding; the DAC has no codes outside this range.
        let code = raw.clamp(0.0, max_dac_val).round();
        out.push(code as i16);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frequency_hz: f64, amplitude: f64) -> ToneComponent {
        ToneComponent {
            frequency_hz,
            amplitude,
        }
    }

    #[test]
    fn first_sample_sits_at_mid_scale() {
        // t=0 makes every sine term zero, leaving half scale 2047.5,
        // which rounds up to 2048.
        let wave = generate(&[tone(60.0, 1.0)], 200, 12).unwrap();
        assert_eq!(wave.len(), 200);
        assert_eq!(wave[0], 2048);
    }

    #[test]
    fn full_scale_tone_spans_dac_range() {
        let wave = generate(&[tone(60.0, 1.0)], 200, 12).unwrap();
        // Peak lands near sample 50 (quarter period), trough near 150.
        assert!(wave.iter().any(|&s| s >= 4090));
        assert!(wave.iter().any(|&s| s <= 5));
    }

    #[test]
    fn saturation_never_leaves_the_dac_range() {
        // Deliberately overdriven sum of tones.
        let tones = [tone(60.0, 1.5), tone(180.0, 1.0), tone(300.0, 0.8)];
        let wave = generate(&tones, 200, 12).unwrap();
        for &s in &wave {
            assert!((0..=4095).contains(&s), "code {s} outside DAC range");
        }
    }

    #[test]
    fn period_is_anchored_to_the_lowest_frequency() {
        // Same tones in both orders give the exact same cycle.
        let a = generate(&[tone(60.0, 0.5), tone(300.0, 0.5)], 200, 12).unwrap();
        let b = generate(&[tone(300.0, 0.5), tone(60.0, 0.5)], 200, 12).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_and_nonpositive_inputs_are_rejected() {
        assert!(matches!(
            generate(&[], 200, 12),
            Err(LinkError::InvalidUserInput(_))
        ));
        assert!(matches!(
            generate(&[tone(0.0, 1.0)], 200, 12),
            Err(LinkError::InvalidUserInput(_))
        ));
        assert!(matches!(
            generate(&[tone(-60.0, 1.0)], 200, 12),
            Err(LinkError::InvalidUserInput(_))
        ));
    }

    #[test]
    fn output_length_matches_request() {
        let wave = generate(&[tone(50.0, 0.2)], 100, 12).unwrap();
        assert_eq!(wave.len(), 100);
    }
}
