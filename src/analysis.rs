use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

/// One bin of a magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumBin {
    pub freq_hz: f64,
    pub magnitude: f64,
}

/// Subtracts the arithmetic mean from every sample. The target's ADC trace
/// rides on a mid-scale bias; this recenters it around zero for display and
/// analysis. Output length equals input length.
pub fn remove_dc(samples: &[i16]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64;
    samples.iter().map(|&s| s as f64 - mean).collect()
}

/// Single-sided magnitude spectrum of a captured waveform.
///
/// Samples are normalized to half DAC scale before the transform, so a
/// full-scale sinusoid reads as magnitude 1.0 in its bin. Bins `[0, N/2)`
/// are kept and every one of them is doubled, the DC bin included; that
/// matches the device-side convention this tool is paired with.
///
/// `effective_sample_rate_hz` is a configured quantity (sampling parameter
/// times the fundamental), not a measured clock; it only labels the bins.
pub fn spectrum(
    samples: &[i16],
    effective_sample_rate_hz: f64,
    dac_resolution_bits: u32,
) -> Vec<SpectrumBin> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let max_dac_val = ((1u32 << dac_resolution_bits) - 1) as f64;
    let half_scale = max_dac_val / 2.0;

    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .map(|&s| Complex::new(s as f64 / half_scale, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    buffer[..n / 2]
        .iter()
        .enumerate()
        .map(|(k, x)| SpectrumBin {
            freq_hz: k as f64 * effective_sample_rate_hz / n as f64,
            magnitude: x.norm() / n as f64 * 2.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_dc_recenters_around_zero() {
        assert_eq!(remove_dc(&[1, 2, 3]), vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn remove_dc_handles_empty_input() {
        assert!(remove_dc(&[]).is_empty());
    }

    #[test]
    fn spectrum_returns_half_the_bins() {
        let samples = vec![0i16; 100];
        let bins = spectrum(&samples, 6000.0, 12);
        assert_eq!(bins.len(), 50);
    }

    #[test]
    fn spectrum_bin_frequencies_are_linear() {
        let samples = vec![0i16; 100];
        let bins = spectrum(&samples, 6000.0, 12);
        assert_eq!(bins[0].freq_hz, 0.0);
        assert_eq!(bins[1].freq_hz, 60.0);
        assert_eq!(bins[49].freq_hz, 2940.0);
    }

    #[test]
    fn pure_tone_lands_in_its_bin() {
        // 10 cycles over 100 samples, amplitude 1000 DAC codes.
        let samples: Vec<i16> = (0..100)
            .map(|i| {
                (1000.0 * (2.0 * std::f64::consts::PI * 10.0 * i as f64 / 100.0).sin()).round()
                    as i16
            })
            .collect();

        let bins = spectrum(&samples, 6000.0, 12);
        let expected = 1000.0 / 2047.5;
        assert!((bins[10].magnitude - expected).abs() < 5e-3);
        assert_eq!(bins[10].freq_hz, 600.0);

        // Neighboring bins stay near the noise floor.
        assert!(bins[9].magnitude < 1e-2);
        assert!(bins[11].magnitude < 1e-2);
    }

    #[test]
    fn dc_bin_is_doubled_like_the_rest() {
        // Constant 1024 normalizes to 1024/2047.5; the kept DC bin is
        // scaled by 2 exactly like every other retained bin.
        let samples = vec![1024i16; 100];
        let bins = spectrum(&samples, 6000.0, 12);
        let expected = 2.0 * 1024.0 / 2047.5;
        assert!((bins[0].magnitude - expected).abs() < 1e-9);
        assert!(bins[1].magnitude < 1e-9);
    }
}
