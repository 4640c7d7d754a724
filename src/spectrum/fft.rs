use crate::error::{ConfigError, TransformError};

/// Fails unless `size` is a power of two and at least 2. The butterfly index recurrence below
/// quietly scrambles the output for any other size, so we refuse it up front.
pub fn check_size(size: usize) -> Result<(), ConfigError> {
    if size < 2 || !size.is_power_of_two() {
        return Err(ConfigError::FftSize(size));
    }
    Ok(())
}

/// A radix-2 transform of a fixed size, along with the scratch buffers it works in. Built once at
/// start-up so that each sampling cycle runs without allocating.
pub struct FftPlan {
    re: Vec<f32>,
    im: Vec<f32>,
}

impl FftPlan {
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        check_size(size)?;
        Ok(Self {
            re: vec![0.0; size],
            im: vec![0.0; size],
        })
    }

    pub fn size(&self) -> usize {
        self.re.len()
    }

    /// Computes `output[k] = |X[k]|`, where X is the discrete Fourier transform of `input` taken as
    /// a purely real sequence. No window is applied; bin 0 holds DC and bin N/2 holds Nyquist, and
    /// both halves of the (conjugate-symmetric) spectrum are written out.
    pub fn magnitudes(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), TransformError> {
        let n = self.size();
        for len in [input.len(), output.len()] {
            if len != n {
                return Err(TransformError::Length {
                    expected: n,
                    actual: len,
                });
            }
        }

        self.transform(input, output);
        Ok(())
    }

    /// `input` and `output` must both be `self.size()` long.
    fn transform(&mut self, input: &[f32], output: &mut [f32]) {
        self.re.copy_from_slice(input);
        self.im.fill(0.0);

        self.bit_reverse();
        self.butterflies();

        for (out, (re, im)) in output.iter_mut().zip(self.re.iter().zip(self.im.iter())) {
            *out = (re * re + im * im).sqrt();
        }
    }

    fn bit_reverse(&mut self) {
        let n = self.size();
        let mut j = 0;
        for i in 0..n {
            if i < j {
                self.re.swap(i, j);
                self.im.swap(i, j);
            }
            let mut m = n >> 1;
            while m >= 1 && j >= m {
                j -= m;
                m >>= 1;
            }
            j += m;
        }
    }

    fn butterflies(&mut self) {
        let n = self.size();
        let (re, im) = (&mut self.re, &mut self.im);

        let mut len = 2;
        while len <= n {
            let half = len / 2;
            let angle = -std::f32::consts::TAU / len as f32;
            let (step_im, step_re) = angle.sin_cos();

            for start in (0..n).step_by(len) {
                let (mut w_re, mut w_im) = (1.0f32, 0.0f32);
                for offset in 0..half {
                    let u = start + offset;
                    let v = u + half;

                    let t_re = w_re * re[v] - w_im * im[v];
                    let t_im = w_re * im[v] + w_im * re[v];

                    re[v] = re[u] - t_re;
                    im[v] = im[u] - t_im;
                    re[u] += t_re;
                    im[u] += t_im;

                    let next_re = w_re * step_re - w_im * step_im;
                    w_im = w_re * step_im + w_im * step_re;
                    w_re = next_re;
                }
            }
            len <<= 1;
        }
    }
}

/// Plans and runs a single transform.
#[cfg(test)]
pub fn magnitude_spectrum(input: &[f32]) -> Result<Vec<f32>, ConfigError> {
    let mut plan = FftPlan::new(input.len())?;
    let mut out = vec![0.0; input.len()];
    plan.transform(input, &mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
        assert_eq!(actual.len(), expected.len());
        for (k, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() <= tolerance, "bin {k}: got {a}, expected {e}");
        }
    }

    /// Deterministic, non-trivial input without needing an rng.
    fn wobble(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| ((i * 7919) % 4096) as f32 - 2048.0 + (i as f32 * 0.37).sin() * 100.0)
            .collect()
    }

    #[test]
    fn rejects_bad_sizes() {
        for size in [0, 1, 3, 6, 100, 255, 257] {
            assert!(matches!(FftPlan::new(size), Err(ConfigError::FftSize(s)) if s == size));
        }
        for size in [2, 4, 256, 4096] {
            assert!(FftPlan::new(size).is_ok());
        }
    }

    #[test]
    fn rejects_mismatched_buffers() {
        let mut plan = FftPlan::new(8).unwrap();
        let mut out = [0.0; 8];
        assert_eq!(
            plan.magnitudes(&[0.0; 4], &mut out),
            Err(TransformError::Length {
                expected: 8,
                actual: 4
            })
        );
        let mut short = [0.0; 2];
        assert!(plan.magnitudes(&[0.0; 8], &mut short).is_err());
    }

    #[test]
    fn output_has_input_length_and_is_non_negative() {
        let mut size = 2;
        while size <= 1024 {
            let out = magnitude_spectrum(&wobble(size)).unwrap();
            assert_eq!(out.len(), size);
            assert!(out.iter().all(|v| *v >= 0.0), "negative magnitude at n={size}");
            size <<= 1;
        }
    }

    #[test]
    fn zeros_in_zeros_out() {
        let out = magnitude_spectrum(&[0.0; 64]).unwrap();
        assert!(out.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn constant_input_lands_in_dc_bin() {
        let n = 128;
        let a = 3.5;
        let out = magnitude_spectrum(&vec![a; n]).unwrap();
        assert!((out[0] - n as f32 * a).abs() < 1e-3);
        assert!(out[1..].iter().all(|v| v.abs() < 1e-3));
    }

    #[test]
    fn known_four_point_case() {
        let out = magnitude_spectrum(&[1.0, 0.0, -1.0, 0.0]).unwrap();
        assert_close(&out, &[0.0, 2.0, 0.0, 2.0], 1e-6);
    }

    #[test]
    fn alternating_input_lands_in_nyquist_bin() {
        let n = 16;
        let input: Vec<f32> = (0..n).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let out = magnitude_spectrum(&input).unwrap();
        for (k, v) in out.iter().enumerate() {
            let expected = if k == n / 2 { n as f32 } else { 0.0 };
            assert!((v - expected).abs() < 1e-4, "bin {k}: {v}");
        }
    }

    #[test]
    fn spectrum_is_mirrored() {
        let n = 64;
        let out = magnitude_spectrum(&wobble(n)).unwrap();
        let tolerance = 1e-4 * out.iter().cloned().fold(0.0, f32::max);
        for k in 1..n / 2 {
            assert!((out[k] - out[n - k]).abs() <= tolerance, "bin {k}");
        }
    }

    #[test]
    fn permutation_matches_canonical_bit_reversal() {
        for bits in 1..=10u32 {
            let n = 1usize << bits;
            let mut plan = FftPlan::new(n).unwrap();
            for i in 0..n {
                plan.re[i] = i as f32;
            }
            plan.bit_reverse();
            for i in 0..n {
                let expected = i.reverse_bits() >> (usize::BITS - bits);
                assert_eq!(plan.re[i], expected as f32, "n={n} i={i}");
            }
        }
    }

    #[test]
    fn matches_naive_dft() {
        let n = 32;
        let input = wobble(n);
        let out = magnitude_spectrum(&input).unwrap();
        let naive: Vec<f32> = (0..n)
            .map(|k| {
                let (mut re, mut im) = (0.0f64, 0.0f64);
                for (t, x) in input.iter().enumerate() {
                    let angle = -std::f64::consts::TAU * (k * t) as f64 / n as f64;
                    re += *x as f64 * angle.cos();
                    im += *x as f64 * angle.sin();
                }
                (re * re + im * im).sqrt() as f32
            })
            .collect();
        let peak = naive.iter().cloned().fold(0.0, f32::max);
        assert_close(&out, &naive, peak * 1e-4);
    }

    #[test]
    fn matches_microfft_at_256() {
        let input = wobble(256);
        let out = magnitude_spectrum(&input).unwrap();

        let mut samples: [f32; 256] = input.clone().try_into().unwrap();
        let reference = microfft::real::rfft_256(&mut samples);
        // rfft packs the real Nyquist coefficient into the imaginary part of the DC bin
        let nyquist = reference[0].im.abs();
        reference[0].im = 0.0;

        let peak = out.iter().cloned().fold(0.0, f32::max);
        let tolerance = peak * 1e-4;
        for (k, c) in reference.iter().enumerate() {
            let expected = c.norm_sqr().sqrt();
            assert!((out[k] - expected).abs() <= tolerance, "bin {k}");
        }
        assert!((out[128] - nyquist).abs() <= tolerance);
    }

    #[test]
    fn plan_is_reusable() {
        let mut plan = FftPlan::new(4).unwrap();
        let mut out = [0.0; 4];
        plan.magnitudes(&[1.0, 1.0, 1.0, 1.0], &mut out).unwrap();
        assert_close(&out, &[4.0, 0.0, 0.0, 0.0], 1e-6);
        plan.magnitudes(&[1.0, 0.0, -1.0, 0.0], &mut out).unwrap();
        assert_close(&out, &[0.0, 2.0, 0.0, 2.0], 1e-6);
    }
}
