use std::fmt::Write;

use crate::error::{ConfigError, PayloadError, TransformError};

/// Bytes taken by the fractional part of each value: the point and two digits.
const FRACTION_BYTES: usize = 3;

/// The wire layout of a published spectrum: every magnitude with two fractional digits, separated
/// by commas, e.g. `12.34,0.00,5.60,1.23`. No brackets, no trailing comma, no newline.
///
/// The buffer bound is worked out from the configuration, so a well-formed spectrum can never be
/// cut short.
#[derive(Debug, Clone)]
pub struct PayloadFormat {
    bins: usize,
    capacity: usize,
}

impl PayloadFormat {
    /// `full_scale` is the largest absolute reading the sampler can produce. With N bins no
    /// magnitude can exceed `N * full_scale`, which bounds the width of every value.
    pub fn new(bins: usize, full_scale: u32, limit: usize) -> Result<Self, ConfigError> {
        let too_large = |needed| ConfigError::PayloadTooLarge {
            fft_size: bins,
            needed,
            limit,
        };
        // Not even representable means far over any limit
        let capacity = worst_case_len(bins, full_scale).ok_or_else(|| too_large(usize::MAX))?;
        if capacity > limit {
            return Err(too_large(capacity));
        }
        Ok(Self { bins, capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Formats `spectrum` into `out`, replacing its contents.
    pub fn write(&self, spectrum: &[f32], out: &mut String) -> Result<(), PayloadError> {
        if spectrum.len() != self.bins {
            return Err(TransformError::Length {
                expected: self.bins,
                actual: spectrum.len(),
            }
            .into());
        }

        out.clear();
        for (i, value) in spectrum.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write!(out, "{value:.2}").expect("writing to a String cannot fail");
        }

        if out.len() > self.capacity {
            return Err(PayloadError::Overflow {
                actual: out.len(),
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn format(&self, spectrum: &[f32]) -> Result<String, PayloadError> {
        let mut out = String::with_capacity(self.capacity);
        self.write(spectrum, &mut out)?;
        Ok(out)
    }
}

fn worst_case_len(bins: usize, full_scale: u32) -> Option<usize> {
    // A little headroom over the exact bound, for rounding in the transform.
    let peak = (bins as f64 * full_scale as f64 * 1.001).ceil() as u64;
    let digits = peak.checked_ilog10().unwrap_or(0) as usize + 1;
    bins.checked_mul(digits + FRACTION_BYTES)?
        .checked_add(bins.saturating_sub(1))
}
