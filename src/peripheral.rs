//! Sources of raw readings for the sampling loop. The real thing is an ADC channel; here we have a
//! simulated one and one that replays readings captured earlier.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ConfigError, SampleError};

/// A blocking, one-reading-at-a-time view of the analog input.
pub trait Sampler: Send {
    fn read_sample(&mut self) -> Result<i32, SampleError>;

    /// The largest absolute value `read_sample` can return.
    fn full_scale(&self) -> u32;
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    fn read_sample(&mut self) -> Result<i32, SampleError> {
        (**self).read_sample()
    }

    fn full_scale(&self) -> u32 {
        (**self).full_scale()
    }
}

/// The payload bound is worked out from the configured full scale, so a sampler that can read
/// wider than that is refused.
pub fn check_full_scale(sampler: &dyn Sampler, configured: u32) -> Result<(), ConfigError> {
    match sampler.full_scale() {
        sampler if sampler > configured => Err(ConfigError::FullScale {
            sampler,
            configured,
        }),
        _ => Ok(()),
    }
}

pub fn full_scale_for_bits(bits: u32) -> Result<u32, ConfigError> {
    match bits {
        1..=30 => Ok((1u32 << bits) - 1),
        _ => Err(ConfigError::AdcBits(bits)),
    }
}

/// Pretends to be an unsigned ADC looking at a sine tone riding on mid-scale, plus some noise.
pub struct ToneSampler<R> {
    rng: R,
    full_scale: u32,
    phase: f32,
    /// Radians the tone advances between consecutive reads.
    phase_step: f32,
}

impl ToneSampler<StdRng> {
    /// `sample_rate` is how often we expect to be read, in Hz.
    pub fn new(full_scale: u32, tone_hz: f32, sample_rate: f32) -> Self {
        // ThreadRng can't leave its thread, so seed a movable one from it
        let rng = StdRng::from_rng(&mut rand::rng());
        Self::with_rng(rng, full_scale, tone_hz, sample_rate)
    }
}

impl<R: Rng + Send> ToneSampler<R> {
    pub fn with_rng(rng: R, full_scale: u32, tone_hz: f32, sample_rate: f32) -> Self {
        Self {
            rng,
            full_scale,
            phase: 0.0,
            phase_step: std::f32::consts::TAU * tone_hz / sample_rate,
        }
    }
}

impl<R: Rng + Send> Sampler for ToneSampler<R> {
    fn read_sample(&mut self) -> Result<i32, SampleError> {
        let mid = self.full_scale as f32 / 2.0;
        let noise: f32 = self.rng.random_range(-0.05..0.05);
        let value = mid + mid * (0.8 * self.phase.sin() + noise);

        self.phase = (self.phase + self.phase_step) % std::f32::consts::TAU;
        Ok(value.round().clamp(0.0, self.full_scale as f32) as i32)
    }

    fn full_scale(&self) -> u32 {
        self.full_scale
    }
}

/// Plays back a fixed list of readings over and over.
pub struct ReplaySampler {
    readings: Vec<i32>,
    next: usize,
    full_scale: u32,
}

impl ReplaySampler {
    /// Every reading must fit in `full_scale`, otherwise the payload bound would not hold.
    #[cfg(test)]
    pub fn new(readings: Vec<i32>, full_scale: u32) -> Result<Self, ConfigError> {
        Self::checked(readings, full_scale, Path::new("<memory>"))
    }

    /// Reads integers separated by commas and/or whitespace.
    pub fn from_file(path: impl Into<PathBuf>, full_scale: u32) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let readings = parse_readings(&text).map_err(|reason| ConfigError::Parse {
            path: path.clone(),
            reason,
        })?;
        Self::checked(readings, full_scale, &path)
    }

    fn checked(readings: Vec<i32>, full_scale: u32, path: &Path) -> Result<Self, ConfigError> {
        if readings.is_empty() {
            return Err(ConfigError::ReplayEmpty(path.to_path_buf()));
        }
        if let Some((index, value)) = readings
            .iter()
            .enumerate()
            .find(|(_, v)| v.unsigned_abs() > full_scale)
        {
            return Err(ConfigError::ReplayRange {
                path: path.to_path_buf(),
                index,
                value: i64::from(*value),
                full_scale,
            });
        }
        Ok(Self {
            readings,
            next: 0,
            full_scale,
        })
    }
}

fn parse_readings(text: &str) -> Result<Vec<i32>, String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i32>()
                .map_err(|err| format!("bad reading {token:?}: {err}"))
        })
        .collect()
}

impl Sampler for ReplaySampler {
    fn read_sample(&mut self) -> Result<i32, SampleError> {
        let value = self.readings[self.next];
        self.next = (self.next + 1) % self.readings.len();
        Ok(value)
    }

    fn full_scale(&self) -> u32 {
        self.full_scale
    }
}
