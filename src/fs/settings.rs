use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants;
use crate::error::ConfigError;
use crate::peripheral::full_scale_for_bits;
use crate::spectrum::PayloadFormat;
use crate::spectrum::fft::check_size;

/// Everything that can be set from the settings file or the command line. Anything left out falls
/// back to the defaults in [`constants`].
#[derive(Debug, Clone, Default, PartialEq, facet::Facet)]
pub struct Settings {
    /// Bins per spectrum, which is also samples per window. Must be a power of two.
    #[facet(default)]
    pub fft_size: Option<usize>,
    #[facet(default)]
    pub sample_period_ms: Option<u64>,
    #[facet(default)]
    pub inter_sample_delay_us: Option<u64>,
    #[facet(default)]
    pub publish_period_ms: Option<u64>,
    /// `ip:port` that every spectrum is sent to.
    #[facet(default)]
    pub destination: Option<String>,
    #[facet(default)]
    pub adc_bits: Option<u32>,
    #[facet(default)]
    pub max_payload_bytes: Option<usize>,
    /// Frequency of the simulated input, used when there is no replay file.
    #[facet(default)]
    pub tone_hz: Option<f32>,
    /// Readings to play back in a loop instead of simulating.
    #[facet(default)]
    pub replay_file: Option<String>,
}

/// Where readings come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Tone { hz: f32 },
    Replay(PathBuf),
}

/// Validated settings. Fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct Config {
    pub fft_size: usize,
    pub sample_period: Duration,
    pub inter_sample_delay: Duration,
    pub publish_period: Duration,
    pub destination: SocketAddr,
    pub full_scale: u32,
    pub format: PayloadFormat,
    pub source: Source,
}

macro_rules! overlay {
    ($base:ident, $top:ident, { $($field:ident,)* }) => {
        Settings { $(
            $field: $top.$field.or($base.$field),
        )* }
    };
}

macro_rules! defaults {
    ($($field:ident: $ty:ty = $default:expr,)*) => {
        /// Every setting with its default applied. `replay_file` has no default; leaving it out
        /// selects the simulated source.
        struct Filled {
            $( $field: $ty, )*
            replay_file: Option<String>,
        }

        impl Settings {
            fn filled(&self) -> Filled {
                Filled {
                    $( $field: self.$field.clone().unwrap_or_else(|| $default), )*
                    replay_file: self.replay_file.clone(),
                }
            }

            /// The same settings with every default written out, for saving a complete settings
            /// file.
            pub fn with_defaults(&self) -> Settings {
                let filled = self.filled();
                Settings {
                    $( $field: Some(filled.$field), )*
                    replay_file: filled.replay_file,
                }
            }
        }
    };
}

defaults! {
    fft_size: usize = constants::DEFAULT_FFT_SIZE,
    sample_period_ms: u64 = constants::DEFAULT_SAMPLE_PERIOD_MS,
    inter_sample_delay_us: u64 = constants::DEFAULT_INTER_SAMPLE_DELAY_US,
    publish_period_ms: u64 = constants::DEFAULT_PUBLISH_PERIOD_MS,
    destination: String = constants::DEFAULT_DESTINATION.to_string(),
    adc_bits: u32 = constants::DEFAULT_ADC_BITS,
    max_payload_bytes: usize = constants::MAX_DATAGRAM_BYTES,
    tone_hz: f32 = constants::DEFAULT_TONE_HZ,
}

impl Settings {
    /// Fields set in `top` win over the ones in `self`.
    pub fn overlay(self, top: Settings) -> Settings {
        let base = self;
        overlay!(base, top, {
            fft_size,
            sample_period_ms,
            inter_sample_delay_us,
            publish_period_ms,
            destination,
            adc_bits,
            max_payload_bytes,
            tone_hz,
            replay_file,
        })
    }

    /// Checks everything that could make the loops misbehave later on.
    pub fn validate(&self) -> Result<Config, ConfigError> {
        let Filled {
            fft_size,
            sample_period_ms,
            inter_sample_delay_us,
            publish_period_ms,
            destination,
            adc_bits,
            max_payload_bytes,
            tone_hz,
            replay_file,
        } = self.filled();

        check_size(fft_size)?;
        let sample_period = positive_millis("sample_period_ms", sample_period_ms)?;
        let publish_period = positive_millis("publish_period_ms", publish_period_ms)?;
        let inter_sample_delay = Duration::from_micros(inter_sample_delay_us);

        let destination = destination
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::Destination {
                addr: destination.clone(),
                source,
            })?;

        let full_scale = full_scale_for_bits(adc_bits)?;
        let format = PayloadFormat::new(fft_size, full_scale, max_payload_bytes)?;

        let source = match replay_file {
            Some(path) => Source::Replay(path.into()),
            None => Source::Tone { hz: tone_hz },
        };

        Ok(Config {
            fft_size,
            sample_period,
            inter_sample_delay,
            publish_period,
            destination,
            full_scale,
            format,
            source,
        })
    }
}

fn positive_millis(name: &'static str, ms: u64) -> Result<Duration, ConfigError> {
    match ms {
        0 => Err(ConfigError::ZeroPeriod(name)),
        ms => Ok(Duration::from_millis(ms)),
    }
}

impl Config {
    /// How often the sampler gets read while filling a window, in Hz.
    pub fn sample_rate(&self) -> f32 {
        if self.inter_sample_delay.is_zero() {
            constants::FALLBACK_SAMPLE_RATE_HZ
        } else {
            1.0 / self.inter_sample_delay.as_secs_f32()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = Settings::default().validate().unwrap();
        assert_eq!(config.fft_size, 256);
        assert_eq!(config.sample_period, Duration::from_secs(30));
        assert_eq!(config.publish_period, Duration::from_secs(300));
        assert_eq!(config.inter_sample_delay, Duration::from_micros(100));
        assert_eq!(config.destination, "192.168.4.2:8888".parse().unwrap());
        assert_eq!(config.full_scale, 4095);
        assert_eq!(config.source, Source::Tone { hz: 440.0 });
        assert!((config.sample_rate() - 10_000.0).abs() < 1.0);
    }

    #[test]
    fn rejects_non_power_of_two() {
        let settings = Settings {
            fft_size: Some(300),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::FftSize(300))
        ));
    }

    #[test]
    fn rejects_zero_periods() {
        let settings = Settings {
            publish_period_ms: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ZeroPeriod("publish_period_ms"))
        ));
    }

    #[test]
    fn rejects_payloads_that_cannot_fit() {
        let settings = Settings {
            max_payload_bytes: Some(2048),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::PayloadTooLarge { .. })
        ));

        let settings = Settings {
            fft_size: Some(1 << 16),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_sizes_too_big_to_even_measure() {
        let settings = Settings {
            fft_size: Some(1 << (usize::BITS - 2)),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::PayloadTooLarge {
                needed: usize::MAX,
                ..
            })
        ));
    }

    #[test]
    fn rejects_bad_destination() {
        let settings = Settings {
            destination: Some("not an address".into()),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Destination { .. })
        ));
    }

    #[test]
    fn overlay_prefers_top() {
        let file = Settings {
            fft_size: Some(512),
            destination: Some("10.0.0.1:9000".into()),
            ..Default::default()
        };
        let flags = Settings {
            fft_size: Some(1024),
            replay_file: Some("readings.txt".into()),
            ..Default::default()
        };
        let merged = file.overlay(flags);
        assert_eq!(merged.fft_size, Some(1024));
        assert_eq!(merged.destination.as_deref(), Some("10.0.0.1:9000"));

        let config = merged.validate().unwrap();
        assert_eq!(config.source, Source::Replay("readings.txt".into()));
    }

    #[test]
    fn with_defaults_fills_everything_but_replay() {
        let full = Settings::default().with_defaults();
        assert_eq!(full.fft_size, Some(256));
        assert_eq!(full.max_payload_bytes, Some(65_507));
        assert_eq!(full.replay_file, None);
        // filling twice changes nothing
        assert_eq!(full.with_defaults(), full);
    }
}
