/// Defaults for everything in the settings file. These match the reference deployment: a 12-bit
/// ADC sampled into 256 bins every 30 seconds, published every 5 minutes to the first station on
/// the access point's subnet.
pub const DEFAULT_FFT_SIZE: usize = 256;
pub const DEFAULT_SAMPLE_PERIOD_MS: u64 = 30_000;
pub const DEFAULT_INTER_SAMPLE_DELAY_US: u64 = 100;
pub const DEFAULT_PUBLISH_PERIOD_MS: u64 = 300_000;
pub const DEFAULT_DESTINATION: &str = "192.168.4.2:8888";
pub const DEFAULT_ADC_BITS: u32 = 12;
pub const DEFAULT_TONE_HZ: f32 = 440.0;

/// Largest payload of a single UDP datagram over IPv4.
pub const MAX_DATAGRAM_BYTES: usize = 65_507;

/// Assumed read rate of the simulated ADC when there is no inter-sample delay to derive it from.
pub const FALLBACK_SAMPLE_RATE_HZ: f32 = 10_000.0;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";
