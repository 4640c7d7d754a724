use std::path::PathBuf;

/// Problems with the configuration. All of these are detected before any task starts, and the
/// process refuses to run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("fft size {0} must be a power of two and at least 2")]
    FftSize(usize),
    #[error("{0} must be greater than zero")]
    ZeroPeriod(&'static str),
    #[error("adc width of {0} bits is outside 1..=30")]
    AdcBits(u32),
    #[error("invalid destination {addr:?}: {source}")]
    Destination {
        addr: String,
        source: std::net::AddrParseError,
    },
    #[error("payload for {fft_size} bins may need {needed} bytes, more than the {limit} allowed")]
    PayloadTooLarge {
        fft_size: usize,
        needed: usize,
        limit: usize,
    },
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
    #[error("reading {value} at position {index} of {path} exceeds full scale {full_scale}")]
    ReplayRange {
        path: PathBuf,
        index: usize,
        value: i64,
        full_scale: u32,
    },
    #[error("replay file {0} contains no readings")]
    ReplayEmpty(PathBuf),
    #[error("sampler full scale {sampler} exceeds the configured {configured}")]
    FullScale { sampler: u32, configured: u32 },
}

/// Misuse of a transform plan or the spectrum channel with a buffer of the wrong size.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("expected {expected} values, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// A bad read from the sampling peripheral. Abandons the current window only.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("reading {value} is outside the sampler's full scale of {full_scale}")]
    OutOfRange { value: i32, full_scale: u32 },
}

/// Why one sampling cycle produced no spectrum.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Sample(#[from] SampleError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("formatted payload is {actual} bytes, over the {capacity} byte bound")]
    Overflow { actual: usize, capacity: usize },
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Anything that stops the process from starting.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not set up {what}: {source}")]
    Io {
        what: &'static str,
        source: std::io::Error,
    },
}
