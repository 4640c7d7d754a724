pub mod channel;
pub mod fft;
pub mod payload;

pub use channel::SpectrumChannel;
pub use fft::FftPlan;
pub use payload::PayloadFormat;
