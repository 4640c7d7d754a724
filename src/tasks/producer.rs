use std::sync::Arc;
use std::time::Duration;

use crate::error::{CycleError, SampleError};
use crate::peripheral::Sampler;
use crate::spectrum::{FftPlan, SpectrumChannel};
use crate::tasks::Shutdown;

/// Fills a window from the sampler, transforms it and commits the result, once per sample period.
/// The sole writer to the channel; it never waits on the publisher.
pub struct Producer<S> {
    sampler: S,
    plan: FftPlan,
    /// Reused every cycle, as is `spectrum`.
    window: Vec<f32>,
    spectrum: Vec<f32>,
    channel: Arc<SpectrumChannel>,
    /// Readings beyond this would break the payload bound, so they void the window.
    full_scale: u32,
    period: Duration,
    inter_sample_delay: Duration,
}

impl<S: Sampler> Producer<S> {
    /// The plan decides the window size; `channel` must have been created with the same length.
    pub fn new(
        sampler: S,
        plan: FftPlan,
        channel: Arc<SpectrumChannel>,
        period: Duration,
        inter_sample_delay: Duration,
    ) -> Self {
        let size = plan.size();
        let full_scale = sampler.full_scale();
        Self {
            sampler,
            plan,
            window: vec![0.0; size],
            spectrum: vec![0.0; size],
            channel,
            full_scale,
            period,
            inter_sample_delay,
        }
    }

    /// Main loop of the producer. Should be run in its own thread.
    pub fn work(mut self, shutdown: &Shutdown) {
        while shutdown.idle(self.period) {
            if let Err(err) = self.run_cycle() {
                log::warn!("abandoning sample window: {err}");
            }
        }
        log::debug!("sampler stopped");
    }

    /// One acquire, transform, commit pass, without the idle wait in front of it. A failed read
    /// leaves the channel alone.
    pub fn run_cycle(&mut self) -> Result<(), CycleError> {
        self.acquire()?;
        self.plan.magnitudes(&self.window, &mut self.spectrum)?;
        self.channel.commit(&self.spectrum)?;

        log::info!(
            "spectrum computed on thread {:?}",
            std::thread::current().name().unwrap_or("<unnamed>")
        );
        Ok(())
    }

    fn acquire(&mut self) -> Result<(), SampleError> {
        for slot in self.window.iter_mut() {
            let value = self.sampler.read_sample()?;
            if value.unsigned_abs() > self.full_scale {
                return Err(SampleError::OutOfRange {
                    value,
                    full_scale: self.full_scale,
                });
            }
            *slot = value as f32;
            // Spreads the reads out rather than bursting them
            if !self.inter_sample_delay.is_zero() {
                std::thread::sleep(self.inter_sample_delay);
            }
        }
        Ok(())
    }
}
