use std::sync::Arc;
use std::time::Duration;

use crate::spectrum::{PayloadFormat, SpectrumChannel};
use crate::tasks::Shutdown;
use crate::transport::Transport;

/// What happened on one pass of the publisher.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing new was committed since the last take. Expected whenever the sample period is
    /// longer than the publish period, or sampling has been failing.
    NoData,
    /// Handed to the transport in one piece.
    Sent,
    /// The spectrum was taken but could not be delivered. It is not put back.
    Failed,
}

/// Drains the channel once per publish period and forwards whatever it finds. The sole reader of
/// the channel; there is no retry, so a failed send just waits for the next period.
pub struct Publisher<T> {
    transport: T,
    channel: Arc<SpectrumChannel>,
    format: PayloadFormat,
    period: Duration,
    spectrum: Vec<f32>,
    payload: String,
}

impl<T: Transport> Publisher<T> {
    pub fn new(
        transport: T,
        channel: Arc<SpectrumChannel>,
        format: PayloadFormat,
        period: Duration,
    ) -> Self {
        let spectrum = vec![0.0; channel.len()];
        let payload = String::with_capacity(format.capacity());
        Self {
            transport,
            channel,
            format,
            period,
            spectrum,
            payload,
        }
    }

    /// Main loop of the publisher. Should be run in its own thread.
    pub fn work(mut self, shutdown: &Shutdown) {
        while shutdown.idle(self.period) {
            self.run_cycle();
        }
        log::debug!("publisher stopped");
    }

    /// One drain-and-send pass, without the idle wait in front of it.
    pub fn run_cycle(&mut self) -> Outcome {
        match self.channel.try_take_into(&mut self.spectrum) {
            Ok(true) => {}
            Ok(false) => {
                log::debug!("no fresh spectrum, skipping publish");
                return Outcome::NoData;
            }
            Err(err) => {
                log::error!("could not take spectrum: {err}");
                return Outcome::Failed;
            }
        }

        if let Err(err) = self.format.write(&self.spectrum, &mut self.payload) {
            log::error!("could not format spectrum: {err}");
            return Outcome::Failed;
        }

        match self.transport.send(self.payload.as_bytes()) {
            Ok(sent) => {
                log::info!(
                    "sent spectrum ({sent} bytes) to {}",
                    self.transport.destination()
                );
                Outcome::Sent
            }
            Err(err) => {
                log::error!("send to {} failed: {err}", self.transport.destination());
                Outcome::Failed
            }
        }
    }
}
