use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ConfigError, Error};
use crate::fs::settings::{Config, Settings, Source};
use crate::peripheral::{ReplaySampler, Sampler, ToneSampler, check_full_scale};
use crate::spectrum::{FftPlan, SpectrumChannel};
use crate::tasks::Shutdown;
use crate::tasks::producer::Producer;
use crate::tasks::publisher::Publisher;
use crate::transport::UdpTransport;

mod constants;
mod error;
mod fs;
mod peripheral;
mod spectrum;
mod tasks;
mod transport;

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Samples an analog input, transforms each window into a magnitude spectrum, and
        /// periodically sends the latest spectrum over UDP.
        cmd main {
            /// JSON settings file. Defaults to settings.json, if present.
            optional --settings file: PathBuf
            /// Write the effective settings to this file and exit.
            optional --dump-settings file: PathBuf
            /// Samples per window / bins per spectrum. Must be a power of two.
            optional --fft-size n: usize
            optional --sample-period-ms ms: u64
            optional --inter-sample-delay-us us: u64
            optional --publish-period-ms ms: u64
            /// ip:port to send spectra to.
            optional --destination addr: String
            optional --adc-bits bits: u32
            optional --tone-hz hz: f32
            /// Play back readings from this file instead of simulating the ADC.
            optional --replay file: PathBuf
            /// Stop both loops after this many seconds instead of running forever.
            optional --run-for-secs secs: u64
        }
    }
}

impl flags::Main {
    fn overrides(&self) -> Settings {
        Settings {
            fft_size: self.fft_size,
            sample_period_ms: self.sample_period_ms,
            inter_sample_delay_us: self.inter_sample_delay_us,
            publish_period_ms: self.publish_period_ms,
            destination: self.destination.clone(),
            adc_bits: self.adc_bits,
            max_payload_bytes: None,
            tone_hz: self.tone_hz,
            replay_file: self
                .replay
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned()),
        }
    }

    /// The settings file (if any) with command line flags on top.
    fn settings(&self) -> Result<Settings, ConfigError> {
        let from_file = match &self.settings {
            Some(path) => fs::load(path)?,
            None => fs::load_if_present(Path::new(constants::DEFAULT_SETTINGS_FILE))?
                .unwrap_or_default(),
        };
        Ok(from_file.overlay(self.overrides()))
    }
}

fn make_sampler(config: &Config) -> Result<Box<dyn Sampler>, ConfigError> {
    let sampler: Box<dyn Sampler> = match &config.source {
        Source::Tone { hz } => Box::new(ToneSampler::new(
            config.full_scale,
            *hz,
            config.sample_rate(),
        )),
        Source::Replay(path) => Box::new(ReplaySampler::from_file(path, config.full_scale)?),
    };
    check_full_scale(sampler.as_ref(), config.full_scale)?;
    Ok(sampler)
}

fn spawn_named<F>(name: &str, f: F) -> Result<std::thread::JoinHandle<()>, Error>
where
    F: FnOnce() + Send + 'static,
{
    std::thread::Builder::new()
        .name(name.into())
        .spawn(f)
        .map_err(|source| Error::Io {
            what: "worker thread",
            source,
        })
}

fn run(flags: flags::Main) -> Result<(), Error> {
    let settings = flags.settings()?;
    if let Some(path) = &flags.dump_settings {
        fs::save(path, &settings.with_defaults()).map_err(|source| Error::Io {
            what: "settings file",
            source,
        })?;
        log::info!("wrote settings to {}", path.display());
        return Ok(());
    }

    // Everything that can be wrong with the configuration gets caught here, before either loop
    // starts.
    let config = settings.validate()?;
    let sampler = make_sampler(&config)?;
    let plan = FftPlan::new(config.fft_size)?;
    let transport = UdpTransport::new(config.destination).map_err(|source| Error::Io {
        what: "udp socket",
        source,
    })?;

    let channel = Arc::new(SpectrumChannel::new(config.fft_size));
    let producer = Producer::new(
        sampler,
        plan,
        channel.clone(),
        config.sample_period,
        config.inter_sample_delay,
    );
    let publisher = Publisher::new(
        transport,
        channel,
        config.format.clone(),
        config.publish_period,
    );

    let shutdown = Arc::new(Shutdown::new());
    let handles = [
        {
            let shutdown = shutdown.clone();
            spawn_named("sampler", move || producer.work(&shutdown))?
        },
        {
            let shutdown = shutdown.clone();
            spawn_named("publisher", move || publisher.work(&shutdown))?
        },
    ];
    log::info!(
        "sampling {} bins every {:?}, publishing to {} every {:?}",
        config.fft_size,
        config.sample_period,
        config.destination,
        config.publish_period,
    );

    if let Some(secs) = flags.run_for_secs {
        std::thread::sleep(Duration::from_secs(secs));
        log::info!("run time elapsed, stopping");
        shutdown.stop();
    }

    for handle in handles {
        let name = handle.thread().name().unwrap_or("<unnamed>").to_string();
        if handle.join().is_err() {
            log::error!("{name} thread panicked");
        }
    }
    Ok(())
}

fn main() {
    // Logging goes through `log`, with `env_logger` printing it. Defaults to info level; set
    // `RUST_LOG` to change it (e.g. `RUST_LOG=debug` to see skipped publishes).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(flags::Main::from_env_or_exit()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
