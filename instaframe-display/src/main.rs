//! Instaframe display device
//!
//! Polls the shared mailbox, shows each new photo on the e-ink panel and
//! removes it from the mailbox. The button blanks the panel.

use std::fs;

use anyhow::{Context, Result};
use env_logger::Env;
use log::{debug, info};

use instaframe_drivers::{open_input, BmpFilter, CdevInput, CommandPanel, SystemClock};
use instaframe_hal::Button;
use instaframe_mailbox::{FtpTransport, MailboxClient};

mod config;
mod controller;
mod store;

use controller::{DisplayController, DisplayDevices, DisplayPlatform};
use store::FreshnessStore;

/// Raspberry Pi build: cdev GPIO, Waveshare panel helper, FTP
struct RaspberryPi;

impl DisplayPlatform for RaspberryPi {
    type Button = CdevInput;
    type Panel = CommandPanel;
    type Filter = BmpFilter;
    type Transport = FtpTransport;
    type Clock = SystemClock;
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("instaframe display starting");

    let config = config::load(config::override_path())?;
    debug!("mailbox: {:?}", config.mailbox);

    fs::create_dir_all(&config.storage.dir)
        .with_context(|| format!("creating {}", config.storage.dir.display()))?;

    let pins = &config.pins;
    let button = open_input(&pins.chip, pins.button, "instaframe-button")
        .context("opening button line")?;

    let devices = DisplayDevices::<RaspberryPi> {
        button: Button::new(button, pins.button_polarity),
        panel: CommandPanel::new(config.panel.clone()),
        filter: BmpFilter::new(config.prepared_path()),
        clock: SystemClock::new(),
    };
    let mailbox = MailboxClient::new(config.mailbox.transport(), config.mailbox.artifact.clone());
    info!(
        "polling {} for {} every {} ms",
        config.mailbox.host,
        mailbox.artifact(),
        config.timing.poll_interval_ms
    );

    let store = FreshnessStore::new(&config.storage.state_file);
    debug!("freshness record at {}", store.path().display());
    let controller = DisplayController::new(
        devices,
        mailbox,
        config.timing.clone(),
        store,
        config.download_path(),
    );
    controller.run()
}
