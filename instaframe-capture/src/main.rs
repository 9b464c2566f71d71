//! Instaframe capture device
//!
//! Watches the shutter button, takes a photo on a press, grades it for the
//! e-ink frame and drops it into the shared mailbox. A photo of a Wi-Fi QR
//! code is not shared; its credentials are applied instead.

use std::fs;

use anyhow::{Context, Result};
use env_logger::Env;
use log::{debug, info};

use instaframe_drivers::{
    open_input, open_output, CdevInput, CdevOutput, EinkFilter, StillCommandCamera, SystemClock,
    WpaSupplicantProvisioner, ZbarDecoder,
};
use instaframe_hal::Button;
use instaframe_mailbox::{FtpTransport, MailboxClient};

mod config;
mod controller;

use controller::{CaptureController, CaptureDevices, CapturePlatform};

/// Raspberry Pi build: cdev GPIO, rpicam, zbar, wpa_supplicant, FTP
struct RaspberryPi;

impl CapturePlatform for RaspberryPi {
    type Button = CdevInput;
    type Indicator = CdevOutput;
    type Camera = StillCommandCamera;
    type Decoder = ZbarDecoder;
    type Network = WpaSupplicantProvisioner;
    type Filter = EinkFilter;
    type Transport = FtpTransport;
    type Clock = SystemClock;
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("instaframe capture starting");

    let config = config::load(config::override_path())?;
    debug!("mailbox: {:?}", config.mailbox);

    fs::create_dir_all(&config.storage.dir)
        .with_context(|| format!("creating {}", config.storage.dir.display()))?;

    let pins = &config.pins;
    let button = open_input(&pins.chip, pins.button, "instaframe-button")
        .context("opening button line")?;
    let indicator = open_output(&pins.chip, pins.indicator, true, "instaframe-indicator")
        .context("opening indicator line")?;

    let devices = CaptureDevices::<RaspberryPi> {
        button: Button::new(button, pins.button_polarity),
        indicator,
        camera: StillCommandCamera::new(config.camera.clone(), &config.storage.dir),
        decoder: ZbarDecoder::new(config.decoder.clone()),
        network: WpaSupplicantProvisioner::new(config.network.clone()),
        filter: EinkFilter::new(config.filter.clone(), config.prepared_path()),
        clock: SystemClock::new(),
    };

    let mailbox = MailboxClient::new(config.mailbox.transport(), config.mailbox.artifact.clone())
        .with_retry(config.timing.retry_policy(), config.timing.upload_backoff_ms);
    info!(
        "uploading to {} as {} ({:?} retry)",
        config.mailbox.host,
        mailbox.artifact(),
        mailbox.policy()
    );

    let controller = CaptureController::new(
        devices,
        mailbox,
        config.timing.clone(),
        config.storage.dir.clone(),
    );
    controller.run()
}
