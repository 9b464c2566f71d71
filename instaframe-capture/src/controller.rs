//! Capture controller
//!
//! One cooperative loop. Each tick samples the button, feeds the
//! [`CaptureMachine`] and acts on what it reports:
//!
//! - primary press: full pipeline (capture, code scan, prepare, upload)
//! - secondary press: capture and code scan only
//! - cooldown finished: indicator steady on
//!
//! Everything runs inline and blocks the loop, upload retries included.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use instaframe_core::capture::{CaptureMachine, Press};
use instaframe_core::config::CaptureTiming;
use instaframe_core::provisioning::parse_wifi_payload;
use instaframe_core::traits::{Clock, CodeDecoder, ImageFilter, ImageSensor, NetworkProvisioner};
use instaframe_drivers::storage::{clean_directory, remove_files};
use instaframe_hal::{Button, InputPin, OutputPin};
use instaframe_mailbox::{MailboxClient, MailboxTransport};

/// Concrete collaborator types for one build of the capture device
pub trait CapturePlatform {
    type Button: InputPin;
    type Indicator: OutputPin;
    type Camera: ImageSensor;
    type Decoder: CodeDecoder;
    type Network: NetworkProvisioner;
    type Filter: ImageFilter;
    type Transport: MailboxTransport;
    type Clock: Clock;
}

/// Hardware and services owned by the controller
pub struct CaptureDevices<P: CapturePlatform> {
    pub button: Button<P::Button>,
    pub indicator: P::Indicator,
    pub camera: P::Camera,
    pub decoder: P::Decoder,
    pub network: P::Network,
    pub filter: P::Filter,
    pub clock: P::Clock,
}

/// Capture-side control loop
pub struct CaptureController<P: CapturePlatform> {
    devices: CaptureDevices<P>,
    mailbox: MailboxClient<P::Transport>,
    machine: CaptureMachine,
    timing: CaptureTiming,
    work_dir: PathBuf,
    /// Last level written to the indicator
    lit: Option<bool>,
    /// A button read is currently failing
    button_fault: bool,
}

impl<P: CapturePlatform> CaptureController<P> {
    /// Create a controller
    ///
    /// `work_dir` holds the transient raw/prepared files and is emptied by
    /// [`start`](Self::start).
    pub fn new(
        devices: CaptureDevices<P>,
        mailbox: MailboxClient<P::Transport>,
        timing: CaptureTiming,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            devices,
            mailbox,
            machine: CaptureMachine::new(&timing),
            timing,
            work_dir: work_dir.into(),
            lit: None,
            button_fault: false,
        }
    }

    /// Power-on sequence: indicator on, clear leftovers, let the camera settle
    pub fn start(&mut self) {
        self.set_indicator(true);
        let removed = clean_directory(&self.work_dir);
        if removed > 0 {
            info!("removed {} leftover files", removed);
        }
        self.devices.clock.sleep_ms(self.timing.startup_delay_ms);
    }

    /// Run forever
    pub fn run(mut self) -> ! {
        self.start();
        info!("listening for button press");
        loop {
            self.tick();
            self.devices.clock.sleep_ms(self.timing.tick_ms);
        }
    }

    /// Process one polling tick
    pub fn tick(&mut self) {
        let now = self.devices.clock.now_ms();
        let pressed = self.sample_button();

        let poll = self.machine.poll(now, pressed);
        if poll.cooldown_finished {
            self.set_indicator(true);
        }

        match poll.press {
            Some(Press::Primary) => {
                let shared = self.share();
                self.machine.capture_finished(shared);
                debug!("share finished, cooldown active: {}", self.in_cooldown());
            }
            Some(Press::Secondary) => self.rescan(),
            Some(Press::Bounce) | None => {}
        }

        let now = self.devices.clock.now_ms();
        if let Some(lit) = self.machine.indicator(now) {
            self.set_indicator(lit);
        }
    }

    /// Check if a capture cooldown is active
    pub fn in_cooldown(&self) -> bool {
        self.machine.in_cooldown()
    }

    fn sample_button(&mut self) -> bool {
        match self.devices.button.is_pressed() {
            Ok(pressed) => {
                if self.button_fault {
                    info!("button readable again");
                    self.button_fault = false;
                }
                pressed
            }
            Err(err) => {
                if !self.button_fault {
                    warn!("button read failed: {err}");
                    self.button_fault = true;
                }
                false
            }
        }
    }

    /// Full pipeline for a primary press
    ///
    /// Returns true only if a photo reached the mailbox.
    fn share(&mut self) -> bool {
        info!("button pressed, taking capture");
        // Light off doubles as the shutter cue
        self.set_indicator(false);

        let raw = match self.devices.camera.capture_still() {
            Ok(raw) => raw,
            Err(err) => {
                error!("capture failed: {err}");
                self.set_indicator(true);
                return false;
            }
        };

        if self.scan_for_wifi(&raw) {
            self.set_indicator(true);
            info!("wifi code doesn't need to be shared");
            remove_files(&[&raw]);
            return false;
        }

        let now = self.devices.clock.now_ms();
        self.machine.restart_blink(now);

        info!("preparing image");
        let prepared = match self.devices.filter.prepare_for_display(&raw) {
            Ok(prepared) => prepared,
            Err(err) => {
                error!("preparing image failed: {err}");
                remove_files(&[&raw]);
                self.set_indicator(true);
                return false;
            }
        };

        info!("uploading to mailbox");
        let uploaded = self.mailbox.upload_with_retry(&prepared, &self.devices.clock);

        debug!("deleting local files");
        remove_files(&[&raw, &prepared]);

        if !uploaded {
            self.set_indicator(true);
            return false;
        }
        info!("done, cooldown started");
        true
    }

    /// Capture and scan only, for a press during the cooldown
    fn rescan(&mut self) {
        info!("button press, only checking for wifi code because awaiting capture cooldown");
        match self.devices.camera.capture_still() {
            Ok(raw) => {
                self.scan_for_wifi(&raw);
                remove_files(&[&raw]);
            }
            Err(err) => warn!("capture for code scan failed: {err}"),
        }
    }

    /// Look for a Wi-Fi code and apply it
    ///
    /// Returns true if the capture holds Wi-Fi credentials, whether or not
    /// applying them worked; such a capture is never shared.
    fn scan_for_wifi(&mut self, raw: &Path) -> bool {
        debug!("checking for wifi code");
        let codes = match self.devices.decoder.decode_codes(raw) {
            Ok(codes) => codes,
            Err(err) => {
                warn!("code scan failed: {err}");
                return false;
            }
        };

        let Some(credentials) = codes.iter().find_map(|code| parse_wifi_payload(code).ok())
        else {
            if !codes.is_empty() {
                debug!("{} codes found, none for wifi", codes.len());
            }
            return false;
        };

        info!("found wifi code for {}", credentials.ssid);
        match self.devices.network.apply_credentials(&credentials) {
            Ok(()) => self.ack_blink(),
            Err(err) => error!("applying wifi credentials failed: {err}"),
        }
        true
    }

    /// Fast blink confirming new credentials; blocks until done
    fn ack_blink(&mut self) {
        for _ in 0..self.timing.ack_blink_count {
            self.set_indicator(true);
            self.devices.clock.sleep_ms(self.timing.ack_blink_ms);
            self.set_indicator(false);
            self.devices.clock.sleep_ms(self.timing.ack_blink_ms);
        }
    }

    fn set_indicator(&mut self, lit: bool) {
        if self.lit == Some(lit) {
            return;
        }
        match self.devices.indicator.set_state(lit) {
            Ok(()) => self.lit = Some(lit),
            Err(err) => warn!("indicator write failed: {err}"),
        }
    }
}
