//! Display controller
//!
//! Alternates between one mailbox synchronization and a wait of one poll
//! interval. The button is sampled throughout the wait; a press blanks the
//! panel straight away.
//!
//! ```text
//!  open ─▶ probe ─▶ judge ─┬─ fresh ─▶ download + delete remote ─▶ close ─▶ show ─▶ record
//!                          ├─ stale ─▶ close (remote untouched)
//!                          └─ none  ─▶ close
//! ```
//!
//! An artifact that was shown but could not be deleted remotely is
//! remembered by its timestamp. While it stays in the mailbox each poll only
//! retries the delete; it is never downloaded or rendered again.
//!
//! No failure leaves the loop. A missing network only costs one interval.

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use instaframe_core::button::EdgeDetector;
use instaframe_core::config::DisplayTiming;
use instaframe_core::sync::{FreshnessRecord, Verdict};
use instaframe_core::traits::{Clock, ImageFilter, Panel};
use instaframe_drivers::storage::remove_files;
use instaframe_hal::{Button, InputPin};
use instaframe_mailbox::{Consumed, MailboxClient, MailboxError, MailboxTransport};

use crate::store::FreshnessStore;

/// Concrete collaborator types for one build of the display device
pub trait DisplayPlatform {
    type Button: InputPin;
    type Panel: Panel;
    type Filter: ImageFilter;
    type Transport: MailboxTransport;
    type Clock: Clock;
}

/// Hardware and services owned by the controller
pub struct DisplayDevices<P: DisplayPlatform> {
    pub button: Button<P::Button>,
    pub panel: P::Panel,
    pub filter: P::Filter,
    pub clock: P::Clock,
}

/// What one synchronization attempt did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Mailbox unreachable
    Offline,
    /// Nothing in the mailbox (or its time could not be read)
    NoArtifact,
    /// Artifact older than the last one shown; left in place
    Stale(f64),
    /// Artifact downloaded and shown
    Shown(f64),
    /// Artifact already shown, only its remote delete was retried
    AlreadyShown(f64),
    /// Artifact taken but not shown
    Failed,
}

/// What one mailbox session did
enum Fetch {
    /// Nothing downloaded
    Skipped(Verdict),
    /// Fresh artifact taken from the mailbox
    Downloaded(f64, Result<Consumed, MailboxError>),
    /// Shown artifact still in the mailbox; `deleted` if the retry worked
    Redeleted { remote: f64, deleted: bool },
}

/// Display-side control loop
pub struct DisplayController<P: DisplayPlatform> {
    devices: DisplayDevices<P>,
    mailbox: MailboxClient<P::Transport>,
    timing: DisplayTiming,
    store: FreshnessStore,
    record: FreshnessRecord,
    edges: EdgeDetector,
    download_path: PathBuf,
    /// Timestamp of a shown artifact whose remote delete failed
    undeleted: Option<f64>,
}

impl<P: DisplayPlatform> DisplayController<P> {
    /// Create a controller, loading the freshness record from `store`
    pub fn new(
        devices: DisplayDevices<P>,
        mailbox: MailboxClient<P::Transport>,
        timing: DisplayTiming,
        store: FreshnessStore,
        download_path: impl Into<PathBuf>,
    ) -> Self {
        let record = store.load();
        Self {
            devices,
            mailbox,
            timing,
            store,
            record,
            edges: EdgeDetector::new(),
            download_path: download_path.into(),
            undeleted: None,
        }
    }

    /// Run forever
    pub fn run(mut self) -> ! {
        info!(
            "started, last shown artifact at {}",
            self.record().last_consumed()
        );
        loop {
            let outcome = self.sync_once();
            debug!("sync outcome: {:?}", outcome);
            self.wait_interval();
        }
    }

    /// Get the current freshness record
    pub fn record(&self) -> FreshnessRecord {
        self.record
    }

    /// One synchronization attempt against the mailbox
    pub fn sync_once(&mut self) -> SyncOutcome {
        info!("start sync");
        let fetched = match self.fetch() {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!("failed, ignoring (might be no wifi): {err}");
                return SyncOutcome::Offline;
            }
        };

        match fetched {
            Fetch::Skipped(Verdict::NoArtifact) => {
                info!("no file, or no success in retrieving file date");
                self.undeleted = None;
                SyncOutcome::NoArtifact
            }
            Fetch::Skipped(Verdict::Stale { remote, record }) => {
                info!("mailbox file is older ({remote} < {record}), not updating frame");
                SyncOutcome::Stale(remote)
            }
            Fetch::Skipped(Verdict::Fresh(_)) => SyncOutcome::Failed,
            Fetch::Redeleted { remote, deleted } => {
                if deleted {
                    info!("removed already shown file from mailbox");
                    self.undeleted = None;
                }
                SyncOutcome::AlreadyShown(remote)
            }
            Fetch::Downloaded(remote, Ok(consumed)) => {
                self.undeleted = None;
                let downloaded = self.download_path.clone();
                let outcome = self.show(&downloaded, remote);
                if outcome == SyncOutcome::Shown(remote) && !consumed.remote_deleted {
                    warn!("mailbox copy not deleted, retrying on the next poll");
                    self.undeleted = Some(remote);
                }
                outcome
            }
            Fetch::Downloaded(_, Err(err)) => {
                error!("error while downloading from mailbox: {err}");
                remove_files(&[&self.download_path]);
                SyncOutcome::Failed
            }
        }
    }

    /// Probe the mailbox and, if the artifact is fresh, consume it
    ///
    /// The session is closed before anything slow (filtering, rendering)
    /// happens.
    fn fetch(&self) -> Result<Fetch, MailboxError> {
        debug!("logging in to mailbox");
        let mut session = self.mailbox.open()?;

        let remote = session.probe().timestamp();
        let fetched = match (remote, self.undeleted) {
            (Some(remote), Some(shown)) if remote == shown => {
                info!("mailbox file was already shown, retrying delete");
                let deleted = match session.discard() {
                    Ok(()) => true,
                    Err(err) => {
                        warn!("error while deleting from mailbox: {err}");
                        false
                    }
                };
                Fetch::Redeleted { remote, deleted }
            }
            _ => match self.record.judge(remote) {
                Verdict::Fresh(remote) => {
                    info!("mailbox file is newer");
                    debug!("downloading to {}", self.download_path.display());
                    Fetch::Downloaded(remote, session.consume(&self.download_path))
                }
                verdict => Fetch::Skipped(verdict),
            },
        };

        debug!("logging out of mailbox");
        if let Err(err) = session.close() {
            debug!("close failed: {err}");
        }
        Ok(fetched)
    }

    /// Prepare, render, clean up and advance the record
    fn show(&mut self, downloaded: &Path, remote: f64) -> SyncOutcome {
        info!("preparing image");
        let prepared = match self.devices.filter.prepare_for_display(downloaded) {
            Ok(prepared) => prepared,
            Err(err) => {
                error!("preparing image failed: {err}");
                remove_files(&[downloaded]);
                return SyncOutcome::Failed;
            }
        };

        info!("starting image display");
        let rendered = self.render(&prepared);

        debug!("clearing local storage");
        remove_files(&[downloaded, prepared.as_path()]);

        if !rendered {
            return SyncOutcome::Failed;
        }

        if self.record.advance(remote) {
            debug!("updating freshness record to {remote}");
            if let Err(err) = self.store.save(&self.record) {
                error!("could not persist freshness record: {err:#}");
            }
        }
        SyncOutcome::Shown(remote)
    }

    /// Render, then always put the panel to sleep
    fn render(&mut self, prepared: &Path) -> bool {
        let result = self.devices.panel.render(prepared);
        if let Err(err) = &result {
            error!("error while displaying image: {err}");
        }
        if let Err(err) = self.devices.panel.sleep() {
            warn!("panel sleep failed: {err}");
        }
        result.is_ok()
    }

    /// Blank the panel, then put it to sleep
    pub fn clear_panel(&mut self) {
        info!("clearing display");
        if let Err(err) = self.devices.panel.clear() {
            error!("error while clearing display: {err}");
        }
        if let Err(err) = self.devices.panel.sleep() {
            warn!("panel sleep failed: {err}");
        }
    }

    /// Wait one poll interval, clearing the panel on each button press
    pub fn wait_interval(&mut self) {
        let clock_start = self.devices.clock.now_ms();
        let deadline = clock_start.saturating_add(self.timing.poll_interval_ms);

        while self.devices.clock.now_ms() < deadline {
            let pressed = match self.devices.button.is_pressed() {
                Ok(pressed) => pressed,
                Err(err) => {
                    debug!("button read failed: {err}");
                    false
                }
            };
            if self.edges.update(pressed) {
                info!("button pressed");
                self.clear_panel();
            }
            self.devices.clock.sleep_ms(self.timing.tick_ms.max(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::fs;
    use std::rc::Rc;

    use instaframe_hal::PinError;
    use instaframe_mailbox::MemoryMailbox;

    const ARTIFACT: &str = "img.jpg";

    /// Scripted line levels; the last level repeats once the script runs out
    #[derive(Clone, Default)]
    struct ScriptedLine(Rc<RefCell<VecDeque<bool>>>);

    impl InputPin for ScriptedLine {
        fn is_high(&mut self) -> Result<bool, PinError> {
            let mut levels = self.0.borrow_mut();
            if levels.len() > 1 {
                Ok(levels.pop_front().unwrap_or(false))
            } else {
                Ok(levels.front().copied().unwrap_or(false))
            }
        }
    }

    #[derive(Clone, Default)]
    struct MockPanel {
        calls: Rc<RefCell<Vec<String>>>,
        fail_render: Rc<Cell<bool>>,
    }

    impl Panel for MockPanel {
        type Error = String;

        fn render(&mut self, prepared: &Path) -> Result<(), String> {
            let name = prepared.file_name().unwrap().to_string_lossy().to_string();
            self.calls.borrow_mut().push(format!("render {name}"));
            if self.fail_render.get() {
                return Err("spi timeout".into());
            }
            Ok(())
        }

        fn clear(&mut self) -> Result<(), String> {
            self.calls.borrow_mut().push("clear".into());
            Ok(())
        }

        fn sleep(&mut self) -> Result<(), String> {
            self.calls.borrow_mut().push("sleep".into());
            Ok(())
        }
    }

    struct CopyFilter {
        output: PathBuf,
    }

    impl ImageFilter for CopyFilter {
        type Error = String;

        fn prepare_for_display(&mut self, raw: &Path) -> Result<PathBuf, String> {
            fs::copy(raw, &self.output).map_err(|e| e.to_string())?;
            Ok(self.output.clone())
        }
    }

    #[derive(Clone, Default)]
    struct FakeClock(Rc<Cell<u64>>);

    impl Clock for FakeClock {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }

        fn sleep_ms(&self, ms: u64) {
            self.0.set(self.0.get() + ms);
        }
    }

    struct TestPlatform;

    impl DisplayPlatform for TestPlatform {
        type Button = ScriptedLine;
        type Panel = MockPanel;
        type Filter = CopyFilter;
        type Transport = MemoryMailbox;
        type Clock = FakeClock;
    }

    struct Rig {
        controller: DisplayController<TestPlatform>,
        line: ScriptedLine,
        panel: MockPanel,
        mailbox: MemoryMailbox,
        store: FreshnessStore,
        dir: tempfile::TempDir,
    }

    impl Rig {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = FreshnessStore::new(dir.path().join("config.dat"));
            Self::with_store(dir, store)
        }

        fn with_record(timestamp: f64) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = FreshnessStore::new(dir.path().join("config.dat"));
            store.save(&FreshnessRecord::from_timestamp(timestamp)).unwrap();
            Self::with_store(dir, store)
        }

        fn with_store(dir: tempfile::TempDir, store: FreshnessStore) -> Self {
            let work = dir.path().join("capture");
            fs::create_dir(&work).unwrap();

            let line = ScriptedLine::default();
            let panel = MockPanel::default();
            let mailbox = MemoryMailbox::new();
            let devices = DisplayDevices::<TestPlatform> {
                button: Button::pull_down(line.clone()),
                panel: panel.clone(),
                filter: CopyFilter {
                    output: work.join("img.bmp"),
                },
                clock: FakeClock::default(),
            };
            let controller = DisplayController::new(
                devices,
                MailboxClient::new(mailbox.clone(), ARTIFACT),
                DisplayTiming::default(),
                store.clone(),
                work.join(ARTIFACT),
            );

            Self {
                controller,
                line,
                panel,
                mailbox,
                store,
                dir,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.panel.calls.borrow().clone()
        }

        fn work_files(&self) -> usize {
            fs::read_dir(self.dir.path().join("capture")).unwrap().count()
        }
    }

    #[test]
    fn test_first_artifact_is_shown_and_consumed() {
        let mut rig = Rig::new();
        rig.mailbox.store(ARTIFACT, b"photo".to_vec(), 100.0);

        assert_eq!(rig.controller.sync_once(), SyncOutcome::Shown(100.0));
        assert_eq!(rig.controller.record().last_consumed(), 100.0);
        assert!(!rig.mailbox.contains(ARTIFACT));
        assert_eq!(rig.calls(), vec!["render img.bmp", "sleep"]);
        assert_eq!(rig.work_files(), 0);
        assert_eq!(rig.store.load().last_consumed(), 100.0);
    }

    #[test]
    fn test_empty_mailbox_leaves_panel_alone() {
        let mut rig = Rig::new();
        rig.mailbox.store(ARTIFACT, b"photo".to_vec(), 100.0);
        rig.controller.sync_once();

        // Consumed once; the next poll finds nothing
        assert_eq!(rig.controller.sync_once(), SyncOutcome::NoArtifact);
        assert_eq!(rig.controller.record().last_consumed(), 100.0);
        assert_eq!(rig.calls().len(), 2);
    }

    #[test]
    fn test_stale_artifact_is_left_in_place() {
        let mut rig = Rig::with_record(100.0);
        rig.mailbox.store(ARTIFACT, b"skewed".to_vec(), 50.0);

        assert_eq!(rig.controller.sync_once(), SyncOutcome::Stale(50.0));
        assert!(rig.mailbox.contains(ARTIFACT));
        assert_eq!(rig.controller.record().last_consumed(), 100.0);
        assert!(rig.calls().is_empty());
    }

    #[test]
    fn test_equal_timestamp_is_shown() {
        let mut rig = Rig::with_record(100.0);
        rig.mailbox.store(ARTIFACT, b"again".to_vec(), 100.0);

        assert_eq!(rig.controller.sync_once(), SyncOutcome::Shown(100.0));
        assert!(!rig.mailbox.contains(ARTIFACT));
    }

    #[test]
    fn test_offline_is_not_fatal() {
        let mut rig = Rig::new();
        rig.mailbox.store(ARTIFACT, b"photo".to_vec(), 100.0);
        rig.mailbox.set_offline(true);

        assert_eq!(rig.controller.sync_once(), SyncOutcome::Offline);
        rig.mailbox.set_offline(false);
        assert_eq!(rig.controller.sync_once(), SyncOutcome::Shown(100.0));
    }

    #[test]
    fn test_render_failure_still_sleeps_and_keeps_record() {
        let mut rig = Rig::new();
        rig.panel.fail_render.set(true);
        rig.mailbox.store(ARTIFACT, b"photo".to_vec(), 100.0);

        assert_eq!(rig.controller.sync_once(), SyncOutcome::Failed);
        assert_eq!(rig.calls(), vec!["render img.bmp", "sleep"]);
        assert_eq!(rig.controller.record().last_consumed(), 0.0);
        assert_eq!(rig.work_files(), 0);
    }

    #[test]
    fn test_failed_remote_delete_still_shows() {
        let mut rig = Rig::new();
        rig.mailbox.store(ARTIFACT, b"photo".to_vec(), 100.0);
        rig.mailbox.fail_next_deletes(1);

        assert_eq!(rig.controller.sync_once(), SyncOutcome::Shown(100.0));
        assert!(rig.mailbox.contains(ARTIFACT));
    }

    #[test]
    fn test_undeleted_artifact_is_rendered_once() {
        let mut rig = Rig::new();
        rig.mailbox.store(ARTIFACT, b"photo".to_vec(), 100.0);
        rig.mailbox.fail_next_deletes(u32::MAX);

        let outcomes: Vec<_> = (0..3).map(|_| rig.controller.sync_once()).collect();
        assert_eq!(
            outcomes,
            vec![
                SyncOutcome::Shown(100.0),
                SyncOutcome::AlreadyShown(100.0),
                SyncOutcome::AlreadyShown(100.0),
            ]
        );
        assert_eq!(rig.calls(), vec!["render img.bmp", "sleep"]);
        assert!(rig.mailbox.contains(ARTIFACT));
        assert_eq!(rig.work_files(), 0);
    }

    #[test]
    fn test_delete_is_retried_until_it_succeeds() {
        let mut rig = Rig::new();
        rig.mailbox.store(ARTIFACT, b"photo".to_vec(), 100.0);
        rig.mailbox.fail_next_deletes(2);

        assert_eq!(rig.controller.sync_once(), SyncOutcome::Shown(100.0));
        assert_eq!(rig.controller.sync_once(), SyncOutcome::AlreadyShown(100.0));
        assert!(rig.mailbox.contains(ARTIFACT));
        assert_eq!(rig.controller.sync_once(), SyncOutcome::AlreadyShown(100.0));
        assert!(!rig.mailbox.contains(ARTIFACT));
        assert_eq!(rig.controller.sync_once(), SyncOutcome::NoArtifact);
        assert_eq!(rig.calls().len(), 2);
    }

    #[test]
    fn test_newer_upload_replaces_undeleted_artifact() {
        let mut rig = Rig::new();
        rig.mailbox.store(ARTIFACT, b"photo".to_vec(), 100.0);
        rig.mailbox.fail_next_deletes(1);
        assert_eq!(rig.controller.sync_once(), SyncOutcome::Shown(100.0));

        rig.mailbox.store(ARTIFACT, b"newer".to_vec(), 160.0);
        assert_eq!(rig.controller.sync_once(), SyncOutcome::Shown(160.0));
        assert!(!rig.mailbox.contains(ARTIFACT));
        assert_eq!(rig.controller.record().last_consumed(), 160.0);
    }

    #[test]
    fn test_newer_artifacts_advance_record() {
        let mut rig = Rig::new();
        for t in [100.0, 105.0, 230.5] {
            rig.mailbox.store(ARTIFACT, b"photo".to_vec(), t);
            assert_eq!(rig.controller.sync_once(), SyncOutcome::Shown(t));
        }
        assert_eq!(rig.controller.record().last_consumed(), 230.5);
    }

    #[test]
    fn test_button_press_clears_once() {
        let mut rig = Rig::new();
        // Released, held for three samples, released again
        rig.line
            .0
            .borrow_mut()
            .extend([false, true, true, true, false]);

        rig.controller.wait_interval();
        assert_eq!(rig.calls(), vec!["clear", "sleep"]);
    }

    #[test]
    fn test_wait_lasts_one_interval() {
        let mut rig = Rig::new();
        let start = rig.controller.devices.clock.now_ms();
        rig.controller.wait_interval();
        let elapsed = rig.controller.devices.clock.now_ms() - start;
        assert!(elapsed >= 5_000 && elapsed < 5_000 + 20);
        assert!(rig.calls().is_empty());
    }
}
