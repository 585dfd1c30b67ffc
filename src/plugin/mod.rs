//! Per-phase log capture for a test run.
//!
//! [`CatchLogPlugin`] is driven by the surrounding runner through explicit
//! callbacks: [`start_run`](CatchLogPlugin::start_run) and
//! [`finish_run`](CatchLogPlugin::finish_run) around the whole run, and
//! [`before_phase`](CatchLogPlugin::before_phase) /
//! [`after_phase`](CatchLogPlugin::after_phase) around each setup, call and
//! teardown. Every phase captures into a fresh [`LogCaptureHandler`]; the
//! run-wide console handler echoes records at the threshold chosen by the
//! verbosity count.

mod item;

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::warn;
use thiserror::Error;

use crate::config::{CaptureConfig, ConfigError};
use crate::control::{HandlerHost, LevelControl};
use crate::fixture::{CallStyleLogCaptureFixture, CompatLogCaptureFixture, LogCaptureFixture};
use crate::formatter::SharedFormatter;
use crate::handler::HandlerError;
use crate::handlers::{FemtoStreamHandler, LogCaptureHandler};
use crate::level::FemtoLevel;
use crate::manager::Manager;
use crate::session::{CaptureOptions, CaptureSession};
use crate::verbosity::VerbosityLevelTable;

pub use item::{ItemState, Phase, ReportSection, TestItem};

/// Report section key used for captured logs.
pub const LOG_SECTION_KEY: &str = "log";

/// Errors raised while driving phase capture.
#[derive(Debug, Error)]
pub enum PhaseError {
    /// A phase was started or finished out of lifecycle order.
    #[error("cannot move {nodeid} through {phase} while {state}")]
    OutOfOrder {
        nodeid: String,
        phase: Phase,
        state: ItemState,
    },
    /// `start_run` was called while a run capture is already open.
    #[error("run capture already started")]
    RunAlreadyStarted,
    /// Closing a capture handler failed.
    #[error("failed to close capture handler: {0}")]
    Close(#[source] HandlerError),
}

/// Capture opened by [`CatchLogPlugin::before_phase`].
///
/// Hand it back to [`CatchLogPlugin::after_phase`]. Dropping it instead
/// still detaches the handler and restores the root level.
#[must_use = "pass the capture to after_phase to report it"]
pub struct PhaseCapture {
    phase: Phase,
    session: CaptureSession<LogCaptureHandler>,
}

impl PhaseCapture {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn handler(&self) -> &Arc<LogCaptureHandler> {
        self.session.handler()
    }
}

/// Log capture for one test run.
pub struct CatchLogPlugin {
    config: CaptureConfig,
    manager: Arc<Manager>,
    formatter: SharedFormatter,
    verbosity_table: VerbosityLevelTable,
    console: Arc<FemtoStreamHandler>,
    run_session: Option<CaptureSession<FemtoStreamHandler>>,
}

impl CatchLogPlugin {
    /// Build a plugin echoing to stderr.
    ///
    /// Configuration errors (bad extra levels, bad formats) surface here,
    /// before any test runs.
    pub fn new(config: CaptureConfig, manager: Arc<Manager>) -> Result<Self, ConfigError> {
        Self::with_console_writer(config, manager, std::io::stderr())
    }

    /// Build a plugin whose console handler writes to `writer`.
    pub fn with_console_writer<W>(
        config: CaptureConfig,
        manager: Arc<Manager>,
        writer: W,
    ) -> Result<Self, ConfigError>
    where
        W: Write + Send + 'static,
    {
        let formatter = config.formatter()?;
        let verbosity_table = config.verbosity_table(manager.level_names())?;
        let console = Arc::new(FemtoStreamHandler::with_formatter(writer, formatter.clone()));
        console.set_level(verbosity_table.resolve(config.verbosity));
        Ok(Self {
            config,
            manager,
            formatter,
            verbosity_table,
            console,
            run_session: None,
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }

    pub fn verbosity_table(&self) -> &VerbosityLevelTable {
        &self.verbosity_table
    }

    pub fn console_handler(&self) -> &Arc<FemtoStreamHandler> {
        &self.console
    }

    /// Threshold of the run-wide console handler.
    pub fn console_level(&self) -> FemtoLevel {
        self.verbosity_table.resolve(self.config.verbosity)
    }

    pub fn print_logs(&self) -> bool {
        self.config.log_print
    }

    fn root_host(&self) -> Arc<dyn HandlerHost> {
        self.manager.root()
    }

    /// Attach the console handler to the root logger for the whole run.
    pub fn start_run(&mut self) -> Result<(), PhaseError> {
        if self.run_session.is_some() {
            return Err(PhaseError::RunAlreadyStarted);
        }
        let options = CaptureOptions::default()
            .with_formatter(self.formatter.clone())
            .with_level(self.console_level());
        self.run_session = Some(CaptureSession::open(
            Arc::clone(&self.console),
            self.root_host(),
            options,
        ));
        Ok(())
    }

    /// Detach and close the console handler. Does nothing if no run
    /// capture is open.
    pub fn finish_run(&mut self) -> Result<(), PhaseError> {
        match self.run_session.take() {
            Some(session) => session.finish().map_err(PhaseError::Close),
            None => Ok(()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_session.is_some()
    }

    /// Start capturing `phase` of `item` into a fresh handler and publish
    /// that handler for the item's fixtures.
    pub fn before_phase(&self, item: &mut TestItem, phase: Phase) -> Result<PhaseCapture, PhaseError> {
        item.begin(phase)?;
        let handler = Arc::new(LogCaptureHandler::new());
        let options = CaptureOptions::default().with_formatter(self.formatter.clone());
        let session = CaptureSession::open(Arc::clone(&handler), self.root_host(), options);
        item.capture_handle().publish(handler);
        Ok(PhaseCapture { phase, session })
    }

    /// Finish `capture`, restoring the root logger, and attach the captured
    /// text to `item` as a `log` section when printing is enabled and
    /// something was logged.
    pub fn after_phase(&self, item: &mut TestItem, capture: PhaseCapture) -> Result<(), PhaseError> {
        let PhaseCapture { phase, session } = capture;
        item.capture_handle().retract();
        let text = session.handler().text();
        let closed = session.finish();
        item.end(phase)?;
        if self.config.log_print {
            let text = text.trim();
            if !text.is_empty() {
                item.add_report_section(phase, LOG_SECTION_KEY, text);
            }
        }
        closed.map_err(PhaseError::Close)
    }

    /// Run `body` as `phase` of `item`.
    ///
    /// The body's own outcome is returned inside the capture outcome. A
    /// close failure is only reported as an error when the body succeeded.
    /// A panicking body still has its phase finished and reported before
    /// the panic resumes.
    pub fn run_phase<T, E>(
        &self,
        item: &mut TestItem,
        phase: Phase,
        body: impl FnOnce() -> Result<T, E>,
    ) -> Result<Result<T, E>, PhaseError> {
        let capture = self.before_phase(item, phase)?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(body));
        let finished = self.after_phase(item, capture);
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(payload) => {
                if let Err(err) = finished {
                    warn!("CatchLogPlugin: finishing panicked {phase} failed: {err}");
                }
                panic::resume_unwind(payload);
            }
        };
        match (finished, outcome) {
            (Err(PhaseError::Close(err)), Err(body_err)) => {
                warn!("CatchLogPlugin: close failed during failing {phase}: {err}");
                Ok(Err(body_err))
            }
            (Err(err), _) => Err(err),
            (Ok(()), outcome) => Ok(outcome),
        }
    }

    /// Canonical fixture for `item`.
    pub fn caplog(&self, item: &TestItem) -> LogCaptureFixture {
        LogCaptureFixture::new(item.capture_handle().clone(), Arc::clone(&self.manager))
    }

    /// Fixture accepting the deprecated `setLevel`/`atLevel` names.
    pub fn compat_caplog(&self, item: &TestItem) -> CompatLogCaptureFixture {
        CompatLogCaptureFixture::new(self.caplog(item), item.warnings().clone())
    }

    /// Fixture for suites that read captures with call syntax.
    pub fn call_style_caplog(&self, item: &TestItem) -> CallStyleLogCaptureFixture {
        CallStyleLogCaptureFixture::new(self.caplog(item), item.warnings().clone())
    }
}

impl Drop for CatchLogPlugin {
    fn drop(&mut self) {
        if let Err(err) = self.finish_run() {
            warn!("CatchLogPlugin: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{FixtureError, LogCapture};
    use rstest::rstest;

    fn plugin(config: CaptureConfig) -> (Arc<Manager>, CatchLogPlugin) {
        let manager = Arc::new(Manager::new());
        let plugin = CatchLogPlugin::with_console_writer(config, Arc::clone(&manager), std::io::sink())
            .expect("valid config");
        (manager, plugin)
    }

    #[rstest]
    #[case(0, FemtoLevel::CRITICAL)]
    #[case(1, FemtoLevel::ERROR)]
    #[case(2, FemtoLevel::WARNING)]
    #[case(3, FemtoLevel::INFO)]
    #[case(4, FemtoLevel::DEBUG)]
    #[case(9, FemtoLevel::DEBUG)]
    fn console_level_follows_verbosity(#[case] verbosity: usize, #[case] expected: FemtoLevel) {
        let (_, plugin) = plugin(CaptureConfig {
            verbosity,
            ..CaptureConfig::default()
        });
        assert_eq!(plugin.console_handler().level(), expected);
        assert_eq!(plugin.console_level(), expected);
    }

    #[test]
    fn bad_extra_level_aborts_construction() {
        let manager = Arc::new(Manager::new());
        let config = CaptureConfig {
            log_level_extra: vec!["NOTSETS".into()],
            ..CaptureConfig::default()
        };
        let err = CatchLogPlugin::with_console_writer(config, manager, std::io::sink())
            .err()
            .expect("unknown level must fail");
        assert!(matches!(err, ConfigError::UnknownLevelName(_)));
    }

    #[test]
    fn run_capture_is_symmetric() {
        let (manager, mut plugin) = plugin(CaptureConfig::default());
        let root = manager.root();
        plugin.start_run().expect("starts");
        assert!(matches!(plugin.start_run(), Err(PhaseError::RunAlreadyStarted)));
        assert_eq!(root.handlers().len(), 1);
        plugin.finish_run().expect("finishes");
        assert!(root.handlers().is_empty());
        assert_eq!(root.level(), FemtoLevel::WARNING);
    }

    #[test]
    fn fixture_sees_only_the_active_phase() {
        let (manager, plugin) = plugin(CaptureConfig::default());
        let mut item = TestItem::new("t");
        let caplog = plugin.caplog(&item);
        let logger = manager.get_logger(Some("app"));

        let capture = plugin.before_phase(&mut item, Phase::Setup).expect("setup");
        logger.info("in setup", &[]);
        assert_eq!(caplog.records().expect("active").len(), 1);
        plugin.after_phase(&mut item, capture).expect("setup done");
        assert_eq!(caplog.records().unwrap_err(), FixtureError::NoActiveCapture);

        let capture = plugin.before_phase(&mut item, Phase::Call).expect("call");
        assert!(caplog.records().expect("active").is_empty());
        plugin.after_phase(&mut item, capture).expect("call done");
    }

    #[test]
    fn phase_restores_root_state() {
        let (manager, plugin) = plugin(CaptureConfig::default());
        let root = manager.root();
        let mut item = TestItem::new("t");
        let capture = plugin.before_phase(&mut item, Phase::Setup).expect("setup");
        assert_eq!(root.level(), FemtoLevel::NOTSET);
        assert_eq!(root.handlers().len(), 1);
        plugin.after_phase(&mut item, capture).expect("setup done");
        assert_eq!(root.level(), FemtoLevel::WARNING);
        assert!(root.handlers().is_empty());
    }

    #[test]
    fn out_of_order_phase_is_rejected_before_capturing() {
        let (manager, plugin) = plugin(CaptureConfig::default());
        let mut item = TestItem::new("t");
        let err = plugin
            .before_phase(&mut item, Phase::Call)
            .err()
            .expect("call before setup");
        assert!(matches!(err, PhaseError::OutOfOrder { .. }));
        assert!(manager.root().handlers().is_empty());
    }
}
