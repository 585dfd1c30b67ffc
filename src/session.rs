//! Scoped capture of a logger's output into a handler.
//!
//! A [`CaptureSession`] configures a handler, attaches it to a host logger
//! and lowers the host's level so records reach the handler. On exit the
//! level is restored, the handler detached and then closed. Exit happens
//! through [`CaptureSession::finish`], [`CaptureSession::run`] or, on any
//! other path including a panic, through `Drop`.

use std::cmp;
use std::fmt;
use std::sync::Arc;

use log::warn;
use thiserror::Error;

use crate::control::{HandlerHost, LevelControl};
use crate::filters::FemtoFilter;
use crate::formatter::SharedFormatter;
use crate::handler::{FemtoHandlerTrait, HandlerError, SharedHandler};
use crate::level::FemtoLevel;
use crate::scoped::{GuardStack, ScopedHandlerGuard, ScopedLevelGuard};

/// Handler-local settings applied when a session opens.
#[derive(Clone, Default)]
pub struct CaptureOptions {
    pub filter: Option<Arc<dyn FemtoFilter>>,
    pub formatter: Option<SharedFormatter>,
    /// Minimum level accepted by the handler. `NOTSET` accepts everything.
    pub level: FemtoLevel,
}

impl CaptureOptions {
    pub fn with_filter(mut self, filter: Arc<dyn FemtoFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn with_level(mut self, level: FemtoLevel) -> Self {
        self.level = level;
        self
    }
}

impl fmt::Debug for CaptureOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureOptions")
            .field("filter", &self.filter.is_some())
            .field("formatter", &self.formatter.is_some())
            .field("level", &self.level)
            .finish()
    }
}

/// What a session changed on entry, kept for exact restoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureScopeState {
    /// The handler was already attached to the host before the session.
    pub handler_was_attached: bool,
    /// Host level before the session lowered it.
    pub previous_level: FemtoLevel,
    /// Host level while the session is open.
    pub target_level: FemtoLevel,
}

/// Failure of a scoped capture run.
#[derive(Debug, Error)]
pub enum SessionError<E> {
    /// The protected body failed. Takes priority over a close failure.
    #[error("capture body failed: {0}")]
    Body(E),
    /// The body succeeded but closing the handler failed.
    #[error("failed to close capture handler: {0}")]
    Close(#[source] HandlerError),
}

/// An open capture of `host` into `handler`.
#[must_use = "dropping the session immediately ends the capture"]
pub struct CaptureSession<H: FemtoHandlerTrait + 'static> {
    handler: Arc<H>,
    guards: GuardStack,
    state: CaptureScopeState,
    finished: bool,
}

impl<H: FemtoHandlerTrait + 'static> CaptureSession<H> {
    /// Configure `handler` from `options` and start capturing `host`.
    ///
    /// The host level is set to `min(handler level, host level)` so the
    /// session only ever lowers it.
    pub fn open(handler: Arc<H>, host: Arc<dyn HandlerHost>, options: CaptureOptions) -> Self {
        let config = handler.config();
        if let Some(filter) = options.filter {
            config.add_filter(filter);
        }
        if let Some(formatter) = options.formatter {
            config.set_formatter(formatter);
        }
        config.set_level(options.level);

        let mut guards = GuardStack::new();
        let shared: SharedHandler = Arc::clone(&handler) as SharedHandler;
        let handler_guard = ScopedHandlerGuard::enter(Arc::clone(&host), shared);
        let handler_was_attached = !handler_guard.attached();
        guards.push(handler_guard);

        let previous_level = host.level();
        let target_level = cmp::min(config.level(), previous_level);
        guards.push(ScopedLevelGuard::enter(host, target_level));

        Self {
            handler,
            guards,
            state: CaptureScopeState {
                handler_was_attached,
                previous_level,
                target_level,
            },
            finished: false,
        }
    }

    /// Run `body` inside a session and tear it down afterwards.
    ///
    /// A body error is returned even when closing the handler also fails;
    /// the close error is then only logged.
    pub fn run<T, E>(
        handler: Arc<H>,
        host: Arc<dyn HandlerHost>,
        options: CaptureOptions,
        body: impl FnOnce(&Arc<H>) -> Result<T, E>,
    ) -> Result<T, SessionError<E>> {
        let session = Self::open(handler, host, options);
        let outcome = body(session.handler());
        let closed = session.finish();
        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(SessionError::Close(err)),
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    warn!("CaptureSession: close failed while body error pending: {close_err}");
                }
                Err(SessionError::Body(err))
            }
        }
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    pub fn state(&self) -> CaptureScopeState {
        self.state
    }

    /// Restore the host and close the handler.
    pub fn finish(mut self) -> Result<(), HandlerError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), HandlerError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.guards.unwind();
        // An enclosing scope still owns an already-attached handler.
        if self.state.handler_was_attached {
            return Ok(());
        }
        self.handler.close()
    }
}

impl<H: FemtoHandlerTrait + 'static> Drop for CaptureSession<H> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!("CaptureSession: failed to close handler on drop: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::LogCaptureHandler;
    use crate::log_record::FemtoLogRecord;
    use crate::test_utils::collecting_handler::CollectingHandler;
    use crate::test_utils::fake_host::FakeHost;
    use rstest::rstest;
    use std::panic::{self, AssertUnwindSafe};

    fn host(level: FemtoLevel) -> (Arc<FakeHost>, Arc<dyn HandlerHost>) {
        let fake = Arc::new(FakeHost::new(level));
        let dyn_host: Arc<dyn HandlerHost> = Arc::clone(&fake) as Arc<dyn HandlerHost>;
        (fake, dyn_host)
    }

    #[rstest]
    #[case(FemtoLevel::NOTSET, FemtoLevel::WARNING, FemtoLevel::NOTSET)]
    #[case(FemtoLevel::INFO, FemtoLevel::WARNING, FemtoLevel::INFO)]
    #[case(FemtoLevel::ERROR, FemtoLevel::DEBUG, FemtoLevel::DEBUG)]
    fn host_level_is_only_lowered(
        #[case] handler_level: FemtoLevel,
        #[case] host_level: FemtoLevel,
        #[case] expected: FemtoLevel,
    ) {
        let (fake, dyn_host) = host(host_level);
        let session = CaptureSession::open(
            Arc::new(LogCaptureHandler::new()),
            dyn_host,
            CaptureOptions::default().with_level(handler_level),
        );
        assert_eq!(fake.level(), expected);
        assert_eq!(session.state().target_level, expected);
        assert_eq!(session.state().previous_level, host_level);
        session.finish().expect("close succeeds");
        assert_eq!(fake.level(), host_level);
    }

    #[test]
    fn finish_detaches_and_closes() {
        let (fake, dyn_host) = host(FemtoLevel::WARNING);
        let handler = Arc::new(LogCaptureHandler::new());
        let session = CaptureSession::open(Arc::clone(&handler), dyn_host, CaptureOptions::default());
        assert_eq!(fake.handler_count(), 1);
        session.finish().expect("close succeeds");
        assert_eq!(fake.handler_count(), 0);
        assert!(handler.is_closed());
    }

    #[test]
    fn restores_on_panic() {
        let (fake, dyn_host) = host(FemtoLevel::WARNING);
        let handler = Arc::new(LogCaptureHandler::new());
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _session =
                CaptureSession::open(Arc::clone(&handler), dyn_host, CaptureOptions::default());
            panic!("test body failed");
        }));
        assert!(result.is_err());
        assert_eq!(fake.level(), FemtoLevel::WARNING);
        assert_eq!(fake.handler_count(), 0);
        assert!(handler.is_closed());
    }

    #[test]
    fn restores_on_body_error() {
        let (fake, dyn_host) = host(FemtoLevel::ERROR);
        let result: Result<(), _> = CaptureSession::run(
            Arc::new(LogCaptureHandler::new()),
            dyn_host,
            CaptureOptions::default(),
            |_| Err("assertion failed"),
        );
        assert!(matches!(result, Err(SessionError::Body("assertion failed"))));
        assert_eq!(fake.level(), FemtoLevel::ERROR);
        assert_eq!(fake.handler_count(), 0);
    }

    #[test]
    fn body_error_wins_over_close_error() {
        let (_, dyn_host) = host(FemtoLevel::WARNING);
        let handler = Arc::new(CollectingHandler::failing_close());
        let result: Result<(), _> = CaptureSession::run(
            Arc::clone(&handler),
            dyn_host,
            CaptureOptions::default(),
            |_| Err("assertion failed"),
        );
        assert!(matches!(result, Err(SessionError::Body("assertion failed"))));
        assert_eq!(handler.close_count(), 1);
    }

    #[test]
    fn close_error_surfaces_when_body_succeeds() {
        let (_, dyn_host) = host(FemtoLevel::WARNING);
        let result: Result<u8, SessionError<()>> = CaptureSession::run(
            Arc::new(CollectingHandler::failing_close()),
            dyn_host,
            CaptureOptions::default(),
            |_| Ok(7),
        );
        assert!(matches!(result, Err(SessionError::Close(_))));
    }

    #[test]
    fn nested_session_on_same_handler_leaves_it_open() {
        let (fake, dyn_host) = host(FemtoLevel::WARNING);
        let handler = Arc::new(LogCaptureHandler::new());
        let outer = CaptureSession::open(
            Arc::clone(&handler),
            Arc::clone(&dyn_host),
            CaptureOptions::default(),
        );
        let inner = CaptureSession::open(Arc::clone(&handler), dyn_host, CaptureOptions::default());
        assert!(inner.state().handler_was_attached);
        inner.finish().expect("inner finish");
        assert!(!handler.is_closed());
        let shared: SharedHandler = Arc::clone(&handler) as SharedHandler;
        assert_eq!(fake.attachments(&shared), 1);
        outer.finish().expect("outer finish");
        assert_eq!(fake.attachments(&shared), 0);
        assert!(handler.is_closed());
    }

    #[test]
    fn options_configure_handler() {
        let (_, dyn_host) = host(FemtoLevel::WARNING);
        let handler = Arc::new(CollectingHandler::new());
        let filter: Arc<dyn FemtoFilter> =
            Arc::new(|r: &FemtoLogRecord| r.logger() == "keep");
        let session = CaptureSession::open(
            Arc::clone(&handler),
            dyn_host,
            CaptureOptions::default()
                .with_filter(filter)
                .with_level(FemtoLevel::INFO),
        );
        for (logger, level) in [
            ("keep", FemtoLevel::INFO),
            ("keep", FemtoLevel::DEBUG),
            ("drop", FemtoLevel::ERROR),
        ] {
            handler
                .handle(&FemtoLogRecord::new(logger, level, "m"))
                .expect("handle succeeds");
        }
        assert_eq!(handler.collected().len(), 1);
        session.finish().expect("close succeeds");
    }
}
