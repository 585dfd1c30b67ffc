//! Close failures that cannot be returned are reported through `log`.

use std::any::Any;
use std::sync::Arc;

use femtocatch::{
    CaptureOptions, CaptureSession, FemtoHandlerTrait, FemtoLogRecord, HandlerConfig,
    HandlerError, HandlerHost, Manager, SessionError,
};
use logtest::Logger;

#[derive(Default)]
struct StuckHandler {
    config: HandlerConfig,
}

impl FemtoHandlerTrait for StuckHandler {
    fn config(&self) -> &HandlerConfig {
        &self.config
    }

    fn emit(&self, _record: &FemtoLogRecord) -> Result<(), HandlerError> {
        Ok(())
    }

    fn close(&self) -> Result<(), HandlerError> {
        Err(HandlerError::Message("device busy".into()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn open(manager: &Manager) -> CaptureSession<StuckHandler> {
    let host: Arc<dyn HandlerHost> = manager.root();
    CaptureSession::open(Arc::new(StuckHandler::default()), host, CaptureOptions::default())
}

// logtest installs a process-wide logger, so every scenario shares one test.
#[test]
fn unreturnable_close_errors_are_logged() {
    let mut logger = Logger::start();
    let manager = Manager::new();

    drop(open(&manager));
    let log = logger.pop().expect("drop should warn");
    assert_eq!(log.level(), log::Level::Warn);
    assert!(log.args().contains("failed to close handler on drop"));
    assert!(log.args().contains("device busy"));

    let host: Arc<dyn HandlerHost> = manager.root();
    let outcome = CaptureSession::run(
        Arc::new(StuckHandler::default()),
        host,
        CaptureOptions::default(),
        |_| Err::<(), _>("assertion failed"),
    );
    assert!(matches!(outcome, Err(SessionError::Body("assertion failed"))));
    let log = logger.pop().expect("pending body error should warn");
    assert_eq!(log.level(), log::Level::Warn);
    assert!(log.args().contains("body error pending"));
    assert!(log.args().contains("device busy"));

    let err = open(&manager).finish().expect_err("close fails");
    assert_eq!(err.to_string(), "device busy");
    assert!(logger.pop().is_none(), "returned errors are not logged");
}
