//! Property tests for capture buffer ordering.

use std::sync::Arc;

use femtocatch::{
    CaptureOptions, CaptureSession, FemtoLevel, HandlerHost, LogCaptureHandler, Manager,
    PatternFormatter, SharedFormatter,
};
use proptest::prelude::*;

fn emission() -> impl Strategy<Value = (FemtoLevel, String)> {
    (
        prop::sample::select(vec![
            FemtoLevel::DEBUG,
            FemtoLevel::INFO,
            FemtoLevel::WARNING,
            FemtoLevel::ERROR,
        ]),
        "[a-z]{1,12}",
    )
}

proptest! {
    #[test]
    fn records_and_text_follow_emission_order(
        emitted in prop::collection::vec(emission(), 0..40),
        threshold in prop::sample::select(vec![FemtoLevel::NOTSET, FemtoLevel::INFO, FemtoLevel::ERROR]),
    ) {
        let manager = Manager::new();
        let logger = manager.get_logger(Some("props"));
        let handler = Arc::new(LogCaptureHandler::new());
        let formatter =
            SharedFormatter::new(PatternFormatter::new("%(message)s", None).expect("valid pattern"));
        let host: Arc<dyn HandlerHost> = manager.root();
        let session = CaptureSession::open(
            Arc::clone(&handler),
            host,
            CaptureOptions::default().with_level(threshold).with_formatter(formatter),
        );

        for (level, message) in &emitted {
            logger.log(*level, message, &[]);
        }

        let expected: Vec<_> = emitted
            .iter()
            .filter(|(level, _)| *level >= threshold)
            .map(|(_, message)| message.clone())
            .collect();
        let captured: Vec<_> = handler.records().iter().map(|r| r.message().to_owned()).collect();
        prop_assert_eq!(&captured, &expected);
        let text: String = expected.iter().map(|m| format!("{m}\n")).collect();
        prop_assert_eq!(handler.text(), text);
        session.finish().expect("close succeeds");
    }
}
