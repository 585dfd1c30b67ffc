//! Test items and their phase state machine.

use std::fmt;

use crate::fixture::{CaptureHandle, WarningRecorder};

use super::PhaseError;

/// Stage of executing a single test item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Call => "call",
            Self::Teardown => "teardown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an item is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemState {
    Idle,
    Capturing(Phase),
    Completed(Phase),
    Reported,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Capturing(phase) => write!(f, "{phase}-capturing"),
            Self::Completed(phase) => write!(f, "{phase} completed"),
            Self::Reported => f.write_str("reported"),
        }
    }
}

/// Extra report content attached to one phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportSection {
    pub phase: Phase,
    pub key: &'static str,
    pub content: String,
}

/// One executing test with its report sections and fixture state.
pub struct TestItem {
    nodeid: String,
    state: ItemState,
    sections: Vec<ReportSection>,
    capture: CaptureHandle,
    warnings: WarningRecorder,
}

impl fmt::Debug for TestItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestItem")
            .field("nodeid", &self.nodeid)
            .field("state", &self.state)
            .field("sections", &self.sections.len())
            .finish()
    }
}

impl TestItem {
    pub fn new(nodeid: impl Into<String>) -> Self {
        Self {
            nodeid: nodeid.into(),
            state: ItemState::Idle,
            sections: Vec::new(),
            capture: CaptureHandle::new(),
            warnings: WarningRecorder::new(),
        }
    }

    pub fn nodeid(&self) -> &str {
        &self.nodeid
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    /// Sections recorded for `phase`.
    pub fn sections_for(&self, phase: Phase) -> impl Iterator<Item = &ReportSection> {
        self.sections.iter().filter(move |s| s.phase == phase)
    }

    pub fn add_report_section(&mut self, phase: Phase, key: &'static str, content: impl Into<String>) {
        self.sections.push(ReportSection {
            phase,
            key,
            content: content.into(),
        });
    }

    pub fn capture_handle(&self) -> &CaptureHandle {
        &self.capture
    }

    pub fn warnings(&self) -> &WarningRecorder {
        &self.warnings
    }

    /// Enter `phase`. Setup may be followed by call or, when setup failed,
    /// directly by teardown.
    pub(crate) fn begin(&mut self, phase: Phase) -> Result<(), PhaseError> {
        let allowed = matches!(
            (self.state, phase),
            (ItemState::Idle, Phase::Setup)
                | (ItemState::Completed(Phase::Setup), Phase::Call | Phase::Teardown)
                | (ItemState::Completed(Phase::Call), Phase::Teardown)
        );
        if !allowed {
            return Err(self.out_of_order(phase));
        }
        self.state = ItemState::Capturing(phase);
        Ok(())
    }

    /// Leave `phase`; finishing teardown marks the item reported.
    pub(crate) fn end(&mut self, phase: Phase) -> Result<(), PhaseError> {
        if self.state != ItemState::Capturing(phase) {
            return Err(self.out_of_order(phase));
        }
        self.state = match phase {
            Phase::Teardown => ItemState::Reported,
            other => ItemState::Completed(other),
        };
        Ok(())
    }

    fn out_of_order(&self, phase: Phase) -> PhaseError {
        PhaseError::OutOfOrder {
            nodeid: self.nodeid.clone(),
            phase,
            state: self.state,
        }
    }
}
