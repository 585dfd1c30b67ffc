//! Narrow control surfaces over the logger hierarchy.
//!
//! Scoped guards and capture sessions only ever need to read and write a
//! level or attach and detach a handler. Expressing that as traits lets the
//! guards run against a real [`FemtoLogger`](crate::FemtoLogger), a handler,
//! or an in-memory fake in tests.

use crate::handler::SharedHandler;
use crate::level::FemtoLevel;

/// Anything with an adjustable threshold.
pub trait LevelControl: Send + Sync {
    /// The object's own level (not an inherited effective level).
    fn level(&self) -> FemtoLevel;

    fn set_level(&self, level: FemtoLevel);
}

/// A logger-like object that owns a set of handlers.
///
/// Handler identity is object identity: two handles to the same handler are
/// the same handler.
pub trait HandlerHost: LevelControl {
    fn has_handler(&self, handler: &SharedHandler) -> bool;

    fn add_handler(&self, handler: SharedHandler);

    /// Detach `handler`, returning whether it was attached.
    fn remove_handler(&self, handler: &SharedHandler) -> bool;
}
