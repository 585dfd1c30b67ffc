//! Scoped guards over levels and handler attachment.
//!
//! Each guard applies its change when built and undoes it exactly once,
//! either through an explicit [`Release::release`] or on drop, so the
//! previous state comes back on every exit path including unwinding.
//! [`GuardStack`] composes guards and releases them in reverse acquisition
//! order.

use std::sync::Arc;

use crate::control::{HandlerHost, LevelControl};
use crate::handler::SharedHandler;
use crate::level::FemtoLevel;

/// A guard that can undo its effect.
pub trait Release: Send {
    /// Undo the guarded change. Calling this more than once is a no-op.
    fn release(&mut self);
}

/// Temporarily overrides a threshold.
///
/// Nested guards on the same target compose by layering: an inner guard
/// restores whatever the outer guard had set, not the value that existed
/// before the outer guard.
#[must_use = "the level is restored as soon as the guard is dropped"]
pub struct ScopedLevelGuard<T: LevelControl + ?Sized = dyn LevelControl> {
    target: Arc<T>,
    saved: Option<FemtoLevel>,
}

impl<T: LevelControl + ?Sized> ScopedLevelGuard<T> {
    /// Save `target`'s current level and replace it with `level`.
    pub fn enter(target: Arc<T>, level: FemtoLevel) -> Self {
        let saved = target.level();
        target.set_level(level);
        Self {
            target,
            saved: Some(saved),
        }
    }

    /// Level that will be restored on release, if not yet released.
    pub fn saved_level(&self) -> Option<FemtoLevel> {
        self.saved
    }
}

impl<T: LevelControl + ?Sized> Release for ScopedLevelGuard<T> {
    fn release(&mut self) {
        if let Some(level) = self.saved.take() {
            self.target.set_level(level);
        }
    }
}

impl<T: LevelControl + ?Sized> Drop for ScopedLevelGuard<T> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Temporarily attaches a handler to a host.
///
/// When the handler is already attached the guard does nothing on entry and
/// nothing on release, so nested scopes never double-attach a handler.
#[must_use = "the handler is detached as soon as the guard is dropped"]
pub struct ScopedHandlerGuard<H: HandlerHost + ?Sized = dyn HandlerHost> {
    host: Arc<H>,
    handler: SharedHandler,
    attached: bool,
}

impl<H: HandlerHost + ?Sized> ScopedHandlerGuard<H> {
    /// Attach `handler` to `host` unless it is already attached.
    pub fn enter(host: Arc<H>, handler: SharedHandler) -> Self {
        let attached = !host.has_handler(&handler);
        if attached {
            host.add_handler(Arc::clone(&handler));
        }
        Self {
            host,
            handler,
            attached,
        }
    }

    /// Whether this guard performed the attachment (and will undo it).
    pub fn attached(&self) -> bool {
        self.attached
    }
}

impl<H: HandlerHost + ?Sized> Release for ScopedHandlerGuard<H> {
    fn release(&mut self) {
        if std::mem::take(&mut self.attached) {
            self.host.remove_handler(&self.handler);
        }
    }
}

impl<H: HandlerHost + ?Sized> Drop for ScopedHandlerGuard<H> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Ordered collection of guards released last-in, first-out.
///
/// `Vec` drops its elements front to back, which is the wrong order for
/// dependent guards; the stack unwinds explicitly instead.
#[derive(Default)]
pub struct GuardStack {
    guards: Vec<Box<dyn Release>>,
}

impl GuardStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<G: Release + 'static>(&mut self, guard: G) {
        self.guards.push(Box::new(guard));
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Release every guard, most recently pushed first.
    pub fn unwind(&mut self) {
        while let Some(mut guard) = self.guards.pop() {
            guard.release();
        }
    }
}

impl Drop for GuardStack {
    fn drop(&mut self) {
        self.unwind();
    }
}
