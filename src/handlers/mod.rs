//! Concrete handler implementations.

pub mod capture;
pub mod stream;

pub use capture::LogCaptureHandler;
pub use stream::FemtoStreamHandler;
