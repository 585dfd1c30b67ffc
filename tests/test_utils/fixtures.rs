//! rstest fixtures building plugins over private hierarchies.
//!
//! Every fixture creates its own [`Manager`] so tests never share logger
//! state through the global hierarchy.

use std::sync::Arc;

use femtocatch::{CaptureConfig, CatchLogPlugin, Manager};
use rstest::fixture;

use super::shared_buffer::SharedBuf;

/// A fresh hierarchy.
#[fixture]
pub fn manager() -> Arc<Manager> {
    Arc::new(Manager::new())
}

/// A plugin with the default configuration whose console writes into the
/// returned buffer.
#[fixture]
#[allow(dead_code)]
pub fn plugin_with_console(
    #[default(CaptureConfig::default())] config: CaptureConfig,
) -> (Arc<Manager>, SharedBuf, CatchLogPlugin) {
    let manager = manager();
    let console = SharedBuf::default();
    let plugin = CatchLogPlugin::with_console_writer(config, Arc::clone(&manager), console.clone())
        .expect("valid configuration");
    (manager, console, plugin)
}
