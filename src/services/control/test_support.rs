use crate::config::Config;
use crate::error::InjectionError;
use crate::services::{DiagnosticSink, InputInjector, JiggleScheduler, MotionProfile};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::controller::JiggleController;

struct NullInjector;

impl InputInjector for NullInjector {
    fn name(&self) -> &'static str {
        "null"
    }

    fn inject(&self, _delta: i32) -> std::result::Result<(), InjectionError> {
        Ok(())
    }
}

struct NullSink;

impl DiagnosticSink for NullSink {
    fn injection_failed(&self, _operation: &'static str, _error: &InjectionError) {}
}

/// Контроллер поверх запущенного планировщика с конфигурацией по умолчанию
pub(super) fn controller(
    name: &str,
    persist: bool,
) -> (Arc<JiggleController>, Arc<JiggleScheduler>, PathBuf) {
    let path = std::env::temp_dir().join(format!(
        "idle-jiggler-controller-{}-{}.toml",
        name,
        std::process::id()
    ));
    let _ = fs::remove_file(&path);

    let mut settings = Config::default();
    settings.jiggle.persist = persist;

    let scheduler = Arc::new(JiggleScheduler::new(
        Arc::new(NullInjector),
        Arc::new(NullSink),
        MotionProfile::default(),
    ));
    scheduler.start(settings.jiggle_config().unwrap()).unwrap();

    let controller = Arc::new(JiggleController::new(
        scheduler.clone(),
        settings,
        path.clone(),
    ));
    (controller, scheduler, path)
}
