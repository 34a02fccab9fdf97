use crate::error::InjectionError;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use super::r#trait::InputInjector;

pub struct DryRunInjector {
    injected: AtomicU64,
}

impl DryRunInjector {
    pub fn new() -> Self {
        info!("Инициализация DryRunInjector");
        Self {
            injected: AtomicU64::new(0),
        }
    }
}

impl InputInjector for DryRunInjector {
    fn name(&self) -> &'static str {
        "dry_run"
    }

    fn inject(&self, delta: i32) -> Result<(), InjectionError> {
        let n = self.injected.fetch_add(1, Ordering::Relaxed) + 1;
        info!("[DRY RUN] Сдвиг #{} на ({}, {})", n, delta, delta);
        Ok(())
    }
}
