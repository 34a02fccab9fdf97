use crate::error::InjectionError;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, warn};

/// Получатель диагностики: одно событие на каждую неудачную инъекцию
pub trait DiagnosticSink: Send + Sync {
    fn injection_failed(&self, operation: &'static str, error: &InjectionError);
}

/// Пишет сбои в tracing; каждый `escalate_after`-й сбой пишется уровнем error
pub struct TracingSink {
    escalate_after: u64,
    failures: AtomicU64,
}

impl TracingSink {
    pub fn new(escalate_after: u64) -> Self {
        Self {
            escalate_after: escalate_after.max(1),
            failures: AtomicU64::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl DiagnosticSink for TracingSink {
    fn injection_failed(&self, operation: &'static str, err: &InjectionError) {
        let total = self.failures.fetch_add(1, Ordering::Relaxed) + 1;

        if total % self.escalate_after == 0 {
            error!(
                operation,
                code = err.code,
                total,
                "Повторяющиеся сбои инъекции ввода: {}",
                err
            );
        } else {
            warn!(operation, code = err.code, "Jiggle пропущен: {}", err);
        }
    }
}
