use crate::config::InjectorConfig;
use crate::error::{InjectionError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Trait for input injectors that push one synthetic relative pointer motion into the OS
pub trait InputInjector: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Move the pointer by `delta` pixels along both X and Y, relative to its current position
    fn inject(&self, delta: i32) -> std::result::Result<(), InjectionError>;
}

/// Factory function to create an appropriate injector based on the dry_run flag and the platform
pub fn create_injector(config: &InjectorConfig, dry_run: bool) -> Result<Arc<dyn InputInjector>> {
    if dry_run {
        return Ok(Arc::new(super::dry_run::DryRunInjector::new()));
    }

    info!("Создание инжектора для платформы {}", std::env::consts::OS);

    #[cfg(target_os = "linux")]
    {
        Ok(Arc::new(super::uinput_device::UinputInjector::new(&config.device_name)?))
    }

    #[cfg(target_os = "windows")]
    {
        let _ = config;
        Ok(Arc::new(super::send_input::SendInputInjector::new()))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        let _ = config;
        Err(crate::jiggler_error!(
            service_unavailable,
            "инъекция ввода не поддерживается на {}",
            std::env::consts::OS
        ))
    }
}

/// Нулевой сдвиг для бэкендов, где нулевые события отбрасываются: шаг +1 и обратный шаг -1.
/// Обратный шаг повторяется один раз; если и повтор не прошёл, указатель остаётся смещён на 1 px.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn round_trip<E: std::fmt::Display>(
    mut step: impl FnMut(i32) -> std::result::Result<(), E>,
) -> std::result::Result<(), E> {
    step(1)?;

    if let Err(first) = step(-1) {
        return step(-1).map_err(|e| {
            warn!("Обратный шаг не записан ({}, повтор: {}), указатель смещён на 1 px", first, e);
            e
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(results: Vec<std::result::Result<(), i32>>) -> (Vec<i32>, std::result::Result<(), i32>) {
        let mut results = results.into_iter();
        let mut steps = Vec::new();
        let outcome = round_trip(|delta| {
            steps.push(delta);
            results.next().unwrap_or(Ok(()))
        });
        (steps, outcome)
    }

    #[test]
    fn test_round_trip_moves_there_and_back() {
        let (steps, outcome) = scripted(vec![]);
        assert_eq!(steps, vec![1, -1]);
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_failed_forward_step_is_not_undone() {
        let (steps, outcome) = scripted(vec![Err(5)]);
        assert_eq!(steps, vec![1]);
        assert_eq!(outcome, Err(5));
    }

    #[test]
    fn test_failed_back_step_is_retried() {
        let (steps, outcome) = scripted(vec![Ok(()), Err(11), Ok(())]);
        assert_eq!(steps, vec![1, -1, -1]);
        assert!(outcome.is_ok());

        let (steps, outcome) = scripted(vec![Ok(()), Err(11), Err(12)]);
        assert_eq!(steps, vec![1, -1, -1]);
        assert_eq!(outcome, Err(12));
    }
}
