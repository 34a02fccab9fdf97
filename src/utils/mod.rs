pub mod instance_guard;
#[cfg(target_os = "linux")]
pub mod permissions;

pub use instance_guard::InstanceGuard;

// ✅ Макросы условного логирования для горячего пути тиков
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}
