use crate::error::{JigglerError, Result};
use std::fmt;
use std::time::Duration;

pub const MIN_INTERVAL_SECONDS: u64 = 1;
pub const MAX_INTERVAL_SECONDS: u64 = 10_800;

/// Проверить, что интервал лежит в допустимом диапазоне
pub fn validate_interval(interval_seconds: u64) -> Result<u64> {
    if (MIN_INTERVAL_SECONDS..=MAX_INTERVAL_SECONDS).contains(&interval_seconds) {
        Ok(interval_seconds)
    } else {
        Err(JigglerError::InvalidInterval(interval_seconds))
    }
}

/// Текущее состояние подёргивания: включено ли, как часто и в каком режиме
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JiggleConfig {
    enabled: bool,
    interval_seconds: u64,
    invisible: bool,
}

impl JiggleConfig {
    pub fn new(enabled: bool, interval_seconds: u64, invisible: bool) -> Result<Self> {
        Ok(Self {
            enabled,
            interval_seconds: validate_interval(interval_seconds)?,
            invisible,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval_seconds
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn invisible(&self) -> bool {
        self.invisible
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_invisible(&mut self, invisible: bool) {
        self.invisible = invisible;
    }

    pub(crate) fn set_interval_seconds(&mut self, interval_seconds: u64) -> Result<()> {
        self.interval_seconds = validate_interval(interval_seconds)?;
        Ok(())
    }
}

impl Default for JiggleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: 60,
            invisible: false,
        }
    }
}

impl fmt::Display for JiggleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, каждые {} с, {}",
            if self.enabled { "включено" } else { "на паузе" },
            self.interval_seconds,
            if self.invisible { "zen" } else { "видимый сдвиг" }
        )
    }
}

/// Величина сдвига для видимого и zen режимов
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionProfile {
    pub visible_delta: i32,
    pub zen_delta: i32,
    /// Чередовать знак видимого сдвига, чтобы курсор не уползал
    pub zigzag: bool,
}

impl MotionProfile {
    /// Сдвиг для очередного подёргивания. `zig` переключается только в видимом режиме.
    pub fn delta(&self, invisible: bool, zig: &mut bool) -> i32 {
        if invisible {
            return self.zen_delta;
        }

        if !self.zigzag {
            return self.visible_delta;
        }

        *zig = !*zig;
        if *zig {
            self.visible_delta
        } else {
            -self.visible_delta
        }
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            visible_delta: 1,
            zen_delta: 0,
            zigzag: false,
        }
    }
}
