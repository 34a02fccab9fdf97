use thiserror::Error;

#[derive(Error, Debug)]
pub enum JigglerError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(target_os = "linux")]
    #[error("Ошибка uinput: {0}")]
    Uinput(#[from] uinput::Error),

    #[error("Интервал {0} с вне допустимого диапазона {min}..={max}", min = crate::services::MIN_INTERVAL_SECONDS, max = crate::services::MAX_INTERVAL_SECONDS)]
    InvalidInterval(u64),

    #[error("Планировщик уже запущен")]
    AlreadyRunning,

    #[error("Неизвестная команда: {0:?}")]
    InvalidCommand(String),

    #[error("Другой экземпляр уже запущен: {0}")]
    AlreadyRunningInstance(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

/// Сбой инъекции одного события: платформа не поставила событие в очередь ввода.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("не удалось вставить событие в поток ввода (код ошибки 0x{code:08x})")]
pub struct InjectionError {
    pub code: i32,
}

impl InjectionError {
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    /// Код последней ошибки ОС для текущего потока
    pub fn last_os_error() -> Self {
        Self::new(std::io::Error::last_os_error().raw_os_error().unwrap_or(-1))
    }
}

pub type Result<T> = std::result::Result<T, JigglerError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! jiggler_error {
    (permission, $($arg:tt)*) => {
        $crate::error::JigglerError::Permission(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::JigglerError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::JigglerError::Internal(format!($($arg)*))
    };
}
