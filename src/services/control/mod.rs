//! Управление во время работы: источники команд (stdin, сигналы) и контроллер,
//! который применяет их к JiggleScheduler и сохраняет изменения в файл настроек.

mod controller;
#[cfg(unix)]
mod signals;
mod stdin;
#[cfg(test)]
mod test_support;
mod r#trait;

pub use self::controller::JiggleController;
pub use self::r#trait::create_control_sources;
