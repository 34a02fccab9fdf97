//! InputInjector отвечает только за одно: поставить в очередь ввода ОС одно
//! относительное движение указателя. Никакого расписания и состояния здесь нет,
//! этим занимается JiggleScheduler.

mod dry_run;
#[cfg(target_os = "windows")]
mod send_input;
mod r#trait;
#[cfg(target_os = "linux")]
mod uinput_device;

pub use self::r#trait::{create_injector, InputInjector};
