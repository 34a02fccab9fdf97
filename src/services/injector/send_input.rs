use crate::error::InjectionError;
use std::mem::size_of;
use tracing::info;
use windows::Win32::Foundation::GetLastError;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_MOVE, MOUSEINPUT,
};

use super::r#trait::InputInjector;

/// Инъекция через SendInput: одна запись INPUT_MOUSE с относительным движением
pub struct SendInputInjector;

impl SendInputInjector {
    pub fn new() -> Self {
        info!("Инициализация SendInputInjector");
        Self
    }
}

impl InputInjector for SendInputInjector {
    fn name(&self) -> &'static str {
        "send_input"
    }

    fn inject(&self, delta: i32) -> Result<(), InjectionError> {
        let inputs = [INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: delta,
                    dy: delta,
                    mouseData: 0,
                    dwFlags: MOUSEEVENTF_MOVE,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }];

        let sent = unsafe { SendInput(&inputs, size_of::<INPUT>() as i32) };
        if sent == 1 {
            return Ok(());
        }

        let code = unsafe { GetLastError() };
        Err(InjectionError::new(code.0 as i32))
    }
}
