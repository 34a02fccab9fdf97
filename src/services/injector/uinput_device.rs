use crate::error::{InjectionError, JigglerError, Result};
use parking_lot::Mutex;
use tracing::{debug, info};
use uinput::event::controller::{Controller, Mouse};
use uinput::event::relative::{Position, Relative};
use uinput::event::Event;

use super::r#trait::{round_trip, InputInjector};

/// Виртуальная мышь на uinput, умеющая только относительное движение
pub struct UinputInjector {
    device: Mutex<uinput::Device>,
    device_name: String,
}

impl UinputInjector {
    pub fn new(device_name: &str) -> Result<Self> {
        info!("Инициализация UinputInjector '{}'", device_name);

        let device = Self::create_virtual_device(device_name)?;

        Ok(Self {
            device: Mutex::new(device),
            device_name: device_name.to_string(),
        })
    }

    fn create_virtual_device(device_name: &str) -> Result<uinput::Device> {
        info!("Создание виртуального устройства uinput '{}' для относительного движения", device_name);

        // Без хотя бы одной кнопки libinput не распознаёт устройство как мышь
        let virtual_device = uinput::default()?
            .name(device_name)?
            .event(Event::Controller(Controller::Mouse(Mouse::Left)))?
            .event(Event::Relative(Relative::Position(Position::X)))?
            .event(Event::Relative(Relative::Position(Position::Y)))?
            .create()
            .map_err(|e| {
                JigglerError::Internal(format!(
                    "Не удалось создать виртуальное устройство '{}': {}",
                    device_name, e
                ))
            })?;

        info!("Виртуальное устройство '{}' создано успешно", device_name);
        Ok(virtual_device)
    }

    fn write_motion(device: &mut uinput::Device, delta: i32) -> std::result::Result<(), InjectionError> {
        let written = device
            .send(Position::X, delta)
            .and_then(|_| device.send(Position::Y, delta))
            .and_then(|_| device.synchronize());

        written.map_err(|e| {
            let err = InjectionError::last_os_error();
            debug!("Запись в uinput не удалась: {} ({})", e, err);
            err
        })
    }
}

impl InputInjector for UinputInjector {
    fn name(&self) -> &'static str {
        "uinput"
    }

    fn inject(&self, delta: i32) -> std::result::Result<(), InjectionError> {
        let mut device = self.device.lock();

        if delta == 0 {
            // Ядро отбрасывает нулевые REL события, поэтому делаем шаг туда и обратно
            return round_trip(|step| Self::write_motion(&mut device, step));
        }

        Self::write_motion(&mut device, delta)
    }
}

impl Drop for UinputInjector {
    fn drop(&mut self) {
        info!("Закрытие виртуального устройства '{}'", self.device_name);
    }
}
