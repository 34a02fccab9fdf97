use crate::error::Result;
use crate::jiggler_error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{info, warn};

const UINPUT_DEVICE: &str = "/dev/uinput";

/// Проверить права доступа к /dev/uinput перед созданием виртуальной мыши
pub fn check_permissions() -> Result<()> {
    info!("Проверка прав доступа...");

    check_uinput_access(Path::new(UINPUT_DEVICE))?;

    // Проверка, что не запущен от root (рекомендация безопасности)
    check_not_root();

    info!("Проверка прав доступа завершена успешно");
    Ok(())
}

fn check_uinput_access(uinput_device: &Path) -> Result<()> {
    if !uinput_device.exists() {
        return Err(jiggler_error!(
            permission,
            "{:?} не существует, загрузите модуль: sudo modprobe uinput",
            uinput_device
        ));
    }

    let metadata = fs::metadata(uinput_device).map_err(|e| {
        jiggler_error!(permission, "Не удалось проверить права доступа к {:?}: {}", uinput_device, e)
    })?;

    // Проверяем права доступа (обычно 660 или 666)
    let mode = metadata.permissions().mode();
    if mode & 0o006 == 0 && mode & 0o060 == 0 && !is_root() {
        return Err(jiggler_error!(
            permission,
            "Нет прав доступа к {:?}. Добавьте пользователя в группу 'uinput' или 'input'",
            uinput_device
        ));
    }

    info!("Доступ к {:?} подтвержден", uinput_device);
    Ok(())
}

fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

fn check_not_root() {
    if is_root() {
        warn!("⚠️  Приложение запущено от имени root!");
        warn!("   Рекомендуется добавить пользователя в группу 'input' (или 'uinput')");
        warn!("   и запускать приложение от имени обычного пользователя:");
        for command in get_setup_commands().iter().filter(|c| c.starts_with("sudo")) {
            warn!("   {}", command);
        }
    }
}

/// Получить рекомендуемые команды для настройки прав доступа
pub fn get_setup_commands() -> Vec<String> {
    vec![
        "# Добавить пользователя в группу с доступом к /dev/uinput:".to_string(),
        "sudo usermod -a -G input $USER".to_string(),
        "".to_string(),
        "# Загрузить модуль uinput:".to_string(),
        "sudo modprobe uinput".to_string(),
        "".to_string(),
        "# Автоматическая загрузка модуля при загрузке системы:".to_string(),
        "echo 'uinput' | sudo tee /etc/modules-load.d/uinput.conf".to_string(),
        "".to_string(),
        "# После выполнения команд перезайдите в систему".to_string(),
    ]
}
