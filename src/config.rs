use crate::services::{validate_interval, JiggleConfig, MotionProfile};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub jiggle: JiggleSettings,
    pub motion: MotionConfig,
    pub injector: InjectorConfig,
    pub diagnostics: DiagnosticsConfig,
    pub instance: InstanceConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Состояние подёргивания при старте; сюда же сохраняются изменения во время работы
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JiggleSettings {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub zen: bool,
    /// Сохранять изменения, сделанные командами, обратно в файл настроек
    pub persist: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MotionConfig {
    pub visible_delta: i32,
    pub zen_delta: i32,
    pub zigzag: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InjectorConfig {
    pub device_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiagnosticsConfig {
    pub escalate_after: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InstanceConfig {
    pub name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            jiggle: JiggleSettings {
                enabled: false,
                interval_seconds: 60,
                zen: false,
                persist: true,
            },
            motion: MotionConfig {
                visible_delta: 1,
                zen_delta: 0,
                zigzag: false,
            },
            injector: InjectorConfig {
                device_name: "Idle Jiggler Virtual Mouse".to_string(),
            },
            diagnostics: DiagnosticsConfig { escalate_after: 10 },
            instance: InstanceConfig {
                name: "idle-jiggler".to_string(),
            },
        }
    }
}

/// Переопределения из командной строки; `None` оставляет значение из файла
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub enabled: Option<bool>,
    pub zen: Option<bool>,
    pub interval_seconds: Option<u64>,
}

impl Config {
    /// Загрузка: значения по умолчанию, затем TOML файл (если есть), затем переменные JIGGLER_*
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("JIGGLER_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    /// Записать настройки в TOML файл
    pub fn save<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();
        let contents = toml::to_string_pretty(self).context("Не удалось сериализовать конфигурацию")?;
        fs::write(config_path, contents)
            .with_context(|| format!("Не удалось записать конфигурацию в {:?}", config_path))?;
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(enabled) = overrides.enabled {
            self.jiggle.enabled = enabled;
        }
        if let Some(zen) = overrides.zen {
            self.jiggle.zen = zen;
        }
        if let Some(interval_seconds) = overrides.interval_seconds {
            self.jiggle.interval_seconds = interval_seconds;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "pretty" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Граница конфигурации: интервал вне 1..=10800 сюда не проходит
        validate_interval(self.jiggle.interval_seconds)?;

        if self.motion.visible_delta == 0 {
            anyhow::bail!("visible_delta не может быть 0");
        }

        if self.injector.device_name.trim().is_empty() {
            anyhow::bail!("Пустое имя виртуального устройства");
        }

        if self.instance.name.is_empty()
            || !self
                .instance
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            anyhow::bail!("Неверное имя экземпляра: {:?}", self.instance.name);
        }

        Ok(())
    }

    pub fn jiggle_config(&self) -> Result<JiggleConfig> {
        Ok(JiggleConfig::new(
            self.jiggle.enabled,
            self.jiggle.interval_seconds,
            self.jiggle.zen,
        )?)
    }

    pub fn motion_profile(&self) -> MotionProfile {
        MotionProfile {
            visible_delta: self.motion.visible_delta,
            zen_delta: self.motion.zen_delta,
            zigzag: self.motion.zigzag,
        }
    }

    /// Перенести текущее состояние планировщика в раздел [jiggle]
    pub fn record(&mut self, state: &JiggleConfig) {
        self.jiggle.enabled = state.enabled();
        self.jiggle.interval_seconds = state.interval_seconds();
        self.jiggle.zen = state.invisible();
    }
}
