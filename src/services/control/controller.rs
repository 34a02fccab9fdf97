use crate::config::Config;
use crate::error::Result;
use crate::events::control::{ControlCommand, HELP};
use crate::services::JiggleScheduler;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Ответ для пользователя, работа продолжается
    Reply(String),
    Quit,
}

/// Применяет команды к планировщику и держит файл настроек в актуальном состоянии
pub struct JiggleController {
    scheduler: Arc<JiggleScheduler>,
    settings: Mutex<Config>,
    settings_path: PathBuf,
    shutdown: Notify,
}

impl JiggleController {
    pub fn new(scheduler: Arc<JiggleScheduler>, settings: Config, settings_path: PathBuf) -> Self {
        Self {
            scheduler,
            settings: Mutex::new(settings),
            settings_path,
            shutdown: Notify::new(),
        }
    }

    pub fn apply(&self, command: ControlCommand) -> Result<CommandOutcome> {
        debug!("Команда управления: {}", command);

        match command {
            ControlCommand::Enable => self.scheduler.resume(),
            ControlCommand::Disable => self.scheduler.pause(),
            ControlCommand::Toggle => {
                self.scheduler.toggle();
            }
            ControlCommand::Zen(Some(invisible)) => self.scheduler.set_invisible(invisible),
            ControlCommand::Zen(None) => {
                self.scheduler.toggle_invisible();
            }
            ControlCommand::Interval(seconds) => self.scheduler.reconfigure(seconds)?,
            ControlCommand::Status => return Ok(CommandOutcome::Reply(self.status())),
            ControlCommand::Help => return Ok(CommandOutcome::Reply(HELP.to_string())),
            ControlCommand::Quit => {
                info!("Запрошено завершение работы");
                self.shutdown.notify_one();
                return Ok(CommandOutcome::Quit);
            }
        }

        self.persist();
        Ok(CommandOutcome::Reply(self.scheduler.config().to_string()))
    }

    pub fn status(&self) -> String {
        let stats = self.scheduler.stats();
        format!(
            "{:?}: {} (тиков: {}, сдвигов: {}, сбоев: {})",
            self.scheduler.state(),
            self.scheduler.config(),
            stats.ticks,
            stats.injected,
            stats.failed
        )
    }

    /// Дождаться команды quit
    pub async fn shutdown_requested(&self) {
        self.shutdown.notified().await;
    }

    fn persist(&self) {
        let mut settings = self.settings.lock();
        if !settings.jiggle.persist {
            return;
        }

        let before = settings.jiggle.clone();
        settings.record(&self.scheduler.config());
        if settings.jiggle == before {
            return;
        }

        match settings.save(&self.settings_path) {
            Ok(()) => debug!("Настройки сохранены в {:?}", self.settings_path),
            Err(e) => warn!("Не удалось сохранить настройки: {:#}", e),
        }
    }
}
