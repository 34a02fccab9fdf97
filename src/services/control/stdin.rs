use crate::error::Result;
use crate::events::ControlCommand;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::controller::{CommandOutcome, JiggleController};
use super::r#trait::ControlSourceTrait;

/// Построчные команды из стандартного ввода
pub struct StdinControl {
    controller: Arc<JiggleController>,
}

impl StdinControl {
    pub fn new(controller: Arc<JiggleController>) -> Self {
        Self { controller }
    }

    /// Блокирующее чтение stdin в отдельном потоке; строки уходят в канал
    fn spawn_reader() -> Result<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(16);

        std::thread::Builder::new()
            .name("stdin-control".to_string())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                debug!("Поток чтения stdin завершён");
            })?;

        Ok(rx)
    }

    async fn run_impl(self) -> Result<()> {
        info!("Управление через stdin: введите 'help' для списка команд");

        let lines = Self::spawn_reader()?;
        self.drive(lines).await
    }

    /// Применять строки из канала, пока не придёт quit или канал не закроется
    async fn drive(&self, mut lines: mpsc::Receiver<String>) -> Result<()> {
        while let Some(line) = lines.recv().await {
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<ControlCommand>() {
                Ok(command) => command,
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            };

            match self.controller.apply(command) {
                Ok(CommandOutcome::Reply(reply)) => println!("{}", reply),
                Ok(CommandOutcome::Quit) => return Ok(()),
                Err(e) => warn!("Команда '{}' не выполнена: {}", command, e),
            }
        }

        info!("stdin закрыт, управление через stdin завершено");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ControlSourceTrait for StdinControl {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
