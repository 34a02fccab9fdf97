use crate::error::Result;
use crate::events::ControlCommand;
use std::sync::Arc;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{info, warn};

use super::controller::JiggleController;
use super::r#trait::ControlSourceTrait;

/// SIGUSR1 переключает подёргивание, SIGUSR2 переключает zen режим
pub struct SignalControl {
    controller: Arc<JiggleController>,
    toggle: Signal,
    zen: Signal,
}

impl SignalControl {
    pub fn new(controller: Arc<JiggleController>) -> Result<Self> {
        Ok(Self {
            controller,
            toggle: signal(SignalKind::user_defined1())?,
            zen: signal(SignalKind::user_defined2())?,
        })
    }

    async fn run_impl(mut self) -> Result<()> {
        info!("Управление сигналами: SIGUSR1 вкл/выкл, SIGUSR2 zen");

        loop {
            let command = tokio::select! {
                received = self.toggle.recv() => match received {
                    Some(()) => ControlCommand::Toggle,
                    None => break,
                },
                received = self.zen.recv() => match received {
                    Some(()) => ControlCommand::Zen(None),
                    None => break,
                },
            };

            info!("Получен сигнал: {}", command);
            if let Err(e) = self.controller.apply(command) {
                warn!("Команда '{}' не выполнена: {}", command, e);
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl ControlSourceTrait for SignalControl {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
