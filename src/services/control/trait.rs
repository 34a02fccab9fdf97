use crate::error::Result;
use std::sync::Arc;

use super::controller::JiggleController;

/// Trait for control sources that feed commands into the controller
#[async_trait::async_trait]
pub trait ControlSourceTrait {
    /// Run the control source until its input is exhausted
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create control sources: stdin when interactive, plus signals on Unix
pub fn create_control_sources(
    controller: Arc<JiggleController>,
    interactive: bool,
) -> Result<Vec<Box<dyn ControlSourceTrait + Send>>> {
    let mut sources: Vec<Box<dyn ControlSourceTrait + Send>> = Vec::new();

    if interactive {
        sources.push(Box::new(super::stdin::StdinControl::new(controller.clone())));
    }

    #[cfg(unix)]
    sources.push(Box::new(super::signals::SignalControl::new(controller)?));

    #[cfg(not(unix))]
    drop(controller);

    Ok(sources)
}
