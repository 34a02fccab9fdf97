pub mod control;

pub use control::ControlCommand;
