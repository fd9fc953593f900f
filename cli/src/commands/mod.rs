//! CLI commands for the bytebpe trainer.

pub mod inspect;
pub mod render;
pub mod train;

pub use inspect::InspectCommand;
pub use train::TrainCommand;
