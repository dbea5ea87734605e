pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::PondConfig;
pub use error::{PondError, Result};
pub use rng::PondRng;
pub use types::{CellId, Clock, Direction, IdCounter};
