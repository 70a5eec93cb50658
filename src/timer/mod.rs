pub mod controller;
pub mod state;

pub use controller::{TrackerController, TrackerSnapshot};
pub use state::{TimerState, ToggleResult};
