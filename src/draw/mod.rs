// Lucky draw: pool management, winner history, and the spin phase machine.

pub mod engine;

pub use engine::{DrawEngine, DrawError, DrawPhase};
