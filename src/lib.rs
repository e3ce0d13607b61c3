pub mod constants;
pub mod error;
pub mod io;
pub mod logger;
pub mod manager;
pub mod memory;
pub mod process;
pub mod simulation;
pub mod view;

// Re-export commonly used items for convenience
pub use error::{MemoryError, Result};
pub use manager::{MemoryManager, MemorySnapshot, TickReport};
pub use memory::{Frame, FrameId, FramePool, Tier};
pub use process::{Process, ProcessId};
pub use simulation::{Observer, Simulation, SimulationConfig};
