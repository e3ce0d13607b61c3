use crate::error::{MemoryError, Result};

pub type ProcessId = u32;

/// A request to run: how many frames the process needs and for how many ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Process {
    id: ProcessId,
    frame_demand: usize,
    lifetime: u32,
}

impl Process {
    pub fn new(id: ProcessId, frame_demand: usize, lifetime: u32) -> Result<Self> {
        if id == 0 {
            return Err(MemoryError::InvalidProcess { pid: id, reason: "id must be positive" });
        }
        if frame_demand == 0 {
            return Err(MemoryError::InvalidProcess {
                pid: id,
                reason: "frame demand must be positive",
            });
        }
        Ok(Process { id, frame_demand, lifetime })
    }

    #[inline]
    pub fn id(&self) -> ProcessId {
        self.id
    }

    #[inline]
    pub fn frame_demand(&self) -> usize {
        self.frame_demand
    }

    /// Lifetime in ticks
    #[inline]
    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Process {} ({} frames, {} ticks)",
            self.id, self.frame_demand, self.lifetime
        )
    }
}
