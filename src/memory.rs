use crate::error::{MemoryError, Result};
use crate::process::ProcessId;

pub type FrameId = usize;

/// Which pool a frame lives in. Physical is always tried before virtual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Physical,
    Virtual,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Physical => write!(f, "physical"),
            Tier::Virtual => write!(f, "virtual"),
        }
    }
}

/// A single unit of memory, owned by at most one process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    id: FrameId,
    owner: Option<ProcessId>,
}

impl Frame {
    fn new(id: FrameId) -> Self {
        Frame { id, owner: None }
    }

    #[inline]
    pub fn id(&self) -> FrameId {
        self.id
    }

    #[inline]
    pub fn owner(&self) -> Option<ProcessId> {
        self.owner
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }
}

/// Fixed-size pool of frames for one tier
#[derive(Debug, Clone)]
pub struct FramePool {
    tier: Tier,
    frames: Box<[Frame]>,
}

impl FramePool {
    /// Create a pool of `capacity` free frames numbered `0..capacity`
    pub fn new(tier: Tier, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MemoryError::InvalidCapacity { tier });
        }
        let frames = (0..capacity).map(Frame::new).collect();
        Ok(FramePool { tier, frames })
    }

    #[inline]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    pub fn free_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_free()).count()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Ids of the frames currently held by `pid`, ascending
    pub fn frames_owned_by(&self, pid: ProcessId) -> Vec<FrameId> {
        self.frames
            .iter()
            .filter(|f| f.owner == Some(pid))
            .map(|f| f.id)
            .collect()
    }

    /// Give `count` frames to `pid`, lowest free ids first.
    ///
    /// Only the number of free frames matters, not whether they are adjacent.
    /// When the pool cannot cover the whole request nothing is touched.
    pub fn allocate(&mut self, pid: ProcessId, count: usize) -> Result<Vec<FrameId>> {
        let free: Vec<FrameId> = self
            .frames
            .iter()
            .filter(|f| f.is_free())
            .map(|f| f.id)
            .take(count)
            .collect();

        if free.len() < count {
            return Err(MemoryError::InsufficientFrames {
                tier: self.tier,
                requested: count,
                available: self.free_count(),
            });
        }

        for &id in &free {
            self.frames[id].owner = Some(pid);
        }
        Ok(free)
    }

    /// Release every frame held by `pid`, returning how many were freed.
    /// Releasing a process that holds nothing here is not an error.
    pub fn deallocate(&mut self, pid: ProcessId) -> usize {
        let mut released = 0;
        for frame in self.frames.iter_mut().filter(|f| f.owner == Some(pid)) {
            frame.owner = None;
            released += 1;
        }
        released
    }
}
