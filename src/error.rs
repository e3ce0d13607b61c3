use std::io;

use thiserror::Error;

use crate::memory::Tier;
use crate::process::ProcessId;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("{tier} memory has {available} free frames, {requested} requested")]
    InsufficientFrames {
        tier: Tier,
        requested: usize,
        available: usize,
    },
    #[error("not enough memory to load process {pid} ({demand} frames)")]
    OutOfMemory { pid: ProcessId, demand: usize },
    #[error("process {0} is not currently loaded")]
    NotLoaded(ProcessId),
    #[error("process {0} is already loaded")]
    AlreadyLoaded(ProcessId),
    #[error("invalid process {pid}: {reason}")]
    InvalidProcess { pid: ProcessId, reason: &'static str },
    #[error("{tier} memory must have at least one frame")]
    InvalidCapacity { tier: Tier },
    #[error("simulation is already running")]
    AlreadyRunning,
    #[error("failed to spawn ticker thread")]
    Spawn(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, MemoryError>;
