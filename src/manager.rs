//! The allocator/scheduler: owns both frame pools and the table of running
//! processes, and ages them one tick at a time.
//!
//! All state sits behind a single lock. `load`, `unload` and every pass of
//! `tick` take it for their whole duration, so readers going through
//! `snapshot` never see a pool and the process table disagree.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::error::{MemoryError, Result};
use crate::memory::{Frame, FrameId, FramePool, Tier};
use crate::process::{Process, ProcessId};

/// Runtime record of a loaded process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveProcess {
    pub tier: Tier,
    pub frames: Vec<FrameId>,
    pub remaining: u32,
}

/// Outcome of one decrement pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub decremented: Vec<ProcessId>,
    pub unloaded: Vec<ProcessId>,
}

/// Point-in-time copy of everything the presentation side may look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySnapshot {
    pub physical: Vec<Frame>,
    pub virtual_frames: Vec<Frame>,
    pub active: BTreeMap<ProcessId, ActiveProcess>,
}

impl MemorySnapshot {
    pub fn frames(&self, tier: Tier) -> &[Frame] {
        match tier {
            Tier::Physical => &self.physical,
            Tier::Virtual => &self.virtual_frames,
        }
    }

    /// `pid -> remaining lifetime` for every active process
    pub fn remaining_lifetimes(&self) -> BTreeMap<ProcessId, u32> {
        self.active
            .iter()
            .map(|(&pid, entry)| (pid, entry.remaining))
            .collect()
    }
}

struct State {
    physical: FramePool,
    virtual_frames: FramePool,
    active: BTreeMap<ProcessId, ActiveProcess>,
}

impl State {
    fn pool(&self, tier: Tier) -> &FramePool {
        match tier {
            Tier::Physical => &self.physical,
            Tier::Virtual => &self.virtual_frames,
        }
    }

    fn pool_mut(&mut self, tier: Tier) -> &mut FramePool {
        match tier {
            Tier::Physical => &mut self.physical,
            Tier::Virtual => &mut self.virtual_frames,
        }
    }

    fn release(&mut self, pid: ProcessId) -> Result<Vec<FrameId>> {
        let entry = self.active.remove(&pid).ok_or(MemoryError::NotLoaded(pid))?;
        self.pool_mut(entry.tier).deallocate(pid);
        for frame in &entry.frames {
            debug!("{} frame {} released", entry.tier, frame);
        }
        info!("Process {} unloaded", pid);
        Ok(entry.frames)
    }
}

pub struct MemoryManager {
    state: Mutex<State>,
}

impl MemoryManager {
    pub fn new(physical_frames: usize, virtual_frames: usize) -> Result<Self> {
        let state = State {
            physical: FramePool::new(Tier::Physical, physical_frames)?,
            virtual_frames: FramePool::new(Tier::Virtual, virtual_frames)?,
            active: BTreeMap::new(),
        };
        Ok(MemoryManager {
            state: Mutex::new(state),
        })
    }

    /// Place `process` in physical memory, falling back to virtual memory.
    ///
    /// A process that fits in neither pool is dropped: it is not queued or
    /// retried, and both pools are left exactly as they were.
    pub fn load(&self, process: &Process) -> Result<Tier> {
        let pid = process.id();
        let demand = process.frame_demand();
        let mut state = self.state.lock();

        if state.active.contains_key(&pid) {
            warn!("Process {} is already loaded", pid);
            return Err(MemoryError::AlreadyLoaded(pid));
        }

        for tier in [Tier::Physical, Tier::Virtual] {
            match state.pool_mut(tier).allocate(pid, demand) {
                Ok(frames) => {
                    info!("Process {} loaded into {} frames {:?}", pid, tier, frames);
                    state.active.insert(
                        pid,
                        ActiveProcess {
                            tier,
                            frames,
                            remaining: process.lifetime(),
                        },
                    );
                    return Ok(tier);
                }
                Err(e) => debug!("Process {}: {}", pid, e),
            }
        }

        warn!("Not enough memory to load process {}", pid);
        Err(MemoryError::OutOfMemory { pid, demand })
    }

    /// Remove `pid` and hand its frames back to their pool
    pub fn unload(&self, pid: ProcessId) -> Result<Vec<FrameId>> {
        let result = self.state.lock().release(pid);
        if result.is_err() {
            warn!("Process {} is not currently loaded", pid);
        }
        result
    }

    /// Run one decrement pass.
    ///
    /// Entries already at zero are unloaded without being decremented; the
    /// rest lose one tick and are unloaded as soon as they reach zero, so a
    /// process loaded with lifetime `L > 0` is gone after exactly `L` passes.
    pub fn tick(&self) -> TickReport {
        let mut state = self.state.lock();
        let mut report = TickReport::default();

        let pids: Vec<ProcessId> = state.active.keys().copied().collect();
        for pid in pids {
            let Some(entry) = state.active.get_mut(&pid) else {
                continue;
            };
            if entry.remaining > 0 {
                entry.remaining -= 1;
                report.decremented.push(pid);
                debug!("Process {} - Time Left: {}", pid, entry.remaining);
                if entry.remaining > 0 {
                    continue;
                }
            }
            // cannot fail, the entry was just looked up under the same lock
            if state.release(pid).is_ok() {
                report.unloaded.push(pid);
            }
        }
        report
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        let state = self.state.lock();
        MemorySnapshot {
            physical: state.physical.frames().to_vec(),
            virtual_frames: state.virtual_frames.frames().to_vec(),
            active: state.active.clone(),
        }
    }

    pub fn is_loaded(&self, pid: ProcessId) -> bool {
        self.state.lock().active.contains_key(&pid)
    }

    pub fn remaining_lifetime(&self, pid: ProcessId) -> Option<u32> {
        self.state.lock().active.get(&pid).map(|e| e.remaining)
    }

    pub fn tier_of(&self, pid: ProcessId) -> Option<Tier> {
        self.state.lock().active.get(&pid).map(|e| e.tier)
    }

    pub fn active_count(&self) -> usize {
        self.state.lock().active.len()
    }

    /// True when no process is loaded
    pub fn is_idle(&self) -> bool {
        self.state.lock().active.is_empty()
    }

    pub fn free_frames(&self, tier: Tier) -> usize {
        self.state.lock().pool(tier).free_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(id: ProcessId, demand: usize, lifetime: u32) -> Process {
        Process::new(id, demand, lifetime).unwrap()
    }

    fn owned(frames: &[Frame], pid: ProcessId) -> Vec<FrameId> {
        frames
            .iter()
            .filter(|f| f.owner() == Some(pid))
            .map(|f| f.id())
            .collect()
    }

    /// Every active entry owns exactly its recorded frames, and no frame is
    /// owned by anything that is not active.
    fn assert_consistent(snapshot: &MemorySnapshot) {
        for tier in [Tier::Physical, Tier::Virtual] {
            for frame in snapshot.frames(tier) {
                if let Some(pid) = frame.owner() {
                    let entry = snapshot.active.get(&pid).expect("frame owned by inactive process");
                    assert_eq!(entry.tier, tier);
                }
            }
        }
        for (&pid, entry) in &snapshot.active {
            assert_eq!(owned(snapshot.frames(entry.tier), pid), entry.frames);
        }
    }

    #[test]
    fn test_load_into_physical() {
        let mm = MemoryManager::new(10, 10).unwrap();
        assert_eq!(mm.load(&process(1, 6, 5)).unwrap(), Tier::Physical);

        let snap = mm.snapshot();
        assert_eq!(snap.active[&1].frames, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(snap.active[&1].remaining, 5);
        assert_consistent(&snap);
    }

    #[test]
    fn test_load_then_unload_round_trip() {
        let mm = MemoryManager::new(4, 4).unwrap();
        mm.load(&process(9, 3, 10)).unwrap();

        assert_eq!(mm.unload(9).unwrap(), vec![0, 1, 2]);
        assert!(!mm.is_loaded(9));
        let snap = mm.snapshot();
        assert!(snap.physical.iter().all(|f| f.is_free()));
        assert!(snap.virtual_frames.iter().all(|f| f.is_free()));
        assert!(snap.active.is_empty());
    }

    #[test]
    fn test_tier_fallback_leaves_physical_untouched() {
        let mm = MemoryManager::new(4, 6).unwrap();
        mm.load(&process(1, 3, 5)).unwrap();
        let physical_before = mm.snapshot().physical;

        assert_eq!(mm.load(&process(2, 2, 5)).unwrap(), Tier::Virtual);
        let snap = mm.snapshot();
        assert_eq!(snap.physical, physical_before);
        assert_eq!(snap.active[&2].frames, vec![0, 1]);
        assert_eq!(mm.tier_of(2), Some(Tier::Virtual));
        assert_consistent(&snap);
    }

    #[test]
    fn test_out_of_memory_changes_nothing() {
        let mm = MemoryManager::new(3, 2).unwrap();
        mm.load(&process(1, 2, 5)).unwrap();
        mm.load(&process(2, 1, 5)).unwrap();
        let before = mm.snapshot();

        let result = mm.load(&process(3, 4, 1));
        assert!(matches!(
            result,
            Err(MemoryError::OutOfMemory { pid: 3, demand: 4 })
        ));
        assert_eq!(mm.snapshot(), before);
        assert!(!mm.is_loaded(3));
    }

    #[test]
    fn test_already_loaded_is_rejected() {
        let mm = MemoryManager::new(10, 10).unwrap();
        mm.load(&process(1, 2, 5)).unwrap();
        let before = mm.snapshot();

        assert!(matches!(
            mm.load(&process(1, 3, 1)),
            Err(MemoryError::AlreadyLoaded(1))
        ));
        assert_eq!(mm.snapshot(), before);
    }

    #[test]
    fn test_unload_not_loaded() {
        let mm = MemoryManager::new(2, 2).unwrap();
        assert!(matches!(mm.unload(5), Err(MemoryError::NotLoaded(5))));
    }

    #[test]
    fn test_second_unload_is_harmless() {
        let mm = MemoryManager::new(2, 2).unwrap();
        mm.load(&process(1, 1, 3)).unwrap();
        assert!(mm.unload(1).is_ok());
        assert!(matches!(mm.unload(1), Err(MemoryError::NotLoaded(1))));
        assert_eq!(mm.free_frames(Tier::Physical), 2);
    }

    #[test]
    fn test_lifetime_exhaustion() {
        let mm = MemoryManager::new(5, 5).unwrap();
        mm.load(&process(1, 2, 3)).unwrap();

        for expected in [2, 1] {
            let report = mm.tick();
            assert_eq!(report.decremented, vec![1]);
            assert!(report.unloaded.is_empty());
            assert_eq!(mm.remaining_lifetime(1), Some(expected));
        }

        let report = mm.tick();
        assert_eq!(report.unloaded, vec![1]);
        assert!(!mm.is_loaded(1));
        assert_eq!(mm.free_frames(Tier::Physical), 5);
    }

    #[test]
    fn test_zero_lifetime_unloads_on_first_tick() {
        let mm = MemoryManager::new(5, 5).unwrap();
        mm.load(&process(4, 2, 0)).unwrap();
        assert_eq!(mm.remaining_lifetime(4), Some(0));

        let report = mm.tick();
        assert!(report.decremented.is_empty());
        assert_eq!(report.unloaded, vec![4]);
        assert!(mm.is_idle());
    }

    #[test]
    fn test_tick_on_empty_table() {
        let mm = MemoryManager::new(1, 1).unwrap();
        assert_eq!(mm.tick(), TickReport::default());
    }

    #[test]
    fn test_freed_frames_are_reused() {
        let mm = MemoryManager::new(4, 1).unwrap();
        mm.load(&process(1, 2, 1)).unwrap();
        mm.load(&process(2, 2, 4)).unwrap();
        mm.tick();

        assert_eq!(mm.load(&process(3, 2, 1)).unwrap(), Tier::Physical);
        assert_eq!(mm.snapshot().active[&3].frames, vec![0, 1]);
    }

    #[test]
    fn test_fixture_scenario() {
        let mm = MemoryManager::new(10, 10).unwrap();

        assert_eq!(mm.load(&process(1, 6, 5)).unwrap(), Tier::Physical);
        assert_eq!(mm.load(&process(2, 4, 3)).unwrap(), Tier::Physical);
        assert_eq!(mm.load(&process(3, 5, 2)).unwrap(), Tier::Virtual);

        let snap = mm.snapshot();
        assert_eq!(owned(&snap.physical, 1), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(owned(&snap.physical, 2), vec![6, 7, 8, 9]);
        assert_eq!(owned(&snap.virtual_frames, 3), vec![0, 1, 2, 3, 4]);
        assert_consistent(&snap);

        mm.tick();
        let report = mm.tick();
        assert_eq!(report.unloaded, vec![3]);
        assert_eq!(mm.free_frames(Tier::Virtual), 10);
        assert_consistent(&mm.snapshot());

        let report = mm.tick();
        assert_eq!(report.unloaded, vec![2]);
        let snap = mm.snapshot();
        assert!(snap.physical[6..].iter().all(|f| f.is_free()));
        assert_eq!(snap.remaining_lifetimes(), BTreeMap::from([(1, 2)]));

        mm.tick();
        let report = mm.tick();
        assert_eq!(report.unloaded, vec![1]);
        assert!(mm.is_idle());
        assert_eq!(mm.free_frames(Tier::Physical), 10);
    }

    #[test]
    fn test_concurrent_loads_keep_ownership_disjoint() {
        use std::sync::Arc;
        use std::thread;

        let mm = Arc::new(MemoryManager::new(16, 16).unwrap());
        let handles: Vec<_> = (1..=8)
            .map(|id| {
                let mm = Arc::clone(&mm);
                thread::spawn(move || {
                    let p = Process::new(id, 3, 2).unwrap();
                    let _ = mm.load(&p);
                    mm.tick();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_consistent(&mm.snapshot());
        while !mm.is_idle() {
            mm.tick();
        }
        assert_eq!(mm.free_frames(Tier::Physical), 16);
        assert_eq!(mm.free_frames(Tier::Virtual), 16);
    }
}
