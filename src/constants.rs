use std::time::Duration;

pub const DEFAULT_PHYSICAL_FRAMES: usize = 10;
pub const DEFAULT_VIRTUAL_FRAMES: usize = 10;

// one decrement pass per tick; the ticker wakes every poll interval to check the running flag
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Seed processes used when no init file is given: (id, frame demand, lifetime in ticks)
pub const FIXTURE_PROCESSES: [(u32, usize, u32); 3] = [(1, 6, 5), (2, 4, 3), (3, 5, 2)];
