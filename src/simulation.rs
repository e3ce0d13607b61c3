use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::constants::{IDLE_POLL_INTERVAL, TICK_INTERVAL};
use crate::error::{MemoryError, Result};
use crate::manager::{MemoryManager, MemorySnapshot};

#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    /// Time between two decrement passes
    pub tick_interval: Duration,
    /// How often the ticker wakes up to check whether it should stop
    pub poll_interval: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_interval: TICK_INTERVAL,
            poll_interval: IDLE_POLL_INTERVAL,
        }
    }
}

/// Owns the ticker thread and the running flag it polls.
///
/// Lifecycle is `new` → `start` → `stop`; dropping a running simulation stops it.
pub struct Simulation {
    manager: Arc<MemoryManager>,
    running: Arc<AtomicBool>,
    config: SimulationConfig,
    ticker: Option<JoinHandle<()>>,
}

impl Simulation {
    pub fn new(manager: Arc<MemoryManager>, config: SimulationConfig) -> Self {
        Simulation {
            manager,
            running: Arc::new(AtomicBool::new(false)),
            config,
            ticker: None,
        }
    }

    pub fn manager(&self) -> &Arc<MemoryManager> {
        &self.manager
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn start(&mut self) -> Result<()> {
        if self.ticker.is_some() {
            return Err(MemoryError::AlreadyRunning);
        }
        self.running.store(true, Ordering::Release);

        let manager = Arc::clone(&self.manager);
        let running = Arc::clone(&self.running);
        let config = self.config;
        let spawned = thread::Builder::new()
            .name("ticker".into())
            .spawn(move || run_ticker(&manager, &running, config));

        match spawned {
            Ok(handle) => {
                info!("Simulation started");
                self.ticker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(MemoryError::Spawn(e))
            }
        }
    }

    /// Clear the running flag and wait for the ticker to finish its current pass
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.ticker.take() {
            if handle.join().is_err() {
                error!("ticker thread panicked");
            }
            info!("Simulation stopped");
        }
    }

    /// Read-only handle for the presentation side
    pub fn observer(&self) -> Observer {
        Observer {
            manager: Arc::clone(&self.manager),
            running: Arc::clone(&self.running),
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read access to the simulation for a renderer running on another thread
#[derive(Clone)]
pub struct Observer {
    manager: Arc<MemoryManager>,
    running: Arc<AtomicBool>,
}

impl Observer {
    pub fn snapshot(&self) -> MemorySnapshot {
        self.manager.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

fn run_ticker(manager: &MemoryManager, running: &AtomicBool, config: SimulationConfig) {
    let mut last_tick = Instant::now();
    while running.load(Ordering::Acquire) {
        if last_tick.elapsed() >= config.tick_interval {
            let report = manager.tick();
            if !report.unloaded.is_empty() {
                debug!("tick unloaded {:?}", report.unloaded);
            }
            last_tick += config.tick_interval;
        }
        thread::sleep(config.poll_interval);
    }
}
