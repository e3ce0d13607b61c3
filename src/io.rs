use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::process::Process;

/// Seed for a simulation run: pool sizes and the processes to load, in order.
///
/// The init file has two lines. The first holds the physical and virtual
/// frame counts, the second holds `id demand lifetime` triples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitData {
    pub physical_frames: usize,
    pub virtual_frames: usize,
    pub processes: Vec<(u32, usize, u32)>,
}

impl Default for InitData {
    fn default() -> Self {
        InitData {
            physical_frames: DEFAULT_PHYSICAL_FRAMES,
            virtual_frames: DEFAULT_VIRTUAL_FRAMES,
            processes: FIXTURE_PROCESSES.to_vec(),
        }
    }
}

impl InitData {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read init file: {}", e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let lines: Vec<&str> = content.lines().collect();

        if lines.is_empty() {
            return Err("Init file is empty".to_string());
        }

        let (physical_frames, virtual_frames) = Self::parse_pool_line(lines[0])?;
        let processes = if lines.len() > 1 {
            Self::parse_process_line(lines[1])?
        } else {
            Vec::new()
        };

        Ok(InitData { physical_frames, virtual_frames, processes })
    }

    fn parse_pool_line(line: &str) -> Result<(usize, usize), String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(format!("Pool line has {} tokens, expected 2", tokens.len()));
        }

        let physical: usize = tokens[0]
            .parse()
            .map_err(|_| format!("Invalid physical frame count: {}", tokens[0]))?;
        let virtual_frames: usize = tokens[1]
            .parse()
            .map_err(|_| format!("Invalid virtual frame count: {}", tokens[1]))?;
        Ok((physical, virtual_frames))
    }

    fn parse_process_line(line: &str) -> Result<Vec<(u32, usize, u32)>, String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        if tokens.len() % 3 != 0 {
            return Err(format!("Process line has {} tokens, expected multiple of 3", tokens.len()));
        }

        let mut entries = Vec::new();
        for chunk in tokens.chunks(3) {
            let id: u32 = chunk[0].parse().map_err(|_| format!("Invalid process id: {}", chunk[0]))?;
            let demand: usize = chunk[1].parse().map_err(|_| format!("Invalid frame demand: {}", chunk[1]))?;
            let lifetime: u32 = chunk[2].parse().map_err(|_| format!("Invalid lifetime: {}", chunk[2]))?;
            entries.push((id, demand, lifetime));
        }
        Ok(entries)
    }

    /// Validate every triple into a [`Process`]
    pub fn processes(&self) -> Result<Vec<Process>, String> {
        self.processes
            .iter()
            .map(|&(id, demand, lifetime)| Process::new(id, demand, lifetime).map_err(|e| e.to_string()))
            .collect()
    }
}
