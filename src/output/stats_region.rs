use crate::loadgen::{StatsRecord, RECORD_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Fixed-size file mirroring one worker's [`StatsRecord`]
///
/// The file lives at `<dir>/<worker_id>.threadmem` and is always exactly one
/// record long. Each publish overwrites it in place without locking, so a
/// concurrent reader may observe a torn record.
#[derive(Debug)]
pub struct StatsRegion {
    file: File,
    path: PathBuf,
}

impl StatsRegion {
    /// Path of the stats file for `worker_id` under `dir`
    pub fn path_for(dir: &Path, worker_id: u32) -> PathBuf {
        dir.join(format!("{}.threadmem", worker_id))
    }

    /// Creates (or truncates) the worker's stats file
    ///
    /// The directory is created if it doesn't exist.
    pub fn create(dir: &Path, worker_id: u32) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;

        let path = Self::path_for(dir, worker_id);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        file.set_len(RECORD_SIZE as u64)?;

        let mut region = Self { file, path };
        region.publish(&StatsRecord::new(worker_id))?;
        Ok(region)
    }

    pub fn publish(&mut self, record: &StatsRecord) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&record.encode())?;
        self.file.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads a stats file written by a worker
    ///
    /// Returns `Ok(None)` if the file is shorter than one record.
    pub fn read(path: &Path) -> io::Result<Option<StatsRecord>> {
        let mut buf = Vec::with_capacity(RECORD_SIZE);
        File::open(path)?.read_to_end(&mut buf)?;
        Ok(StatsRecord::decode(&buf))
    }
}
