use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::{Context, Result};
use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::info;

/// Source of filename stamps. Injected so tests can pin a stamp and the whole
/// pipeline stays deterministic end to end.
pub trait StampSource: Send + Sync {
    /// Next stamp; successive calls must never repeat a value.
    fn next_stamp(&self) -> i64;
}

/// Millisecond wall-clock stamps, bumped past the last issued value so two
/// requests landing in the same millisecond still get distinct filenames.
#[derive(Debug, Default)]
pub struct WallClock {
    last: AtomicI64,
}

impl StampSource for WallClock {
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(seen) => last = seen,
            }
        }
    }
}

/// Writes summary files into one directory and hands back the relative URL
/// each file is served under.
pub struct OutputStore {
    dir: PathBuf,
    stamps: Box<dyn StampSource>,
}

impl OutputStore {
    pub fn new<P: AsRef<Path>>(dir: P, stamps: Box<dyn StampSource>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        Ok(Self { dir, stamps })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one summary as `output_<stamp>.csv`.
    ///
    /// The write goes through a temp file and a rename, so a failure mid-write
    /// never leaves a partial output behind.
    pub fn persist(&self, contents: &str) -> Result<String> {
        let name = format!("output_{}.csv", self.stamps.next_stamp());
        let path = self.dir.join(&name);

        let mut tmp =
            NamedTempFile::new_in(&self.dir).context("creating temp file in output directory")?;
        tmp.write_all(contents.as_bytes()).context("writing summary")?;
        tmp.persist(&path)
            .with_context(|| format!("renaming into {}", path.display()))?;

        info!(file = %path.display(), bytes = contents.len(), "wrote summary");
        Ok(format!("/{name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStamps(i64);

    impl StampSource for FixedStamps {
        fn next_stamp(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn persist_writes_file_and_returns_relative_url() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = OutputStore::new(dir.path(), Box::new(FixedStamps(42)))?;

        let url = store.persist("a,b\n1,2\n")?;
        assert_eq!(url, "/output_42.csv");

        let written = std::fs::read_to_string(dir.path().join("output_42.csv"))?;
        assert_eq!(written, "a,b\n1,2\n");
        Ok(())
    }

    #[test]
    fn persist_leaves_no_stray_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = OutputStore::new(dir.path(), Box::new(FixedStamps(7)))?;
        store.persist("x\n")?;

        let entries: Vec<_> = std::fs::read_dir(dir.path())?
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["output_7.csv"]);
        Ok(())
    }

    #[test]
    fn wall_clock_stamps_strictly_increase() {
        let clock = WallClock::default();
        let mut prev = clock.next_stamp();
        for _ in 0..100 {
            let next = clock.next_stamp();
            assert!(next > prev);
            prev = next;
        }
    }
}
