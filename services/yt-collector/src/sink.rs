//! JSONL output sink
//!
//! One file per record kind under the output directory, named
//! `<kind>.<run_id>.jsonl`, one serialized record per line. Files are
//! created lazily on first write for their kind.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct JsonlSink {
    dir: PathBuf,
    run_id: String,
    writers: HashMap<&'static str, BufWriter<File>>,
}

impl JsonlSink {
    pub fn new(dir: &Path, run_id: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            run_id: run_id.to_string(),
            writers: HashMap::new(),
        })
    }

    /// Append one record to the file for `kind`.
    pub fn write<T: Serialize>(&mut self, kind: &'static str, record: &T) -> Result<()> {
        if !self.writers.contains_key(kind) {
            let path = self.dir.join(format!("{kind}.{}.jsonl", self.run_id));
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            self.writers.insert(kind, BufWriter::new(file));
        }
        let writer = self.writers.get_mut(kind).expect("writer just inserted");
        serde_json::to_writer(&mut *writer, record).context("failed to serialize record")?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Flush all writers and return the paths written.
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = self
            .writers
            .keys()
            .map(|kind| self.dir.join(format!("{kind}.{}.jsonl", self.run_id)))
            .collect();
        paths.sort();
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Record {
        id: String,
        views: u64,
    }

    #[test]
    fn records_land_one_per_line_in_the_kind_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonlSink::new(dir.path(), "run-1").unwrap();

        sink.write(
            "videos",
            &Record {
                id: "v1".into(),
                views: 10,
            },
        )
        .unwrap();
        sink.write(
            "videos",
            &Record {
                id: "v2".into(),
                views: 20,
            },
        )
        .unwrap();
        sink.write(
            "channels",
            &Record {
                id: "c1".into(),
                views: 0,
            },
        )
        .unwrap();

        let paths = sink.finish().unwrap();
        assert_eq!(paths.len(), 2);

        let videos = std::fs::read_to_string(dir.path().join("videos.run-1.jsonl")).unwrap();
        let lines: Vec<&str> = videos.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], "v1");
        assert_eq!(first["views"], 10);

        let channels = std::fs::read_to_string(dir.path().join("channels.run-1.jsonl")).unwrap();
        assert_eq!(channels.lines().count(), 1);
    }

    #[test]
    fn finish_with_no_writes_returns_no_paths() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlSink::new(dir.path(), "run-1").unwrap();
        assert!(sink.finish().unwrap().is_empty());
    }

    #[test]
    fn output_dir_is_created_if_missing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        let mut sink = JsonlSink::new(&nested, "run-1").unwrap();
        sink.write(
            "videos",
            &Record {
                id: "v1".into(),
                views: 1,
            },
        )
        .unwrap();
        sink.finish().unwrap();
        assert!(nested.join("videos.run-1.jsonl").exists());
    }
}
