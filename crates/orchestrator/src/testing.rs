//! In-memory sinks shared by the unit tests

use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use triager_common::{ProbeResult, ResultStore, TriagerError, TriagerResult, UnresolvedSink};

#[derive(Clone, Default)]
pub struct RecordingStore {
    rows: Arc<Mutex<Vec<ProbeResult>>>,
    fail: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn rows(&self) -> Vec<ProbeResult> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultStore for RecordingStore {
    async fn upsert(&self, result: &ProbeResult) -> TriagerResult<()> {
        if self.fail {
            return Err(TriagerError::Storage("database is locked".into()));
        }
        self.rows.lock().unwrap().push(result.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct VecSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl VecSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl UnresolvedSink for VecSink {
    fn append(&mut self, domain: &str) -> TriagerResult<()> {
        self.lines.lock().unwrap().push(domain.to_string());
        Ok(())
    }
}

/// Cloneable writer so tests can read back what the collector printed.
#[derive(Clone, Default)]
pub struct SharedBuf {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
