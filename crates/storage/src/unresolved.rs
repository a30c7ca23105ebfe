//! Append-only unresolved-domains file

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use triager_common::{TriagerResult, UnresolvedSink};

pub const DEFAULT_UNRESOLVED_FILE: &str = "unresolved_domains.txt";

/// One unresolved domain per line. The file is truncated when opened, so
/// each run starts from an empty list.
pub struct UnresolvedFile {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl UnresolvedFile {
    pub fn create<P: AsRef<Path>>(path: P) -> TriagerResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UnresolvedSink for UnresolvedFile {
    fn append(&mut self, domain: &str) -> TriagerResult<()> {
        writeln!(self.writer, "{}", domain)?;
        Ok(())
    }

    fn flush(&mut self) -> TriagerResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
