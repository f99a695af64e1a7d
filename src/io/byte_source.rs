use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A thread-safe source of book bytes.
pub trait ByteSource: Send + Sync {
    /// Returns the total length of the source.
    fn len(&self) -> u64;

    /// Returns true if the source is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the whole source from the beginning.
    fn read_all(&self) -> io::Result<Vec<u8>>;

    /// Human-readable origin, for log messages.
    fn describe(&self) -> String;
}

// --- Implementation: Local File ---

pub struct FileSource {
    path: PathBuf,
    file: File,
    len: u64,
}

impl FileSource {
    /// Open `path` for reading. A missing file reports `ErrorKind::NotFound`.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        Ok(Self { path, file, len })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_all(&self) -> io::Result<Vec<u8>> {
        // `&File` reads through the shared handle; rewind in case of a
        // previous read.
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;
        let mut data = Vec::with_capacity(self.len as usize);
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// --- Implementation: In-Memory ---

/// An in-memory ByteSource backed by a `Vec<u8>`.
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_all(&self) -> io::Result<Vec<u8>> {
        Ok(self.data.clone())
    }

    fn describe(&self) -> String {
        format!("<{} bytes in memory>", self.data.len())
    }
}
