use crate::config::Settings;
use crate::error::Result;
use encoding_rs::Encoding;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::warn;

/// Turns an input file into text, honouring the configured encoding and
/// any byte-order mark.
pub struct SourceReader {
    encoding: &'static Encoding,
    use_mmap: bool,
}

impl SourceReader {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            use_mmap: false,
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(settings.text_encoding()?).with_mmap(settings.use_mmap))
    }

    pub fn read_to_string(&self, path: &Path) -> Result<String> {
        if self.use_mmap {
            self.read_mmap(path)
        } else {
            let bytes = std::fs::read(path)?;
            Ok(self.decode(&bytes))
        }
    }

    /// Read using memory-mapped I/O for large files
    fn read_mmap(&self, path: &Path) -> Result<String> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(String::new());
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(self.decode(&mmap))
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, used, had_errors) = self.encoding.decode(bytes);
        if had_errors {
            warn!(
                "Input is not valid {}; malformed bytes were replaced",
                used.name()
            );
        }
        text.into_owned()
    }
}

impl Default for SourceReader {
    fn default() -> Self {
        Self::new(encoding_rs::UTF_8)
    }
}
