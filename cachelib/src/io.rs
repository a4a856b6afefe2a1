use std::fs::File;
use std::io::{BufRead, Cursor};
use std::path::Path;
use crate::error::SimError;

/// Opens a trace file for sequential reading
///
/// On unix systems the file is memory mapped and the OS told that reads will be sequential, elsewhere
/// it falls back to a large buffered reader. Empty files are never mapped
pub fn get_reader(path: &Path) -> Result<Box<dyn BufRead>, SimError> {
    let file = File::open(path).map_err(|source| SimError::MissingTraceSource {
        path: path.to_path_buf(),
        source,
    })?;
    let read_error = |source| SimError::TraceRead {
        path: path.to_path_buf(),
        source,
    };
    let len = file.metadata().map_err(read_error)?.len();
    if len == 0 {
        return Ok(Box::new(Cursor::new(Vec::new())));
    }
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        // 4096 is the standard block size (or a multiple of it) on most systems
        const BUFFER_SIZE: usize = 16 * 4096;
        Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, file)))
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        // Safety: the mapping is read only and dropped once the trace has been parsed
        let mmap = unsafe { Mmap::map(&file) }.map_err(read_error)?;
        mmap.advise(Advice::Sequential).map_err(read_error)?;
        Ok(Box::new(Cursor::new(mmap)))
    }
}
