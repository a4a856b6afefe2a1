use std::io::BufRead;
use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use crate::error::SimError;
use crate::io::get_reader;

lazy_static! {
    // <kind> <operand>, the operand in hex with an optional 0x prefix
    static ref TRACE_LINE: Regex =
        Regex::new(r"^\s*(?P<kind>[0-9]+)\s+(?:0[xX])?(?P<operand>[0-9a-fA-F]+)\s*$").unwrap();
}

/// A single traced instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Kind `0`, a read of the given address
    Load(u64),
    /// Kind `1`, a write to the given address
    Store(u64),
    /// Kind `2`, non-memory work taking the given number of cycles
    Compute(u64),
}

impl Instruction {
    /// Parses one trace line, returning None if it isn't a well formed entry
    ///
    /// # Examples
    ///
    /// ```
    /// use cachelib::trace::Instruction;
    /// assert_eq!(Instruction::parse("0 0x817ae8"), Some(Instruction::Load(0x817ae8)));
    /// assert_eq!(Instruction::parse("2 1A"), Some(Instruction::Compute(26)));
    /// assert_eq!(Instruction::parse("3 0x10"), None);
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let tokens = TRACE_LINE.captures(line)?;
        let operand = u64::from_str_radix(&tokens["operand"], 16).ok()?;
        match &tokens["kind"] {
            "0" => Some(Instruction::Load(operand)),
            "1" => Some(Instruction::Store(operand)),
            "2" => Some(Instruction::Compute(operand)),
            _ => None,
        }
    }
}

/// The full instruction stream of one core, parsed up front so that malformed input is reported
/// before the simulation starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    path: PathBuf,
    instructions: Vec<Instruction>,
}

impl Trace {
    /// Opens and parses the trace file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let trace = Self::parse(path, get_reader(path)?)?;
        debug!("read {} instructions from {}", trace.len(), path.display());
        Ok(trace)
    }

    /// Parses a trace from any buffered reader. `path` is only used for error reporting
    ///
    /// Blank lines are skipped; any other line which isn't `<kind> <hex operand>` is an error
    pub fn parse<R: BufRead>(path: impl Into<PathBuf>, reader: R) -> Result<Self, SimError> {
        let path = path.into();
        let mut instructions = Vec::new();
        for (number, bytes) in reader.split(b'\n').enumerate() {
            let mut bytes = bytes.map_err(|source| SimError::TraceRead {
                path: path.clone(),
                source,
            })?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            let line = String::from_utf8(bytes).map_err(|e| SimError::MalformedTraceEntry {
                path: path.clone(),
                line: number + 1,
                content: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let instruction = Instruction::parse(&line).ok_or_else(|| SimError::MalformedTraceEntry {
                path: path.clone(),
                line: number + 1,
                content: line.clone(),
            })?;
            instructions.push(instruction);
        }
        Ok(Self { path, instructions })
    }

    pub fn from_instructions(path: impl Into<PathBuf>, instructions: Vec<Instruction>) -> Self {
        Self {
            path: path.into(),
            instructions,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Works out which file core `core` reads its trace from
///
/// A single core uses `input_file` itself if it names an existing file. Otherwise each core reads
/// `<input_file>_<core>.data`
pub fn core_trace_path(input_file: &str, core: usize, num_cores: usize) -> PathBuf {
    let direct = Path::new(input_file);
    if num_cores == 1 && direct.is_file() {
        direct.to_path_buf()
    } else {
        PathBuf::from(format!("{input_file}_{core}.data"))
    }
}
