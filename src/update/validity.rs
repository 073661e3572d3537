//! Structural validation of a downloaded executable.
//!
//! Before a candidate binary is allowed anywhere near the running
//! executable's path, it must look like something the operating system could
//! actually load: correct format magic for the host platform and at least a
//! complete header. Corrupted or truncated downloads fail here, which is the
//! last gate before the backup/swap steps become destructive.
//!
//! # Degraded Mode
//!
//! On a platform whose executable format this checker does not know, the
//! check is skipped and treated as passing, with a warning in the log. This
//! is an explicit escape hatch, not a default-deny: in that mode no content
//! is verified at all, which is a known weak point of the protocol.

use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::core::PrimerError;

/// Executable container formats the checker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableFormat {
    /// ELF (Linux and most other Unixes)
    Elf,
    /// Mach-O, thin or universal (macOS)
    MachO,
    /// PE/COFF behind an MZ stub (Windows)
    Pe,
    /// Anything the checker cannot verify; validation is skipped
    Unknown,
}

impl ExecutableFormat {
    /// The format expected for binaries on the compilation target.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(target_os = "linux") {
            Self::Elf
        } else if cfg!(target_os = "macos") {
            Self::MachO
        } else if cfg!(target_os = "windows") {
            Self::Pe
        } else {
            Self::Unknown
        }
    }

    /// Minimum plausible file length for this format.
    ///
    /// A file shorter than its own mandatory header cannot be loadable, so
    /// anything below this is reported as truncated.
    const fn min_length(self) -> usize {
        match self {
            // ELF64 header
            Self::Elf => 64,
            // mach_header_64
            Self::MachO => 32,
            // DOS stub up to the PE offset field
            Self::Pe => 64,
            Self::Unknown => 0,
        }
    }

    /// Whether `header` starts with a magic number of this format.
    fn magic_matches(self, header: &[u8]) -> bool {
        match self {
            Self::Elf => header.starts_with(&[0x7f, b'E', b'L', b'F']),
            Self::MachO => {
                header.starts_with(&[0xcf, 0xfa, 0xed, 0xfe]) // 64-bit
                    || header.starts_with(&[0xce, 0xfa, 0xed, 0xfe]) // 32-bit
                    || header.starts_with(&[0xca, 0xfe, 0xba, 0xbe]) // universal
            }
            Self::Pe => header.starts_with(b"MZ"),
            Self::Unknown => true,
        }
    }
}

/// Checks that a staged download is a structurally valid executable.
pub struct ExecutableValidator {
    format: ExecutableFormat,
}

impl ExecutableValidator {
    /// Validator for the host platform's executable format.
    #[must_use]
    pub fn for_host() -> Self {
        Self::with_format(ExecutableFormat::host())
    }

    /// Validator for an explicit format; used by tests and cross-checks.
    #[must_use]
    pub const fn with_format(format: ExecutableFormat) -> Self {
        Self { format }
    }

    /// Validate the file at `path`.
    ///
    /// Opens the file, reads the header, and drops the handle before
    /// returning — a lingering open handle would block the copy operations
    /// that follow on some filesystems.
    ///
    /// # Errors
    ///
    /// [`PrimerError::Validation`] when the file is missing its format magic
    /// or is shorter than a complete header; [`PrimerError::Io`] when the
    /// file cannot be opened at all.
    pub fn validate(&self, path: &Path) -> Result<(), PrimerError> {
        if self.format == ExecutableFormat::Unknown {
            warn!(
                "no structural check available for this platform; \
                 accepting {} unverified",
                path.display()
            );
            return Ok(());
        }

        let mut header = [0u8; 64];
        let read = {
            let mut file = std::fs::File::open(path)?;
            read_up_to(&mut file, &mut header)?
            // file handle dropped here
        };

        let length = std::fs::metadata(path)?.len() as usize;
        if length < self.format.min_length() {
            return Err(PrimerError::Validation {
                path: path.display().to_string(),
                reason: format!(
                    "truncated payload: {length} bytes is shorter than a {:?} header",
                    self.format
                ),
            });
        }

        if !self.format.magic_matches(&header[..read]) {
            return Err(PrimerError::Validation {
                path: path.display().to_string(),
                reason: format!("malformed header: not a {:?} image", self.format),
            });
        }

        debug!("{} passed {:?} structural validation", path.display(), self.format);
        Ok(())
    }
}

/// Read as many bytes as the file offers, up to the buffer size.
fn read_up_to(file: &mut std::fs::File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = file.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}
