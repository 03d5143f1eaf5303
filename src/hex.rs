//! Intel HEX decoding into a flat flash image.
//!
//! Only data records are loaded. The end-of-file record stops decoding;
//! extended address and start records are skipped. Lines that do not
//! start with `:` are ignored.

use tracing::{debug, warn};

use crate::error::HexError;

/// ATmega328P flash size
pub const FLASH_SIZE: usize = 32 * 1024;

const RECORD_DATA: u8 = 0x00;
const RECORD_EOF: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramImage {
    flash: Vec<u8>,
    /// One past the highest written address
    extent: usize,
}

impl ProgramImage {
    pub fn new() -> Self {
        ProgramImage {
            flash: vec![0; FLASH_SIZE],
            extent: 0,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.flash
    }

    pub fn extent(&self) -> usize {
        self.extent
    }

    pub fn is_empty(&self) -> bool {
        self.extent == 0
    }

    fn write(&mut self, line: usize, address: usize, data: &[u8]) -> Result<(), HexError> {
        let end = address + data.len();
        if end > FLASH_SIZE {
            return Err(HexError::OutOfRange {
                line,
                address,
                size: FLASH_SIZE,
            });
        }
        self.flash[address..end].copy_from_slice(data);
        self.extent = self.extent.max(end);
        Ok(())
    }
}

impl Default for ProgramImage {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse(source: &str) -> Result<ProgramImage, HexError> {
    let mut image = ProgramImage::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let Some(body) = raw.trim().strip_prefix(':') else {
            continue;
        };
        let bytes = decode_bytes(body, line)?;
        // count, address (2), type, checksum
        if bytes.len() < 5 {
            return Err(HexError::Truncated { line });
        }
        let count = bytes[0] as usize;
        if bytes.len() < count + 5 {
            return Err(HexError::Truncated { line });
        }

        let record = &bytes[..count + 5];
        let sum = record.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        if sum != 0 {
            warn!(line, "checksum mismatch in hex record");
        }

        let address = u16::from_be_bytes([bytes[1], bytes[2]]) as usize;
        match bytes[3] {
            RECORD_DATA => image.write(line, address, &bytes[4..4 + count])?,
            RECORD_EOF => break,
            other => debug!(line, record_type = other, "skipping hex record"),
        }
    }

    debug!(extent = image.extent(), "program image decoded");
    Ok(image)
}

fn decode_bytes(body: &str, line: usize) -> Result<Vec<u8>, HexError> {
    if body.len() % 2 != 0 {
        return Err(HexError::Truncated { line });
    }
    (0..body.len())
        .step_by(2)
        .map(|i| {
            body.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or(HexError::InvalidDigits { line })
        })
        .collect()
}
