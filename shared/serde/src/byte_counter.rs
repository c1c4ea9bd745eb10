use crate::byte_writer::ByteWrite;

/// A ByteWrite implementation that only counts, used to size values
/// before writing them.
pub struct ByteCounter {
    bytes_written: u32,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self { bytes_written: 0 }
    }

    pub fn bytes_written(&self) -> u32 {
        self.bytes_written
    }
}

impl Default for ByteCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteWrite for ByteCounter {
    fn write_byte(&mut self, _byte: u8) {
        self.bytes_written += 1;
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes_written += bytes.len() as u32;
    }

    fn is_counter(&self) -> bool {
        true
    }
}
