use crate::error::SerdeErr;

/// Reads bytes sequentially from a borrowed buffer
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    state: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, state: 0 }
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let byte = *self.buffer.get(self.state).ok_or(SerdeErr::UnexpectedEnd {
            needed: 1,
            remaining: 0,
        })?;
        self.state += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], SerdeErr> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(SerdeErr::UnexpectedEnd {
                needed: count,
                remaining,
            });
        }
        let bytes = &self.buffer[self.state..self.state + count];
        self.state += count;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let bytes = self.read_bytes(N)?;
        let mut output = [0u8; N];
        output.copy_from_slice(bytes);
        Ok(output)
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.state
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
