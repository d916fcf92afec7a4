//! Little-endian cursors used to move snapshots in and out of raw dumps.
//!
//! Every supported target is little-endian, so dumps are always read and written
//! in that byte order regardless of the host.

use super::xmm::XmmRegister;

/// Read cursor over a dump that is already known to be long enough.
///
/// Length is checked once up front by
/// [`SnapshotLayout::from_bytes`](super::SnapshotLayout::from_bytes); reading past
/// the end afterwards is a layout bug and panics.
#[derive(Debug)]
pub struct ByteReader<'a>
{
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a>
{
    pub(crate) const fn new(bytes: &'a [u8]) -> Self
    {
        Self { bytes, position: 0 }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize
    {
        self.position
    }

    fn take<const N: usize>(&mut self) -> [u8; N]
    {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.position..self.position + N]);
        self.position += N;
        out
    }
}

/// Write cursor that builds a dump image.
#[derive(Debug, Default)]
pub struct ByteWriter
{
    bytes: Vec<u8>,
}

impl ByteWriter
{
    pub(crate) fn with_capacity(capacity: usize) -> Self
    {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn into_inner(self) -> Vec<u8>
    {
        self.bytes
    }
}

/// A value that occupies a fixed number of bytes in a snapshot dump.
pub trait WireValue: Copy
{
    /// Read the value at the cursor and advance it.
    fn read_from(reader: &mut ByteReader<'_>) -> Self;

    /// Append the value to the writer.
    fn write_to(self, writer: &mut ByteWriter);
}

impl WireValue for u32
{
    fn read_from(reader: &mut ByteReader<'_>) -> Self
    {
        u32::from_le_bytes(reader.take())
    }

    fn write_to(self, writer: &mut ByteWriter)
    {
        writer.bytes.extend_from_slice(&self.to_le_bytes());
    }
}

impl WireValue for u64
{
    fn read_from(reader: &mut ByteReader<'_>) -> Self
    {
        u64::from_le_bytes(reader.take())
    }

    fn write_to(self, writer: &mut ByteWriter)
    {
        writer.bytes.extend_from_slice(&self.to_le_bytes());
    }
}

impl WireValue for XmmRegister
{
    fn read_from(reader: &mut ByteReader<'_>) -> Self
    {
        let low = u64::read_from(reader);
        let high = u64::read_from(reader);
        XmmRegister::new(low, high)
    }

    fn write_to(self, writer: &mut ByteWriter)
    {
        WireValue::write_to(self.low, writer);
        WireValue::write_to(self.high, writer);
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_reader_is_little_endian()
    {
        let bytes = [0x78, 0x56, 0x34, 0x12, 0xef, 0xcd, 0xab, 0x90, 0x78, 0x56, 0x34, 0x12];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(u32::read_from(&mut reader), 0x1234_5678);
        assert_eq!(u64::read_from(&mut reader), 0x1234_5678_90ab_cdef);
        assert_eq!(reader.position(), 12);
    }

    #[test]
    fn test_xmm_lanes_are_low_then_high()
    {
        let mut writer = ByteWriter::default();
        XmmRegister::new(1, 2).write_to(&mut writer);
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[8], 2);
    }
}
