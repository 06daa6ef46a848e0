use bytes::Bytes;
use std::io::IoSlice;
use std::slice::ChunksExact;

pub const FILL_BYTE: u8 = b'B';

/// One logical message: `nbufs` equally sized chunks laid out back to back in
/// a single allocation.
#[derive(Debug, Clone)]
pub struct PayloadBuffer {
    data: Bytes,
    bufsize: usize,
}

impl PayloadBuffer {
    pub fn new(nbufs: usize, bufsize: usize) -> Self {
        Self::filled(nbufs, bufsize, FILL_BYTE)
    }

    pub fn filled(nbufs: usize, bufsize: usize, byte: u8) -> Self {
        assert!(nbufs > 0 && bufsize > 0, "payload needs at least one byte");
        Self {
            data: Bytes::from(vec![byte; nbufs * bufsize]),
            bufsize,
        }
    }

    /// Wraps existing bytes, split into `bufsize` chunks. `data.len()` must be
    /// a non-zero multiple of `bufsize`.
    pub fn from_bytes(data: Bytes, bufsize: usize) -> Self {
        assert!(
            bufsize > 0 && !data.is_empty() && data.len() % bufsize == 0,
            "payload of {} bytes cannot be split into {} byte chunks",
            data.len(),
            bufsize
        );
        Self { data, bufsize }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn nbufs(&self) -> usize {
        self.data.len() / self.bufsize
    }

    pub fn bufsize(&self) -> usize {
        self.bufsize
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn chunks(&self) -> ChunksExact<'_, u8> {
        self.data.chunks_exact(self.bufsize)
    }

    /// Scatter/gather descriptors covering every chunk in order.
    pub fn io_slices(&self) -> Vec<IoSlice<'_>> {
        self.chunks().map(IoSlice::new).collect()
    }
}
