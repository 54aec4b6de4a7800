//! Packed tensor type

/// `size * size * 3` bytes in R, G, B order, pixels row-major from `(0, 0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedTensor {
    size: u32,
    bytes: Vec<u8>,
}

impl PackedTensor {
    pub(crate) fn new(size: u32, bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.len(), Self::expected_len(size));
        Self { size, bytes }
    }

    pub fn expected_len(size: u32) -> usize {
        size as usize * size as usize * 3
    }

    /// Side length of the square image the tensor was packed from.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// NHWC shape with a batch of one.
    pub fn shape(&self) -> [usize; 4] {
        [1, self.size as usize, self.size as usize, 3]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
