use alloc::vec;
use alloc::vec::Vec;

use crate::BLOCK_SIZE;

/// 向上取整到块大小的整数倍
pub const fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

/// 复制`bytes`并以0填充至块边界
pub fn pad_to_blocks(bytes: &[u8]) -> Vec<u8> {
    let mut buf = vec![0; padded_len(bytes.len())];
    buf[..bytes.len()].copy_from_slice(bytes);
    buf
}
