//! 块缓冲区
//!
//! 只读写块的一部分时，先把整块读入[`Block`]，修改后再整块写回，
//! 以免破坏块内其它字节。缓冲区随作用域释放。

use alloc::boxed::Box;
use alloc::vec;
use core::ops::{Deref, DerefMut};

use block_dev::{BlockDevice, BlockError};

use crate::BLOCK_SIZE;

#[derive(Debug)]
pub struct Block {
    data: Box<[u8]>,
}

impl Block {
    pub fn new() -> Self {
        Self {
            data: vec![0; BLOCK_SIZE].into_boxed_slice(),
        }
    }

    pub fn load(&mut self, dev: &dyn BlockDevice, block_id: usize) -> Result<(), BlockError> {
        dev.read_block(block_id, &mut self.data)
    }

    pub fn store(&self, dev: &dyn BlockDevice, block_id: usize) -> Result<(), BlockError> {
        dev.write_block(block_id, &self.data)
    }
}

impl Deref for Block {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for Block {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

/// 从`start`起读入连续的块，`buf.len()`必须是块大小的整数倍
pub fn read_blocks(dev: &dyn BlockDevice, start: usize, buf: &mut [u8]) -> Result<(), BlockError> {
    debug_assert_eq!(0, buf.len() % BLOCK_SIZE);
    buf.chunks_exact_mut(BLOCK_SIZE)
        .enumerate()
        .try_for_each(|(i, chunk)| dev.read_block(start + i, chunk))
}

/// 从`start`起写出连续的块，`buf.len()`必须是块大小的整数倍
pub fn write_blocks(dev: &dyn BlockDevice, start: usize, buf: &[u8]) -> Result<(), BlockError> {
    debug_assert_eq!(0, buf.len() % BLOCK_SIZE);
    buf.chunks_exact(BLOCK_SIZE)
        .enumerate()
        .try_for_each(|(i, chunk)| dev.write_block(start + i, chunk))
}
