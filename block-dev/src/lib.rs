//! # 块设备接口层
//!
//! 块设备以固定大小的**块**为单位存取数据；
//! [`BlockDevice`] 是对读写块设备的抽象，
//! 文件系统只通过它访问底层存储，每次操作恰好一个块。

#![no_std]

extern crate alloc;

mod ram_disk;

use core::any::Any;
use core::fmt::Debug;

pub use self::ram_disk::RamDisk;

/// 块的字节数，文件系统与块设备共用
pub const BLOCK_SIZE: usize = 4096;

/// 单个块操作的失败
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    #[error("block {block_id} is out of range")]
    OutOfRange { block_id: usize },
    #[error("buffer of {len} bytes is not one block")]
    BadBuffer { len: usize },
    #[error("device I/O failed")]
    Io,
}

/// 块设备驱动特质
pub trait BlockDevice: Debug + Send + Sync + Any {
    /// 设备上的块总数
    fn num_blocks(&self) -> usize;

    /// `buf.len()`必须等于[`BLOCK_SIZE`]
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), BlockError>;

    /// `buf.len()`必须等于[`BLOCK_SIZE`]
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), BlockError>;

    /// 关闭设备前写回所有未落盘的数据
    fn close(&self) -> Result<(), BlockError> {
        Ok(())
    }
}

/// 检查块号与缓冲区长度
pub fn check_access(num_blocks: usize, block_id: usize, len: usize) -> Result<(), BlockError> {
    if block_id >= num_blocks {
        Err(BlockError::OutOfRange { block_id })
    } else if len != BLOCK_SIZE {
        Err(BlockError::BadBuffer { len })
    } else {
        Ok(())
    }
}
