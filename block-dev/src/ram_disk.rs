use alloc::vec;
use alloc::vec::Vec;

use spin::Mutex;

use crate::{BLOCK_SIZE, BlockDevice, BlockError, check_access};

/// 内存中的块设备，内容随其释放而丢失
#[derive(Debug)]
pub struct RamDisk {
    data: Mutex<Vec<u8>>,
    num_blocks: usize,
}

impl RamDisk {
    /// 全零的设备
    pub fn new(num_blocks: usize) -> Self {
        Self {
            data: Mutex::new(vec![0; num_blocks * BLOCK_SIZE]),
            num_blocks,
        }
    }

    /// 复制设备的全部内容
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.lock().clone()
    }
}

impl BlockDevice for RamDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), BlockError> {
        check_access(self.num_blocks, block_id, buf.len())?;
        let start = block_id * BLOCK_SIZE;
        buf.copy_from_slice(&self.data.lock()[start..start + BLOCK_SIZE]);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), BlockError> {
        check_access(self.num_blocks, block_id, buf.len())?;
        let start = block_id * BLOCK_SIZE;
        self.data.lock()[start..start + BLOCK_SIZE].copy_from_slice(buf);
        Ok(())
    }
}
