#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use ecsfs::{BlockDevice, BlockError, FileSystem, Fd, RamDisk, SuperBlock};

/// 格式化一个含`data_blocks`个数据块的内存卷并挂载
pub fn mounted(data_blocks: usize) -> (Arc<RamDisk>, FileSystem) {
    let disk = Arc::new(RamDisk::new(SuperBlock::total_for(data_blocks)));
    ecsfs::format(&*disk).unwrap();
    let fs = FileSystem::mount(disk.clone()).unwrap();
    (disk, fs)
}

/// 与[`mounted`]相同，但底层设备可以注入失败
pub fn mounted_faulty(data_blocks: usize) -> (Arc<FaultyDisk>, FileSystem) {
    let disk = Arc::new(FaultyDisk::new(RamDisk::new(SuperBlock::total_for(
        data_blocks,
    ))));
    ecsfs::format(&*disk).unwrap();
    let fs = FileSystem::mount(disk.clone()).unwrap();
    (disk, fs)
}

/// 确定性的测试数据
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i % 251) as u8 ^ seed.wrapping_mul(31))
        .collect()
}

pub fn create_with(fs: &mut FileSystem, name: &str, data: &[u8]) -> Fd {
    fs.create(name).unwrap();
    let fd = fs.open(name).unwrap();
    assert_eq!(data.len(), fs.write(fd, data).unwrap());
    fd
}

pub fn read_all(fs: &mut FileSystem, fd: Fd) -> Vec<u8> {
    let mut buf = vec![0; fs.stat(fd).unwrap()];
    fs.seek(fd, 0).unwrap();
    let n = fs.read(fd, &mut buf).unwrap();
    buf.truncate(n);
    buf
}

/// 空闲块与所有文件链长之和恒等于数据块数减去保留块
pub fn assert_blocks_conserved(fs: &FileSystem) {
    let info = fs.info().unwrap();
    let used: usize = fs
        .ls()
        .unwrap()
        .iter()
        .map(|file| fs.chain(&file.name).unwrap().len())
        .sum();
    assert_eq!(info.data_blocks - 1, info.free_data_blocks + used);
}

/// 可以注入读写失败的内存设备
#[derive(Debug)]
pub struct FaultyDisk {
    inner: RamDisk,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    /// 只有写入这个块时失败，`usize::MAX`表示不启用
    pub fail_block: AtomicUsize,
}

impl FaultyDisk {
    pub fn new(inner: RamDisk) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_block: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_block(&self, block_id: Option<usize>) {
        self.fail_block
            .store(block_id.unwrap_or(usize::MAX), Ordering::SeqCst);
    }
}

impl BlockDevice for FaultyDisk {
    fn num_blocks(&self) -> usize {
        self.inner.num_blocks()
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), BlockError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BlockError::Io);
        }
        self.inner.read_block(block_id, buf)
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), BlockError> {
        if self.fail_writes.load(Ordering::SeqCst)
            || self.fail_block.load(Ordering::SeqCst) == block_id
        {
            return Err(BlockError::Io);
        }
        self.inner.write_block(block_id, buf)
    }
}
