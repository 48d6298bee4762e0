//! 根目录，占据恰好一个块的定长目录项数组。
//!
//! 文件名为空的目录项是空闲的。

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use block_dev::BlockDevice;

use crate::block::Block;
use crate::volume::superblock::SuperBlock;
use crate::{BlockId, Error, FILE_MAX_COUNT, FILENAME_LEN, FatEntry, Result};

/// | 偏移 | 长度 | 字段 |
/// |------|------|------|
/// | 0    | 16   | NUL结尾的文件名 |
/// | 16   | 4    | 文件字节数 |
/// | 20   | 2    | 首个数据块，`0xFFFF`表示空文件 |
/// | 22   | 10   | 保留 |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    name: [u8; FILENAME_LEN],
    size: u32,
    first: u16,
    _reserved: [u8; 10],
}

impl Default for DirEntry {
    fn default() -> Self {
        Self {
            name: [0; FILENAME_LEN],
            size: 0,
            first: FatEntry::EOC_RAW,
            _reserved: [0; 10],
        }
    }
}

impl DirEntry {
    pub const SIZE: usize = 32;

    pub fn decode(raw: &[u8]) -> Self {
        let mut entry = Self::default();
        entry.name.copy_from_slice(&raw[..16]);
        entry.size = u32::from_le_bytes([raw[16], raw[17], raw[18], raw[19]]);
        entry.first = u16::from_le_bytes([raw[20], raw[21]]);
        entry._reserved.copy_from_slice(&raw[22..32]);
        entry
    }

    pub fn encode(&self, raw: &mut [u8]) {
        raw[..16].copy_from_slice(&self.name);
        raw[16..20].copy_from_slice(&self.size.to_le_bytes());
        raw[20..22].copy_from_slice(&self.first.to_le_bytes());
        raw[22..32].copy_from_slice(&self._reserved);
    }

    pub fn is_free(&self) -> bool {
        self.name[0] == 0
    }

    /// 不含NUL的文件名
    pub fn name(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(FILENAME_LEN);
        &self.name[..len]
    }

    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name())
    }

    pub const fn size(&self) -> usize {
        self.size as usize
    }

    pub fn resize(&mut self, size: usize) {
        self.size = size as u32;
    }

    /// 首个数据块，空文件为`None`
    pub fn first(&self) -> Option<BlockId> {
        (self.first != FatEntry::EOC_RAW).then_some(BlockId::new(self.first))
    }

    /// 磁盘上记录的原始首块编号
    pub const fn first_raw(&self) -> u16 {
        self.first
    }

    pub fn set_first(&mut self, id: Option<BlockId>) {
        self.first = id.map_or(FatEntry::EOC_RAW, u16::from);
    }
}

impl DirEntry {
    /// 名称已经过[`validate_name`]检查
    fn occupy(&mut self, name: &str) {
        *self = Self::default();
        self.name[..name.len()].copy_from_slice(name.as_bytes());
    }
}

/// 合法文件名：非空，不含NUL，加上结尾的NUL后能放入文件名缓冲区
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() >= FILENAME_LEN || name.bytes().any(|b| b == 0) {
        Err(Error::InvalidArgument)
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDir {
    entries: Vec<DirEntry>,
}

impl RootDir {
    pub fn new() -> Self {
        Self {
            entries: (0..FILE_MAX_COUNT).map(|_| DirEntry::default()).collect(),
        }
    }

    pub fn load(dev: &dyn BlockDevice, sb: &SuperBlock) -> Result<Self> {
        let mut block = Block::new();
        block.load(dev, sb.root_dir())?;

        let root = Self {
            entries: block.chunks_exact(DirEntry::SIZE).map(DirEntry::decode).collect(),
        };

        // 占用的目录项不能指向保留块或数据区之外
        if let Some(entry) = root.iter().find(|entry| {
            entry.first().is_some_and(|id| {
                id == BlockId::RESERVED || id.index() >= sb.data_blocks()
            })
        }) {
            log::error!(
                "{:?} starts at block {} out of {}",
                entry.name_lossy(),
                entry.first_raw(),
                sb.data_blocks()
            );
            return Err(Error::InvalidVolume("directory entry outside the data region"));
        }

        Ok(root)
    }

    pub fn store(&self, dev: &dyn BlockDevice, sb: &SuperBlock) -> Result<()> {
        let mut block = Block::new();
        for (entry, raw) in self.entries.iter().zip(block.chunks_exact_mut(DirEntry::SIZE)) {
            entry.encode(raw);
        }
        block.store(dev, sb.root_dir())?;
        log::debug!("flushed root directory");
        Ok(())
    }

    /// 按顺序遍历占用的目录项
    pub fn iter(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter().filter(|entry| !entry.is_free())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| !entry.is_free() && entry.name() == name.as_bytes())
    }

    pub fn get(&self, slot: usize) -> &DirEntry {
        &self.entries[slot]
    }

    pub fn get_mut(&mut self, slot: usize) -> &mut DirEntry {
        &mut self.entries[slot]
    }

    /// 以`name`占用第一个空闲目录项
    pub fn claim(&mut self, name: &str) -> Option<usize> {
        let slot = self.entries.iter().position(DirEntry::is_free)?;
        self.entries[slot].occupy(name);
        Some(slot)
    }

    pub fn clear(&mut self, slot: usize) {
        self.entries[slot] = DirEntry::default();
    }

    pub fn free_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_free()).count()
    }
}
