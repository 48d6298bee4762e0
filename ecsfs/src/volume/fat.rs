//! 文件分配表
//!
//! 每个数据块对应一个16位条目：`0`表示未分配，`0xFFFF`表示链尾，
//! 其它值为链上下一个块的编号。整张表在挂载时读入内存，卸载时写回。

use alloc::vec;
use alloc::vec::Vec;
use core::mem;

use block_dev::BlockDevice;

use crate::block::{read_blocks, write_blocks};
use crate::util::pad_to_blocks;
use crate::volume::superblock::SuperBlock;
use crate::{BlockId, Error, FatEntry, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocTable {
    entries: Vec<FatEntry>,
}

impl AllocTable {
    /// 空卷的FAT：只有保留的0号块被占用
    pub fn new(data_blocks: usize) -> Self {
        let mut entries = vec![FatEntry::Free; data_blocks];
        entries[BlockId::RESERVED.index()] = FatEntry::Eoc;
        Self { entries }
    }

    pub fn load(dev: &dyn BlockDevice, sb: &SuperBlock) -> Result<Self> {
        let mut raw = vec![0; sb.fat_blocks() * crate::BLOCK_SIZE];
        read_blocks(dev, sb.fat_area(), &mut raw)?;

        let entries: Vec<FatEntry> = raw
            .chunks_exact(mem::size_of::<u16>())
            .take(sb.data_blocks())
            .map(|raw| FatEntry::from(u16::from_le_bytes([raw[0], raw[1]])))
            .collect();

        if entries[BlockId::RESERVED.index()] != FatEntry::Eoc {
            log::error!("FAT[0]={:?}", entries[0]);
            return Err(Error::InvalidVolume("reserved block is not end-of-chain"));
        }

        let fat = Self { entries };
        if let Some(id) = fat
            .entries
            .iter()
            .find_map(|entry| match *entry {
                FatEntry::Next(id) if !fat.is_data_block(id) => Some(id),
                _ => None,
            })
        {
            log::error!("FAT links to block {id} out of {}", fat.len());
            return Err(Error::InvalidVolume("allocation table entry out of range"));
        }

        Ok(fat)
    }

    pub fn store(&self, dev: &dyn BlockDevice, sb: &SuperBlock) -> Result<()> {
        let raw: Vec<u8> = self
            .entries
            .iter()
            .flat_map(|&entry| u16::from(entry).to_le_bytes())
            .collect();
        write_blocks(dev, sb.fat_area(), &pad_to_blocks(&raw))?;
        log::debug!("flushed {} FAT entries", self.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: BlockId) -> FatEntry {
        self.entries[id.index()]
    }

    /// 链上的下一个块，`None`表示`id`为最后一个块
    pub fn next(&self, id: BlockId) -> Option<BlockId> {
        match self.get(id) {
            FatEntry::Next(next) => Some(next),
            _ => None,
        }
    }

    /// 从`first`开始的整条链
    pub fn chain(&self, first: BlockId) -> Chain<'_> {
        Chain {
            fat: self,
            current: Some(first),
            budget: self.len(),
        }
    }

    pub fn free_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|&&entry| entry == FatEntry::Free)
            .count()
    }

    /// 寻找未分配的块并标记为链尾。
    ///
    /// 从1号块开始线性扫描，0号块保留。
    pub fn alloc(&mut self) -> Option<BlockId> {
        let index = self
            .entries
            .iter()
            .skip(BlockId::MIN.index())
            .position(|&entry| entry == FatEntry::Free)?
            + BlockId::MIN.index();
        self.entries[index] = FatEntry::Eoc;

        Some(BlockId::new(index as u16))
    }

    /// 在链尾`tail`之后追加至多`count`个块，返回实际追加的数量
    pub fn extend(&mut self, mut tail: BlockId, count: usize) -> usize {
        debug_assert_eq!(FatEntry::Eoc, self.get(tail));

        let mut added = 0;
        while added < count {
            let Some(id) = self.alloc() else {
                log::warn!("FAT exhausted after {added} of {count} blocks");
                break;
            };
            self.entries[tail.index()] = FatEntry::Next(id);
            tail = id;
            added += 1;
        }

        added
    }

    /// 释放整条链，返回释放的块数
    pub fn release(&mut self, first: BlockId) -> usize {
        let mut id = first;
        let mut freed = 0;

        while id != BlockId::RESERVED && freed < self.len() {
            let entry = mem::take(&mut self.entries[id.index()]);
            freed += 1;
            match entry {
                FatEntry::Next(next) => id = next,
                FatEntry::Eoc => return freed,
                FatEntry::Free => {
                    log::warn!("chain from {first} crosses free block {id}");
                    return freed;
                }
            }
        }

        log::warn!("chain from {first} never reached end-of-chain");
        freed
    }
}

impl AllocTable {
    fn is_data_block(&self, id: BlockId) -> bool {
        id != BlockId::RESERVED && id.index() < self.len()
    }
}

/// 沿FAT遍历的块链，最多产出FAT条目数个块，以免链上出现环
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    fat: &'a AllocTable,
    current: Option<BlockId>,
    budget: usize,
}

impl Iterator for Chain<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.budget == 0 {
            return None;
        }
        self.budget -= 1;

        let id = self.current?;
        self.current = self.fat.next(id);
        Some(id)
    }
}
