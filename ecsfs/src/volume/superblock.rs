use crate::config::{FAT_ENTRIES_PER_BLOCK, MAGIC};
use crate::util::padded_len;
use crate::{BlockId, Error, Result};

/// 超级块，位于0号块。
///
/// | 偏移 | 长度 | 字段 |
/// |------|------|------|
/// | 0    | 8    | 签名 `ECS150FS` |
/// | 8    | 2    | 块总数 |
/// | 10   | 2    | 根目录块号 |
/// | 12   | 2    | 数据区起始块号 |
/// | 14   | 2    | 数据块数量 |
/// | 16   | 1    | FAT块数量 |
///
/// 块的剩余部分皆填0。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperBlock {
    total_blocks: u16,
    root_dir: u16,
    data_area: u16,
    data_blocks: u16,
    fat_blocks: u8,
}

impl SuperBlock {
    /// 为`total_blocks`个块的设备规划布局
    pub fn new(total_blocks: usize) -> Option<Self> {
        if !(4..=u16::MAX as usize).contains(&total_blocks) {
            return None;
        }

        // 最少的FAT块，使其条目足以覆盖剩下的数据块
        let fat_blocks = (1..)
            .find(|&fat| fat * FAT_ENTRIES_PER_BLOCK >= total_blocks - 2 - fat)
            .and_then(|fat: usize| u8::try_from(fat).ok())?;
        let root_dir = fat_blocks as u16 + 1;

        Some(Self {
            total_blocks: total_blocks as u16,
            root_dir,
            data_area: root_dir + 1,
            data_blocks: (total_blocks - 2 - fat_blocks as usize) as u16,
            fat_blocks,
        })
    }

    /// 容纳`data_blocks`个数据块所需的块总数
    pub const fn total_for(data_blocks: usize) -> usize {
        data_blocks + data_blocks.div_ceil(FAT_ENTRIES_PER_BLOCK) + 2
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf[..8] != MAGIC {
            return Err(Error::InvalidVolume("bad signature"));
        }

        let u16_at = |offset: usize| u16::from_le_bytes([buf[offset], buf[offset + 1]]);
        let sb = Self {
            total_blocks: u16_at(8),
            root_dir: u16_at(10),
            data_area: u16_at(12),
            data_blocks: u16_at(14),
            fat_blocks: buf[16],
        };
        sb.validate()?;

        Ok(sb)
    }

    /// `buf`长度为一个块，签名与字段之后填0
    pub fn encode(&self, buf: &mut [u8]) {
        buf.fill(0);
        buf[..8].copy_from_slice(&MAGIC);
        buf[8..10].copy_from_slice(&self.total_blocks.to_le_bytes());
        buf[10..12].copy_from_slice(&self.root_dir.to_le_bytes());
        buf[12..14].copy_from_slice(&self.data_area.to_le_bytes());
        buf[14..16].copy_from_slice(&self.data_blocks.to_le_bytes());
        buf[16] = self.fat_blocks;
    }

    pub const fn total_blocks(&self) -> usize {
        self.total_blocks as usize
    }

    /// FAT区的起始块号
    pub const fn fat_area(&self) -> usize {
        1
    }

    pub const fn fat_blocks(&self) -> usize {
        self.fat_blocks as usize
    }

    pub const fn root_dir(&self) -> usize {
        self.root_dir as usize
    }

    /// 数据区的起始块号
    pub const fn data_area(&self) -> usize {
        self.data_area as usize
    }

    pub const fn data_blocks(&self) -> usize {
        self.data_blocks as usize
    }

    /// 数据块在设备上的块号
    pub fn data_block(&self, id: BlockId) -> usize {
        self.data_area() + id.index()
    }
}

impl SuperBlock {
    fn validate(&self) -> Result<()> {
        if self.data_blocks == 0 {
            Err(Error::InvalidVolume("no data blocks"))
        } else if self.fat_blocks() * crate::BLOCK_SIZE != padded_len(self.data_blocks() * 2) {
            Err(Error::InvalidVolume("allocation table size mismatch"))
        } else if self.root_dir() != self.fat_area() + self.fat_blocks()
            || self.data_area() != self.root_dir() + 1
            || self.data_area() + self.data_blocks() != self.total_blocks()
        {
            Err(Error::InvalidVolume("inconsistent layout"))
        } else {
            Ok(())
        }
    }
}
