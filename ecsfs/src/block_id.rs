use derive_more::{Display, From, Into};

/// 数据区内的块编号，相对数据区的起始块。
///
/// 0号块是保留的哨兵，恒为链尾，永不分配给文件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into)]
#[repr(transparent)]
pub struct BlockId(u16);

impl BlockId {
    pub const RESERVED: Self = Self(0);

    /// 最小的可用块号
    pub const MIN: Self = Self(1);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// FAT条目
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FatEntry {
    #[default]
    Free,
    /// 链表上的最后一个块
    Eoc,
    Next(BlockId),
}

impl FatEntry {
    pub const EOC_RAW: u16 = 0xFFFF;
}

impl From<u16> for FatEntry {
    fn from(raw: u16) -> Self {
        match raw {
            0 => Self::Free,
            Self::EOC_RAW => Self::Eoc,
            raw => Self::Next(BlockId(raw)),
        }
    }
}

impl From<FatEntry> for u16 {
    fn from(entry: FatEntry) -> Self {
        match entry {
            FatEntry::Free => 0,
            FatEntry::Eoc => FatEntry::EOC_RAW,
            FatEntry::Next(id) => id.0,
        }
    }
}
