use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use block_dev::BlockDevice;

use crate::block::Block;
use crate::descriptor::OpenFileTable;
use crate::volume::fat::AllocTable;
use crate::volume::root_dir::{RootDir, validate_name};
use crate::volume::superblock::SuperBlock;
use crate::{BlockId, Error, FILE_MAX_COUNT, Result};

/// 已挂载的卷。
///
/// 挂载时读入超级块、FAT与根目录，之后的操作只修改内存中的副本，
/// [`FileSystem::unmount`] 时写回设备。
#[derive(Debug)]
pub struct FileSystem {
    mounted: Option<Mounted>,
}

#[derive(Debug)]
pub(crate) struct Mounted {
    pub dev: Arc<dyn BlockDevice>,
    pub sb: SuperBlock,
    pub fat: AllocTable,
    pub root: RootDir,
    pub files: OpenFileTable,
}

impl FileSystem {
    pub fn mount(dev: Arc<dyn BlockDevice>) -> Result<Self> {
        let sb = {
            let mut block = Block::new();
            block.load(&*dev, 0)?;
            SuperBlock::decode(&block)?
        };

        if sb.total_blocks() != dev.num_blocks() {
            log::error!(
                "superblock counts {} blocks, device has {}",
                sb.total_blocks(),
                dev.num_blocks()
            );
            return Err(Error::InvalidVolume("block count mismatch"));
        }

        let fat = AllocTable::load(&*dev, &sb)?;
        let root = RootDir::load(&*dev, &sb)?;
        log::info!(
            "mounted: fat={}..{} root={} data={}+{}",
            sb.fat_area(),
            sb.fat_area() + sb.fat_blocks(),
            sb.root_dir(),
            sb.data_area(),
            sb.data_blocks()
        );

        Ok(Self {
            mounted: Some(Mounted {
                dev,
                sb,
                fat,
                root,
                files: OpenFileTable::new(),
            }),
        })
    }

    /// 写回根目录与FAT并关闭设备。
    ///
    /// 写回失败时卷仍处于挂载状态，可以重试。
    pub fn unmount(&mut self) -> Result<()> {
        let mounted = self.mounted()?;
        if mounted.files.opened() > 0 {
            return Err(Error::Busy);
        }

        mounted.root.store(&*mounted.dev, &mounted.sb)?;
        mounted.fat.store(&*mounted.dev, &mounted.sb)?;
        mounted.dev.close()?;

        self.mounted = None;
        log::info!("unmounted");
        Ok(())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn info(&self) -> Result<VolumeInfo> {
        let mounted = self.mounted()?;
        let sb = &mounted.sb;
        Ok(VolumeInfo {
            total_blocks: sb.total_blocks(),
            fat_blocks: sb.fat_blocks(),
            root_dir: sb.root_dir(),
            data_area: sb.data_area(),
            data_blocks: sb.data_blocks(),
            free_data_blocks: mounted.fat.free_count(),
            free_dir_slots: mounted.root.free_count(),
        })
    }

    /// 创建空文件，首次写入时才分配数据块
    pub fn create(&mut self, name: &str) -> Result<()> {
        let root = &mut self.mounted_mut()?.root;
        if root.free_count() == 0 {
            return Err(Error::ResourceExhausted);
        }
        validate_name(name)?;
        if root.position(name).is_some() {
            return Err(Error::Conflict);
        }

        root.claim(name).ok_or(Error::ResourceExhausted)?;
        log::debug!("create {name:?}");
        Ok(())
    }

    /// 删除文件并释放其整条块链，文件不能处于打开状态
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let mounted = self.mounted_mut()?;
        let slot = mounted.root.position(name).ok_or(Error::NotFound)?;
        if mounted.files.is_busy(name) {
            return Err(Error::Conflict);
        }

        if let Some(first) = mounted.root.get(slot).first() {
            let freed = mounted.fat.release(first);
            log::debug!("delete {name:?}: released {freed} blocks from {first}");
        }
        mounted.root.clear(slot);
        Ok(())
    }

    pub fn ls(&self) -> Result<Vec<FileEntry>> {
        Ok(self
            .mounted()?
            .root
            .iter()
            .map(|entry| FileEntry {
                name: entry.name_lossy().into_owned(),
                size: entry.size(),
                first_block: entry.first_raw(),
            })
            .collect())
    }

    /// 文件按顺序占用的数据块，空文件为空
    pub fn chain(&self, name: &str) -> Result<Vec<BlockId>> {
        let mounted = self.mounted()?;
        let slot = mounted.root.position(name).ok_or(Error::NotFound)?;
        Ok(mounted
            .root
            .get(slot)
            .first()
            .map(|first| mounted.fat.chain(first).collect())
            .unwrap_or_default())
    }

    pub fn free_data_blocks(&self) -> Result<usize> {
        Ok(self.mounted()?.fat.free_count())
    }

    pub fn free_dir_slots(&self) -> Result<usize> {
        Ok(self.mounted()?.root.free_count())
    }
}

impl FileSystem {
    pub(crate) fn mounted(&self) -> Result<&Mounted> {
        self.mounted.as_ref().ok_or(Error::NotMounted)
    }

    pub(crate) fn mounted_mut(&mut self) -> Result<&mut Mounted> {
        self.mounted.as_mut().ok_or(Error::NotMounted)
    }
}

impl Drop for FileSystem {
    fn drop(&mut self) {
        if self.is_mounted() {
            log::warn!("file system dropped while mounted, metadata changes are lost");
        }
    }
}

/// 卷信息报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub total_blocks: usize,
    pub fat_blocks: usize,
    pub root_dir: usize,
    pub data_area: usize,
    pub data_blocks: usize,
    pub free_data_blocks: usize,
    pub free_dir_slots: usize,
}

impl fmt::Display for VolumeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total_blk_count={}", self.total_blocks)?;
        writeln!(f, "fat_blk_count={}", self.fat_blocks)?;
        writeln!(f, "rdir_blk={}", self.root_dir)?;
        writeln!(f, "data_blk={}", self.data_area)?;
        writeln!(f, "data_blk_count={}", self.data_blocks)?;
        writeln!(
            f,
            "fat_free_ratio={}/{}",
            self.free_data_blocks, self.data_blocks
        )?;
        writeln!(f, "rdir_free_ratio={}/{}", self.free_dir_slots, FILE_MAX_COUNT)
    }
}

/// 目录列表中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: usize,
    /// 首个数据块，空文件为`0xFFFF`
    pub first_block: u16,
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "file: {}, size: {}, data_blk: {}",
            self.name, self.size, self.first_block
        )
    }
}
