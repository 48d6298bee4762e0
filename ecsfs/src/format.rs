use block_dev::BlockDevice;

use crate::block::Block;
use crate::volume::fat::AllocTable;
use crate::volume::root_dir::RootDir;
use crate::volume::superblock::SuperBlock;
use crate::{Error, Result};

/// 在设备上建立空卷，覆盖原有的超级块、FAT与根目录。
///
/// 数据区的内容保持不变。
pub fn format(dev: &dyn BlockDevice) -> Result<SuperBlock> {
    let sb = SuperBlock::new(dev.num_blocks()).ok_or(Error::InvalidArgument)?;

    let mut block = Block::new();
    sb.encode(&mut block);
    block.store(dev, 0)?;
    AllocTable::new(sb.data_blocks()).store(dev, &sb)?;
    RootDir::new().store(dev, &sb)?;

    log::info!(
        "formatted {} blocks: {} FAT blocks, {} data blocks",
        sb.total_blocks(),
        sb.fat_blocks(),
        sb.data_blocks()
    );
    Ok(sb)
}
