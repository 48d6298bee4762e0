//! 卷的布局
//!
//! 超级块 | FAT区 | 根目录 | 数据区
//!
//! 所有多字节整数均为小端序。

pub mod fat;
pub mod root_dir;
pub mod superblock;
