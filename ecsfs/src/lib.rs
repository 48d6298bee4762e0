//! ECS150-FS：建立在定长块设备之上的单卷扁平文件系统。
//!
//! 卷由超级块、文件分配表(FAT)、根目录与数据区组成，
//! 文件内容是由FAT串起的一条块链，首次写入时才分配。

#![no_std]

extern crate alloc;

mod block;
mod block_id;
mod config;
mod control;
mod descriptor;
mod error;
mod format;
mod inode;
mod util;
pub mod volume;

pub use block_dev::{BlockDevice, BlockError, RamDisk};

pub use self::{
    block_id::{BlockId, FatEntry},
    config::*,
    control::{FileEntry, FileSystem, VolumeInfo},
    descriptor::Fd,
    error::{Error, Result},
    format::format,
    volume::superblock::SuperBlock,
};
