//! 卷的固定参数

pub use block_dev::BLOCK_SIZE;

/// 超级块签名
pub const MAGIC: [u8; 8] = *b"ECS150FS";

/// 根目录最多容纳的文件数
pub const FILE_MAX_COUNT: usize = 128;

/// 同时打开的文件描述符上限
pub const OPEN_MAX_COUNT: usize = 32;

/// 文件名缓冲区长度，包括结尾的NUL
pub const FILENAME_LEN: usize = 16;

/// 一个FAT块能容纳多少条目
pub const FAT_ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / 2;
