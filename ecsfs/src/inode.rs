//! 按偏移读写文件
//!
//! 偏移`offset`落在链上第`offset / BLOCK_SIZE`个块的`offset % BLOCK_SIZE`处。
//! 每次只处理一个块：整块直接在设备与调用者缓冲区之间传输，
//! 不足一块时经由[`Block`]暂存，读出后只拷贝需要的部分，
//! 写入时先读后改再写回，保留块内其它字节。

use crate::block::Block;
use crate::control::{FileSystem, Mounted};
use crate::descriptor::Fd;
use crate::{BLOCK_SIZE, BlockId, Error, Result};

impl FileSystem {
    /// 从游标处读取至多`buf.len()`字节，不会读过文件末尾。
    ///
    /// 返回实际读取的字节数，游标随之前进。
    pub fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize> {
        let Mounted {
            dev,
            sb,
            fat,
            root,
            files,
        } = self.mounted_mut()?;
        let file = files.get_mut(fd)?;
        let slot = root.position(&file.name).ok_or(Error::NotFound)?;
        let entry = root.get(slot);

        let offset = file.offset;
        let len = buf.len().min(entry.size().saturating_sub(offset));
        if len == 0 {
            return Ok(0);
        }

        let mut current = entry
            .first()
            .and_then(|first| fat.chain(first).nth(offset / BLOCK_SIZE));
        let mut start = offset % BLOCK_SIZE;
        let mut read = 0;
        let mut bounce: Option<Block> = None;

        while read < len {
            let Some(id) = current else {
                log::warn!(
                    "chain of {:?} ends before its size {}",
                    file.name,
                    entry.size()
                );
                break;
            };

            let end = (start + len - read).min(BLOCK_SIZE);
            let dst = &mut buf[read..read + end - start];
            if dst.len() == BLOCK_SIZE {
                dev.read_block(sb.data_block(id), dst)?;
            } else {
                let bounce = bounce.get_or_insert_with(Block::new);
                bounce.load(&**dev, sb.data_block(id))?;
                dst.copy_from_slice(&bounce[start..end]);
            }

            read += dst.len();
            start = 0;
            current = fat.next(id);
        }

        file.offset += read;
        Ok(read)
    }

    /// 从游标处写入`data`，按需分配与扩展块链。
    ///
    /// 空间不足时尽量多写，返回实际写入的字节数，游标随之前进。
    /// 文件变大时更新其大小并写回根目录。
    pub fn write(&mut self, fd: Fd, data: &[u8]) -> Result<usize> {
        let Mounted {
            dev,
            sb,
            fat,
            root,
            files,
        } = self.mounted_mut()?;
        let file = files.get_mut(fd)?;
        let slot = root.position(&file.name).ok_or(Error::NotFound)?;

        if data.is_empty() {
            return Ok(0);
        }

        let first = match root.get(slot).first() {
            Some(first) => first,
            None => {
                // 空文件，分配首个块
                let Some(first) = fat.alloc() else {
                    log::warn!("no free block for {:?}", file.name);
                    return Ok(0);
                };
                root.get_mut(slot).set_first(Some(first));
                first
            }
        };

        let offset = file.offset;
        let mut remaining = data.len();

        // 游标恰好位于链尾之后时，先扩展再定位
        let mut current = first;
        for _ in 0..offset / BLOCK_SIZE {
            current = match advance(fat, current, &mut remaining) {
                Some(next) => next,
                None => return Ok(0),
            };
        }

        let mut start = offset % BLOCK_SIZE;
        let mut written = 0;
        let mut bounce: Option<Block> = None;

        loop {
            let end = (start + remaining).min(BLOCK_SIZE);
            let src = &data[written..written + end - start];
            if src.len() == BLOCK_SIZE {
                dev.write_block(sb.data_block(current), src)?;
            } else {
                let bounce = bounce.get_or_insert_with(Block::new);
                bounce.load(&**dev, sb.data_block(current))?;
                bounce[start..end].copy_from_slice(src);
                bounce.store(&**dev, sb.data_block(current))?;
            }

            written += src.len();
            remaining -= src.len();
            start = 0;

            if remaining == 0 {
                break;
            }
            current = match advance(fat, current, &mut remaining) {
                Some(next) => next,
                None => break,
            };
        }

        let end = offset + written;
        let old_size = root.get(slot).size();
        if end > old_size {
            root.get_mut(slot).resize(end);
            if let Err(e) = root.store(&**dev, sb) {
                root.get_mut(slot).resize(old_size);
                return Err(e);
            }
        }
        file.offset = end;

        if written < data.len() {
            log::warn!(
                "short write to {:?}: {written} of {} bytes",
                file.name,
                data.len()
            );
        }
        Ok(written)
    }
}

/// 沿链前进一个块。
///
/// 链已到尽头时按`remaining`所需的块数扩展，
/// 扩展不足则把`remaining`削减到新增块的容量。
fn advance(
    fat: &mut crate::volume::fat::AllocTable,
    current: BlockId,
    remaining: &mut usize,
) -> Option<BlockId> {
    if let Some(next) = fat.next(current) {
        return Some(next);
    }

    let wanted = remaining.div_ceil(BLOCK_SIZE);
    let added = fat.extend(current, wanted);
    log::debug!("extend chain at {current}: {added} of {wanted} blocks");
    *remaining = (*remaining).min(added * BLOCK_SIZE);

    fat.next(current)
}
