//! 打开文件表
//!
//! 描述符只记录游标与绑定的文件名，不持有文件的任何块。
//! 同一文件可以被多个描述符打开，游标互相独立。

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use derive_more::{Display, From, Into};

use crate::control::FileSystem;
use crate::volume::root_dir::validate_name;
use crate::{Error, OPEN_MAX_COUNT, Result};

/// 文件描述符，即打开文件表的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
#[repr(transparent)]
pub struct Fd(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFile {
    pub name: String,
    pub offset: usize,
}

#[derive(Debug)]
pub struct OpenFileTable {
    slots: Vec<Option<OpenFile>>,
}

impl OpenFileTable {
    pub fn new() -> Self {
        Self {
            slots: (0..OPEN_MAX_COUNT).map(|_| None).collect(),
        }
    }

    /// 占用第一个空闲槽位，游标归零
    pub fn open(&mut self, name: &str) -> Option<Fd> {
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(OpenFile {
            name: name.to_string(),
            offset: 0,
        });
        Some(Fd(index))
    }

    pub fn close(&mut self, fd: Fd) -> Result<OpenFile> {
        self.slots
            .get_mut(fd.0)
            .and_then(Option::take)
            .ok_or(Error::InvalidArgument)
    }

    pub fn get(&self, fd: Fd) -> Result<&OpenFile> {
        self.slots
            .get(fd.0)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidArgument)
    }

    pub fn get_mut(&mut self, fd: Fd) -> Result<&mut OpenFile> {
        self.slots
            .get_mut(fd.0)
            .and_then(Option::as_mut)
            .ok_or(Error::InvalidArgument)
    }

    /// 是否有描述符绑定到`name`
    pub fn is_busy(&self, name: &str) -> bool {
        self.slots.iter().flatten().any(|file| file.name == name)
    }

    /// 已打开的描述符数量
    pub fn opened(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

impl FileSystem {
    pub fn open(&mut self, name: &str) -> Result<Fd> {
        let mounted = self.mounted_mut()?;
        validate_name(name)?;
        mounted.root.position(name).ok_or(Error::NotFound)?;

        let fd = mounted
            .files
            .open(name)
            .ok_or(Error::ResourceExhausted)?;
        log::debug!("open {name:?} as fd {fd}");
        Ok(fd)
    }

    pub fn close(&mut self, fd: Fd) -> Result<()> {
        let file = self.mounted_mut()?.files.close(fd)?;
        log::debug!("close fd {fd} ({:?})", file.name);
        Ok(())
    }

    /// 描述符所绑定文件的字节数
    pub fn stat(&self, fd: Fd) -> Result<usize> {
        let mounted = self.mounted()?;
        let file = mounted.files.get(fd)?;
        let slot = mounted.root.position(&file.name).ok_or(Error::NotFound)?;
        Ok(mounted.root.get(slot).size())
    }

    /// 移动游标，`offset`不能超过文件大小
    pub fn seek(&mut self, fd: Fd, offset: usize) -> Result<()> {
        let size = self.stat(fd)?;
        if offset > size {
            return Err(Error::InvalidArgument);
        }
        self.mounted_mut()?.files.get_mut(fd)?.offset = offset;
        Ok(())
    }

    pub fn tell(&self, fd: Fd) -> Result<usize> {
        Ok(self.mounted()?.files.get(fd)?.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots() {
        let mut table = OpenFileTable::new();
        let a = table.open("a").unwrap();
        let b = table.open("a").unwrap();
        assert_eq!(Fd(0), a);
        assert_eq!(Fd(1), b);
        assert!(table.is_busy("a"));
        assert_eq!(2, table.opened());

        table.get_mut(b).unwrap().offset = 10;
        assert_eq!(0, table.get(a).unwrap().offset);

        assert!(table.close(a).is_ok());
        assert_eq!(Err(Error::InvalidArgument), table.close(a));
        assert!(table.is_busy("a"));
        assert_eq!(Some(Fd(0)), table.open("b"));

        assert!(table.close(b).is_ok());
        assert!(!table.is_busy("a"));
        assert_eq!(Err(Error::InvalidArgument), table.get(Fd(OPEN_MAX_COUNT)).map(|_| ()));
    }

    #[test]
    fn exhaustion() {
        let mut table = OpenFileTable::new();
        for i in 0..OPEN_MAX_COUNT {
            assert_eq!(Some(Fd(i)), table.open("f"));
        }
        assert_eq!(None, table.open("f"));
    }
}
