mod common;

use common::{assert_blocks_conserved, create_with, mounted, pattern};
use ecsfs::{BLOCK_SIZE, Error, FILE_MAX_COUNT, OPEN_MAX_COUNT};

#[test]
fn create_is_lazy() {
    let (_disk, mut fs) = mounted(32);
    fs.create("a.txt").unwrap();

    let files = fs.ls().unwrap();
    assert_eq!(1, files.len());
    assert_eq!("file: a.txt, size: 0, data_blk: 65535", files[0].to_string());
    assert!(fs.chain("a.txt").unwrap().is_empty());
    assert_eq!(31, fs.free_data_blocks().unwrap());
    assert_eq!(FILE_MAX_COUNT - 1, fs.free_dir_slots().unwrap());
}

#[test]
fn create_rejects_bad_names() {
    let (_disk, mut fs) = mounted(32);
    assert_eq!(Err(Error::InvalidArgument), fs.create(""));
    assert_eq!(Err(Error::InvalidArgument), fs.create("name_is_too_long"));
    assert_eq!(Err(Error::InvalidArgument), fs.create("nul\0name"));
    assert!(fs.create("name_just_fits").is_ok());

    assert_eq!(Err(Error::Conflict), fs.create("name_just_fits"));
    assert_eq!(FILE_MAX_COUNT - 1, fs.free_dir_slots().unwrap());
}

#[test]
fn directory_full() {
    let (_disk, mut fs) = mounted(32);
    for i in 0..FILE_MAX_COUNT {
        fs.create(&format!("file{i}")).unwrap();
    }
    assert_eq!(0, fs.free_dir_slots().unwrap());
    assert_eq!(Err(Error::ResourceExhausted), fs.create("one_more"));

    fs.delete("file7").unwrap();
    fs.create("one_more").unwrap();
    // 复用第一个空闲目录项
    assert_eq!("one_more", fs.ls().unwrap()[7].name);
}

#[test]
fn delete_releases_chain() {
    let (_disk, mut fs) = mounted(32);
    let fd = create_with(&mut fs, "big", &pattern(3 * BLOCK_SIZE + 1, 2));
    create_with(&mut fs, "small", b"tiny");
    fs.close(fd).unwrap();

    assert_eq!(4, fs.chain("big").unwrap().len());
    let free = fs.free_data_blocks().unwrap();
    let slots = fs.free_dir_slots().unwrap();

    fs.delete("big").unwrap();
    assert_eq!(free + 4, fs.free_data_blocks().unwrap());
    assert_eq!(slots + 1, fs.free_dir_slots().unwrap());
    assert_eq!(Err(Error::NotFound), fs.chain("big"));
    assert_eq!(Err(Error::NotFound), fs.delete("big"));
    assert_blocks_conserved(&fs);
}

#[test]
fn delete_busy_file() {
    let (_disk, mut fs) = mounted(32);
    let first = create_with(&mut fs, "busy", &pattern(5000, 3));
    let second = fs.open("busy").unwrap();
    let before = (fs.ls().unwrap(), fs.free_data_blocks().unwrap());

    assert_eq!(Err(Error::Conflict), fs.delete("busy"));
    fs.close(first).unwrap();
    assert_eq!(Err(Error::Conflict), fs.delete("busy"));
    assert_eq!(before, (fs.ls().unwrap(), fs.free_data_blocks().unwrap()));

    fs.close(second).unwrap();
    fs.delete("busy").unwrap();
    assert!(fs.ls().unwrap().is_empty());
    assert_eq!(31, fs.free_data_blocks().unwrap());
}

#[test]
fn delete_empty_file() {
    let (_disk, mut fs) = mounted(32);
    fs.create("empty").unwrap();
    fs.delete("empty").unwrap();
    assert_eq!(31, fs.free_data_blocks().unwrap());
    assert_eq!(FILE_MAX_COUNT, fs.free_dir_slots().unwrap());
}

#[test]
fn listing_order_and_format() {
    let (_disk, mut fs) = mounted(32);
    let fd = create_with(&mut fs, "a.txt", &pattern(5000, 4));
    fs.close(fd).unwrap();
    fs.create("b.txt").unwrap();

    let lines: Vec<String> = fs.ls().unwrap().iter().map(|f| f.to_string()).collect();
    assert_eq!(
        ["file: a.txt, size: 5000, data_blk: 1", "file: b.txt, size: 0, data_blk: 65535"],
        lines.as_slice()
    );
}

#[test]
fn open_rules() {
    let (_disk, mut fs) = mounted(32);
    assert_eq!(Err(Error::NotFound), fs.open("missing"));
    assert_eq!(Err(Error::InvalidArgument), fs.open(""));
    assert_eq!(Err(Error::InvalidArgument), fs.open("name_is_too_long"));

    fs.create("f").unwrap();
    let fds: Vec<_> = (0..OPEN_MAX_COUNT).map(|_| fs.open("f").unwrap()).collect();
    assert_eq!(Err(Error::ResourceExhausted), fs.open("f"));

    fs.close(fds[5]).unwrap();
    assert_eq!(fds[5], fs.open("f").unwrap());
}

#[test]
fn close_twice() {
    let (_disk, mut fs) = mounted(32);
    fs.create("f").unwrap();
    let fd = fs.open("f").unwrap();
    assert_eq!(Ok(()), fs.close(fd));
    assert_eq!(Err(Error::InvalidArgument), fs.close(fd));
    assert_eq!(Err(Error::InvalidArgument), fs.stat(fd));
    assert_eq!(Err(Error::InvalidArgument), fs.close(OPEN_MAX_COUNT.into()));
    assert!(fs.unmount().is_ok());
}
