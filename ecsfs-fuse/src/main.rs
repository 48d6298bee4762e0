mod block_file;
mod cli;

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use block_dev::BlockDevice;
use clap::Parser;
use ecsfs::{BLOCK_SIZE, FileSystem, SuperBlock};

pub use self::{
    block_file::BlockFile,
    cli::{Cli, Command, VolumeCommand},
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = Cli::parse();
    log::info!("disk={:?}", cli.disk);

    match cli.command {
        Command::Make { data_blocks } => make(&cli.disk, data_blocks),
        Command::Volume(command) => {
            let fd = OpenOptions::new().read(true).write(true).open(&cli.disk)?;
            let block_dev: Arc<dyn BlockDevice> = Arc::new(BlockFile::new(fd)?);
            let mut fs = FileSystem::mount(block_dev)?;

            let result = run(&mut fs, command);
            fs.unmount()?;
            result
        }
    }
}

fn make(disk: &Path, data_blocks: usize) -> Result<(), Box<dyn Error>> {
    let total_blocks = SuperBlock::total_for(data_blocks);
    let fd = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(disk)?;
    fd.set_len((total_blocks * BLOCK_SIZE) as u64)?;

    let block_dev = BlockFile::new(fd)?;
    let sb = ecsfs::format(&block_dev)?;
    block_dev.close()?;
    println!(
        "Created virtual disk '{}' with '{}' data blocks",
        disk.display(),
        sb.data_blocks()
    );
    Ok(())
}

fn run(fs: &mut FileSystem, command: VolumeCommand) -> Result<(), Box<dyn Error>> {
    match command {
        VolumeCommand::Info => {
            println!("FS Info:");
            print!("{}", fs.info()?);
        }
        VolumeCommand::Ls => {
            println!("FS Ls:");
            for file in fs.ls()? {
                println!("{file}");
            }
        }
        VolumeCommand::Add { host_file } => {
            let name = host_file
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or("host file name is not valid UTF-8")?;
            let data = fs::read(&host_file)?;

            fs.create(name)?;
            let fd = fs.open(name)?;
            let written = fs.write(fd, &data);
            fs.close(fd)?;
            println!("Wrote file '{name}' ({}/{} bytes)", written?, data.len());
        }
        VolumeCommand::Rm { name } => {
            fs.delete(&name)?;
            println!("Removed file '{name}'");
        }
        VolumeCommand::Cat { name } => {
            let fd = fs.open(&name)?;
            let read = fs.stat(fd).and_then(|size| {
                let mut data = vec![0; size];
                let read = fs.read(fd, &mut data)?;
                data.truncate(read);
                Ok(data)
            });
            fs.close(fd)?;
            let data = read?;
            io::stdout().write_all(&data)?;
        }
        VolumeCommand::Stat { name } => {
            let fd = fs.open(&name)?;
            let size = fs.stat(fd);
            fs.close(fd)?;
            println!("Size of file '{name}' is {} bytes", size?);
        }
    }

    Ok(())
}
