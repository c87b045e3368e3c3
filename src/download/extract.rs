//! Gzip tarball extraction into staging directories

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use log::debug;
use tar::{Archive, EntryType};

use crate::error::{BuildError, Result};

/// Unpack a `.tar.gz` byte stream under `dest`
///
/// Directories and regular files are materialized with their mode bits;
/// symlinks and other entry kinds are skipped. Files that already exist are
/// truncated, stale files not in the archive are left alone.
pub async fn extract_tar_gz(data: Vec<u8>, dest: &Path) -> Result<()> {
    let owned = dest.to_path_buf();

    // CPU-bound decode runs off the async workers
    tokio::task::spawn_blocking(move || unpack(&data, &owned))
        .await
        .map_err(|e| BuildError::Archive {
            dest: dest.to_path_buf(),
            source: io::Error::other(e),
        })?
}

fn unpack(data: &[u8], dest: &Path) -> Result<()> {
    let archive_err = |source: io::Error| BuildError::Archive {
        dest: dest.to_path_buf(),
        source,
    };

    let mut archive = Archive::new(GzDecoder::new(data));
    let mut count = 0usize;

    for entry in archive.entries().map_err(archive_err)? {
        let mut entry = entry.map_err(archive_err)?;
        let name = entry.path().map_err(archive_err)?.into_owned();
        let target = dest.join(checked_relative(&name).map_err(archive_err)?);

        match entry.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&target).map_err(|e| BuildError::io(&target, e))?;
            }
            EntryType::Regular | EntryType::Continuous => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
                }
                let mode = entry.header().mode().map_err(archive_err)?;
                let mut file = create_with_mode(&target, mode)?;
                copy_entry(&mut entry, &mut file, dest, &target)?;
                apply_mode(&target, mode)?;
                count += 1;
            }
            other => debug!("Skipping {:?} entry {}", other, name.display()),
        }
    }

    debug!("Unpacked {} files into {}", count, dest.display());
    Ok(())
}

/// Stream one entry's content; read failures belong to the archive,
/// write failures to the file being written
fn copy_entry<R: Read, W: Write>(
    entry: &mut R,
    file: &mut W,
    dest: &Path,
    target: &Path,
) -> Result<u64> {
    let mut buf = [0u8; 8192];
    let mut written = 0u64;
    loop {
        let n = match entry.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(BuildError::Archive {
                    dest: dest.to_path_buf(),
                    source,
                });
            }
        };
        file.write_all(&buf[..n]).map_err(|e| BuildError::io(target, e))?;
        written += n as u64;
    }
    file.flush().map_err(|e| BuildError::io(target, e))?;
    Ok(written)
}

/// Reject absolute paths and parent traversal in entry names
fn checked_relative(name: &Path) -> io::Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in name.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("entry escapes destination: {}", name.display()),
                ));
            }
        }
    }
    Ok(clean)
}

#[cfg(unix)]
fn create_with_mode(path: &Path, mode: u32) -> Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode & 0o7777)
        .open(path)
        .map_err(|e| BuildError::io(path, e))
}

#[cfg(not(unix))]
fn create_with_mode(path: &Path, _mode: u32) -> Result<fs::File> {
    fs::File::create(path).map_err(|e| BuildError::io(path, e))
}

/// Re-apply the exact mode; `open` is filtered through the umask
#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
        .map_err(|e| BuildError::io(path, e))
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tar::{Builder, Header};

    /// Entry for [`tar_gz`]: `(path, mode, Some(content))` for files, `None` for dirs
    pub type TarEntry<'a> = (&'a str, u32, Option<&'a str>);

    pub fn tar_gz(entries: &[TarEntry<'_>]) -> Vec<u8> {
        let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, mode, content) in entries {
            let mut header = Header::new_gnu();
            header.set_mode(*mode);
            match content {
                Some(content) => {
                    header.set_entry_type(tar::EntryType::Regular);
                    header.set_size(content.len() as u64);
                    header.set_cksum();
                    builder.append_data(&mut header, path, content.as_bytes()).unwrap();
                }
                None => {
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_size(0);
                    header.set_cksum();
                    builder.append_data(&mut header, path, std::io::empty()).unwrap();
                }
            }
        }
        builder.into_inner().unwrap().finish().unwrap()
    }
}
