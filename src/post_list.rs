use std::{fs, io};
use std::path::{Path, PathBuf};

use spdlog::debug;

pub struct PostList {
    pub root_dir: PathBuf,
}

impl PostList {
    pub fn new(root_dir: &Path) -> PostList {
        PostList {
            root_dir: root_dir.to_path_buf(),
        }
    }

    /// Directories right under the root, in the order the filesystem lists them.
    pub fn retrieve_dirs(&self) -> io::Result<Vec<PathBuf>> {
        let mut dirs: Vec<PathBuf> = vec![];
        let entries = fs::read_dir(self.root_dir.as_path())?;
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            } else {
                debug!("Skipping non directory entry {}", entry.path().display());
            }
        }
        Ok(dirs)
    }

    pub fn retrieve_sorted_dirs(&self) -> io::Result<Vec<PathBuf>> {
        let mut dirs = self.retrieve_dirs()?;
        dirs.sort();
        Ok(dirs)
    }
}

pub fn dir_name(dir: &Path) -> io::Result<String> {
    match dir.file_name().and_then(|name| name.to_str()) {
        Some(name) => Ok(name.to_string()),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid directory name: {}", dir.display()),
        )),
    }
}
