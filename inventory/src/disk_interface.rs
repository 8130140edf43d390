use globwalk::{FileType, GlobWalkerBuilder};
use makegen_metrics::scoped_metric;
use std::{
    io::{Error, ErrorKind, Result},
    path::{Path, PathBuf},
};

pub trait DiskInterface {
    /// Names of the regular files directly inside `dir` that end with `extension`, in whatever
    /// order the filesystem returns them.
    fn list_files<P: AsRef<Path>>(&self, dir: P, extension: &str) -> Result<Vec<String>>;

    fn size<P: AsRef<Path>>(&self, path: P) -> Result<u64>;
}

/// The real filesystem, with relative paths resolved against `root`.
#[derive(Debug, Clone)]
pub struct SystemDiskInterface {
    root: PathBuf,
}

impl SystemDiskInterface {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        SystemDiskInterface { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DiskInterface for SystemDiskInterface {
    fn list_files<P: AsRef<Path>>(&self, dir: P, extension: &str) -> Result<Vec<String>> {
        scoped_metric!("scan");
        let base = self.root.join(dir);
        let walker = GlobWalkerBuilder::new(&base, format!("*{}", extension))
            .max_depth(1)
            // Symlinked sources count; FILE then applies to the link target.
            .follow_links(true)
            .file_type(FileType::FILE)
            .build()
            .map_err(|e| Error::new(ErrorKind::Other, e))?;

        let mut names = Vec::new();
        for entry in walker {
            let entry = entry?;
            let name = entry.file_name().to_str().ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidData,
                    format!("non UTF-8 file name {:?}", entry.file_name()),
                )
            })?;
            if name.ends_with(extension) {
                names.push(name.to_owned());
            }
        }
        Ok(names)
    }

    fn size<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        scoped_metric!("stat");
        Ok(std::fs::metadata(self.root.join(path))?.len())
    }
}
