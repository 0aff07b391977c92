use bytes::Bytes;

/// Image extensions the conversion service will accept.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// One file as handed over by the selection mechanism, before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    /// Path relative to the selection root, e.g. `volume-01/page-001.jpg`.
    pub relative_path: String,
    pub bytes: Bytes,
}

impl RawFile {
    pub fn new(relative_path: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            relative_path: relative_path.into(),
            bytes: bytes.into(),
        }
    }
}

/// Opaque file contents with the name they were selected under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file: FileBlob,
    pub directory: String,
}

impl SelectedFile {
    pub fn file_name(&self) -> &str {
        &self.file.name
    }

    /// Multipart key the file is uploaded under: `<directory>/<filename>`.
    pub fn upload_key(&self) -> String {
        format!("{}/{}", self.directory, self.file.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("'{path}' has no directory component; select a directory, not loose files")]
    InvalidSelection { path: String },
    #[error("'{path}' does not name a file")]
    EmptyFileName { path: String },
}

/// Ordered collection of selected files, grouped by top-level directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileGroupSet {
    files: Vec<SelectedFile>,
}

impl FileGroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a selection. Either every file is accepted or none is.
    pub fn add_files(&mut self, raw: Vec<RawFile>) -> Result<usize, SelectionError> {
        let mut accepted = Vec::with_capacity(raw.len());
        for entry in raw {
            let (directory, name) = split_relative_path(&entry.relative_path)?;
            accepted.push(SelectedFile {
                file: FileBlob {
                    name: name.to_string(),
                    bytes: entry.bytes,
                },
                directory: directory.to_string(),
            });
        }
        let count = accepted.len();
        self.files.extend(accepted);
        Ok(count)
    }

    /// Drops every file selected from `dir`. Unknown directories are ignored.
    pub fn remove_directory(&mut self, dir: &str) -> usize {
        let before = self.files.len();
        self.files.retain(|file| file.directory != dir);
        before - self.files.len()
    }

    /// Directories in first-seen order, without repeats.
    pub fn distinct_directories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for file in &self.files {
            if !seen.iter().any(|dir| dir == &file.directory) {
                seen.push(file.directory.clone());
            }
        }
        seen
    }

    /// Upper bound of the progress counter reported for a job over this set.
    pub fn progress_scale(&self) -> u32 {
        self.distinct_directories().len() as u32 + 1
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn files_in<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a SelectedFile> + 'a {
        self.files.iter().filter(move |file| file.directory == dir)
    }

    /// Files the service will skip because of their extension.
    pub fn unsupported_files(&self) -> Vec<&SelectedFile> {
        self.files
            .iter()
            .filter(|file| !is_supported_image(file.file_name()))
            .collect()
    }

    /// Upload keys shared by more than one file, in first-seen order.
    ///
    /// Files with the same name in different subfolders of one directory
    /// collide; the service keeps only the first part per key.
    pub fn duplicate_keys(&self) -> Vec<String> {
        let keys: Vec<String> = self.files.iter().map(SelectedFile::upload_key).collect();
        let mut duplicates: Vec<String> = Vec::new();
        for (index, key) in keys.iter().enumerate() {
            if keys[..index].contains(key) && !duplicates.contains(key) {
                duplicates.push(key.clone());
            }
        }
        duplicates
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

pub fn is_supported_image(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => SUPPORTED_EXTENSIONS
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

fn split_relative_path(path: &str) -> Result<(&str, &str), SelectionError> {
    let trimmed = path.trim_start_matches(['/', '\\']);
    let Some((directory, rest)) = trimmed.split_once(['/', '\\']) else {
        return Err(SelectionError::InvalidSelection {
            path: path.to_string(),
        });
    };
    if directory.is_empty() {
        return Err(SelectionError::InvalidSelection {
            path: path.to_string(),
        });
    }
    let name = rest.rsplit(['/', '\\']).next().unwrap_or(rest);
    if name.is_empty() {
        return Err(SelectionError::EmptyFileName {
            path: path.to_string(),
        });
    }
    Ok((directory, name))
}
