use crate::selection::{FileBlob, FileGroupSet};

/// Multipart field carrying the manga-mode toggle.
pub const MANGA_MODE_FIELD: &str = "manga_mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmissionOptions {
    pub manga_mode: bool,
}

impl SubmissionOptions {
    /// Flat `(name, value)` pairs sent next to the files.
    pub fn fields(&self) -> Vec<(String, String)> {
        vec![(MANGA_MODE_FIELD.to_string(), self.manga_mode.to_string())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    /// `<directory>/<filename>`
    pub key: String,
    pub file: FileBlob,
}

/// Transport-neutral multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub parts: Vec<PayloadPart>,
    pub fields: Vec<(String, String)>,
}

impl Payload {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|part| part.key.as_str())
    }

    pub fn total_bytes(&self) -> u64 {
        self.parts.iter().map(|part| part.file.bytes.len() as u64).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("nothing to submit: no files selected")]
    EmptySelection,
}

/// Builds the submission body, directory-major and in insertion order within
/// each directory.
pub fn encode(files: &FileGroupSet, options: &SubmissionOptions) -> Result<Payload, EncodingError> {
    if files.is_empty() {
        return Err(EncodingError::EmptySelection);
    }

    let mut parts = Vec::with_capacity(files.len());
    for directory in files.distinct_directories() {
        for selected in files.files_in(&directory) {
            parts.push(PayloadPart {
                key: selected.upload_key(),
                file: selected.file.clone(),
            });
        }
    }

    Ok(Payload {
        parts,
        fields: options.fields(),
    })
}
