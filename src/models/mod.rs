use bytes::Bytes;

/// A file received from a client, held in memory until it is stored.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Client-supplied filename, used verbatim as the object key
    pub file_name: String,
    pub content: Bytes,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    pub fn object_key(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}
