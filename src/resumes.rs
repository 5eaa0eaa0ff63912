// src/resumes.rs
//! Resume repository: upload, list, detail and delete against
//! `/api/resumes`, keeping a mirror of the user's collection.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::service_client::{Failure, RESUMES_ENDPOINT};
use crate::core::ServiceClient;
use crate::error::{ClientError, ClientResult, ValidationError};
use crate::session::SessionContext;
use crate::types::{DeleteAck, ResumeRecord};

/// Largest upload accepted: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Where the bytes of an upload come from. Content is only read once the
/// size check has passed.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

impl FileSource {
    async fn read(self) -> ClientResult<Vec<u8>> {
        match self {
            FileSource::Memory(bytes) => Ok(bytes),
            FileSource::Path(path) => tokio::fs::read(&path).await.map_err(|e| {
                ClientError::Upload(format!("Failed to read file {}: {}", path.display(), e))
            }),
        }
    }
}

/// A resume file picked from disk, with the name and size reported by the
/// filesystem.
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub source: FileSource,
    pub filename: String,
    pub size_bytes: u64,
}

impl PickedFile {
    pub async fn from_path(path: &Path) -> ClientResult<Self> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            ClientError::Upload(format!("Failed to read file {}: {}", path.display(), e))
        })?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| ClientError::Upload(format!("Invalid file name: {}", path.display())))?;

        Ok(Self {
            source: FileSource::Path(path.to_path_buf()),
            filename,
            size_bytes: metadata.len(),
        })
    }
}

pub fn check_upload_size(size_bytes: u64) -> Result<(), ValidationError> {
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge { size_bytes });
    }
    Ok(())
}

pub struct ResumeRepository {
    api: ServiceClient,
    resumes: Vec<ResumeRecord>,
}

impl ResumeRepository {
    pub fn new(api: ServiceClient) -> Self {
        Self {
            api,
            resumes: Vec::new(),
        }
    }

    /// The collection as of the last successful fetch, in backend order.
    pub fn resumes(&self) -> &[ResumeRecord] {
        &self.resumes
    }

    /// Upload a PDF and refresh the collection. The size limit is enforced
    /// before the session is consulted or any request is made.
    pub async fn upload(
        &mut self,
        session: &SessionContext,
        file: FileSource,
        filename: &str,
        size_bytes: u64,
    ) -> ClientResult<ResumeRecord> {
        check_upload_size(size_bytes)?;
        let token = session.bearer()?;

        let content = file.read().await?;
        info!("Uploading resume {} ({} bytes)", filename, size_bytes);

        let record: ResumeRecord = self
            .api
            .post_pdf(
                self.api.url(RESUMES_ENDPOINT)?,
                token,
                filename,
                content,
                Failure::UPLOAD,
            )
            .await?;
        info!("Uploaded resume {} as {}", record.filename, record.id);

        self.refresh(session).await?;
        Ok(record)
    }

    pub async fn upload_picked(
        &mut self,
        session: &SessionContext,
        file: PickedFile,
    ) -> ClientResult<ResumeRecord> {
        let PickedFile {
            source,
            filename,
            size_bytes,
        } = file;
        self.upload(session, source, &filename, size_bytes).await
    }

    /// Fetch the collection and replace the local mirror.
    pub async fn list(&mut self, session: &SessionContext) -> ClientResult<&[ResumeRecord]> {
        self.refresh(session).await?;
        Ok(&self.resumes)
    }

    pub async fn get_detail(&self, session: &SessionContext, id: &str) -> ClientResult<ResumeRecord> {
        let token = session.bearer()?;
        let url = self.api.item_url(RESUMES_ENDPOINT, id)?;
        self.api.get_json(url, token, Failure::DETAIL).await
    }

    /// Delete a resume and refresh the collection. Deleting an id that is
    /// already gone is reported however the backend reports it.
    pub async fn delete(&mut self, session: &SessionContext, id: &str) -> ClientResult<DeleteAck> {
        let token = session.bearer()?;
        let url = self.api.item_url(RESUMES_ENDPOINT, id)?;

        let ack = DeleteAck::from(self.api.delete(url, token, Failure::DELETE).await?);
        if !ack.success {
            warn!("Backend acknowledged delete of {} without success", id);
        }
        info!("Deleted resume {}", id);

        self.refresh(session).await?;
        Ok(ack)
    }

    async fn refresh(&mut self, session: &SessionContext) -> ClientResult<()> {
        let token = session.bearer()?;
        let resumes: Vec<ResumeRecord> = self
            .api
            .get_json(self.api.url(RESUMES_ENDPOINT)?, token, Failure::LIST)
            .await?;
        info!("Loaded {} resumes", resumes.len());
        self.resumes = resumes;
        Ok(())
    }
}
