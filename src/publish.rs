use std::fs;
use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Local};
use log::{error, info};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{config::UploadingConfig, dataset::Dataset, error::PublishError, requests::RequestClient};

/// Body of a create-or-update write to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRequest {
    pub message: String,
    /// Base64 of the UTF-8 JSON document.
    pub content: String,
    /// Revision being replaced; absent when creating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl PutRequest {
    pub fn new(message: String, document: &str, sha: Option<String>) -> Self {
        Self {
            message,
            content: BASE64.encode(document.as_bytes()),
            sha,
        }
    }
}

/// A single named document with revision-checked writes.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Revision marker of the stored document, `None` if it does not exist yet.
    async fn current_revision(&self) -> Result<Option<String>, PublishError>;

    async fn put(&self, request: &PutRequest) -> Result<(), PublishError>;
}

/// The GitHub repository contents endpoint for one file.
pub struct GithubContentsStore {
    client: RequestClient,
    url: String,
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
}

impl GithubContentsStore {
    pub fn new(config: &UploadingConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: RequestClient::new(&config.token)?,
            url: config.contents_url.clone(),
        })
    }
}

impl RemoteStore for GithubContentsStore {
    async fn current_revision(&self) -> Result<Option<String>, PublishError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Error getting current file: {body}");
            return Err(PublishError::Status { status, body });
        }
        let contents: ContentsResponse = response.json().await?;
        Ok(Some(contents.sha))
    }

    async fn put(&self, request: &PutRequest) -> Result<(), PublishError> {
        let response = self.client.put(&self.url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Status { status, body });
        }
        Ok(())
    }
}

/// The JSON document for `dataset`: 4-space indent, keys in insertion order.
/// Both the local file and the upload are produced from this.
pub fn encode_dataset(dataset: &Dataset) -> Result<String, PublishError> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    dataset.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

pub fn save_local(document: &str, path: &Path) -> Result<(), PublishError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, document)?;
    Ok(())
}

pub fn commit_message(at: DateTime<Local>) -> String {
    format!("Update test times - {}", at.format("%Y-%m-%d %H:%M:%S"))
}

/// Create the document if the store has none, otherwise update the current
/// revision.
pub async fn upsert(
    store: &impl RemoteStore,
    document: &str,
    at: DateTime<Local>,
) -> Result<(), PublishError> {
    let sha = store.current_revision().await?;
    match &sha {
        Some(_) => info!("Successfully got current file SHA"),
        None => info!("File doesn't exist yet, will create new"),
    }

    let request = PutRequest::new(commit_message(at), document, sha);
    info!("Attempting to update file...");
    store.put(&request).await?;
    info!("Successfully updated remote store");
    Ok(())
}

#[derive(Debug)]
pub struct PublishReport {
    pub local: Result<PathBuf, PublishError>,
    pub remote: Result<(), PublishError>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.local.is_ok() && self.remote.is_ok()
    }
}

/// Saves the dataset locally, then pushes the same bytes to the remote store.
pub struct PublishAdapter<S> {
    store: S,
    local_path: PathBuf,
}

impl<S: RemoteStore> PublishAdapter<S> {
    pub fn new(store: S, local_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            local_path: local_path.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// A failed local save does not stop the upload, and a failed upload
    /// leaves the local file in place. Only an unencodable dataset is an error.
    pub async fn publish(&self, dataset: &Dataset) -> Result<PublishReport, PublishError> {
        let document = encode_dataset(dataset)?;

        let local = save_local(&document, &self.local_path).map(|()| self.local_path.clone());
        match &local {
            Ok(path) => info!("Data saved locally to {}", path.display()),
            Err(e) => error!("Failed to save data locally: {e}"),
        }

        let remote = upsert(&self.store, &document, Local::now()).await;
        if let Err(e) = &remote {
            error!("Error updating remote store: {e}");
        }

        Ok(PublishReport { local, remote })
    }
}
