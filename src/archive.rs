//! Read-only access to the remote file archive.
//!
//! The pipeline only needs two things from the archive: the names in a
//! directory, and the bytes of one file. [`RemoteArchive`] is that seam;
//! [`HttpArchive`] implements it against the UCSB directory index pages.

use std::{sync::OnceLock, time::Duration};

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use log::debug;
use regex::Regex;

use crate::error::{ChirpsError, Result};

pub const DEFAULT_BASE_URL: &str = "https://data.chc.ucsb.edu/products/CHIRPS-2.0";

/// Chunks of a remote file as they arrive.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

#[async_trait]
pub trait RemoteArchive: Send + Sync {
    /// Raw entry names in `subdir`.
    async fn list(&self, subdir: &str) -> Result<Vec<String>>;

    /// Opens `file_name` in `subdir` for reading.
    async fn open(&self, subdir: &str, file_name: &str) -> Result<ByteStream>;
}

pub struct HttpArchive {
    client: reqwest::Client,
    base_url: String,
}

impl HttpArchive {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(HttpArchive {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, subdir: &str, file_name: &str) -> String {
        format!("{}/{}/{}", self.base_url, subdir.trim_matches('/'), file_name)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ChirpsError::Network(format!("Could not access {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(ChirpsError::Network(format!(
                "Could not access {}: {}",
                url,
                response.status()
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl RemoteArchive for HttpArchive {
    async fn list(&self, subdir: &str) -> Result<Vec<String>> {
        let url = self.url(subdir, "");
        debug!("Listing {}", url);

        let page = self.get(&url).await?.text().await?;

        Ok(extract_links(&page))
    }

    async fn open(&self, subdir: &str, file_name: &str) -> Result<ByteStream> {
        let url = self.url(subdir, file_name);
        debug!("Fetching {}", url);

        let response = self.get(&url).await?;

        Ok(response
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .map_err(ChirpsError::from)
            .boxed())
    }
}

/// Entry names linked from an HTML directory index.
///
/// Index pages may shorten the visible link text of long names, so the last
/// segment of the `href` is used. Sort links (`?C=M;O=A`) and links to parent
/// directories have no segment and are dropped.
pub fn extract_links(page: &str) -> Vec<String> {
    static ANCHOR: OnceLock<Regex> = OnceLock::new();
    let anchor = ANCHOR.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>"#).unwrap()
    });

    anchor
        .captures_iter(page)
        .filter_map(|cap| {
            let href = cap[1].split(['?', '#']).next().unwrap_or("");
            let name = href.rsplit('/').next().unwrap_or("");
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

// -- Test double -------------------------------------------------------------

#[cfg(test)]
pub(crate) mod memory {
    use std::{
        collections::{HashMap, HashSet},
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    use flate2::{write::GzEncoder, Compression};

    use super::*;

    pub fn gzipped(content: &[u8]) -> Vec<u8> {
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap()
    }

    /// In-memory archive with call counters and scripted failures.
    #[derive(Default)]
    pub struct MemoryArchive {
        listing: Vec<String>,
        files: HashMap<String, Vec<u8>>,
        broken: HashSet<String>,
        flaky: Mutex<HashMap<String, usize>>,
        offline: bool,
        pub list_calls: AtomicUsize,
        pub open_calls: AtomicUsize,
    }

    impl MemoryArchive {
        pub fn new() -> Self {
            Self::default()
        }

        /// Appears in the listing but can't be fetched.
        pub fn with_listed(mut self, name: &str) -> Self {
            self.listing.push(name.to_string());
            self
        }

        pub fn with_file(mut self, name: &str, content: Vec<u8>) -> Self {
            self.listing.push(name.to_string());
            self.files.insert(name.to_string(), content);
            self
        }

        /// Fails partway through the byte stream.
        pub fn with_broken_file(mut self, name: &str, content: Vec<u8>) -> Self {
            self.broken.insert(name.to_string());
            self.with_file(name, content)
        }

        /// Refuses the first `failures` opens of `name`.
        pub fn with_flaky_file(mut self, name: &str, content: Vec<u8>, failures: usize) -> Self {
            self.flaky
                .get_mut()
                .unwrap()
                .insert(name.to_string(), failures);
            self.with_file(name, content)
        }

        pub fn offline(mut self) -> Self {
            self.offline = true;
            self
        }

        pub fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        pub fn open_calls(&self) -> usize {
            self.open_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteArchive for MemoryArchive {
        async fn list(&self, _subdir: &str) -> Result<Vec<String>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                return Err(ChirpsError::Network("connection refused".into()));
            }
            Ok(self.listing.clone())
        }

        async fn open(&self, _subdir: &str, file_name: &str) -> Result<ByteStream> {
            self.open_calls.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                return Err(ChirpsError::Network("connection refused".into()));
            }

            if let Some(left) = self.flaky.lock().unwrap().get_mut(file_name) {
                if *left > 0 {
                    *left -= 1;
                    return Err(ChirpsError::Network("connection reset".into()));
                }
            }

            let content = self
                .files
                .get(file_name)
                .ok_or_else(|| ChirpsError::Network(format!("{}: 404 Not Found", file_name)))?;

            let mut chunks: Vec<Result<Vec<u8>>> =
                content.chunks(16).map(|c| Ok(c.to_vec())).collect();
            if self.broken.contains(file_name) {
                chunks.truncate(1);
                chunks.push(Err(ChirpsError::Network("connection closed".into())));
            }

            Ok(futures::stream::iter(chunks).boxed())
        }
    }
}

// -- Tests -------------------------------------------------------------------
