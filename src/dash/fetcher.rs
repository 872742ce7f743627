// Retrieval of the sources.

use async_trait::async_trait;
use futures::future::join_all;

use crate::dash::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RetrieveError {
    #[snafu(display("transport error: {source}"))]
    Transport { source: reqwest::Error },
    #[snafu(display("HTTP {status} {reason}"))]
    Status { status: u16, reason: String },
    #[snafu(display("cannot read file {path}: {source}"))]
    ReadingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("invalid JSON: {source}"))]
    Decoding { source: serde_json::Error },
}

/// Retrieves one JSON document.
#[async_trait]
pub trait Retrieve: Send + Sync {
    async fn retrieve(&self, address: &str) -> Result<JSValue, RetrieveError>;
}

/// Retrieves URLs over HTTP and everything else from the file system.
pub struct HttpRetriever {
    client: reqwest::Client,
}

impl HttpRetriever {
    pub fn new() -> Result<HttpRetriever, RetrieveError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("campaign-dashboard/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context(TransportSnafu {})?;
        Ok(HttpRetriever { client })
    }

    async fn get(&self, url: &str) -> Result<JSValue, RetrieveError> {
        let response = self.client.get(url).send().await.context(TransportSnafu {})?;
        let status = response.status();
        if !status.is_success() {
            return StatusSnafu {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or(""),
            }
            .fail();
        }
        let body = response.bytes().await.context(TransportSnafu {})?;
        serde_json::from_slice(&body).context(DecodingSnafu {})
    }

    async fn read_file(&self, path: &str) -> Result<JSValue, RetrieveError> {
        let body = tokio::fs::read(path)
            .await
            .context(ReadingFileSnafu { path })?;
        serde_json::from_slice(&body).context(DecodingSnafu {})
    }
}

#[async_trait]
impl Retrieve for HttpRetriever {
    async fn retrieve(&self, address: &str) -> Result<JSValue, RetrieveError> {
        debug!("retrieve: {}", address);
        if address.starts_with("http://") || address.starts_with("https://") {
            self.get(address).await
        } else {
            self.read_file(address).await
        }
    }
}

/// Retrieves all the addresses at once.
///
/// All the retrievals run to completion. If any of them failed, the first
/// failure (in the order of the addresses) is returned and nothing else.
/// Otherwise the documents come back in the order of the addresses.
pub async fn fetch_all<R: Retrieve + ?Sized>(
    retriever: &R,
    addresses: &[String],
) -> DashResult<Vec<JSValue>> {
    info!("fetch_all: retrieving {} sources", addresses.len());
    let results = join_all(addresses.iter().map(|a| retriever.retrieve(a))).await;

    for (address, res) in addresses.iter().zip(results.iter()) {
        if let Err(e) = res {
            warn!("fetch_all: {} failed: {}", address, e);
        }
    }

    let mut payloads: Vec<JSValue> = Vec::with_capacity(results.len());
    for (address, res) in addresses.iter().zip(results) {
        let js = res.context(SourceUnavailableSnafu {
            address: address.clone(),
        })?;
        payloads.push(js);
    }
    debug!("fetch_all: retrieved {} documents", payloads.len());
    Ok(payloads)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves documents from memory. Unknown addresses are a 404.
    pub struct MemoryRetriever {
        docs: HashMap<String, JSValue>,
        delays: HashMap<String, u64>,
        pub calls: Mutex<Vec<String>>,
    }

    impl MemoryRetriever {
        pub fn new(docs: &[(&str, JSValue)]) -> MemoryRetriever {
            MemoryRetriever {
                docs: docs
                    .iter()
                    .map(|(a, js)| (a.to_string(), js.clone()))
                    .collect(),
                delays: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_delay(mut self, address: &str, millis: u64) -> MemoryRetriever {
            self.delays.insert(address.to_string(), millis);
            self
        }

        pub fn called(&self) -> Vec<String> {
            let mut res = self.calls.lock().unwrap().clone();
            res.sort();
            res
        }
    }

    #[async_trait]
    impl Retrieve for MemoryRetriever {
        async fn retrieve(&self, address: &str) -> Result<JSValue, RetrieveError> {
            if let Some(ms) = self.delays.get(address) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            self.calls.lock().unwrap().push(address.to_string());
            match self.docs.get(address) {
                Some(js) => Ok(js.clone()),
                None => StatusSnafu {
                    status: 404u16,
                    reason: "Not Found",
                }
                .fail(),
            }
        }
    }
}
