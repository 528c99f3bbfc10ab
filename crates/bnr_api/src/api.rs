use log::debug;
use std::time::Duration;

use crate::acquisition::ArchiveSource;
use crate::error::BnrError;

pub const BNR_ARCHIVE_BASE_URL: &str = "https://www.bnr.ro/files/xml/years/nbrfxrates";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct BnrAPI {
    archive_base_url: String,
    client: reqwest::Client,
}

impl BnrAPI {
    pub fn new() -> Result<Self, BnrError> {
        return BnrAPI::with_base_url(BNR_ARCHIVE_BASE_URL, DEFAULT_TIMEOUT);
    }

    pub fn with_base_url(archive_base_url: &str, timeout: Duration) -> Result<Self, BnrError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        return Ok(BnrAPI {
            archive_base_url: archive_base_url.trim_end_matches('/').to_string(),
            client,
        });
    }

    pub fn archive_url(&self, year: i32) -> String {
        format!("{}{}.xml", self.archive_base_url, year)
    }
}

impl ArchiveSource for BnrAPI {
    fn document_name(&self, year: i32) -> String {
        self.archive_url(year)
    }

    async fn fetch_archive(&self, year: i32) -> Result<String, BnrError> {
        let url = self.archive_url(year);

        debug!("fetch_archive | url: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BnrError::Retrieval {
                url,
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
