#[derive(Debug, thiserror::Error)]
pub enum BnrError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not retrieve {url}: status {status}")]
    Retrieval { url: String, status: u16 },

    #[error("Could not parse {document}: {source}")]
    Parse {
        document: String,
        #[source]
        source: quick_xml::Error,
    },
}
