use serde::Deserialize;

const DEFAULT_HEALTHCHECK_URL: &str = "http://localhost:8080/healthcheck";

#[derive(Debug)]
enum CustomError {
    ReqwestError(String),
    NotOk,
    NoData,
}

#[derive(Debug, Deserialize)]
struct StatusJSON {
    status: String,
    records: usize,
    origin: Option<serde_json::Value>,
}

impl std::fmt::Display for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomError::ReqwestError(e) => write!(f, "Reqwest error: {}", e),
            CustomError::NotOk => write!(f, "Status code != 200 or no healthcheck"),
            CustomError::NoData => write!(f, "Service has no rate data loaded"),
        }
    }
}

impl From<reqwest::Error> for CustomError {
    fn from(err: reqwest::Error) -> CustomError {
        CustomError::ReqwestError(err.to_string())
    }
}

fn check(status: &StatusJSON) -> Result<(), CustomError> {
    if status.status != "ok" {
        return Err(CustomError::NotOk);
    }
    if status.records == 0 || status.origin.is_none() {
        return Err(CustomError::NoData);
    }
    Ok(())
}

fn main() -> Result<(), CustomError> {
    let url = std::env::var("BNR_RATES_HEALTHCHECK_URL")
        .unwrap_or_else(|_| DEFAULT_HEALTHCHECK_URL.to_string());
    let res = reqwest::blocking::get(&url)?;
    if res.status() != 200 {
        return Err(CustomError::NotOk);
    }
    let status: StatusJSON = res.json::<StatusJSON>()?;
    check(&status)
}
