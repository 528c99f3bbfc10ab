use bnr_api::{DataOrigin, acquisition, api::BNR_ARCHIVE_BASE_URL};
use chrono::{Local, NaiveDate};
use dotenvy::dotenv;
use log::{error, info, warn};
use rate_analysis::{
    Action, AppState, TableSort,
    chart::ChartSeries,
    export::{self, ExportError},
    format,
};
use rate_model::{Currency, DateRange};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use std::{env, process::exit};

use actix_web::{
    App, HttpResponse, HttpServer, Responder, get, http::header, middleware::Logger, post, web,
};

mod utils;

#[derive(Serialize)]
struct HealthcheckResponse {
    status: String,
    records: usize,
    origin: Option<DataOrigin>,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    records: usize,
    origin: Option<DataOrigin>,
    notice: Option<&'static str>,
}

#[derive(Serialize)]
struct StatCard {
    currency: Currency,
    latest_value: String,
    latest_change_percent: String,
    min: String,
    max: String,
    average: String,
}

#[derive(Serialize)]
struct StatsResponse {
    stats: Vec<StatCard>,
    notice: Option<&'static str>,
}

#[derive(Serialize)]
struct TableRowView {
    date: NaiveDate,
    currency: Currency,
    value: String,
    change_percent: String,
}

#[derive(Serialize)]
struct ChartResponse {
    series: Vec<ChartSeries>,
}

/// Optional view parameters; absent ones keep the stored defaults.
#[derive(Debug, Default, Deserialize)]
struct ViewQuery {
    currencies: Option<String>,
    start: Option<String>,
    end: Option<String>,
    search: Option<String>,
    sort: Option<String>,
    compare: Option<String>,
}

impl ViewQuery {
    fn actions(&self, current: &AppState) -> Vec<Action> {
        let mut actions = Vec::new();

        if let Some(currencies) = &self.currencies {
            actions.push(Action::SelectCurrencies(utils::parse_currencies(currencies)));
        }
        if self.start.is_some() || self.end.is_some() {
            let range = current.criteria().range;
            actions.push(Action::SetDateRange(DateRange::new(
                self.start
                    .as_deref()
                    .map_or(range.start, utils::parse_date_bound),
                self.end.as_deref().map_or(range.end, utils::parse_date_bound),
            )));
        }
        if let Some(search) = &self.search {
            actions.push(Action::SetSearch(utils::sanitize_search(search.clone())));
        }
        if let Some(sort) = &self.sort {
            actions.push(Action::SetSort(TableSort::from_key(sort)));
        }
        if let Some(compare) = &self.compare {
            actions.push(Action::SetComparison(utils::parse_currencies(compare)));
        }
        actions
    }

    /// Derived state for one request; the stored snapshot is left as is.
    fn view(&self, current: &AppState) -> AppState {
        self.actions(current)
            .into_iter()
            .fold(current.clone(), |state, action| state.apply(action))
    }
}

struct Store {
    state: RwLock<Arc<AppState>>,
    archive_url: String,
    timeout: Duration,
}

impl Store {
    fn new(state: AppState, config: &Config) -> Self {
        return Store {
            state: RwLock::new(Arc::new(state)),
            archive_url: config.archive_url.clone(),
            timeout: config.timeout,
        };
    }

    fn snapshot(&self) -> Arc<AppState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn dispatch(&self, action: Action) -> Arc<AppState> {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = Arc::new(guard.apply(action));
        *guard = next.clone();
        next
    }
}

#[get("/healthcheck")]
async fn healthcheck(store: web::Data<Store>) -> impl Responder {
    let state = store.snapshot();
    web::Json(HealthcheckResponse {
        status: "ok".to_string(),
        records: state.dataset().len(),
        origin: state.origin().cloned(),
    })
}

#[post("/refresh")]
async fn refresh(store: web::Data<Store>) -> impl Responder {
    let today = Local::now().date_naive();
    let acquisition = acquisition::load(&store.archive_url, store.timeout, today).await;
    if acquisition.is_synthetic() {
        warn!("refresh | serving simulated rates");
    }

    let state = store.dispatch(Action::DatasetLoaded(acquisition));
    web::Json(RefreshResponse {
        records: state.dataset().len(),
        origin: state.origin().cloned(),
        notice: state.notice(),
    })
}

#[get("/rates")]
async fn get_rates(query: web::Query<ViewQuery>, store: web::Data<Store>) -> impl Responder {
    let state = query.view(&store.snapshot());
    web::Json(state.filtered().to_vec())
}

#[get("/stats")]
async fn get_stats(query: web::Query<ViewQuery>, store: web::Data<Store>) -> impl Responder {
    let state = query.view(&store.snapshot());
    let stats = state
        .stats()
        .into_iter()
        .map(|s| StatCard {
            currency: s.currency,
            latest_value: format::value(s.latest_value),
            latest_change_percent: format::percent(s.latest_change_percent),
            min: format::value(s.min),
            max: format::value(s.max),
            average: format::value(s.average),
        })
        .collect();
    web::Json(StatsResponse {
        stats,
        notice: state.notice(),
    })
}

#[get("/table")]
async fn get_table(query: web::Query<ViewQuery>, store: web::Data<Store>) -> impl Responder {
    let state = query.view(&store.snapshot());
    let rows: Vec<TableRowView> = state
        .table()
        .into_iter()
        .map(|row| TableRowView {
            date: row.date,
            currency: row.currency,
            value: format::value(row.value),
            change_percent: format::percent(row.change_percent),
        })
        .collect();
    web::Json(rows)
}

#[get("/chart")]
async fn get_chart(query: web::Query<ViewQuery>, store: web::Data<Store>) -> impl Responder {
    let state = query.view(&store.snapshot());
    web::Json(ChartResponse {
        series: state.chart(),
    })
}

#[get("/comparison")]
async fn get_comparison(query: web::Query<ViewQuery>, store: web::Data<Store>) -> impl Responder {
    let state = query.view(&store.snapshot());
    web::Json(ChartResponse {
        series: state.comparison_chart(),
    })
}

#[get("/export.csv")]
async fn export_csv(query: web::Query<ViewQuery>, store: web::Data<Store>) -> HttpResponse {
    let state = query.view(&store.snapshot());
    match state.export_csv() {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    export::file_name(Local::now().date_naive())
                ),
            ))
            .body(csv),
        Err(ExportError::Empty) => HttpResponse::NotFound().json(StatusResponse {
            status: "no data to export".to_string(),
        }),
        Err(e) => {
            error!("export_csv | {}", e);
            HttpResponse::InternalServerError().json(StatusResponse {
                status: "export failed".to_string(),
            })
        }
    }
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(StatusResponse {
        status: "not found".to_string(),
    })
}

struct Config {
    workers: usize,
    port: u16,
    archive_url: String,
    timeout: Duration,
}

impl Config {
    fn new() -> Result<Config, Box<dyn std::error::Error>> {
        dotenv().ok();

        let mut workers: usize = env::var("BNR_RATES_WORKERS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()?;
        let port: u16 = env::var("BNR_RATES_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;
        let timeout_secs: u64 = env::var("BNR_RATES_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;
        let mut archive_url = env::var("BNR_RATES_ARCHIVE_URL").unwrap_or_default();

        if workers == 0 {
            workers = 1;
        }

        if archive_url.trim().is_empty() {
            archive_url = BNR_ARCHIVE_BASE_URL.to_string();
        }

        let config = Config {
            workers,
            port,
            archive_url,
            timeout: Duration::from_secs(timeout_secs),
        };
        Ok(config)
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not create config: {}", e);
            exit(1);
        }
    };

    let today = Local::now().date_naive();
    let acquisition = acquisition::load(&config.archive_url, config.timeout, today).await;
    if acquisition.is_synthetic() {
        warn!("BNR archives unavailable, serving simulated rates");
    }
    info!("Loaded {} rate records", acquisition.records.len());

    let initial = AppState::new(today).apply(Action::DatasetLoaded(acquisition));
    let store = web::Data::new(Store::new(initial, &config));

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .service(healthcheck)
            .service(refresh)
            .service(get_rates)
            .service(get_stats)
            .service(get_table)
            .service(get_chart)
            .service(get_comparison)
            .service(export_csv)
            .default_service(web::to(not_found))
            .wrap(Logger::default())
    })
    .bind(("0.0.0.0", config.port))?
    .workers(config.workers)
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;
    use bnr_api::Acquisition;
    use rate_model::RateRecord;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn store() -> web::Data<Store> {
        let acquisition = Acquisition {
            records: vec![
                RateRecord { date: date("2024-01-02"), currency: Currency::Eur, value: 4.9753 },
                RateRecord { date: date("2024-01-02"), currency: Currency::Usd, value: 4.5512 },
                RateRecord { date: date("2024-01-03"), currency: Currency::Eur, value: 4.9800 },
            ],
            origin: DataOrigin::Archive { years: vec![2024] },
        };
        let config = Config {
            workers: 1,
            port: 8080,
            archive_url: BNR_ARCHIVE_BASE_URL.to_string(),
            timeout: Duration::from_secs(1),
        };
        let state = AppState::new(date("2024-01-31")).apply(Action::DatasetLoaded(acquisition));
        web::Data::new(Store::new(state, &config))
    }

    #[test]
    fn view_query_pass_applies_present_params_only() {
        let store = store();
        let query = ViewQuery {
            currencies: Some("eur".to_string()),
            end: Some("2024-01-02".to_string()),
            ..ViewQuery::default()
        };
        let state = query.view(&store.snapshot());

        assert_eq!(state.criteria().range.start, Some(date("2023-12-31")));
        assert_eq!(state.filtered().len(), 1);
        assert_eq!(store.snapshot().filtered().len(), 3);
    }

    #[test]
    fn view_query_pass_empty_start_opens_bound() {
        let store = store();
        let query = ViewQuery {
            start: Some(String::new()),
            ..ViewQuery::default()
        };
        let state = query.view(&store.snapshot());
        assert_eq!(state.criteria().range.start, None);
        assert_eq!(state.criteria().range.end, Some(date("2024-01-31")));
    }

    #[actix_web::test]
    async fn export_csv_pass_attachment() {
        let app = actix_test::init_service(App::new().app_data(store()).service(export_csv)).await;
        let req = actix_test::TestRequest::get()
            .uri("/export.csv?currencies=EUR&start=2024-01-02&end=2024-01-02")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert!(resp.headers().contains_key(header::CONTENT_DISPOSITION));
        let bytes = actix_test::read_body(resp).await;
        assert_eq!(bytes, "Data,Valuta,Curs (RON)\n2024-01-02,EUR,4.9753\n");
    }

    #[actix_web::test]
    async fn export_csv_fail_nothing_to_export() {
        let app = actix_test::init_service(App::new().app_data(store()).service(export_csv)).await;
        let req = actix_test::TestRequest::get()
            .uri("/export.csv?currencies=GBP")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn get_stats_pass_formatted_cards() {
        let app = actix_test::init_service(App::new().app_data(store()).service(get_stats)).await;
        let req = actix_test::TestRequest::get().uri("/stats").to_request();
        let json: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(json["stats"][0]["currency"], "EUR");
        assert_eq!(json["stats"][0]["latest_value"], "4.9800");
        assert_eq!(json["stats"][0]["latest_change_percent"], "0.09");
        assert_eq!(json["stats"][1]["currency"], "USD");
        assert!(json["notice"].is_null());
    }

    #[actix_web::test]
    async fn unknown_route_pass_not_found() {
        let app = actix_test::init_service(App::new().default_service(web::to(not_found))).await;
        let req = actix_test::TestRequest::get().uri("/nope").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn get_table_pass_search_term_kept_verbatim() {
        let app = actix_test::init_service(App::new().app_data(store()).service(get_table)).await;

        let req = actix_test::TestRequest::get().uri("/table?search=e/u/r").to_request();
        let rows: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.as_array().unwrap().len(), 0);

        let req = actix_test::TestRequest::get().uri("/table?search=4,97").to_request();
        let rows: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.as_array().unwrap().len(), 0);

        let req = actix_test::TestRequest::get().uri("/table?search=%20EuR%20").to_request();
        let rows: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.as_array().unwrap().len(), 2);
    }
}
