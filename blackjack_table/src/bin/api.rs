use actix_web::{
    body::BoxBody,
    error, get,
    http::{header::ContentType, StatusCode},
    post, web, App, HttpResponse, HttpServer,
};
use blackjack_table::prelude::*;
use blackjack_table::write;
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Most tables a single request may run.
const MAX_TABLES: usize = 64;

/// The simulation to run, meant to be deserialized from JSON. Human seats in `table` are left out.
#[derive(Debug, Deserialize)]
struct SimulationRequest {
    #[serde(default)]
    table: TableConfig,
    rounds: u32,
    #[serde(default = "one_table")]
    tables: usize,
}

fn one_table() -> usize {
    1
}

/// The configured simulation, kept between requests.
#[derive(Debug, Clone)]
struct SimulationSetup {
    table: TableConfig,
    rounds: u32,
    tables: usize,
}

impl TryFrom<SimulationRequest> for SimulationSetup {
    type Error = UserError;

    fn try_from(value: SimulationRequest) -> Result<Self, Self::Error> {
        let table = value.table.computer_only();
        table
            .validate()
            .map_err(|e| UserError::BadInput(e.to_string()))?;
        if value.tables == 0 || value.tables > MAX_TABLES {
            return Err(UserError::BadInput(format!(
                "tables must be between 1 and {}",
                MAX_TABLES
            )));
        }
        Ok(SimulationSetup {
            table,
            rounds: value.rounds,
            tables: value.tables,
        })
    }
}

/// An enum that will handle user facing errors
#[derive(Debug)]
enum UserError {
    InternalError,
    SimulatorNotConfigured,
    BadInput(String),
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserError::InternalError => write!(f, "an internal error occured"),
            UserError::SimulatorNotConfigured => write!(
                f,
                "unable to run, no table has been configured with /config-table"
            ),
            UserError::BadInput(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for UserError {}

impl error::ResponseError for UserError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            UserError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::SimulatorNotConfigured => StatusCode::BAD_REQUEST,
            UserError::BadInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

type AppState = web::Data<Mutex<Option<SimulationSetup>>>;

/// A handler that stores the table configuration and the size of the simulation to run.
#[post("/config-table")]
async fn configure_table(
    params: web::Json<SimulationRequest>,
    app_setup: AppState,
) -> Result<HttpResponse, UserError> {
    let setup = SimulationSetup::try_from(params.into_inner())?;
    let mut guard = app_setup.lock().map_err(|_| UserError::InternalError)?;
    info!(
        seats = setup.table.seats.len(),
        rounds = setup.rounds,
        tables = setup.tables,
        "table configured"
    );
    *guard = Some(setup);
    Ok(HttpResponse::Ok().body("table configured successfully"))
}

/// A handler that runs the configured simulation and answers with the per table summaries as JSON.
#[get("/run-sim")]
async fn run_simulation(app_setup: AppState) -> Result<HttpResponse, UserError> {
    let setup = app_setup
        .lock()
        .map_err(|_| UserError::InternalError)?
        .clone()
        .ok_or(UserError::SimulatorNotConfigured)?;

    let result = web::block(move || {
        MultiTableSimulator::new(setup.table, setup.rounds)
            .tables(setup.tables)
            .build()?
            .run_with(write::summaries_as_json)
    })
    .await
    .map_err(|_| UserError::InternalError)?;

    match result {
        Ok(json) => Ok(HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(json)),
        Err(e) => {
            warn!(error = %e, "simulation failed");
            Err(UserError::InternalError)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let address = "127.0.0.1";
    let port = 8080;
    info!("listening at {}:{}", address, port);

    let app_setup: AppState = web::Data::new(Mutex::new(None));

    HttpServer::new(move || {
        App::new()
            .app_data(app_setup.clone())
            .service(configure_table)
            .service(run_simulation)
    })
    .bind((address, port))?
    .run()
    .await
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::test;

    #[actix_web::test]
    async fn test_run_before_config_is_rejected() {
        let app_setup: AppState = web::Data::new(Mutex::new(None));
        let app = test::init_service(
            App::new()
                .app_data(app_setup.clone())
                .service(configure_table)
                .service(run_simulation),
        )
        .await;
        let req = test::TestRequest::get().uri("/run-sim").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_configure_then_run() {
        let app_setup: AppState = web::Data::new(Mutex::new(None));
        let app = test::init_service(
            App::new()
                .app_data(app_setup.clone())
                .service(configure_table)
                .service(run_simulation),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/config-table")
            .set_json(serde_json::json!({
                "table": {"seed": 4, "min_bet": 5},
                "rounds": 30,
                "tables": 2
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/run-sim").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_object().map(|tables| tables.len()), Some(2));
        // the default seating minus the human
        assert_eq!(body["1"].as_array().map(|seats| seats.len()), Some(3));
        assert_eq!(body["2"][0]["rounds"], 30);
    }

    #[actix_web::test]
    async fn test_bad_config_is_rejected() {
        let app_setup: AppState = web::Data::new(Mutex::new(None));
        let app = test::init_service(
            App::new()
                .app_data(app_setup.clone())
                .service(configure_table),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/config-table")
            .set_json(serde_json::json!({"rounds": 10, "tables": 0}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
