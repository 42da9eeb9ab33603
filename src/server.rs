//! HTTP surface for the workflow
//!
//! Exposes the aggregate at `GET /countries-emission` and a small preview of
//! raw upstream data at `GET /`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info};

use crate::data::{Country, CountryYearRecord};
use crate::sequencer::Delay;
use crate::source::{CountryDataSource, SourceError};
use crate::workflow::{EmissionWorkflow, FAILURE_MESSAGE};

/// Number of entries shown per list on the preview page
pub const PREVIEW_LEN: usize = 5;

const PREVIEW_FAILURE_MESSAGE: &str = "Failed to load preview data.";

/// JSON body returned for failed requests
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

/// Sample of upstream data shown on the landing route
#[derive(Debug, Serialize)]
pub struct Preview {
    pub countries: Vec<Country>,
    pub records: Vec<CountryYearRecord>,
}

/// Builds the router for a workflow
pub fn router<S, D>(workflow: Arc<EmissionWorkflow<S, D>>) -> Router
where
    S: CountryDataSource + 'static,
    D: Delay + 'static,
{
    Router::new()
        .route("/", get(preview::<S, D>))
        .route("/countries-emission", get(countries_emission::<S, D>))
        .with_state(workflow)
}

async fn countries_emission<S, D>(State(workflow): State<Arc<EmissionWorkflow<S, D>>>) -> Response
where
    S: CountryDataSource + 'static,
    D: Delay + 'static,
{
    match workflow.run().await {
        Ok(response) => (StatusCode::OK, Json(response.data.as_ref())).into_response(),
        // Cause is already logged by the workflow
        Err(_) => failure(FAILURE_MESSAGE),
    }
}

async fn preview<S, D>(State(workflow): State<Arc<EmissionWorkflow<S, D>>>) -> Response
where
    S: CountryDataSource + 'static,
    D: Delay + 'static,
{
    match load_preview(workflow.source()).await {
        Ok(preview) => Json(preview).into_response(),
        Err(err) => {
            error!(error = %err, "Failed to load preview data");
            failure(PREVIEW_FAILURE_MESSAGE)
        }
    }
}

/// Fetches the first countries and the first records of the first country
pub async fn load_preview<S: CountryDataSource + ?Sized>(source: &S) -> Result<Preview, SourceError> {
    let mut countries = source.list_countries().await?;
    countries.truncate(PREVIEW_LEN);

    let mut records = match countries.first() {
        Some(country) => source.country_records(&country.code).await?,
        None => Vec::new(),
    };
    records.truncate(PREVIEW_LEN);

    Ok(Preview { countries, records })
}

fn failure(message: &'static str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody { error: message }),
    )
        .into_response()
}

/// Binds `addr` and serves the router until Ctrl+C
pub async fn serve(app: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "App is listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
}
