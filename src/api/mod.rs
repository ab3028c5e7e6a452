mod report;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::core::{
    ChartPoint, ContributionTiming, CurrencyFormat, MAX_FRACTION_DIGITS, MAX_YEARS, MonthRow,
    PlanParameters, Projection, StepType, Totals, YearRow, run_projection,
};
use crate::export::{
    self, ExportError, MONTHLY_CSV_FILENAME, WORKBOOK_FILENAME, YEARLY_CSV_FILENAME,
    monthly_table, table_to_csv, yearly_table,
};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStepType {
    Percent,
    Fixed,
}

impl From<CliStepType> for StepType {
    fn from(value: CliStepType) -> Self {
        match value {
            CliStepType::Percent => StepType::Percent,
            CliStepType::Fixed => StepType::Fixed,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTiming {
    Start,
    End,
}

impl From<CliTiming> for ContributionTiming {
    fn from(value: CliTiming) -> Self {
        match value {
            CliTiming::Start => ContributionTiming::StartOfMonth,
            CliTiming::End => ContributionTiming::EndOfMonth,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStepType {
    #[serde(alias = "percentage")]
    Percent,
    #[serde(alias = "amount")]
    Fixed,
}

impl From<ApiStepType> for CliStepType {
    fn from(value: ApiStepType) -> Self {
        match value {
            ApiStepType::Percent => CliStepType::Percent,
            ApiStepType::Fixed => CliStepType::Fixed,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiTiming {
    #[serde(alias = "start-of-month", alias = "startOfMonth", alias = "start_of_month")]
    Start,
    #[serde(alias = "end-of-month", alias = "endOfMonth", alias = "end_of_month")]
    End,
}

impl From<ApiTiming> for CliTiming {
    fn from(value: ApiTiming) -> Self {
        match value {
            ApiTiming::Start => CliTiming::Start,
            ApiTiming::End => CliTiming::End,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ExportKind {
    YearlyCsv,
    MonthlyCsv,
    Workbook,
}

/// Web form fields. Numeric fields take numbers or text so that fractional,
/// negative, empty or non-numeric entries are coerced instead of rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    #[serde(alias = "startContribution", deserialize_with = "lenient_number")]
    start_sip: Option<f64>,
    step_type: Option<ApiStepType>,
    #[serde(deserialize_with = "lenient_number")]
    step_value: Option<f64>,
    #[serde(alias = "stepIntervalMonths", deserialize_with = "lenient_number")]
    step_interval: Option<f64>,
    #[serde(alias = "annualReturnPct", deserialize_with = "lenient_number")]
    annual_return: Option<f64>,
    #[serde(alias = "annualInflationPct", deserialize_with = "lenient_number")]
    annual_inflation: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    years: Option<f64>,
    timing: Option<ApiTiming>,

    include_monthly: Option<bool>,
    fraction_digits: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FormNumber {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Anything that is not a number maps to NaN, which the input boundary then
/// coerces to 0 for amounts and 1 for counts.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match FormNumber::deserialize(deserializer)? {
        FormNumber::Number(v) => v,
        FormNumber::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        FormNumber::Other(_) => f64::NAN,
    };
    Ok(Some(value))
}

#[derive(Parser, Debug)]
#[command(
    name = "stepup-sip",
    about = "Step-up SIP projection with monthly compounding and inflation-adjusted balances"
)]
struct Cli {
    #[arg(long, default_value_t = 3000.0, help = "First month's contribution")]
    start_contribution: f64,
    #[arg(long, value_enum, default_value_t = CliStepType::Percent)]
    step_type: CliStepType,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Step-up size: percent for --step-type=percent, amount for --step-type=fixed"
    )]
    step_value: f64,
    #[arg(
        long,
        default_value_t = 6,
        help = "Months between step-ups (values below 1 are treated as 1)"
    )]
    step_interval_months: u32,
    #[arg(long, default_value_t = 12.0, help = "Expected annual return in percent")]
    annual_return: f64,
    #[arg(long, default_value_t = 6.0, help = "Expected annual inflation in percent")]
    annual_inflation: f64,
    #[arg(long, default_value_t = 20, help = "Horizon in years, clamped to 1..=60")]
    years: u32,
    #[arg(
        long,
        value_enum,
        default_value_t = CliTiming::End,
        help = "Whether each contribution lands before or after that month's interest"
    )]
    timing: CliTiming,
    #[arg(
        long,
        default_value_t = 0,
        help = "Fractional digits in displayed currency amounts (max 20)"
    )]
    fraction_digits: usize,
    #[arg(long, help = "Also print the month-by-month table")]
    monthly: bool,
    #[arg(long, help = "Write the yearly table as CSV to this path")]
    csv_out: Option<PathBuf>,
    #[arg(long, help = "Write the monthly table as CSV to this path")]
    monthly_csv_out: Option<PathBuf>,
    #[arg(long, help = "Write the Summary/Monthly workbook (.xlsx) to this path")]
    xlsx_out: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug)]
struct ApiOptions {
    include_monthly: bool,
    fraction_digits: usize,
}

#[derive(Debug)]
struct ApiRequest {
    params: PlanParameters,
    options: ApiOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormattedTotals {
    total_contributed: String,
    final_nominal: String,
    final_real: String,
    gain: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    parameters: PlanParameters,
    totals: Totals,
    formatted_totals: FormattedTotals,
    yearly: Vec<YearRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly: Option<Vec<MonthRow>>,
    chart: Vec<ChartPoint>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

struct ExportArtifact {
    content_type: &'static str,
    filename: &'static str,
    body: Vec<u8>,
}

fn build_params(cli: &Cli) -> PlanParameters {
    let years = cli.years.clamp(1, MAX_YEARS);
    if years != cli.years {
        debug!(requested = cli.years, years, "clamped horizon");
    }
    let step_interval_months = cli.step_interval_months.max(1);
    if step_interval_months != cli.step_interval_months {
        debug!("step interval below 1 treated as 1");
    }

    PlanParameters {
        start_contribution: non_negative("start_contribution", cli.start_contribution),
        step_type: cli.step_type.into(),
        step_value: non_negative("step_value", cli.step_value),
        step_interval_months,
        annual_return_pct: non_negative("annual_return", cli.annual_return),
        annual_inflation_pct: non_negative("annual_inflation", cli.annual_inflation),
        years,
        timing: cli.timing.into(),
    }
}

fn non_negative(field: &str, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        return value;
    }
    debug!(field, value, "coerced invalid amount to 0");
    0.0
}

/// Whole count of at least 1; anything non-numeric falls back to 1.
fn whole_count(value: f64) -> u32 {
    if !value.is_finite() || value < 1.0 {
        return 1;
    }
    value.floor().min(u32::MAX as f64) as u32
}

pub fn run_cli<I, T>(args: I) -> Result<(), ExportError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let params = build_params(&cli);
    let projection = run_projection(&params);
    let fmt = CurrencyFormat::default().with_fraction_digits(cli.fraction_digits);

    print!(
        "{}",
        report::render_report(&params, &projection, &fmt, cli.monthly)
    );

    if let Some(path) = &cli.csv_out {
        export::write_table_csv(&yearly_table(&projection.yearly), path)?;
        info!(path = %path.display(), "wrote yearly CSV");
    }
    if let Some(path) = &cli.monthly_csv_out {
        export::write_table_csv(&monthly_table(&projection.schedule), path)?;
        info!(path = %path.display(), "wrote monthly CSV");
    }
    if let Some(path) = &cli.xlsx_out {
        export::save_workbook(&params, &projection, path)?;
        info!(path = %path.display(), "wrote workbook");
    }
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route(
            "/api/export/yearly.csv",
            get(yearly_csv_get_handler).post(yearly_csv_post_handler),
        )
        .route(
            "/api/export/monthly.csv",
            get(monthly_csv_get_handler).post(monthly_csv_post_handler),
        )
        .route(
            "/api/export/workbook.xlsx",
            get(workbook_get_handler).post(workbook_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("Step-up SIP HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/projection");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

type QueryPayload = Result<Query<ProjectionPayload>, QueryRejection>;
type JsonPayload = Result<Json<ProjectionPayload>, JsonRejection>;

fn from_query(payload: QueryPayload) -> Result<ProjectionPayload, Response> {
    payload
        .map(|Query(payload)| payload)
        .map_err(|rejection| error_response(rejection.status(), &rejection.body_text()))
}

fn from_json(payload: JsonPayload) -> Result<ProjectionPayload, Response> {
    payload
        .map(|Json(payload)| payload)
        .map_err(|rejection| error_response(rejection.status(), &rejection.body_text()))
}

async fn projection_get_handler(payload: QueryPayload) -> Response {
    projection_handler_impl(from_query(payload))
}

async fn projection_post_handler(payload: JsonPayload) -> Response {
    projection_handler_impl(from_json(payload))
}

async fn yearly_csv_get_handler(payload: QueryPayload) -> Response {
    export_handler_impl(ExportKind::YearlyCsv, from_query(payload))
}

async fn yearly_csv_post_handler(payload: JsonPayload) -> Response {
    export_handler_impl(ExportKind::YearlyCsv, from_json(payload))
}

async fn monthly_csv_get_handler(payload: QueryPayload) -> Response {
    export_handler_impl(ExportKind::MonthlyCsv, from_query(payload))
}

async fn monthly_csv_post_handler(payload: JsonPayload) -> Response {
    export_handler_impl(ExportKind::MonthlyCsv, from_json(payload))
}

async fn workbook_get_handler(payload: QueryPayload) -> Response {
    export_handler_impl(ExportKind::Workbook, from_query(payload))
}

async fn workbook_post_handler(payload: JsonPayload) -> Response {
    export_handler_impl(ExportKind::Workbook, from_json(payload))
}

fn request_from(payload: Result<ProjectionPayload, Response>) -> Result<ApiRequest, Response> {
    api_request_from_payload(payload?).map_err(|msg| error_response(StatusCode::BAD_REQUEST, &msg))
}

fn projection_handler_impl(payload: Result<ProjectionPayload, Response>) -> Response {
    let request = match request_from(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    debug!(years = request.params.years, "projection request");

    let projection = run_projection(&request.params);
    let response = build_projection_response(&request, projection);
    json_response(StatusCode::OK, response)
}

fn export_handler_impl(kind: ExportKind, payload: Result<ProjectionPayload, Response>) -> Response {
    let request = match request_from(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    debug!(?kind, years = request.params.years, "export request");

    match render_export(kind, &request.params) {
        Ok(artifact) => with_cache_control((
            [
                (header::CONTENT_TYPE, artifact.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", artifact.filename),
                ),
            ],
            artifact.body,
        )),
        Err(e) => {
            error!(?kind, "export failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

fn render_export(kind: ExportKind, params: &PlanParameters) -> Result<ExportArtifact, ExportError> {
    let projection = run_projection(params);
    let artifact = match kind {
        ExportKind::YearlyCsv => ExportArtifact {
            content_type: CSV_CONTENT_TYPE,
            filename: YEARLY_CSV_FILENAME,
            body: table_to_csv(&yearly_table(&projection.yearly))?.into_bytes(),
        },
        ExportKind::MonthlyCsv => ExportArtifact {
            content_type: CSV_CONTENT_TYPE,
            filename: MONTHLY_CSV_FILENAME,
            body: table_to_csv(&monthly_table(&projection.schedule))?.into_bytes(),
        },
        ExportKind::Workbook => ExportArtifact {
            content_type: XLSX_CONTENT_TYPE,
            filename: WORKBOOK_FILENAME,
            body: export::workbook_bytes(params, &projection)?,
        },
    };
    Ok(artifact)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ProjectionPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ProjectionPayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();
    let mut options = ApiOptions {
        include_monthly: false,
        fraction_digits: 0,
    };

    if let Some(v) = payload.start_sip {
        cli.start_contribution = v;
    }
    if let Some(v) = payload.step_type {
        cli.step_type = v.into();
    }
    if let Some(v) = payload.step_value {
        cli.step_value = v;
    }
    if let Some(v) = payload.step_interval {
        cli.step_interval_months = whole_count(v);
    }
    if let Some(v) = payload.annual_return {
        cli.annual_return = v;
    }
    if let Some(v) = payload.annual_inflation {
        cli.annual_inflation = v;
    }
    if let Some(v) = payload.years {
        cli.years = whole_count(v);
    }
    if let Some(v) = payload.timing {
        cli.timing = v.into();
    }

    if let Some(v) = payload.include_monthly {
        options.include_monthly = v;
    }
    if let Some(v) = payload.fraction_digits {
        if v > MAX_FRACTION_DIGITS {
            return Err(format!(
                "fractionDigits must be between 0 and {MAX_FRACTION_DIGITS}"
            ));
        }
        options.fraction_digits = v;
    }

    Ok(ApiRequest {
        params: build_params(&cli),
        options,
    })
}

fn default_cli_for_api() -> Cli {
    let defaults = PlanParameters::default();
    Cli {
        start_contribution: defaults.start_contribution,
        step_type: CliStepType::Percent,
        step_value: defaults.step_value,
        step_interval_months: defaults.step_interval_months,
        annual_return: defaults.annual_return_pct,
        annual_inflation: defaults.annual_inflation_pct,
        years: defaults.years,
        timing: CliTiming::End,
        fraction_digits: 0,
        monthly: false,
        csv_out: None,
        monthly_csv_out: None,
        xlsx_out: None,
    }
}

fn build_projection_response(request: &ApiRequest, projection: Projection) -> ProjectionResponse {
    let fmt = CurrencyFormat::default().with_fraction_digits(request.options.fraction_digits);
    let totals = projection.totals;

    ProjectionResponse {
        parameters: request.params.clone(),
        totals,
        formatted_totals: FormattedTotals {
            total_contributed: fmt.format_value(totals.total_contributed),
            final_nominal: fmt.format_value(totals.final_nominal),
            final_real: fmt.format_value(totals.final_real),
            gain: fmt.format_value(totals.gain),
        },
        yearly: projection.yearly,
        monthly: request.options.include_monthly.then_some(projection.schedule),
        chart: projection.chart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn default_cli_matches_reset_parameters() {
        let params = build_params(&sample_cli());
        assert_eq!(params, PlanParameters::default());
    }

    #[test]
    fn cli_defaults_match_api_defaults() {
        let cli = Cli::try_parse_from(["stepup-sip"]).expect("defaults parse");
        assert_eq!(build_params(&cli), build_params(&sample_cli()));
    }

    #[test]
    fn cli_parses_enums_and_exports() {
        let cli = Cli::try_parse_from([
            "stepup-sip",
            "--step-type",
            "fixed",
            "--step-value",
            "500",
            "--timing",
            "start",
            "--years",
            "3",
            "--csv-out",
            "yearly.csv",
            "--monthly",
        ])
        .expect("args parse");

        let params = build_params(&cli);
        assert_eq!(params.step_type, StepType::Fixed);
        assert_eq!(params.timing, ContributionTiming::StartOfMonth);
        assert_eq!(params.years, 3);
        assert_approx(params.step_value, 500.0);
        assert!(cli.monthly);
        assert_eq!(cli.csv_out, Some(PathBuf::from("yearly.csv")));
    }

    #[test]
    fn build_params_clamps_horizon_and_interval() {
        let mut cli = sample_cli();
        cli.years = 0;
        cli.step_interval_months = 0;
        let params = build_params(&cli);
        assert_eq!(params.years, 1);
        assert_eq!(params.step_interval_months, 1);

        cli.years = 75;
        assert_eq!(build_params(&cli).years, MAX_YEARS);
    }

    #[test]
    fn build_params_coerces_invalid_amounts_to_zero() {
        let mut cli = sample_cli();
        cli.start_contribution = f64::NAN;
        cli.step_value = -5.0;
        cli.annual_return = f64::INFINITY;
        cli.annual_inflation = -1.0;

        let params = build_params(&cli);
        assert_approx(params.start_contribution, 0.0);
        assert_approx(params.step_value, 0.0);
        assert_approx(params.annual_return_pct, 0.0);
        assert_approx(params.annual_inflation_pct, 0.0);
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "startSip": 5000,
          "stepType": "fixed",
          "stepValue": 250,
          "stepInterval": 12,
          "annualReturn": 10.5,
          "annualInflation": 5,
          "years": 15,
          "timing": "start",
          "includeMonthly": true,
          "fractionDigits": 2
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let params = request.params;

        assert_approx(params.start_contribution, 5_000.0);
        assert_eq!(params.step_type, StepType::Fixed);
        assert_approx(params.step_value, 250.0);
        assert_eq!(params.step_interval_months, 12);
        assert_approx(params.annual_return_pct, 10.5);
        assert_approx(params.annual_inflation_pct, 5.0);
        assert_eq!(params.years, 15);
        assert_eq!(params.timing, ContributionTiming::StartOfMonth);
        assert!(request.options.include_monthly);
        assert_eq!(request.options.fraction_digits, 2);
    }

    #[test]
    fn api_request_accepts_aliases() {
        let json = r#"{
          "startContribution": 1000,
          "stepIntervalMonths": 3,
          "timing": "endOfMonth",
          "stepType": "percentage"
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert_approx(request.params.start_contribution, 1_000.0);
        assert_eq!(request.params.step_interval_months, 3);
        assert_eq!(request.params.timing, ContributionTiming::EndOfMonth);
        assert_eq!(request.params.step_type, StepType::Percent);
    }

    #[test]
    fn api_request_coerces_counts() {
        let json = r#"{ "years": -4, "stepInterval": 2.7 }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert_eq!(request.params.years, 1);
        assert_eq!(request.params.step_interval_months, 2);

        let json = r#"{ "years": 500 }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert_eq!(request.params.years, MAX_YEARS);
    }

    #[test]
    fn api_request_coerces_non_numeric_text() {
        let json = r#"{ "years": "ten", "annualReturn": "", "stepInterval": "abc", "startSip": null }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert_eq!(request.params.years, 1);
        assert_eq!(request.params.step_interval_months, 1);
        assert_approx(request.params.annual_return_pct, 0.0);
        assert_approx(request.params.start_contribution, 0.0);
    }

    #[test]
    fn api_request_accepts_numeric_text() {
        let json = r#"{ "years": "15", "stepValue": " 7.5 ", "annualInflation": "4" }"#;
        let request = api_request_from_json(json).expect("json should parse");
        assert_eq!(request.params.years, 15);
        assert_approx(request.params.step_value, 7.5);
        assert_approx(request.params.annual_inflation_pct, 4.0);
    }

    #[test]
    fn query_string_fields_are_coerced() {
        let uri: axum::http::Uri = "/api/projection?years=ten&annualReturn=&stepValue=5&timing=start"
            .parse()
            .expect("valid uri");
        let Query(payload) = Query::<ProjectionPayload>::try_from_uri(&uri).expect("query parses");
        let request = api_request_from_payload(payload).expect("payload is valid");

        assert_eq!(request.params.years, 1);
        assert_approx(request.params.annual_return_pct, 0.0);
        assert_approx(request.params.step_value, 5.0);
        assert_eq!(request.params.timing, ContributionTiming::StartOfMonth);
    }

    #[tokio::test]
    async fn malformed_query_returns_json_error_body() {
        let uri: axum::http::Uri = "/api/projection?includeMonthly=maybe"
            .parse()
            .expect("valid uri");
        let payload = Query::<ProjectionPayload>::try_from_uri(&uri);
        assert!(payload.is_err());

        let response = projection_get_handler(payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_json_error(response).await;
    }

    #[tokio::test]
    async fn malformed_json_body_returns_json_error_body() {
        use axum::extract::FromRequest;

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/export/yearly.csv")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{ \"years\": "))
            .expect("valid request");
        let payload = Json::<ProjectionPayload>::from_request(request, &()).await;
        assert!(payload.is_err());

        let response = yearly_csv_post_handler(payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_json_error(response).await;
    }

    async fn assert_json_error(response: Response) {
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"application/json"[..])
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert!(value["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    }

    #[test]
    fn api_request_rejects_excess_fraction_digits() {
        let err = api_request_from_json(r#"{ "fractionDigits": 21 }"#)
            .expect_err("must reject fraction digits above limit");
        assert!(err.contains("fractionDigits"));
    }

    #[test]
    fn api_request_rejects_unknown_step_type() {
        let err = api_request_from_json(r#"{ "stepType": "doubling" }"#)
            .expect_err("must reject unknown step type");
        assert!(err.contains("Invalid API JSON payload"));
    }

    #[test]
    fn projection_response_serialization_contains_expected_fields() {
        let request = api_request_from_json(r#"{ "years": 2 }"#).expect("json should parse");
        let projection = run_projection(&request.params);
        let response = build_projection_response(&request, projection);
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"parameters\""));
        assert!(json.contains("\"startContribution\":3000.0"));
        assert!(json.contains("\"stepType\":\"percent\""));
        assert!(json.contains("\"timing\":\"end-of-month\""));
        assert!(json.contains("\"formattedTotals\""));
        assert!(json.contains("\"totalContributed\""));
        assert!(json.contains("\"returnEarned\""));
        assert!(json.contains("\"nominalEndBalance\""));
        assert!(!json.contains("\"monthly\""));
        assert_eq!(response.yearly.len(), 2);
        assert_eq!(response.chart.len(), 24);
    }

    #[test]
    fn projection_response_includes_monthly_on_request() {
        let request = api_request_from_json(r#"{ "years": 1, "includeMonthly": true }"#)
            .expect("json should parse");
        let projection = run_projection(&request.params);
        let response = build_projection_response(&request, projection);

        let monthly = response.monthly.as_ref().expect("monthly rows");
        assert_eq!(monthly.len(), 12);
        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"monthLabel\":\"Jan\""));
        assert!(json.contains("\"inflationIndex\""));
    }

    #[test]
    fn formatted_totals_use_requested_fraction_digits() {
        let json = r#"{
          "startSip": 1000,
          "stepValue": 0,
          "annualReturn": 0,
          "annualInflation": 0,
          "years": 1,
          "fractionDigits": 2
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let projection = run_projection(&request.params);
        let response = build_projection_response(&request, projection);

        assert_eq!(response.formatted_totals.total_contributed, "₹12,000.00");
        assert_eq!(response.formatted_totals.final_nominal, "₹12,000.00");
        assert_eq!(response.formatted_totals.gain, "₹0.00");
    }

    #[test]
    fn render_export_produces_csv_and_workbook_artifacts() {
        let params = PlanParameters {
            years: 2,
            ..PlanParameters::default()
        };

        let yearly = render_export(ExportKind::YearlyCsv, &params).expect("yearly csv");
        assert_eq!(yearly.filename, "stepup_sip_yearly.csv");
        assert_eq!(yearly.content_type, CSV_CONTENT_TYPE);
        let text = String::from_utf8(yearly.body).expect("utf-8 csv");
        assert!(text.starts_with("Year,Start Balance,Contribution,"));
        assert_eq!(text.lines().count(), 3);

        let monthly = render_export(ExportKind::MonthlyCsv, &params).expect("monthly csv");
        let text = String::from_utf8(monthly.body).expect("utf-8 csv");
        assert!(text.starts_with("Month#,Year,Month Label,"));
        assert_eq!(text.lines().count(), 25);

        let workbook = render_export(ExportKind::Workbook, &params).expect("workbook");
        assert_eq!(workbook.filename, "stepup_sip_calculator.xlsx");
        assert_eq!(&workbook.body[..2], b"PK");
    }

    #[test]
    fn error_response_sets_status_and_no_store() {
        let response = error_response(StatusCode::BAD_REQUEST, "bad input");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
    }
}
