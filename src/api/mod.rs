use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt::Write as _;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::{
    self, BlogCategory, BlogPostSummary, LoanOption, calculator_form, pages,
};
use crate::core::validation::{
    LOAN_TERM_YEARS, REMAINING_TERM_YEARS, field_range, whole_years,
};
use crate::core::{
    AffordabilityInputs, AmortizationYear, Calculator, CalculatorInputs, CalculatorResult,
    DscrInputs, FieldRange, LoanProgram, ResultFormat, Validate, ValidationErrors, VaPurchaseInputs,
    VaRefinanceInputs, VaRefinanceType, VaUsage, default_funding_fee_percent,
    default_refinance_funding_fee_percent,
};
use crate::error::{ApiError, CalculatorError};
use crate::theme::{self, ContrastReport, Rgb};

const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AffordabilityPayload {
    annual_income: Option<f64>,
    monthly_debts: Option<f64>,
    down_payment: Option<f64>,
    interest_rate: Option<f64>,
    loan_term_years: Option<f64>,
    property_tax_rate: Option<f64>,
    annual_insurance: Option<f64>,
    monthly_hoa: Option<f64>,
    loan_program: Option<LoanProgram>,
    front_end_ratio: Option<f64>,
    back_end_ratio: Option<f64>,
    va_funding_fee_exempt: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VaPurchasePayload {
    home_price: Option<f64>,
    down_payment: Option<f64>,
    interest_rate: Option<f64>,
    loan_term_years: Option<f64>,
    funding_fee_percent: Option<f64>,
    va_usage: Option<VaUsage>,
    disability_exempt: Option<bool>,
    property_tax_rate: Option<f64>,
    annual_insurance: Option<f64>,
    monthly_hoa: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VaRefinancePayload {
    refinance_type: Option<VaRefinanceType>,
    home_value: Option<f64>,
    current_balance: Option<f64>,
    current_interest_rate: Option<f64>,
    remaining_term_years: Option<f64>,
    new_interest_rate: Option<f64>,
    #[serde(alias = "newLoanTermYears")]
    loan_term_years: Option<f64>,
    cash_out_amount: Option<f64>,
    funding_fee_percent: Option<f64>,
    va_usage: Option<VaUsage>,
    disability_exempt: Option<bool>,
    closing_costs: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DscrPayload {
    property_price: Option<f64>,
    down_payment: Option<f64>,
    interest_rate: Option<f64>,
    loan_term_years: Option<f64>,
    monthly_rent: Option<f64>,
    monthly_expenses: Option<f64>,
    vacancy_rate: Option<f64>,
}

/// Merges a partial request onto the calculator's form defaults. Values that
/// cannot be carried into the inputs are reported in `errors`.
trait CalculatorPayload: DeserializeOwned + Default {
    fn into_inputs(self, errors: &mut ValidationErrors) -> CalculatorInputs;
}

fn merge_term(errors: &mut ValidationErrors, range: FieldRange, value: Option<f64>, term: &mut u32) {
    if let Some(years) = value.and_then(|v| whole_years(errors, range, v)) {
        *term = years;
    }
}

impl CalculatorPayload for AffordabilityPayload {
    fn into_inputs(self, errors: &mut ValidationErrors) -> CalculatorInputs {
        let mut inputs = AffordabilityInputs::default();
        if let Some(v) = self.annual_income {
            inputs.annual_income = v;
        }
        if let Some(v) = self.monthly_debts {
            inputs.monthly_debts = v;
        }
        if let Some(v) = self.down_payment {
            inputs.down_payment = v;
        }
        if let Some(v) = self.interest_rate {
            inputs.interest_rate = v;
        }
        merge_term(errors, LOAN_TERM_YEARS, self.loan_term_years, &mut inputs.loan_term_years);
        if let Some(v) = self.property_tax_rate {
            inputs.property_tax_rate = v;
        }
        if let Some(v) = self.annual_insurance {
            inputs.annual_insurance = v;
        }
        if let Some(v) = self.monthly_hoa {
            inputs.monthly_hoa = v;
        }
        if let Some(program) = self.loan_program {
            // Ratios the caller leaves out follow the chosen program.
            let limits = program.dti_limits();
            inputs.loan_program = program;
            inputs.front_end_ratio = limits.front_end;
            inputs.back_end_ratio = limits.back_end;
        }
        if let Some(v) = self.front_end_ratio {
            inputs.front_end_ratio = v;
        }
        if let Some(v) = self.back_end_ratio {
            inputs.back_end_ratio = v;
        }
        if let Some(v) = self.va_funding_fee_exempt {
            inputs.va_funding_fee_exempt = v;
        }
        CalculatorInputs::Affordability(inputs)
    }
}

impl CalculatorPayload for VaPurchasePayload {
    fn into_inputs(self, errors: &mut ValidationErrors) -> CalculatorInputs {
        let mut inputs = VaPurchaseInputs::default();
        if let Some(v) = self.home_price {
            inputs.home_price = v;
        }
        if let Some(v) = self.down_payment {
            inputs.down_payment = v;
        }
        if let Some(v) = self.interest_rate {
            inputs.interest_rate = v;
        }
        merge_term(errors, LOAN_TERM_YEARS, self.loan_term_years, &mut inputs.loan_term_years);
        inputs.funding_fee_percent = self.funding_fee_percent.unwrap_or_else(|| {
            default_funding_fee_percent(
                self.va_usage.unwrap_or(VaUsage::FirstUse),
                inputs.home_price,
                inputs.down_payment,
            )
        });
        if let Some(v) = self.disability_exempt {
            inputs.disability_exempt = v;
        }
        if let Some(v) = self.property_tax_rate {
            inputs.property_tax_rate = v;
        }
        if let Some(v) = self.annual_insurance {
            inputs.annual_insurance = v;
        }
        if let Some(v) = self.monthly_hoa {
            inputs.monthly_hoa = v;
        }
        CalculatorInputs::VaPurchase(inputs)
    }
}

impl CalculatorPayload for VaRefinancePayload {
    fn into_inputs(self, errors: &mut ValidationErrors) -> CalculatorInputs {
        let mut inputs = VaRefinanceInputs::default();
        if let Some(v) = self.refinance_type {
            inputs.refinance_type = v;
        }
        if let Some(v) = self.home_value {
            inputs.home_value = v;
        }
        if let Some(v) = self.current_balance {
            inputs.current_balance = v;
        }
        if let Some(v) = self.current_interest_rate {
            inputs.current_interest_rate = v;
        }
        merge_term(
            errors,
            REMAINING_TERM_YEARS,
            self.remaining_term_years,
            &mut inputs.remaining_term_years,
        );
        if let Some(v) = self.new_interest_rate {
            inputs.new_interest_rate = v;
        }
        merge_term(
            errors,
            LOAN_TERM_YEARS,
            self.loan_term_years,
            &mut inputs.new_loan_term_years,
        );
        if let Some(v) = self.cash_out_amount {
            inputs.cash_out_amount = v;
        }
        inputs.funding_fee_percent = self.funding_fee_percent.unwrap_or_else(|| {
            default_refinance_funding_fee_percent(
                inputs.refinance_type,
                self.va_usage.unwrap_or(VaUsage::FirstUse),
            )
        });
        if let Some(v) = self.disability_exempt {
            inputs.disability_exempt = v;
        }
        if let Some(v) = self.closing_costs {
            inputs.closing_costs = v;
        }
        CalculatorInputs::VaRefinance(inputs)
    }
}

impl CalculatorPayload for DscrPayload {
    fn into_inputs(self, errors: &mut ValidationErrors) -> CalculatorInputs {
        let mut inputs = DscrInputs::default();
        if let Some(v) = self.property_price {
            inputs.property_price = v;
        }
        if let Some(v) = self.down_payment {
            inputs.down_payment = v;
        }
        if let Some(v) = self.interest_rate {
            inputs.interest_rate = v;
        }
        merge_term(errors, LOAN_TERM_YEARS, self.loan_term_years, &mut inputs.loan_term_years);
        if let Some(v) = self.monthly_rent {
            inputs.monthly_rent = v;
        }
        if let Some(v) = self.monthly_expenses {
            inputs.monthly_expenses = v;
        }
        if let Some(v) = self.vacancy_rate {
            inputs.vacancy_rate = v;
        }
        CalculatorInputs::Dscr(inputs)
    }
}

/// Wire names accepted for a field that validation reports under another key.
const FIELD_ALIASES: [(&str, &str); 1] = [("newLoanTermYears", "loanTermYears")];

fn canonical_field(key: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |(_, field)| *field)
}

fn type_error_message(key: &str, detail: &str) -> String {
    match field_range(canonical_field(key)) {
        Some(range) => format!("{} must be a number", range.label),
        None => format!("Invalid value: {detail}"),
    }
}

/// Applies the payload and, when anything was rejected, reports those fields
/// together with whatever the merged inputs fail on.
fn finish<P: CalculatorPayload>(
    payload: P,
    mut errors: ValidationErrors,
) -> Result<CalculatorInputs, ApiError> {
    let inputs = payload.into_inputs(&mut errors);
    if errors.is_empty() {
        return Ok(inputs);
    }
    if let Err(rest) = inputs.validate() {
        errors.merge(rest);
    }
    Err(CalculatorError::Validation(errors).into())
}

fn decode_json<P: CalculatorPayload>(body: &[u8]) -> Result<CalculatorInputs, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return finish(P::default(), ValidationErrors::new());
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON payload: {e}")))?;
    let Value::Object(mut fields) = value else {
        return Err(ApiError::BadRequest(
            "Invalid JSON payload: expected an object".to_string(),
        ));
    };

    // Decode field by field so a bad value is reported under its own key.
    let mut errors = ValidationErrors::new();
    let rejected: Vec<String> = fields
        .iter()
        .filter_map(|(key, value)| {
            let single = Map::from_iter([(key.clone(), value.clone())]);
            let err = serde_json::from_value::<P>(Value::Object(single)).err()?;
            errors.add(canonical_field(key), type_error_message(key, &err.to_string()));
            Some(key.clone())
        })
        .collect();
    for key in &rejected {
        fields.remove(key);
    }
    let payload = serde_json::from_value::<P>(Value::Object(fields))
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON payload: {e}")))?;
    finish(payload, errors)
}

fn parse_query<P: DeserializeOwned>(query: &str) -> Result<P, String> {
    let uri: Uri = format!("/?{query}")
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| e.to_string())?;
    Query::<P>::try_from_uri(&uri)
        .map(|Query(payload)| payload)
        .map_err(|e| e.body_text())
}

fn decode_query<P: CalculatorPayload>(uri: &Uri) -> Result<CalculatorInputs, ApiError> {
    let mut errors = ValidationErrors::new();
    let mut accepted = Vec::new();
    for pair in uri.query().unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
        let key = pair.split('=').next().unwrap_or(pair);
        match parse_query::<P>(pair) {
            Ok(_) => accepted.push(pair),
            Err(detail) => errors.add(canonical_field(key), type_error_message(key, &detail)),
        }
    }
    let payload = parse_query::<P>(&accepted.join("&"))
        .map_err(|detail| ApiError::BadRequest(format!("Invalid query string: {detail}")))?;
    finish(payload, errors)
}

fn inputs_from_json(calculator: Calculator, body: &[u8]) -> Result<CalculatorInputs, ApiError> {
    match calculator {
        Calculator::Affordability => decode_json::<AffordabilityPayload>(body),
        Calculator::VaPurchase => decode_json::<VaPurchasePayload>(body),
        Calculator::VaRefinance => decode_json::<VaRefinancePayload>(body),
        Calculator::Dscr => decode_json::<DscrPayload>(body),
    }
}

fn inputs_from_query(calculator: Calculator, uri: &Uri) -> Result<CalculatorInputs, ApiError> {
    match calculator {
        Calculator::Affordability => decode_query::<AffordabilityPayload>(uri),
        Calculator::VaPurchase => decode_query::<VaPurchasePayload>(uri),
        Calculator::VaRefinance => decode_query::<VaRefinancePayload>(uri),
        Calculator::Dscr => decode_query::<DscrPayload>(uri),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorResponse {
    pub calculator: Calculator,
    pub title: &'static str,
    pub results: Vec<CalculatorResult>,
    /// Yearly amortization of the financed loan.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schedule: Vec<AmortizationYear>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculatorListing {
    calculator: Calculator,
    title: &'static str,
    summary: &'static str,
    path: String,
    fields: Vec<content::FormField>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct BlogQuery {
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContrastQuery {
    foreground: Option<String>,
    background: Option<String>,
}

fn resolve_calculator(slug: &str) -> Result<Calculator, ApiError> {
    Calculator::from_slug(slug).ok_or_else(|| ApiError::NotFound {
        kind: "calculator",
        slug: slug.to_string(),
    })
}

fn calculate(inputs: CalculatorInputs) -> Result<CalculatorResponse, ApiError> {
    let calculator = inputs.calculator();
    let results = inputs.calculate()?;
    let schedule = inputs.schedule()?;
    tracing::debug!(
        calculator = calculator.slug(),
        lines = results.len(),
        "calculation complete"
    );
    Ok(CalculatorResponse {
        calculator,
        title: calculator.title(),
        results,
        schedule,
    })
}

/// Runs a calculator from a camelCase JSON object; omitted fields take the
/// form defaults. Shared by the HTTP API and the `calc` subcommand.
pub fn run_calculator_json(
    calculator: Calculator,
    json: &str,
) -> Result<CalculatorResponse, ApiError> {
    calculate(inputs_from_json(calculator, json.as_bytes())?)
}

/// Plain-text rendering of a result list for terminals.
pub fn render_results_text(response: &CalculatorResponse) -> String {
    let width = response
        .results
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = format!("{}\n", response.title);
    for result in &response.results {
        let marker = if result.highlight { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:<width$}  {:>18}",
            result.label,
            result.display_value()
        );
        if let Some(description) = &result.description {
            let _ = writeln!(out, "    {description}");
        }
    }
    if !response.schedule.is_empty() {
        let _ = writeln!(
            out,
            "\n{:>4}  {:>16}  {:>16}  {:>16}",
            "Year", "Principal", "Interest", "Balance"
        );
        for row in &response.schedule {
            let _ = writeln!(
                out,
                "{:>4}  {:>16}  {:>16}  {:>16}",
                row.year,
                ResultFormat::Currency.render(row.principal_paid),
                ResultFormat::Currency.render(row.interest_paid),
                ResultFormat::Currency.render(row.ending_balance)
            );
        }
    }
    out
}

#[derive(Clone)]
struct AppState {
    page_cache: HeaderValue,
}

impl AppState {
    fn new(config: &SiteConfig) -> Self {
        let page_cache = if config.cache_max_age_secs == 0 {
            HeaderValue::from_static("no-cache")
        } else {
            HeaderValue::from_str(&format!("public, max-age={}", config.cache_max_age_secs))
                .unwrap_or(HeaderValue::from_static("no-cache"))
        };
        Self { page_cache }
    }
}

pub fn router(config: &SiteConfig) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/index.html", get(home_handler))
        .route("/loan-options", get(loan_options_handler))
        .route("/loan-options/:slug", get(loan_option_handler))
        .route("/blog", get(blog_index_handler))
        .route("/blog/:slug", get(blog_post_handler))
        .route("/calculators", get(calculators_handler))
        .route("/calculators/:slug", get(calculator_page_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/theme.css", get(theme_css_handler))
        .route("/health", get(health_handler))
        .route("/api/calculators", get(calculators_api_handler))
        .route(
            "/api/calculators/:slug",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/api/blog", get(blog_api_handler))
        .route("/api/loan-options", get(loan_options_api_handler))
        .route("/api/contrast", get(contrast_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(config))
}

pub async fn run_http_server(config: SiteConfig) -> std::io::Result<()> {
    let addr = config
        .socket_addr()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let app = router(&config);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "mortgage site listening");
    tracing::info!("local access: http://127.0.0.1:{}/", config.port);

    axum::serve(listener, app).await
}

fn page(state: &AppState, status: StatusCode, html: String) -> Response {
    let mut response = (status, Html(html)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, state.page_cache.clone());
    response
}

fn asset(state: &AppState, content_type: &'static str, body: impl IntoResponse) -> Response {
    let mut response = ([(header::CONTENT_TYPE, content_type)], body).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, state.page_cache.clone());
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn not_found_page(state: &AppState, path: &str) -> Response {
    page(state, StatusCode::NOT_FOUND, pages::not_found_page(path))
}

async fn home_handler(State(state): State<AppState>) -> Response {
    page(&state, StatusCode::OK, pages::home_page())
}

async fn loan_options_handler(State(state): State<AppState>) -> Response {
    page(&state, StatusCode::OK, pages::loan_options_page())
}

async fn loan_option_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    uri: Uri,
) -> Response {
    match content::find_loan_option(&slug) {
        Some(option) => page(&state, StatusCode::OK, pages::loan_option_page(option)),
        None => not_found_page(&state, uri.path()),
    }
}

async fn blog_index_handler(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
    uri: Uri,
) -> Response {
    match query.category.as_deref().filter(|c| !c.is_empty()) {
        None => page(&state, StatusCode::OK, pages::blog_index_page(None)),
        Some(slug) => match BlogCategory::from_slug(slug) {
            Some(category) => page(&state, StatusCode::OK, pages::blog_index_page(Some(category))),
            None => not_found_page(&state, uri.path()),
        },
    }
}

async fn blog_post_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    uri: Uri,
) -> Response {
    match content::find_post(&slug) {
        Some(post) => page(&state, StatusCode::OK, pages::blog_post_page(post)),
        None => not_found_page(&state, uri.path()),
    }
}

async fn calculators_handler(State(state): State<AppState>) -> Response {
    page(&state, StatusCode::OK, pages::calculators_page())
}

async fn calculator_page_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    uri: Uri,
) -> Response {
    let Some(calculator) = Calculator::from_slug(&slug) else {
        return not_found_page(&state, uri.path());
    };
    let initial = calculator.default_inputs().calculate().unwrap_or_else(|err| {
        tracing::warn!(calculator = calculator.slug(), error = %err, "default inputs failed");
        Vec::new()
    });
    page(&state, StatusCode::OK, pages::calculator_page(calculator, &initial))
}

async fn styles_handler(State(state): State<AppState>) -> Response {
    asset(&state, "text/css; charset=utf-8", STYLES_CSS)
}

async fn app_js_handler(State(state): State<AppState>) -> Response {
    asset(&state, "application/javascript; charset=utf-8", APP_JS)
}

async fn theme_css_handler(State(state): State<AppState>) -> Response {
    asset(&state, "text/css; charset=utf-8", theme::css_variables())
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn calculators_api_handler() -> Response {
    let listing: Vec<CalculatorListing> = Calculator::ALL
        .into_iter()
        .map(|calculator| CalculatorListing {
            calculator,
            title: calculator.title(),
            summary: calculator.summary(),
            path: format!("/calculators/{}", calculator.slug()),
            fields: calculator_form(calculator),
        })
        .collect();
    json_response(StatusCode::OK, listing)
}

async fn calculate_get_handler(Path(slug): Path<String>, uri: Uri) -> Result<Response, ApiError> {
    let calculator = resolve_calculator(&slug)?;
    let inputs = inputs_from_query(calculator, &uri)?;
    Ok(json_response(StatusCode::OK, calculate(inputs)?))
}

async fn calculate_post_handler(
    Path(slug): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let calculator = resolve_calculator(&slug)?;
    let inputs = inputs_from_json(calculator, &body)?;
    Ok(json_response(StatusCode::OK, calculate(inputs)?))
}

async fn blog_api_handler(Query(query): Query<BlogQuery>) -> Result<Response, ApiError> {
    let posts = match query.category.as_deref().filter(|c| !c.is_empty()) {
        None => content::posts_newest_first(),
        Some(slug) => {
            let category = BlogCategory::from_slug(slug).ok_or_else(|| ApiError::NotFound {
                kind: "blog category",
                slug: slug.to_string(),
            })?;
            content::posts_in_category(category)
        }
    };
    let summaries: Vec<BlogPostSummary> = posts.into_iter().map(BlogPostSummary::from).collect();
    Ok(json_response(StatusCode::OK, summaries))
}

async fn loan_options_api_handler() -> Response {
    let options: &[LoanOption] = content::loan_options();
    json_response(StatusCode::OK, options)
}

async fn contrast_handler(Query(query): Query<ContrastQuery>) -> Result<Response, ApiError> {
    let parse = |name: &str, value: Option<String>| -> Result<Rgb, ApiError> {
        let value = value.ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))?;
        Rgb::from_hex(&value).map_err(|e| ApiError::BadRequest(format!("{name}: {e}")))
    };
    let foreground = parse("foreground", query.foreground)?;
    let background = parse("background", query.background)?;
    Ok(json_response(
        StatusCode::OK,
        ContrastReport::new(foreground, background),
    ))
}

async fn not_found_handler(State(state): State<AppState>, uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        return ApiError::NotFound {
            kind: "endpoint",
            slug: uri.path().to_string(),
        }
        .into_response();
    }
    not_found_page(&state, uri.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn app() -> Router {
        router(&SiteConfig::default())
    }

    async fn send(request: Request<Body>) -> (StatusCode, Response) {
        let response = app().oneshot(request).await.expect("infallible");
        (response.status(), response)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request")
    }

    fn result_value(body: &Value, label: &str) -> f64 {
        body["results"]
            .as_array()
            .expect("results array")
            .iter()
            .find(|r| r["label"] == label)
            .and_then(|r| r["value"].as_f64())
            .unwrap_or_else(|| panic!("missing {label}"))
    }

    #[test]
    fn payload_parses_web_keys_and_keeps_defaults() {
        let json = r#"{
          "homePrice": 350000,
          "downPayment": 17500,
          "vaUsage": "subsequent-use",
          "disabilityExempt": false
        }"#;
        let CalculatorInputs::VaPurchase(inputs) =
            inputs_from_json(Calculator::VaPurchase, json.as_bytes()).expect("parse")
        else {
            panic!("wrong calculator");
        };
        assert_approx(inputs.home_price, 350_000.0);
        assert_approx(inputs.down_payment, 17_500.0);
        // 5% down on subsequent use.
        assert_approx(inputs.funding_fee_percent, 1.5);
        assert_eq!(inputs.loan_term_years, VaPurchaseInputs::default().loan_term_years);
    }

    #[test]
    fn loan_program_resets_unspecified_ratios() {
        let json = r#"{"loanProgram": "fha", "backEndRatio": 50}"#;
        let CalculatorInputs::Affordability(inputs) =
            inputs_from_json(Calculator::Affordability, json.as_bytes()).expect("parse")
        else {
            panic!("wrong calculator");
        };
        assert_eq!(inputs.loan_program, LoanProgram::Fha);
        assert_approx(inputs.front_end_ratio, 31.0);
        assert_approx(inputs.back_end_ratio, 50.0);
    }

    #[test]
    fn refinance_fee_defaults_by_type() {
        let json = r#"{"refinanceType": "cash-out", "cashOutAmount": 20000, "newLoanTermYears": 25}"#;
        let CalculatorInputs::VaRefinance(inputs) =
            inputs_from_json(Calculator::VaRefinance, json.as_bytes()).expect("parse")
        else {
            panic!("wrong calculator");
        };
        assert_eq!(inputs.refinance_type, VaRefinanceType::CashOut);
        assert_approx(inputs.funding_fee_percent, 2.15);
        assert_eq!(inputs.new_loan_term_years, 25);
    }

    #[test]
    fn malformed_json_is_a_bad_request() {
        let err = run_calculator_json(Calculator::Dscr, "{\"monthlyRent\": ").expect_err("bad json");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = run_calculator_json(Calculator::Dscr, "[1, 2]").expect_err("not an object");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    fn field_errors(err: &ApiError) -> &ValidationErrors {
        match err {
            ApiError::Calculator(CalculatorError::Validation(fields)) => fields,
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn bad_term_values_are_reported_under_the_field() {
        for (json, message) in [
            (r#"{"loanTermYears": -5}"#, "Loan term must be at least 1"),
            (r#"{"loanTermYears": 29.5}"#, "Loan term must be a whole number of years"),
            (r#"{"loanTermYears": "lots"}"#, "Loan term must be a number"),
            (r#"{"loanTermYears": 0}"#, "Loan term must be at least 1"),
        ] {
            let err = run_calculator_json(Calculator::Dscr, json).expect_err(json);
            assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY, "{json}");
            assert_eq!(field_errors(&err).get("loanTermYears"), Some(message), "{json}");
        }
    }

    #[test]
    fn type_errors_are_collected_with_range_errors() {
        let err = run_calculator_json(
            Calculator::VaRefinance,
            r#"{"newLoanTermYears": "thirty", "remainingTermYears": 12.25,
                "newInterestRate": 30, "refinanceType": "reverse"}"#,
        )
        .expect_err("several bad fields");
        let fields = field_errors(&err);
        assert_eq!(fields.get("loanTermYears"), Some("Loan term must be a number"));
        assert_eq!(
            fields.get("remainingTermYears"),
            Some("Remaining term must be a whole number of years")
        );
        assert_eq!(fields.get("newInterestRate"), Some("New interest rate must be at most 20"));
        assert!(fields.get("refinanceType").is_some_and(|m| m.starts_with("Invalid value")));
    }

    #[test]
    fn whole_terms_sent_as_decimals_are_accepted() {
        let response =
            run_calculator_json(Calculator::Dscr, r#"{"loanTermYears": 15.0}"#).expect("valid");
        assert_eq!(response.schedule.len(), 15);
    }

    #[test]
    fn empty_body_runs_with_defaults() {
        let response = run_calculator_json(Calculator::Affordability, "  ").expect("defaults");
        assert_eq!(response.calculator, Calculator::Affordability);
        assert!(response.results.iter().any(|r| r.label == "Maximum Home Price"));
    }

    #[test]
    fn text_rendering_marks_highlights() {
        let response = run_calculator_json(Calculator::VaPurchase, "{}").expect("defaults");
        let text = render_results_text(&response);
        assert!(text.starts_with("VA Purchase Calculator\n"));
        assert!(text.lines().any(|l| l.starts_with("* Total Monthly Payment")));
        assert!(text.contains("$8,600.00"));
        assert!(text.lines().any(|l| l.trim_start().starts_with("30 ") && l.ends_with("$0.00")));
    }

    #[tokio::test]
    async fn post_calculator_returns_results() {
        let (status, response) = send(post_json(
            "/api/calculators/dscr",
            r#"{"propertyPrice": 500000, "downPayment": 125000, "interestRate": 7.5,
                "loanTermYears": 30, "monthlyRent": 4000, "monthlyExpenses": 800}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );
        let body = body_json(response).await;
        assert_eq!(body["calculator"], "dscr");
        let dscr = result_value(&body, "DSCR");
        assert!((1.0..1.25).contains(&dscr), "dscr {dscr}");
        let schedule = body["schedule"].as_array().expect("schedule");
        assert_eq!(schedule.len(), 30);
        assert_eq!(schedule[29]["endingBalance"], 0.0);
    }

    #[tokio::test]
    async fn query_type_errors_are_field_keyed() {
        let (status, response) = send(get(
            "/api/calculators/va-purchase?loanTermYears=lots&homePrice=250000&interestRate=29.5",
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["fields"]["loanTermYears"], "Loan term must be a number");
        assert_eq!(body["fields"]["interestRate"], "Interest rate must be at most 20");

        let (status, response) = send(get("/api/calculators/dscr?loanTermYears=-5")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["fields"]["loanTermYears"], "Loan term must be at least 1");
    }

    #[tokio::test]
    async fn get_calculator_reads_the_query_string() {
        let (status, response) = send(get(
            "/api/calculators/va-purchase?homePrice=300000&fundingFeePercent=2.15&disabilityExempt=true",
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = body_json(response).await;
        assert_approx(result_value(&body, "VA Funding Fee"), 0.0);
        assert_approx(result_value(&body, "Total Loan Amount"), 300_000.0);
    }

    #[tokio::test]
    async fn validation_errors_are_field_keyed() {
        let (status, response) = send(post_json(
            "/api/calculators/affordability",
            r#"{"interestRate": 25, "annualIncome": 10}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Please correct the highlighted fields");
        assert_eq!(body["fields"]["interestRate"], "Interest rate must be at most 20");
        assert!(body["fields"]["annualIncome"].is_string());
    }

    #[tokio::test]
    async fn down_payment_above_price_is_rejected() {
        let (status, response) = send(post_json(
            "/api/calculators/va-purchase",
            r#"{"homePrice": 200000, "downPayment": 250000}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["fields"]["downPayment"].is_string());
    }

    #[tokio::test]
    async fn unknown_calculator_and_routes_are_404() {
        let (status, response) = send(get("/api/calculators/fha-streamline")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "unknown calculator: fha-streamline");

        let (status, response) = send(get("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body_json(response).await["error"].is_string());

        let (status, response) = send(get("/blog/not-a-post")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Page not found"));
    }

    #[tokio::test]
    async fn pages_render_with_cache_headers() {
        let (status, response) = send(get("/calculators/va-refinance")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("public, max-age=300"))
        );
        let html = body_text(response).await;
        assert!(html.contains("data-calculator=\"va-refinance\""));
        assert!(html.contains("New Monthly Payment"));

        for path in ["/", "/loan-options", "/loan-options/usda", "/blog", "/blog?category=investing", "/calculators"] {
            let (status, _) = send(get(path)).await;
            assert_eq!(status, StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn assets_have_content_types() {
        let (status, response) = send(get("/theme.css")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("text/css; charset=utf-8"))
        );
        assert!(body_text(response).await.contains("--color-primary"));

        let (status, response) = send(get("/app.js")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body_text(response).await.contains("/api/calculators/"));
    }

    #[tokio::test]
    async fn listings_and_contrast() {
        let (_, response) = send(get("/api/blog?category=va-loans")).await;
        let body = body_json(response).await;
        let posts = body.as_array().expect("array");
        assert!(!posts.is_empty());
        assert!(posts.iter().all(|p| p["category"] == "va-loans"));

        let (_, response) = send(get("/api/loan-options")).await;
        let body = body_json(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(content::loan_options().len()));

        let (status, response) = send(get("/api/contrast?foreground=%23000000&background=fff")).await;
        assert_eq!(status, StatusCode::OK);
        let body = body_json(response).await;
        assert_approx(body["ratio"].as_f64().expect("ratio"), 21.0);
        assert_eq!(body["aaaNormalText"], true);

        let (status, _) = send(get("/api/contrast?foreground=red&background=fff")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, response) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }
}
