//! Portal REST API client.

use crate::attendance::DateRange;
use crate::auth::{Session, User};
use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::models::attendance::AttendanceRecordDto;
use crate::models::shift::ShiftConfig;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// One page of a paginated list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

/// REST client for the admin portal backend.
///
/// Authenticated calls send the session token as a bearer token.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    max_pages: u32,
}

impl ApiClient {
    /// Create a new client instance.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
            max_pages: config.max_pages,
        })
    }

    /// Attach the token of an existing session.
    pub fn with_session(mut self, session: &Session) -> Self {
        self.token = Some(session.token.clone());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{base}/{path}", base = self.base_url, path = path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match &self.token {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(AppError::Unauthorized),
        }
    }

    /// Exchange credentials for a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let url = self.url("auth/login/");
        info!("Logging in as '{username}'");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let response = check_response(response).await?;
        let body: LoginResponse = response.json().await?;

        Ok(Session::new(body.token, body.user))
    }

    /// Fetch an employee's shift config, falling back to defaults when none is stored.
    pub async fn get_shift(&self, employee_id: i64) -> Result<ShiftConfig> {
        let url = self.url(&format!("employee-shift/{employee_id}/"));
        let response = self.authorized(self.client.get(&url))?.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("No shift configured for employee {employee_id}, using defaults");
            return Ok(ShiftConfig::default());
        }

        let response = check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Save an employee's shift config.
    pub async fn save_shift(&self, employee_id: i64, shift: &ShiftConfig) -> Result<()> {
        shift.validate()?;
        let url = self.url(&format!("employee-shift/{employee_id}/"));

        let response = self.authorized(self.client.post(&url))?.json(shift).send().await?;
        check_response(response).await?;

        info!("Saved shift {} for employee {employee_id}", shift.describe());
        Ok(())
    }

    /// Accept a pagination link only if it stays under the configured base URL.
    /// The bearer token is sent with it.
    fn checked_next<'u>(&self, next: &'u str) -> Result<&'u str> {
        let same_origin = next
            .strip_prefix(&self.base_url)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'));
        if same_origin {
            Ok(next)
        } else {
            warn!("Refusing pagination link outside {}: {next}", self.base_url);
            Err(AppError::parse(format!("Pagination link leaves the API base URL: {next}")))
        }
    }

    /// Fetch all attendance records for one employee in a date range,
    /// following pagination.
    pub async fn fetch_attendance(&self, employee_id: i64, range: DateRange) -> Result<Vec<AttendanceRecordDto>> {
        range.validate()?;

        let first_url = self.url("attendance-records/");
        let query = [
            ("employee_id", employee_id.to_string()),
            ("start_date", range.start.format("%Y-%m-%d").to_string()),
            ("end_date", range.end.format("%Y-%m-%d").to_string()),
        ];

        let mut records = Vec::new();
        let mut next: Option<String> = None;

        for page_no in 1..=self.max_pages {
            let request = match &next {
                Some(url) => self.client.get(url),
                None => self.client.get(&first_url).query(&query),
            };
            let response = self.authorized(request)?.send().await?;
            let response = check_response(response).await?;
            let body = response.text().await?;
            let page: Page<AttendanceRecordDto> = parse_page(&body)?;

            debug!(
                "Attendance page {page_no}: {} records (total {:?})",
                page.results.len(),
                page.count
            );
            records.extend(page.results);

            match page.next {
                Some(url) if !url.is_empty() => {
                    self.checked_next(&url)?;
                    next = Some(url);
                }
                _ => {
                    info!("Fetched {} attendance records for employee {employee_id}", records.len());
                    return Ok(records);
                }
            }
        }

        warn!(
            "Stopped after {} pages for employee {employee_id}; results may be incomplete",
            self.max_pages
        );
        Ok(records)
    }
}

/// Parse a paginated response body.
pub fn parse_page<T: serde::de::DeserializeOwned>(body: &str) -> Result<Page<T>> {
    serde_json::from_str(body).map_err(|e| AppError::parse(format!("Invalid page response: {e}")))
}

/// Map a non-success status to an error.
pub fn status_error(status: StatusCode, body: &str) -> AppError {
    if status == StatusCode::UNAUTHORIZED {
        return AppError::Unauthorized;
    }

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        });

    AppError::Api {
        status: status.as_u16(),
        message,
    }
}

async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}
