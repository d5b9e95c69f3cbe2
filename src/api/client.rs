use chrono::NaiveDate;
use serde::Deserialize;

use super::ApiError;
use crate::calendar::RawEvent;
use crate::config::Config;

/// HTTP client for the rescue server.
///
/// All endpoints are relative to the configured base URL. State-changing
/// requests carry the CSRF token the server injects into its pages;
/// fragment requests carry `HX-Request: true` so the server renders a
/// partial instead of a full page.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    csrf_token: String,
    rescue_id: Option<i64>,
}

/// Appointment record as served by the appointment API, used to
/// populate the edit-appointment form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start_datetime: Option<String>,
    #[serde(default)]
    pub end_datetime: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Medicine record used to populate the edit-medicine form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicineRecord {
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.server_url.trim_end_matches('/').to_string(),
            csrf_token: config.csrf_token.clone(),
            rescue_id: config.rescue_id,
        }
    }

    /// Fetch raw events for a visible date range.
    pub async fn events(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawEvent>, ApiError> {
        let mut params = vec![
            ("start".to_string(), format!("{}T00:00:00", start)),
            ("end".to_string(), format!("{}T00:00:00", end)),
        ];
        if let Some(rescue_id) = self.rescue_id {
            params.push(("rescue_id".to_string(), rescue_id.to_string()));
        }

        let res = self
            .http
            .get(format!("{}/api/calendar/events", self.base_url))
            .query(&params)
            .send()
            .await?;
        let res = check_status(res).await?;
        Ok(res.json().await?)
    }

    /// Fetch one page of a category's reminder list as an HTML fragment.
    pub async fn reminders_fragment(
        &self,
        category: &str,
        offset: usize,
        limit: usize,
    ) -> Result<String, ApiError> {
        let mut params = Vec::new();
        if let Some(rescue_id) = self.rescue_id {
            params.push(("rescue_id".to_string(), rescue_id.to_string()));
        }
        params.push(("offset".to_string(), offset.to_string()));
        params.push(("limit".to_string(), limit.to_string()));

        let res = self
            .http
            .get(format!("{}/calendar/reminders/{}", self.base_url, category))
            .header("HX-Request", "true")
            .query(&params)
            .send()
            .await?;
        let res = check_status(res).await?;
        Ok(res.text().await?)
    }

    /// Mark a reminder acknowledged. Any non-2xx status is a failure.
    pub async fn acknowledge_reminder(&self, reminder_id: i64) -> Result<(), ApiError> {
        let res = self
            .http
            .post(format!(
                "{}/calendar/acknowledge_reminder/{}",
                self.base_url, reminder_id
            ))
            .header("X-CSRFToken", &self.csrf_token)
            .send()
            .await?;
        check_status(res).await?;
        Ok(())
    }

    pub async fn appointment(&self, id: i64) -> Result<AppointmentRecord, ApiError> {
        self.fetch_record(&format!("/api/appointments/{}", id)).await
    }

    pub async fn medicine(&self, id: i64) -> Result<MedicineRecord, ApiError> {
        self.fetch_record(&format!("/api/medicines/{}", id)).await
    }

    async fn fetch_record<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        let res = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let res = check_status(res).await?;
        Ok(res.json().await?)
    }

    /// Submit a populated form to its per-record URL, form-encoded.
    pub async fn submit_form(
        &self,
        path: &str,
        fields: &[(String, String)],
    ) -> Result<(), ApiError> {
        let res = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("X-CSRFToken", &self.csrf_token)
            .form(fields)
            .send()
            .await?;
        check_status(res).await?;
        Ok(())
    }
}

/// Surface a non-2xx response body as the error detail.
async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = res.status().as_u16();
    if !(200..300).contains(&status) {
        let body = res.text().await.unwrap_or_default();
        return Err(ApiError::Status { status, body });
    }
    Ok(res)
}
