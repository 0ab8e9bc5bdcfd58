//! HTTP client for the Store's serverless request handlers.
//!
//! All endpoints speak JSON. Non-2xx responses are mapped through
//! `StoreError::from_status`; request timeouts surface as network errors
//! and are treated identically by the engine.

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::models::{Budget, Expense, NewExpense};

use super::{Store, StoreError};

/// HTTP request timeout in seconds.
/// 8s fails fast enough that an offline mutation still feels instant while
/// tolerating slow serverless cold starts.
const REQUEST_TIMEOUT_SECS: u64 = 8;

/// `POST /budget` body. The handlers read camelCase keys.
#[derive(Debug, Serialize)]
struct BudgetPayload<'a> {
    amount: f64,
    #[serde(rename = "startDate")]
    start_date: &'a NaiveDate,
    #[serde(rename = "endDate")]
    end_date: &'a NaiveDate,
    days: i64,
}

#[derive(Debug, Serialize)]
struct PinPayload<'a> {
    pin: &'a str,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    valid: bool,
}

/// Client for the Store endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct StoreClient {
    client: Client,
    base_url: String,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Check if a response is successful, mapping the body into an error if not.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(StoreError::from_status(status, &body))
        }
    }
}

impl Store for StoreClient {
    async fn fetch_budget(&self) -> Result<Option<Budget>, StoreError> {
        let response = self.client.get(self.url("budget")).send().await?;
        let response = Self::check(response).await?;
        // The handler returns the newest row, or a JSON null when none exists
        let budget: Option<Budget> = response.json().await?;
        debug!(found = budget.is_some(), "Fetched budget from store");
        Ok(budget)
    }

    async fn save_budget(&self, budget: &Budget) -> Result<Value, StoreError> {
        let payload = BudgetPayload {
            amount: budget.amount,
            start_date: &budget.start_date,
            end_date: &budget.end_date,
            days: budget.days,
        };
        let response = self
            .client
            .post(self.url("budget"))
            .json(&payload)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn delete_budget(&self, id: Option<i64>) -> Result<(), StoreError> {
        let url = match id {
            Some(id) => format!("{}?id={}", self.url("budget"), id),
            None => self.url("budget"),
        };
        let response = self.client.delete(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_expenses(&self) -> Result<Vec<Expense>, StoreError> {
        let response = self.client.get(self.url("expenses")).send().await?;
        let response = Self::check(response).await?;
        let expenses: Vec<Expense> = response.json().await?;
        debug!(count = expenses.len(), "Fetched expenses from store");
        Ok(expenses)
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Value, StoreError> {
        let response = self
            .client
            .post(self.url("expenses"))
            .json(expense)
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn delete_expense(&self, id: i64) -> Result<(), StoreError> {
        let url = format!("{}?id={}", self.url("expenses"), id);
        let response = self.client.delete(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn verify_pin(&self, pin: &str) -> Result<bool, StoreError> {
        let response = self
            .client
            .post(self.url("verify-pin"))
            .json(&PinPayload { pin })
            .send()
            .await?;
        let response = Self::check(response).await?;
        let pin_response: PinResponse = response.json().await?;
        Ok(pin_response.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = StoreClient::new("http://localhost:8888/api/").unwrap();
        assert_eq!(client.url("budget"), "http://localhost:8888/api/budget");
    }

    #[test]
    fn test_budget_payload_uses_camel_case_keys() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let payload = BudgetPayload {
            amount: 150000.0,
            start_date: &start,
            end_date: &end,
            days: 30,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["startDate"], "2024-01-01");
        assert_eq!(json["endDate"], "2024-01-31");
        assert_eq!(json["days"], 30);
    }

    #[test]
    fn test_new_expense_body_shape() {
        let expense = NewExpense {
            name: "Rice".to_string(),
            amount: 5000.0,
            category: Category::Groceries,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        };
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["name"], "Rice");
        assert_eq!(json["category"], "groceries");
        assert_eq!(json["date"], "2024-01-05");
    }
}
