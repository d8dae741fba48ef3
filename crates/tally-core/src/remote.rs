//! Remote API client
//!
//! Thin HTTP wrapper over the inventory backend. Response shapes differ
//! slightly from the local schema (`product_id` vs `id`, optional fields),
//! so the wire types live here and convert into the canonical models at
//! this boundary only.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Branch, Product, Stock, StockView};

/// Full product+stock attribute set carried by create/update requests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductUpload {
    pub code: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
    pub batch: String,
}

impl ProductUpload {
    /// Assemble an upload from a local product and its stock row
    #[must_use]
    pub fn from_rows(product: &Product, stock: &Stock) -> Self {
        Self {
            code: product.code.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity: stock.quantity,
            batch: stock.batch.clone(),
        }
    }
}

/// Operations the sync engine and write path need from the backend
///
/// The seam exists so sync behavior can be exercised against a scripted
/// fake; `HttpApi` is the production implementation.
pub trait RemoteApi {
    /// Fetch the full branch list
    async fn list_branches(&self) -> Result<Vec<Branch>>;

    /// List (optionally search) a branch's stock
    async fn list_stock(&self, branch_id: i64, search: Option<&str>) -> Result<Vec<StockView>>;

    /// Create a product with its stock row; returns the server product id
    async fn create_product(&self, branch_id: i64, upload: &ProductUpload) -> Result<i64>;

    /// Update an existing product (server id) and its stock row
    async fn update_product(
        &self,
        branch_id: i64,
        product_id: i64,
        upload: &ProductUpload,
    ) -> Result<()>;

    /// Delete a product on the server
    async fn delete_product(&self, product_id: i64) -> Result<()>;

    /// Record a quantity adjustment for a server-side stock row
    async fn log_adjustment(&self, stock_id: i64, branch_id: i64, new_quantity: i64) -> Result<()>;
}

/// reqwest-backed implementation of `RemoteApi`
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl HttpApi {
    /// Create a client for the given API base URL and bearer token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            token: token.into(),
            client: reqwest::Client::builder().build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(parse_api_error(status, &body)));
        }
        Ok(response)
    }
}

impl RemoteApi for HttpApi {
    async fn list_branches(&self) -> Result<Vec<Branch>> {
        let response = self
            .client
            .get(self.url("/branches"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let branches = Self::check(response)
            .await?
            .json::<Vec<RemoteBranch>>()
            .await?;
        Ok(branches.into_iter().map(Branch::from).collect())
    }

    async fn list_stock(&self, branch_id: i64, search: Option<&str>) -> Result<Vec<StockView>> {
        let mut request = self
            .client
            .get(self.url(&format!("/branches/{branch_id}/stocks")))
            .bearer_auth(&self.token);
        if let Some(term) = search {
            request = request.query(&[("q", term)]);
        }

        let response = request.send().await?;
        let rows = Self::check(response)
            .await?
            .json::<Vec<RemoteStockRow>>()
            .await?;
        Ok(rows.into_iter().map(|row| row.into_view(branch_id)).collect())
    }

    async fn create_product(&self, branch_id: i64, upload: &ProductUpload) -> Result<i64> {
        let response = self
            .client
            .post(self.url(&format!("/branches/{branch_id}/products/")))
            .bearer_auth(&self.token)
            .json(upload)
            .send()
            .await?;
        let payload = Self::check(response)
            .await?
            .json::<CreateProductResponse>()
            .await?;
        payload.resolve_id()
    }

    async fn update_product(
        &self,
        branch_id: i64,
        product_id: i64,
        upload: &ProductUpload,
    ) -> Result<()> {
        let response = self
            .client
            .post(self.url(&format!("/branches/{branch_id}/products/{product_id}/")))
            .bearer_auth(&self.token)
            .json(upload)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_product(&self, product_id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/product/{product_id}/delete")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn log_adjustment(&self, stock_id: i64, branch_id: i64, new_quantity: i64) -> Result<()> {
        let response = self
            .client
            .post(self.url(&format!("/stocks/{stock_id}/log-adjustment")))
            .bearer_auth(&self.token)
            .json(&AdjustmentBody {
                branch_id,
                new_quantity,
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct AdjustmentBody {
    branch_id: i64,
    new_quantity: i64,
}

#[derive(Debug, Deserialize)]
struct RemoteBranch {
    id: i64,
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<RemoteBranch> for Branch {
    fn from(remote: RemoteBranch) -> Self {
        Self {
            id: remote.id,
            code: remote.code,
            description: remote.description.unwrap_or_default(),
        }
    }
}

/// One row of the branch stock listing as the server renders it
#[derive(Debug, Deserialize)]
struct RemoteStockRow {
    /// Stock row id on the server
    id: i64,
    /// Product id; older payloads carry it only as the row id
    #[serde(default)]
    product_id: Option<i64>,
    code: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    quantity: i64,
    #[serde(default)]
    batch: Option<String>,
    #[serde(default)]
    branch_id: Option<i64>,
}

impl RemoteStockRow {
    /// Normalize into the canonical view; `branch_id` fills payloads that
    /// omit it (the listing endpoint is already branch-scoped)
    fn into_view(self, branch_id: i64) -> StockView {
        StockView {
            product_id: self.product_id.unwrap_or(self.id),
            code: self.code,
            name: self.name,
            description: self.description.unwrap_or_default(),
            price: self.price.unwrap_or(0.0),
            stock_id: self.id,
            branch_id: self.branch_id.unwrap_or(branch_id),
            batch: self.batch.unwrap_or_default(),
            quantity: self.quantity,
            synced: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateProductResponse {
    id: Option<i64>,
    product_id: Option<i64>,
}

impl CreateProductResponse {
    fn resolve_id(self) -> Result<i64> {
        self.id
            .or(self.product_id)
            .ok_or_else(|| Error::Network("create response did not include id/product_id".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("API base URL must not be empty".to_string()));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "API base URL must include http:// or https://".to_string(),
        ))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url(String::new()).is_err());
        assert!(normalize_base_url("api.example.com".to_string()).is_err());
        assert_eq!(
            normalize_base_url("https://api.example.com/".to_string()).unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn parse_api_error_prefers_structured_message() {
        let message = parse_api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"code already taken"}"#,
        );
        assert_eq!(message, "code already taken (422)");

        let fallback = parse_api_error(StatusCode::BAD_GATEWAY, "");
        assert_eq!(fallback, "HTTP 502");
    }

    #[test]
    fn stock_row_normalizes_product_id_and_branch() {
        let row: RemoteStockRow = serde_json::from_str(
            r#"{"id":31,"code":"000111","name":"Widget","quantity":5,"batch":"B1"}"#,
        )
        .unwrap();
        let view = row.into_view(2);

        assert_eq!(view.product_id, 31);
        assert_eq!(view.stock_id, 31);
        assert_eq!(view.branch_id, 2);
        assert!(view.synced);

        let row: RemoteStockRow = serde_json::from_str(
            r#"{"id":31,"product_id":9,"code":"000111","name":"Widget","price":9.99,"quantity":5,"branch_id":4}"#,
        )
        .unwrap();
        let view = row.into_view(2);

        assert_eq!(view.product_id, 9);
        assert_eq!(view.branch_id, 4);
    }

    #[test]
    fn create_response_resolves_either_id_field() {
        let payload: CreateProductResponse =
            serde_json::from_str(r#"{"product_id":12}"#).unwrap();
        assert_eq!(payload.resolve_id().unwrap(), 12);

        let payload: CreateProductResponse = serde_json::from_str(r"{}").unwrap();
        assert!(payload.resolve_id().is_err());
    }
}
