//! Typed data-access shim over the inventory REST API.
//!
//! One choke point (`request`) performs every HTTP call: it attaches the bearer
//! token, deserializes 2xx bodies, and on any other status surfaces the
//! backend's `error` message verbatim. No retries, no caching — every page
//! re-fetches whole collections after a mutation.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::config::AppConfig;
use crate::errors::{ClientError, Result};
use crate::models::{
    NewProduct, PasswordChange, Product, ProductUpdate, StockMovement, StockUpdate, User,
};

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductsEnvelope {
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    product: Product,
}

#[derive(Debug, Deserialize)]
struct MovementsEnvelope {
    movements: Vec<StockMovement>,
}

#[derive(Debug, Deserialize)]
struct CategoriesEnvelope {
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SuppliersEnvelope {
    suppliers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: User,
}

/// `PUT /products/:id/stock` acknowledges with the recorded movement. Callers
/// reload the product collection afterwards instead of patching their copy, so
/// server-derived fields can never drift.
#[derive(Debug, Deserialize)]
pub struct StockUpdateAck {
    pub message: String,
    #[serde(default)]
    pub movement: Option<StockMovement>,
}

#[derive(Debug, Deserialize)]
pub struct Ack {
    pub message: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| ClientError::InvalidResponse(format!("invalid base URL: {}", e)))?;
        Ok(Self {
            http,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    /// Joins `path` onto the base URL. `path` is relative to the API root
    /// (e.g. `products/3/stock`).
    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ClientError::InvalidResponse("API base URL cannot be a base".to_string())
            })?;
            segments.pop_if_empty();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        debug!(%method, %url, "api request");

        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            serde_json::from_str(&text).map_err(|e| {
                ClientError::InvalidResponse(format!("failed to decode response: {}", e))
            })
        } else {
            Err(Self::api_error(status, response.text().await.ok()))
        }
    }

    /// Builds the error for a non-2xx response. The backend's `error` field is
    /// passed through verbatim; if the body is not the expected JSON the raw
    /// body is used, and failing that the status reason.
    fn api_error(status: StatusCode, body: Option<String>) -> ClientError {
        let message = body
            .as_deref()
            .and_then(|text| {
                serde_json::from_str::<serde_json::Value>(text)
                    .ok()
                    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                    .or_else(|| {
                        let trimmed = text.trim();
                        (!trimmed.is_empty()).then(|| trimmed.to_string())
                    })
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        ClientError::Api { status, message }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let envelope: ProductsEnvelope = self
            .request::<_, ()>(Method::GET, "products", None)
            .await?;
        Ok(envelope.products)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: i64) -> Result<Product> {
        let envelope: ProductEnvelope = self
            .request::<_, ()>(Method::GET, &format!("products/{}", product_id), None)
            .await?;
        Ok(envelope.product)
    }

    #[instrument(skip(self, product), fields(sku = %product.sku))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let envelope: ProductEnvelope = self
            .request(Method::POST, "products", Some(product))
            .await?;
        Ok(envelope.product)
    }

    #[instrument(skip(self, update))]
    pub async fn update_product(&self, product_id: i64, update: &ProductUpdate) -> Result<Ack> {
        self.request(Method::PUT, &format!("products/{}", product_id), Some(update))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: i64) -> Result<Ack> {
        self.request::<_, ()>(Method::DELETE, &format!("products/{}", product_id), None)
            .await
    }

    #[instrument(skip(self, update), fields(movement_type = ?update.movement_type, quantity = update.quantity))]
    pub async fn update_stock(&self, product_id: i64, update: &StockUpdate) -> Result<StockUpdateAck> {
        self.request(
            Method::PUT,
            &format!("products/{}/stock", product_id),
            Some(update),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn list_movements(&self, product_id: i64) -> Result<Vec<StockMovement>> {
        let envelope: MovementsEnvelope = self
            .request::<_, ()>(
                Method::GET,
                &format!("products/{}/movements", product_id),
                None,
            )
            .await?;
        Ok(envelope.movements)
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>> {
        let envelope: CategoriesEnvelope = self
            .request::<_, ()>(Method::GET, "categories", None)
            .await?;
        Ok(envelope.categories)
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(&self) -> Result<Vec<String>> {
        let envelope: SuppliersEnvelope = self
            .request::<_, ()>(Method::GET, "suppliers", None)
            .await?;
        Ok(envelope.suppliers)
    }

    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User> {
        let envelope: UserEnvelope = self.request::<_, ()>(Method::GET, "auth/me", None).await?;
        Ok(envelope.user)
    }

    #[instrument(skip_all)]
    pub async fn change_password(&self, change: &PasswordChange) -> Result<Ack> {
        self.request(Method::PUT, "auth/change-password", Some(change))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let cfg = AppConfig {
            api_base_url: base.to_string(),
            ..AppConfig::default()
        };
        ApiClient::new(&cfg).unwrap()
    }

    #[test]
    fn endpoint_joins_relative_paths() {
        let c = client("http://localhost:5000/api");
        assert_eq!(
            c.endpoint("products/3/stock").unwrap().as_str(),
            "http://localhost:5000/api/products/3/stock"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash_in_base() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(
            c.endpoint("products").unwrap().as_str(),
            "http://localhost:5000/api/products"
        );
    }

    #[test]
    fn api_error_prefers_error_field() {
        let err = ApiClient::api_error(
            StatusCode::BAD_REQUEST,
            Some(r#"{"error": "Product with SKU A1 already exists"}"#.to_string()),
        );
        assert_eq!(err.user_message(), "Product with SKU A1 already exists");
    }

    #[test]
    fn api_error_falls_back_to_raw_body_then_reason() {
        let err = ApiClient::api_error(StatusCode::BAD_GATEWAY, Some("upstream down".to_string()));
        assert_eq!(err.user_message(), "upstream down");

        let err = ApiClient::api_error(StatusCode::NOT_FOUND, Some(String::new()));
        assert_eq!(err.user_message(), "Not Found");

        let err = ApiClient::api_error(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert_eq!(err.user_message(), "Internal Server Error");
    }
}
