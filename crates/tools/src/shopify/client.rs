//! REST Admin API client for products, metafields and collections.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use shop_agent_core::{Metafield, Product, ProductId};
use tracing::instrument;

use crate::config::ShopifyConfig;

use super::conversions::{convert_metafield, convert_product, to_rest_metafield, to_rest_product};
use super::types::{
    CustomCollectionsEnvelope, ErrorsEnvelope, MetafieldEnvelope, MetafieldsEnvelope,
    ProductEnvelope, ProductsEnvelope, SmartCollectionsEnvelope,
};
use super::{AdminShopifyError, ProductStore};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Shopify REST Admin API client.
///
/// # Security
///
/// Holds the Admin API access token, which has HIGH PRIVILEGE access to the
/// store's catalog.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    /// `{protocol}://{store}/admin/api/{version}/`
    base_url: String,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns [`AdminShopifyError::InvalidConfig`] if the access token is not
    /// a valid header value or the HTTP client cannot be built.
    pub fn new(config: &ShopifyConfig) -> Result<Self, AdminShopifyError> {
        Self::with_base_url(&config.access_token, &config.base_url())
    }

    /// Create a client rooted at an explicit API base URL.
    ///
    /// # Errors
    ///
    /// Same as [`AdminClient::new`].
    pub fn with_base_url(
        access_token: &SecretString,
        base_url: &str,
    ) -> Result<Self, AdminShopifyError> {
        let mut token = HeaderValue::from_str(access_token.expose_secret()).map_err(|_| {
            AdminShopifyError::InvalidConfig("Invalid access token for header".to_string())
        })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCESS_TOKEN_HEADER, token);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AdminShopifyError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        Ok(Self {
            inner: Arc::new(AdminClientInner { client, base_url }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    // =========================================================================
    // Request Execution
    // =========================================================================

    /// Send a request and map error statuses.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<reqwest::Response, AdminShopifyError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<f64>().ok())
                    .map_or(2, |secs| {
                        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                        // Shopify sends small positive values such as "2.0"
                        let secs = secs.ceil() as u64;
                        secs
                    });
                Err(AdminShopifyError::RateLimited(retry_after))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                AdminShopifyError::Unauthorized("Invalid or expired access token".to_string()),
            ),
            StatusCode::NOT_FOUND => Err(AdminShopifyError::NotFound(resource.to_string())),
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                let body = response.text().await?;
                let messages = serde_json::from_str::<ErrorsEnvelope>(&body)
                    .map(|errors| errors.full_messages())
                    .unwrap_or_else(|_| vec![body]);
                Err(AdminShopifyError::UserError(messages))
            }
            _ => Err(AdminShopifyError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Send a request and decode the JSON body.
    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<T, AdminShopifyError> {
        let response = self.execute(request, resource).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ProductStore for AdminClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn find(&self, id: ProductId) -> Result<Option<Product>, AdminShopifyError> {
        let request = self.inner.client.get(self.url(&format!("products/{id}.json")));
        match self
            .execute_json::<ProductEnvelope>(request, &format!("product {id}"))
            .await
        {
            Ok(envelope) => Ok(Some(convert_product(envelope.product))),
            Err(AdminShopifyError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn find_page(
        &self,
        since_id: Option<ProductId>,
        limit: usize,
    ) -> Result<Vec<Product>, AdminShopifyError> {
        let path = since_id.map_or_else(
            || format!("products.json?limit={limit}"),
            |since| format!("products.json?limit={limit}&since_id={since}"),
        );
        let request = self.inner.client.get(self.url(&path));
        let envelope: ProductsEnvelope = self.execute_json(request, "products").await?;

        Ok(envelope.products.into_iter().map(convert_product).collect())
    }

    #[instrument(skip(self, product), fields(product_id = ?product.id))]
    async fn save(&self, product: &Product) -> Result<Product, AdminShopifyError> {
        let body = ProductEnvelope {
            product: to_rest_product(product),
        };
        let (request, resource) = match product.id {
            Some(id) => (
                self.inner
                    .client
                    .put(self.url(&format!("products/{id}.json"))),
                format!("product {id}"),
            ),
            None => (
                self.inner.client.post(self.url("products.json")),
                "products".to_string(),
            ),
        };

        let envelope: ProductEnvelope = self.execute_json(request.json(&body), &resource).await?;
        Ok(convert_product(envelope.product))
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn destroy(&self, id: ProductId) -> Result<(), AdminShopifyError> {
        let request = self
            .inner
            .client
            .delete(self.url(&format!("products/{id}.json")));
        self.execute(request, &format!("product {id}")).await?;
        Ok(())
    }

    #[instrument(skip(self, metafield), fields(product_id = %id, key = %metafield.label()))]
    async fn add_metafield(
        &self,
        id: ProductId,
        metafield: &Metafield,
    ) -> Result<Metafield, AdminShopifyError> {
        let body = MetafieldEnvelope {
            metafield: to_rest_metafield(metafield),
        };
        let request = self
            .inner
            .client
            .post(self.url(&format!("products/{id}/metafields.json")))
            .json(&body);

        let envelope: MetafieldEnvelope = self
            .execute_json(request, &format!("product {id}"))
            .await?;
        Ok(convert_metafield(envelope.metafield))
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn metafields(&self, id: ProductId) -> Result<Vec<Metafield>, AdminShopifyError> {
        let request = self
            .inner
            .client
            .get(self.url(&format!("products/{id}/metafields.json")));
        let envelope: MetafieldsEnvelope = self
            .execute_json(request, &format!("product {id}"))
            .await?;

        Ok(envelope
            .metafields
            .into_iter()
            .map(convert_metafield)
            .collect())
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn collections(&self, id: ProductId) -> Result<Vec<String>, AdminShopifyError> {
        let custom = self
            .inner
            .client
            .get(self.url(&format!("custom_collections.json?product_id={id}")));
        let custom: CustomCollectionsEnvelope =
            self.execute_json(custom, "custom collections").await?;

        let smart = self
            .inner
            .client
            .get(self.url(&format!("smart_collections.json?product_id={id}")));
        let smart: SmartCollectionsEnvelope = self.execute_json(smart, "smart collections").await?;

        Ok(custom
            .custom_collections
            .into_iter()
            .chain(smart.smart_collections)
            .map(|c| c.title)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shop_agent_core::{Price, Variant, VariantId};
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TOKEN: &str = "shpat_test_token";

    fn client_for(server: &MockServer) -> AdminClient {
        AdminClient::with_base_url(
            &SecretString::from(TOKEN),
            &format!("{}/admin/api/2026-01", server.uri()),
        )
        .unwrap()
    }

    fn product_json(id: u64, title: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": title,
            "body_html": "<p>Sturdy.</p>",
            "product_type": "Widget",
            "vendor": "Acme",
            "tags": "blue, sturdy",
            "handle": "blue-widget",
            "status": "active",
            "created_at": "2024-01-01T00:00:00-05:00",
            "updated_at": "2024-01-02T00:00:00-05:00",
            "variants": [
                {"id": id * 10, "title": "Default Title", "sku": "W-1", "price": "19.99"}
            ]
        })
    }

    #[tokio::test]
    async fn test_find_sends_token_and_converts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2026-01/products/42.json"))
            .and(header(ACCESS_TOKEN_HEADER, TOKEN))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"product": product_json(42, "Blue Widget")})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let product = client_for(&server)
            .find(ProductId::new(42))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(product.title, "Blue Widget");
        assert_eq!(product.first_price(), Some(Price::parse("19.99").unwrap()));
        assert_eq!(product.variants[0].id, Some(VariantId::new(420)));
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2026-01/products/7.json"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"errors": "Not Found"})))
            .mount(&server)
            .await;

        let found = client_for(&server).find(ProductId::new(7)).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_page_passes_since_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2026-01/products.json"))
            .and(query_param("limit", "100"))
            .and(query_param("since_id", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "products": [product_json(6, "Mug"), product_json(9, "Cup")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server)
            .find_page(Some(ProductId::new(5)), 100)
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[1].title, "Cup");
    }

    #[tokio::test]
    async fn test_save_creates_without_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/api/2026-01/products.json"))
            .and(body_partial_json(serde_json::json!({
                "product": {"title": "Blue Widget", "variants": [{"price": "19.99"}]}
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"product": product_json(42, "Blue Widget")})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let product = Product {
            title: "Blue Widget".to_string(),
            variants: vec![Variant {
                price: Some(Price::parse("19.99").unwrap()),
                ..Variant::default()
            }],
            ..Product::default()
        };

        let saved = client_for(&server).save(&product).await.unwrap();
        assert_eq!(saved.id, Some(ProductId::new(42)));
    }

    #[tokio::test]
    async fn test_save_updates_with_put() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/admin/api/2026-01/products/42.json"))
            .and(body_partial_json(serde_json::json!({
                "product": {"id": 42, "variants": [{"id": 420, "price": "25"}]}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"product": product_json(42, "Blue Widget")})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let product = Product {
            id: Some(ProductId::new(42)),
            title: "Blue Widget".to_string(),
            variants: vec![Variant {
                id: Some(VariantId::new(420)),
                price: Some(Price::parse("25").unwrap()),
                ..Variant::default()
            }],
            ..Product::default()
        };

        client_for(&server).save(&product).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejected_flattens_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "errors": {"title": ["can't be blank"]}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .save(&Product::default())
            .await
            .unwrap_err();

        match err {
            AdminShopifyError::UserError(messages) => {
                assert_eq!(messages, vec!["Title can't be blank"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2.0"))
            .mount(&server)
            .await;

        let err = client_for(&server).find_page(None, 100).await.unwrap_err();
        assert!(matches!(err, AdminShopifyError::RateLimited(2)));
    }

    #[tokio::test]
    async fn test_forbidden_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server).metafields(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, AdminShopifyError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_destroy() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/admin/api/2026-01/products/42.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).destroy(ProductId::new(42)).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_metafield_and_list() {
        let server = MockServer::start().await;
        let stored = serde_json::json!({
            "id": 900,
            "namespace": "ai_metadata",
            "key": "ai_results",
            "value": "Vendor Information: Acme, Globex",
            "type": "multi_line_text_field"
        });
        Mock::given(method("POST"))
            .and(path("/admin/api/2026-01/products/42/metafields.json"))
            .and(body_partial_json(serde_json::json!({
                "metafield": {"namespace": "ai_metadata", "key": "ai_results", "type": "multi_line_text_field"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"metafield": stored})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2026-01/products/42/metafields.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"metafields": [stored]})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let field = Metafield::new(
            "ai_metadata",
            "ai_results",
            "Vendor Information: Acme, Globex",
            "multi_line_text_field",
        );
        let saved = client.add_metafield(ProductId::new(42), &field).await.unwrap();
        assert!(saved.id.is_some());

        let listed = client.metafields(ProductId::new(42)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].label(), "ai_metadata.ai_results");
    }

    #[tokio::test]
    async fn test_collections_merges_custom_and_smart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2026-01/custom_collections.json"))
            .and(query_param("product_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "custom_collections": [{"id": 1, "title": "Summer"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2026-01/smart_collections.json"))
            .and(query_param("product_id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "smart_collections": [{"id": 2, "title": "Under $20"}]
            })))
            .mount(&server)
            .await;

        let titles = client_for(&server).collections(ProductId::new(42)).await.unwrap();
        assert_eq!(titles, vec!["Summer", "Under $20"]);
    }
}
