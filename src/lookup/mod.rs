//! External barcode product lookup.
//!
//! Talks to the go-upc JSON API to resolve barcodes that are not in the local
//! catalog. The product endpoint caches successful lookups back into the
//! store, so each unknown code is resolved externally at most once.

use reqwest::Client;
use serde::Deserialize;

use crate::infra::ServiceError;

/// Barcode lookup configuration.
#[derive(Debug, Clone)]
pub struct BarcodeLookupConfig {
    /// API key, sent as a bearer token.
    pub api_key: String,
    /// Lookup service base URL.
    pub base_url: String,
}

impl BarcodeLookupConfig {
    /// Load configuration from environment variables. Returns `None` when no
    /// API key is configured, in which case lookups are disabled and the
    /// product endpoint serves local data only.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("BARCODE_API_KEY").ok()?;
        let base_url =
            std::env::var("BARCODE_API_URL").unwrap_or_else(|_| "https://go-upc.com".to_string());

        Some(Self { api_key, base_url })
    }
}

/// A product as described by the external lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProduct {
    pub name: String,
    pub description: String,
    pub code_type: Option<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
}

/// Client for the go-upc code lookup endpoint.
pub struct BarcodeLookupClient {
    config: BarcodeLookupConfig,
    client: Client,
}

impl BarcodeLookupClient {
    pub fn new(config: BarcodeLookupConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self, code: &str) -> String {
        format!(
            "{}/api/v1/code/{}",
            self.config.base_url.trim_end_matches('/'),
            code
        )
    }

    /// Resolve a barcode. Returns `None` when the service does not know the
    /// code (HTTP 404); other non-success statuses are errors.
    pub async fn lookup(&self, code: &str) -> Result<Option<ExternalProduct>, ServiceError> {
        let url = self.endpoint(code);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ServiceError::Lookup(format!("lookup request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Lookup(format!(
                "lookup service returned HTTP status {}",
                status
            )));
        }

        let body = response
            .json::<LookupResponse>()
            .await
            .map_err(|e| ServiceError::Lookup(format!("failed to parse lookup response: {}", e)))?;

        let code_type = body.code_type;
        Ok(body.product.map(|p| {
            let mut product = ExternalProduct::from(p);
            product.code_type = code_type;
            product
        }))
    }
}

/// Wire format of the lookup response. The service has shipped both
/// `title`/`images` and `name`/`imageUrl` shapes, so both are accepted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    code_type: Option<String>,
    product: Option<ApiProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiProduct {
    #[serde(alias = "title")]
    name: Option<String>,
    description: Option<String>,
    brand: Option<String>,
    image_url: Option<String>,
    images: Option<Vec<String>>,
}

impl From<ApiProduct> for ExternalProduct {
    fn from(p: ApiProduct) -> Self {
        let image_url = p.image_url.or_else(|| {
            p.images
                .as_ref()
                .and_then(|images| images.first().cloned())
        });

        ExternalProduct {
            name: p.name.unwrap_or_else(|| "Unknown Product".to_string()),
            description: p
                .description
                .unwrap_or_else(|| "No description available".to_string()),
            code_type: None,
            brand: p.brand,
            image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = BarcodeLookupClient::new(BarcodeLookupConfig {
            api_key: "key".to_string(),
            base_url: "https://go-upc.com/".to_string(),
        });
        assert_eq!(
            client.endpoint("5000112654042"),
            "https://go-upc.com/api/v1/code/5000112654042"
        );
    }

    #[test]
    fn parses_title_and_images_shape() {
        let json = r#"
        {
          "product": {
            "title": "Coca-Cola Classic",
            "description": "Soft drink",
            "brand": "Coca-Cola",
            "images": ["https://img.example/cola.jpg"]
          }
        }
        "#;

        let response: LookupResponse = serde_json::from_str(json).unwrap();
        let product = ExternalProduct::from(response.product.unwrap());
        assert_eq!(product.name, "Coca-Cola Classic");
        assert_eq!(product.brand.as_deref(), Some("Coca-Cola"));
        assert_eq!(product.image_url.as_deref(), Some("https://img.example/cola.jpg"));
    }

    #[test]
    fn parses_name_and_image_url_shape() {
        let json = r#"
        {
          "product": {
            "name": "Sprite",
            "description": "Soft drink",
            "imageUrl": "https://img.example/sprite.jpg"
          }
        }
        "#;

        let response: LookupResponse = serde_json::from_str(json).unwrap();
        let product = ExternalProduct::from(response.product.unwrap());
        assert_eq!(product.name, "Sprite");
        assert_eq!(product.image_url.as_deref(), Some("https://img.example/sprite.jpg"));
    }

    #[test]
    fn missing_product_yields_none() {
        let response: LookupResponse = serde_json::from_str(r#"{"product": null}"#).unwrap();
        assert!(response.product.is_none());
    }

    #[test]
    fn missing_fields_get_fallbacks() {
        let response: LookupResponse = serde_json::from_str(r#"{"product": {}}"#).unwrap();
        let product = ExternalProduct::from(response.product.unwrap());
        assert_eq!(product.name, "Unknown Product");
        assert_eq!(product.description, "No description available");
        assert!(product.image_url.is_none());
    }
}
