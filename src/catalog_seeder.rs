use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::catalog::Catalog;
use crate::config::FetcherConfig;
use crate::models::CatalogEntry;
use crate::utils::user_agent::random_user_agent;
use crate::{AppError, Result};

const BOOTSTRAP_MARKER: &str = "window.PRODUCT_SELECTION_BOOTSTRAP";
const SELECTION_KEY: &str = "productSelectionData:";

static BARE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([{,])\s*([a-zA-Z0-9_]+)\s*:").unwrap());
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Scrapes a product-selection page and merges its models into the catalog.
#[derive(Debug, Clone)]
pub struct CatalogSeeder {
    client: Client,
    accept_language: String,
}

impl CatalogSeeder {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            accept_language: config.accept_language.clone(),
        })
    }

    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let html = self
            .client
            .get(url)
            .header(USER_AGENT, random_user_agent())
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        tracing::info!("Fetched product page {}", url);
        Ok(html)
    }

    /// Fetch `url`, extract its models and merge them into the catalog at
    /// `catalog_path`. Returns how many models the page contained.
    pub async fn seed(&self, url: &str, catalog_path: impl AsRef<Path>) -> Result<usize> {
        let catalog_path = catalog_path.as_ref();
        let html = self.fetch_page(url).await?;
        let selection = extract_product_selection(&html)?;
        let models = models_from_selection(&selection)?;
        let found = models.len();

        let mut catalog = if catalog_path.exists() {
            Catalog::load(catalog_path)?
        } else {
            Catalog::default()
        };
        catalog.merge(models);
        catalog.save(catalog_path)?;

        tracing::info!("Merged {} models into {}", found, catalog_path.display());
        Ok(found)
    }
}

/// Pull the `productSelectionData` object out of the bootstrap script.
pub fn extract_product_selection(html: &str) -> Result<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script")
        .map_err(|e| AppError::Internal(format!("invalid script selector: {:?}", e)))?;

    let script = document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .find(|text| text.contains(BOOTSTRAP_MARKER))
        .ok_or_else(|| AppError::parse(format!("no script contains {}", BOOTSTRAP_MARKER)))?;

    let key_at = script
        .find(SELECTION_KEY)
        .ok_or_else(|| AppError::parse(format!("'{}' not found", SELECTION_KEY)))?;
    let after_key = key_at + SELECTION_KEY.len();
    let start = script[after_key..]
        .find(|c: char| !c.is_whitespace())
        .map(|offset| after_key + offset)
        .ok_or_else(|| AppError::parse("product selection data is empty"))?;

    if !script[start..].starts_with('{') {
        return Err(AppError::parse("product selection data does not start with '{'"));
    }

    let end = find_matching_brace(&script, start)
        .ok_or_else(|| AppError::parse("no matching closing brace for product selection data"))?;

    let json = normalize_js_object(&script[start..=end]);
    let value = serde_json::from_str(&json)?;
    tracing::debug!("Extracted product selection data ({} bytes)", json.len());
    Ok(value)
}

/// Byte index of the `}` closing the `{` at `start`. Braces inside quoted
/// strings are ignored.
pub fn find_matching_brace(s: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, c) in s[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Rewrite a JavaScript object literal into JSON: quote bare keys, switch
/// single quotes to double quotes, drop trailing commas.
pub fn normalize_js_object(source: &str) -> String {
    let quoted = BARE_KEY.replace_all(source, r#"${1} "${2}":"#);
    let double_quoted = quoted.replace('\'', "\"");
    TRAILING_COMMA.replace_all(&double_quoted, "${1}").into_owned()
}

fn field<'a>(value: &'a Value, pointer: &str) -> Result<&'a Value> {
    value
        .pointer(pointer)
        .ok_or_else(|| AppError::parse(format!("missing {}", pointer)))
}

fn str_field<'a>(value: &'a Value, key: &str) -> Result<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::parse(format!("missing string field {}", key)))
}

fn parse_amount(value: &Value) -> Result<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim())
            .map_err(|e| AppError::parse(format!("invalid price {}: {}", s, e))),
        Value::Number(n) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok())
            .ok_or_else(|| AppError::parse(format!("invalid price {}", n))),
        other => Err(AppError::parse(format!("invalid price {}", other))),
    }
}

/// Build catalog entries from the product selection data.
pub fn models_from_selection(data: &Value) -> Result<BTreeMap<String, CatalogEntry>> {
    let colors: BTreeMap<&str, &str> = field(data, "/displayValues/dimensionColor")?
        .as_object()
        .ok_or_else(|| AppError::parse("dimensionColor is not an object"))?
        .iter()
        .filter_map(|(key, value)| {
            value
                .get("value")
                .and_then(Value::as_str)
                .filter(|v| !v.is_empty())
                .map(|v| (key.as_str(), v))
        })
        .collect();

    let mut prices: BTreeMap<String, (Decimal, String)> = BTreeMap::new();
    let price_table = field(data, "/displayValues/prices")?
        .as_object()
        .ok_or_else(|| AppError::parse("prices is not an object"))?;
    for (key, value) in price_table {
        let code = key.to_uppercase().replace('_', "/");
        let amount = parse_amount(field(value, "/currentPrice/raw_amount")?)?;
        let currency = str_field(value, "priceCurrency")?.to_string();
        prices.insert(code, (amount, currency));
    }

    let products = field(data, "/products")?
        .as_array()
        .ok_or_else(|| AppError::parse("products is not an array"))?;

    let mut models = BTreeMap::new();
    for product in products {
        let code = str_field(product, "partNumber")?;
        let (price, currency) = prices
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::parse(format!("no price for {}", code)))?;
        let color_key = str_field(product, "dimensionColor")?;
        let color = colors
            .get(color_key)
            .ok_or_else(|| AppError::parse(format!("unknown color {} for {}", color_key, code)))?;

        models.insert(
            code.to_string(),
            CatalogEntry {
                name: str_field(product, "familyType")?.to_string(),
                price,
                currency,
                capacity: str_field(product, "dimensionCapacity")?.to_string(),
                color: color.to_string(),
            },
        );
    }

    if models.is_empty() {
        return Err(AppError::parse("no products in product selection data"));
    }

    tracing::info!("Extracted {} models from product selection data", models.len());
    Ok(models)
}
