//! DynamoDB backend.
//!
//! Items are JSON objects converted to `AttributeValue` maps. Conditions are sent with `#kN`
//! name placeholders so key names never collide with reserved words.

use crate::config::{AttributeType, TableSpec};
use crate::error::StoreError;
use crate::service::ConditionExpression;
use crate::store::{Item, KeyValueStore};
use async_trait::async_trait;
use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use tracing::{debug, info};

pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS config chain, optionally against a local endpoint.
    pub async fn from_env(endpoint_url: Option<&str>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = match endpoint_url {
            Some(endpoint) => {
                let dynamo_config = aws_sdk_dynamodb::config::Builder::from(&config)
                    .endpoint_url(endpoint)
                    .build();
                Client::from_conf(dynamo_config)
            }
            None => Client::new(&config),
        };
        info!(endpoint = ?endpoint_url, "using DynamoDB store");
        Self { client }
    }
}

/// Classify an SDK failure: 5xx responses, timeouts and transport failures are server faults.
fn fault<E>(err: SdkError<E, HttpResponse>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let message = err
        .message()
        .map(String::from)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    let (name, server) = match &err {
        SdkError::ServiceError(ctx) => (
            err.code().unwrap_or("ServiceError").to_string(),
            ctx.raw().status().as_u16() >= 500,
        ),
        SdkError::ConstructionFailure(_) => ("ConstructionFailure".to_string(), false),
        SdkError::TimeoutError(_) => ("TimeoutError".to_string(), true),
        SdkError::DispatchFailure(_) => ("DispatchFailure".to_string(), true),
        SdkError::ResponseError(_) => ("ResponseError".to_string(), true),
        _ => ("SdkError".to_string(), true),
    };
    if server {
        StoreError::server(name, message)
    } else {
        StoreError::client(name, message)
    }
}

fn build_fault(err: BuildError) -> StoreError {
    StoreError::client("BuildError", err.to_string())
}

fn scalar_type(t: AttributeType) -> ScalarAttributeType {
    match t {
        AttributeType::String => ScalarAttributeType::S,
        AttributeType::Number => ScalarAttributeType::N,
        AttributeType::Binary => ScalarAttributeType::B,
    }
}

fn to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(a) => AttributeValue::L(a.into_iter().map(to_attribute).collect()),
        Value::Object(m) => AttributeValue::M(to_attribute_map(m)),
    }
}

fn to_attribute_map(item: Item) -> HashMap<String, AttributeValue> {
    item.into_iter().map(|(k, v)| (k, to_attribute(v))).collect()
}

fn number_value(n: String) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::from(i);
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::String(n))
}

fn from_attribute(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => number_value(n),
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(l) => Value::Array(l.into_iter().map(from_attribute).collect()),
        AttributeValue::M(m) => Value::Object(from_attribute_map(m)),
        AttributeValue::Ss(ss) => Value::Array(ss.into_iter().map(Value::String).collect()),
        AttributeValue::Ns(ns) => Value::Array(ns.into_iter().map(number_value).collect()),
        AttributeValue::B(b) => Value::Array(b.into_inner().into_iter().map(Value::from).collect()),
        AttributeValue::Bs(bs) => Value::Array(
            bs.into_iter()
                .map(|b| Value::Array(b.into_inner().into_iter().map(Value::from).collect()))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn from_attribute_map(item: HashMap<String, AttributeValue>) -> Map<String, Value> {
    item.into_iter().map(|(k, v)| (k, from_attribute(v))).collect()
}

#[async_trait]
impl KeyValueStore for DynamoStore {
    async fn create_table(&self, table: &TableSpec) -> Result<(), StoreError> {
        let mut req = self
            .client
            .create_table()
            .table_name(&table.name)
            .billing_mode(BillingMode::PayPerRequest);
        for (attr, key_type) in table.key_attributes().zip([KeyType::Hash, KeyType::Range]) {
            req = req
                .key_schema(
                    KeySchemaElement::builder()
                        .attribute_name(&attr.name)
                        .key_type(key_type)
                        .build()
                        .map_err(build_fault)?,
                )
                .attribute_definitions(
                    AttributeDefinition::builder()
                        .attribute_name(&attr.name)
                        .attribute_type(scalar_type(attr.type_))
                        .build()
                        .map_err(build_fault)?,
                );
        }
        match req.send().await {
            Ok(_) => {
                info!(table = %table.name, "created DynamoDB table");
                Ok(())
            }
            Err(err) if err.as_service_error().map(|e| e.is_resource_in_use_exception()).unwrap_or(false) => {
                debug!(table = %table.name, "DynamoDB table already exists");
                Ok(())
            }
            Err(err) => Err(fault(err)),
        }
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), StoreError> {
        match self.client.delete_table().table_name(table_name).send().await {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().map(|e| e.is_resource_not_found_exception()).unwrap_or(false) => Ok(()),
            Err(err) => Err(fault(err)),
        }
    }

    async fn put_item(&self, table_name: &str, item: Item, condition: &ConditionExpression) -> Result<(), StoreError> {
        let mut req = self
            .client
            .put_item()
            .table_name(table_name)
            .set_item(Some(to_attribute_map(item)));
        if !condition.is_empty() {
            let (expression, names) = condition.with_placeholders();
            req = req
                .condition_expression(expression)
                .set_expression_attribute_names(Some(names));
        }
        match req.send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(StoreError::ConditionFailed(condition.to_string()))
            }
            Err(err) => Err(fault(err)),
        }
    }

    async fn get_item(&self, table_name: &str, key: &Item) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(to_attribute_map(key.clone())))
            .consistent_read(true)
            .send()
            .await
            .map_err(fault)?;
        Ok(output.item.map(from_attribute_map))
    }

    async fn delete_item(&self, table_name: &str, key: &Item) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(table_name)
            .set_key(Some(to_attribute_map(key.clone())))
            .send()
            .await
            .map_err(fault)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client.list_tables().limit(1).send().await.map_err(fault)?;
        Ok(())
    }
}
