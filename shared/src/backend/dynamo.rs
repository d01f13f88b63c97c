use super::{Document, DocumentStore, IndexKey, Query, SYSTEM_FIELDS};
use crate::error::WorkshopError;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Document collections as DynamoDB tables, one table per collection,
/// with `id` as the partition key.
pub struct DynamoDocuments {
    client: DynamoClient,
}

impl DynamoDocuments {
    pub fn new(client: DynamoClient) -> Self {
        Self { client }
    }
}

/// JSON value to DynamoDB attribute.
pub fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_attribute(v)))
                .collect(),
        ),
    }
}

/// DynamoDB attribute to JSON value. Set and binary types are not used by
/// this application and come back as `null`.
pub fn from_attribute(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => parse_number(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::L(items) => Value::Array(items.iter().map(from_attribute).collect()),
        AttributeValue::M(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), from_attribute(v)))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn parse_number(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Split a DynamoDB item into system fields and data.
pub fn item_to_document(item: &HashMap<String, AttributeValue>) -> Document {
    let data = item
        .iter()
        .filter(|(k, _)| !SYSTEM_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), from_attribute(v)))
        .collect();

    Document {
        id: string_attr(item, "id"),
        created_at: string_attr(item, "created_at"),
        updated_at: string_attr(item, "updated_at"),
        data,
    }
}

#[async_trait]
impl DocumentStore for DynamoDocuments {
    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, WorkshopError> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut put_request = self
            .client
            .put_item()
            .table_name(collection)
            .item("id", AttributeValue::S(id.to_string()))
            .item("created_at", AttributeValue::S(now.clone()))
            .item("updated_at", AttributeValue::S(now.clone()))
            .condition_expression("attribute_not_exists(id)");

        for (key, value) in data.iter().filter(|(_, v)| !v.is_null()) {
            put_request = put_request.item(key.clone(), to_attribute(value));
        }

        put_request.send().await.map_err(|e| {
            if e.as_service_error()
                .map(|se| se.is_conditional_check_failed_exception())
                .unwrap_or(false)
            {
                WorkshopError::Conflict(format!("Document {} already exists in {}", id, collection))
            } else {
                tracing::error!("Failed to create document in {}: {:?}", collection, e);
                WorkshopError::backend("Failed to create document", e)
            }
        })?;

        Ok(Document {
            id: id.to_string(),
            created_at: now.clone(),
            updated_at: now,
            data: data.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        })
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Document, WorkshopError> {
        let result = self
            .client
            .get_item()
            .table_name(collection)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get document {} from {}: {:?}", id, collection, e);
                WorkshopError::backend("Failed to get document", e)
            })?;

        result
            .item()
            .map(item_to_document)
            .ok_or_else(|| WorkshopError::NotFound(format!("Document {} not found in {}", id, collection)))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Document, WorkshopError> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut set_expr = vec!["#updated_at = :updated_at".to_string()];
        let mut remove_expr = vec![];
        let mut expr_names = HashMap::new();
        let mut expr_values = HashMap::new();
        expr_names.insert("#updated_at".to_string(), "updated_at".to_string());
        expr_values.insert(":updated_at".to_string(), AttributeValue::S(now));

        for (i, (key, value)) in patch
            .iter()
            .filter(|(k, _)| !SYSTEM_FIELDS.contains(&k.as_str()))
            .enumerate()
        {
            let name = format!("#f{}", i);
            expr_names.insert(name.clone(), key.clone());
            if value.is_null() {
                remove_expr.push(name);
            } else {
                let placeholder = format!(":v{}", i);
                set_expr.push(format!("{} = {}", name, placeholder));
                expr_values.insert(placeholder, to_attribute(value));
            }
        }

        let mut update_expression = format!("SET {}", set_expr.join(", "));
        if !remove_expr.is_empty() {
            update_expression.push_str(&format!(" REMOVE {}", remove_expr.join(", ")));
        }

        let mut builder = self
            .client
            .update_item()
            .table_name(collection)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression(update_expression)
            .condition_expression("attribute_exists(id)")
            .return_values(ReturnValue::AllNew);

        for (k, v) in expr_names {
            builder = builder.expression_attribute_names(k, v);
        }

        for (k, v) in expr_values {
            builder = builder.expression_attribute_values(k, v);
        }

        let output = builder.send().await.map_err(|e| {
            if e.as_service_error()
                .map(|se| se.is_conditional_check_failed_exception())
                .unwrap_or(false)
            {
                WorkshopError::NotFound(format!("Document {} not found in {}", id, collection))
            } else {
                tracing::error!("Failed to update document {} in {}: {:?}", id, collection, e);
                WorkshopError::backend("Failed to update document", e)
            }
        })?;

        output
            .attributes()
            .map(item_to_document)
            .ok_or_else(|| WorkshopError::Backend("Update returned no attributes".to_string()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), WorkshopError> {
        self.client
            .delete_item()
            .table_name(collection)
            .key("id", AttributeValue::S(id.to_string()))
            .condition_expression("attribute_exists(id)")
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false)
                {
                    WorkshopError::NotFound(format!("Document {} not found in {}", id, collection))
                } else {
                    tracing::error!("Failed to delete document {} from {}: {:?}", id, collection, e);
                    WorkshopError::backend("Failed to delete document", e)
                }
            })?;
        Ok(())
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>, WorkshopError> {
        let expr = ListExpressions::new(query);
        let mut docs = match &query.index {
            Some(key) => self.query_index(collection, key, &expr).await?,
            None => self.scan(collection, &expr).await?,
        };
        query.sort(&mut docs);
        Ok(docs)
    }
}

/// Filter expression plus attribute name/value maps built from a [`Query`].
struct ListExpressions {
    filter: Option<String>,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl ListExpressions {
    fn new(query: &Query) -> Self {
        let mut filter_expr = vec![];
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        for (i, (field, value)) in query.filters.iter().enumerate() {
            let name = format!("#f{}", i);
            let placeholder = format!(":v{}", i);
            filter_expr.push(format!("{} = {}", name, placeholder));
            names.insert(name, field.clone());
            values.insert(placeholder, to_attribute(value));
        }

        Self {
            filter: (!filter_expr.is_empty()).then(|| filter_expr.join(" AND ")),
            names,
            values,
        }
    }
}

impl DynamoDocuments {
    /// Read one partition of a secondary index, paging until DynamoDB stops
    /// returning a continuation key.
    async fn query_index(
        &self,
        collection: &str,
        key: &IndexKey,
        expr: &ListExpressions,
    ) -> Result<Vec<Document>, WorkshopError> {
        let mut names = expr.names.clone();
        let mut values = expr.values.clone();
        names.insert("#pk".to_string(), key.field.clone());
        values.insert(":pk".to_string(), to_attribute(&key.value));

        let mut docs = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let page = self
                .client
                .query()
                .table_name(collection)
                .index_name(&key.index)
                .key_condition_expression("#pk = :pk")
                .set_filter_expression(expr.filter.clone())
                .set_expression_attribute_names(Some(names.clone()))
                .set_expression_attribute_values(Some(values.clone()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| {
                    tracing::error!("Failed to query {} on {}: {:?}", collection, key.index, e);
                    WorkshopError::backend("Failed to list documents", e)
                })?;

            docs.extend(page.items().iter().map(item_to_document));

            match page.last_evaluated_key() {
                Some(next) if !next.is_empty() => start_key = Some(next.clone()),
                _ => break,
            }
        }

        Ok(docs)
    }

    /// Whole-table read, used only for admin-wide listings.
    async fn scan(
        &self,
        collection: &str,
        expr: &ListExpressions,
    ) -> Result<Vec<Document>, WorkshopError> {
        let mut docs = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut builder = self
                .client
                .scan()
                .table_name(collection)
                .set_exclusive_start_key(start_key.take());

            if expr.filter.is_some() {
                builder = builder
                    .set_filter_expression(expr.filter.clone())
                    .set_expression_attribute_names(Some(expr.names.clone()))
                    .set_expression_attribute_values(Some(expr.values.clone()));
            }

            let page = builder.send().await.map_err(|e| {
                tracing::error!("Failed to scan {}: {:?}", collection, e);
                WorkshopError::backend("Failed to list documents", e)
            })?;

            docs.extend(page.items().iter().map(item_to_document));

            match page.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_to_document_splits_system_fields() {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S("reg-1".to_string()));
        item.insert("created_at".to_string(), AttributeValue::S("2025-09-07T10:00:00Z".to_string()));
        item.insert("updated_at".to_string(), AttributeValue::S("2025-09-08T10:00:00Z".to_string()));
        item.insert("payment_status".to_string(), AttributeValue::S("pending".to_string()));
        item.insert(
            "expertise".to_string(),
            AttributeValue::L(vec![AttributeValue::S("OSINT".to_string())]),
        );

        let doc = item_to_document(&item);

        assert_eq!(doc.id, "reg-1");
        assert_eq!(doc.updated_at, "2025-09-08T10:00:00Z");
        assert_eq!(doc.data.len(), 2);
        assert_eq!(doc.data.get("expertise"), Some(&json!(["OSINT"])));
    }

    #[test]
    fn test_list_expressions() {
        let expr = ListExpressions::new(&Query::new().indexed("user_id-index", "user_id", "u1"));
        assert!(expr.filter.is_none());
        assert!(expr.names.is_empty());

        let expr = ListExpressions::new(
            &Query::new()
                .indexed("user_id-index", "user_id", "u1")
                .equal("payment_status", "pending"),
        );
        assert_eq!(expr.filter.as_deref(), Some("#f0 = :v0"));
        assert_eq!(expr.names.get("#f0").map(String::as_str), Some("payment_status"));
        assert_eq!(expr.values.get(":v0"), Some(&AttributeValue::S("pending".to_string())));
    }

    #[test]
    fn test_numbers_keep_their_kind() {
        assert_eq!(from_attribute(&AttributeValue::N("42".to_string())), json!(42));
        assert_eq!(from_attribute(&AttributeValue::N("2.5".to_string())), json!(2.5));
        assert_eq!(to_attribute(&json!(42)), AttributeValue::N("42".to_string()));
    }

    #[test]
    fn test_nested_values() {
        let value = json!({"links": {"github": "https://github.com/ncc"}, "active": true});
        let attr = to_attribute(&value);

        let AttributeValue::M(fields) = &attr else {
            panic!("expected a map attribute");
        };
        assert_eq!(fields.get("active"), Some(&AttributeValue::Bool(true)));
        assert_eq!(from_attribute(&attr), value);
    }
}
