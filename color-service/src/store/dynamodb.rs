use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use tracing::debug;

use super::{ColorStore, StoreError};
use crate::model::ColorRecord;

const ATTR_KEY: &str = "pk";
const ATTR_COLORS: &str = "colors";
const ATTR_TIMESTAMP: &str = "timestamp";

type Item = HashMap<String, AttributeValue>;

/// Color records in a DynamoDB table with `pk` as its string partition key.
#[derive(Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for DynamoDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl DynamoDbStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn backend_error<E>(operation: &'static str, err: E) -> StoreError
    where
        E: std::error::Error,
    {
        StoreError::Backend {
            operation,
            message: DisplayErrorContext(err).to_string(),
        }
    }
}

fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
}

fn colors_of(value: Option<&AttributeValue>) -> Vec<String> {
    value
        .and_then(|v| v.as_l().ok())
        .map(|list| {
            list.iter()
                .filter_map(|c| c.as_s().ok())
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn record_to_item(record: &ColorRecord) -> Item {
    HashMap::from([
        (ATTR_KEY.to_string(), AttributeValue::S(record.key.clone())),
        (ATTR_COLORS.to_string(), string_list(&record.colors)),
        (
            ATTR_TIMESTAMP.to_string(),
            AttributeValue::S(record.timestamp.clone()),
        ),
    ])
}

fn item_to_record(item: &Item) -> Result<ColorRecord, StoreError> {
    let key = item
        .get(ATTR_KEY)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::MalformedItem(format!("item without string `{ATTR_KEY}`")))?;

    Ok(ColorRecord {
        key,
        colors: colors_of(item.get(ATTR_COLORS)),
        timestamp: item
            .get(ATTR_TIMESTAMP)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_default(),
    })
}

#[async_trait]
impl ColorStore for DynamoDbStore {
    async fn get(&self, key: &str) -> Result<Option<ColorRecord>, StoreError> {
        debug!(table = %self.table_name, key, "GetItem");
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_KEY, AttributeValue::S(key.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| Self::backend_error("GetItem", e))?;

        response.item().map(item_to_record).transpose()
    }

    async fn put(&self, record: &ColorRecord) -> Result<(), StoreError> {
        debug!(table = %self.table_name, key = %record.key, "PutItem");
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)))
            .send()
            .await
            .map_err(|e| Self::backend_error("PutItem", e))?;
        Ok(())
    }

    async fn append_color(
        &self,
        key: &str,
        color: &str,
        timestamp: &str,
    ) -> Result<Vec<String>, StoreError> {
        debug!(table = %self.table_name, key, "UpdateItem list_append");
        // `timestamp` is a reserved word, hence the name placeholder.
        let response = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ATTR_KEY, AttributeValue::S(key.to_string()))
            .update_expression(
                "SET #colors = list_append(if_not_exists(#colors, :empty), :color), #ts = :ts",
            )
            .expression_attribute_names("#colors", ATTR_COLORS)
            .expression_attribute_names("#ts", ATTR_TIMESTAMP)
            .expression_attribute_values(":empty", AttributeValue::L(Vec::new()))
            .expression_attribute_values(":color", string_list(&[color.to_string()]))
            .expression_attribute_values(":ts", AttributeValue::S(timestamp.to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| Self::backend_error("UpdateItem", e))?;

        let colors = colors_of(response.attributes().and_then(|a| a.get(ATTR_COLORS)));
        if colors.is_empty() {
            return Ok(vec![color.to_string()]);
        }
        Ok(colors)
    }

    async fn scan(&self, prefix: Option<&str>) -> Result<Vec<ColorRecord>, StoreError> {
        debug!(table = %self.table_name, prefix, "Scan");
        let mut records = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let mut request = self.client.scan().table_name(&self.table_name);
            if let Some(prefix) = prefix {
                request = request
                    .filter_expression("begins_with(#pk, :prefix)")
                    .expression_attribute_names("#pk", ATTR_KEY)
                    .expression_attribute_values(":prefix", AttributeValue::S(prefix.to_string()));
            }
            if let Some(key) = last_evaluated_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let response = request
                .send()
                .await
                .map_err(|e| Self::backend_error("Scan", e))?;

            for item in response.items() {
                records.push(item_to_record(item)?);
            }

            match response.last_evaluated_key() {
                Some(key) if !key.is_empty() => last_evaluated_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::operation::get_item::{GetItemError, GetItemOutput};
    use aws_sdk_dynamodb::operation::put_item::PutItemOutput;
    use aws_sdk_dynamodb::operation::scan::ScanOutput;
    use aws_sdk_dynamodb::operation::update_item::UpdateItemOutput;
    use aws_sdk_dynamodb::types::error::ResourceNotFoundException;
    use aws_smithy_mocks::{mock, mock_client, RuleMode};

    const TABLE: &str = "colors-test";

    fn key_item(key: &str) -> Item {
        HashMap::from([(ATTR_KEY.to_string(), AttributeValue::S(key.to_string()))])
    }

    fn stored(key: &str, colors: &[&str]) -> Item {
        let colors: Vec<String> = colors.iter().map(|c| c.to_string()).collect();
        record_to_item(&ColorRecord {
            key: key.to_string(),
            colors,
            timestamp: "2024-01-01T00:00:00.000Z".into(),
        })
    }

    #[tokio::test]
    async fn append_is_a_single_list_append_update() {
        let update = mock!(Client::update_item)
            .match_requests(|req| {
                let names = req.expression_attribute_names().cloned().unwrap_or_default();
                let values = req.expression_attribute_values().cloned().unwrap_or_default();
                req.table_name() == Some(TABLE)
                    && req.key() == Some(&key_item("John"))
                    && req.update_expression()
                        == Some(
                            "SET #colors = list_append(if_not_exists(#colors, :empty), :color), #ts = :ts",
                        )
                    && names.get("#colors").map(String::as_str) == Some(ATTR_COLORS)
                    && names.get("#ts").map(String::as_str) == Some(ATTR_TIMESTAMP)
                    && values.get(":empty") == Some(&AttributeValue::L(Vec::new()))
                    && values.get(":color")
                        == Some(&AttributeValue::L(vec![AttributeValue::S("green".into())]))
                    && values.get(":ts") == Some(&AttributeValue::S("2024-01-02T00:00:00.000Z".into()))
                    && req.return_values() == Some(&ReturnValue::UpdatedNew)
            })
            .then_output(|| {
                UpdateItemOutput::builder()
                    .attributes(
                        ATTR_COLORS,
                        string_list(&["blue".to_string(), "green".to_string()]),
                    )
                    .build()
            });
        let get = mock!(Client::get_item).then_output(|| GetItemOutput::builder().build());
        let put = mock!(Client::put_item).then_output(|| PutItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&update, &get, &put]);
        let store = DynamoDbStore::new(client, TABLE);

        let colors = store
            .append_color("John", "green", "2024-01-02T00:00:00.000Z")
            .await
            .unwrap();

        assert_eq!(colors, vec!["blue", "green"]);
        assert_eq!(update.num_calls(), 1);
        assert_eq!(get.num_calls(), 0);
        assert_eq!(put.num_calls(), 0);
    }

    #[tokio::test]
    async fn scan_follows_last_evaluated_key() {
        let first = mock!(Client::scan)
            .match_requests(|req| req.table_name() == Some(TABLE) && req.exclusive_start_key().is_none())
            .then_output(|| {
                ScanOutput::builder()
                    .items(stored("Ada", &["red"]))
                    .set_last_evaluated_key(Some(key_item("Ada")))
                    .build()
            });
        let second = mock!(Client::scan)
            .match_requests(|req| req.exclusive_start_key() == Some(&key_item("Ada")))
            .then_output(|| {
                ScanOutput::builder()
                    .items(stored("John", &["blue", "green"]))
                    .build()
            });
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&first, &second]);
        let store = DynamoDbStore::new(client, TABLE);

        let records = store.scan(None).await.unwrap();

        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Ada", "John"]);
        assert_eq!(records[1].colors, vec!["blue", "green"]);
        assert_eq!(first.num_calls(), 1);
        assert_eq!(second.num_calls(), 1);
    }

    #[tokio::test]
    async fn scan_with_prefix_filters_on_key() {
        let scan = mock!(Client::scan)
            .match_requests(|req| {
                let names = req.expression_attribute_names().cloned().unwrap_or_default();
                let values = req.expression_attribute_values().cloned().unwrap_or_default();
                req.filter_expression() == Some("begins_with(#pk, :prefix)")
                    && names.get("#pk").map(String::as_str) == Some(ATTR_KEY)
                    && values.get(":prefix") == Some(&AttributeValue::S("Jo".into()))
            })
            .then_output(|| ScanOutput::builder().items(stored("John", &["blue"])).build());
        let client = mock_client!(aws_sdk_dynamodb, [&scan]);
        let store = DynamoDbStore::new(client, TABLE);

        let records = store.scan(Some("Jo")).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "John");
        assert_eq!(scan.num_calls(), 1);
    }

    #[tokio::test]
    async fn put_writes_the_whole_record() {
        let put = mock!(Client::put_item)
            .match_requests(|req| {
                req.table_name() == Some(TABLE) && req.item() == Some(&stored("Ada", &["red"]))
            })
            .then_output(|| PutItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, [&put]);
        let store = DynamoDbStore::new(client, TABLE);

        store
            .put(&ColorRecord {
                key: "Ada".into(),
                colors: vec!["red".into()],
                timestamp: "2024-01-01T00:00:00.000Z".into(),
            })
            .await
            .unwrap();

        assert_eq!(put.num_calls(), 1);
    }

    #[tokio::test]
    async fn get_reads_consistently_and_maps_absence_to_none() {
        let found = mock!(Client::get_item)
            .match_requests(|req| {
                req.key() == Some(&key_item("Ada")) && req.consistent_read() == Some(true)
            })
            .then_output(|| GetItemOutput::builder().set_item(Some(stored("Ada", &["red"]))).build());
        let missing = mock!(Client::get_item)
            .match_requests(|req| req.key() == Some(&key_item("Nobody")))
            .then_output(|| GetItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&found, &missing]);
        let store = DynamoDbStore::new(client, TABLE);

        assert_eq!(store.get("Ada").await.unwrap().unwrap().colors, vec!["red"]);
        assert!(store.get("Nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn service_errors_become_backend_errors() {
        let get = mock!(Client::get_item).then_error(|| {
            GetItemError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            )
        });
        let client = mock_client!(aws_sdk_dynamodb, [&get]);
        let store = DynamoDbStore::new(client, TABLE);

        match store.get("Ada").await {
            Err(StoreError::Backend { operation, message }) => {
                assert_eq!(operation, "GetItem");
                assert!(message.contains("Requested resource not found"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn item_round_trips_through_record() {
        let record = ColorRecord {
            key: "John".into(),
            colors: vec!["blue".into(), "green".into()],
            timestamp: "2024-01-01T00:00:00.000Z".into(),
        };
        let item = record_to_item(&record);

        assert_eq!(item[ATTR_KEY], AttributeValue::S("John".into()));
        assert_eq!(item_to_record(&item).unwrap(), record);
    }

    #[test]
    fn item_without_key_is_malformed() {
        let item = HashMap::from([(ATTR_COLORS.to_string(), AttributeValue::L(Vec::new()))]);
        assert!(matches!(
            item_to_record(&item),
            Err(StoreError::MalformedItem(_))
        ));
    }

    #[test]
    fn non_string_colors_are_skipped() {
        let item = HashMap::from([
            (ATTR_KEY.to_string(), AttributeValue::S("Ada".into())),
            (
                ATTR_COLORS.to_string(),
                AttributeValue::L(vec![
                    AttributeValue::S("red".into()),
                    AttributeValue::N("7".into()),
                ]),
            ),
        ]);
        let record = item_to_record(&item).unwrap();
        assert_eq!(record.colors, vec!["red"]);
        assert_eq!(record.timestamp, "");
    }
}
