//! Bounded-concurrency choice lookups

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use crate::catalog::{Capabilities, Column, TableName};
use crate::constraint::Constraint;
use crate::filter::Row;
use super::error::{ChoiceError, LookupError};

fn default_max_concurrent() -> usize {
    4
}

fn default_batch_size() -> usize {
    50
}

/// Limits for resolving choices against live rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChoiceResolverConfig {
    /// Lookups in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Choice values per lookup
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ChoiceResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            batch_size: default_batch_size(),
        }
    }
}

/// Fetches rows of a table matching a path filter
#[async_trait]
pub trait RowLookup: Send + Sync {
    async fn lookup(&self, table: &TableName, filter: &str) -> Result<Vec<Row>, LookupError>;
}

/// A choice value and the row it selects, if one was found
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChoice {
    pub value: Value,
    pub row: Option<Row>,
}

/// Look up the rows behind a list of choice values
///
/// Non-null values are batched and encoded as choice filters on `column`;
/// null values resolve without a lookup. The first failed batch fails the
/// whole call and outstanding batches are dropped. The result follows the
/// order of `values`.
pub async fn resolve_choices(
    lookup: &dyn RowLookup,
    table: &TableName,
    column: &Column,
    capabilities: &dyn Capabilities,
    values: &[Value],
    config: &ChoiceResolverConfig,
) -> Result<Vec<ResolvedChoice>, ChoiceError> {
    let mut distinct: Vec<Value> = Vec::new();
    for value in values.iter().filter(|v| !v.is_null()) {
        if !distinct.iter().any(|d| same_value(d, value)) {
            distinct.push(value.clone());
        }
    }

    let filters = distinct
        .chunks(config.batch_size.max(1))
        .map(|batch| Constraint::Choice(batch.to_vec()).encode(column, capabilities))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(table = %table, column = %column.name, batches = filters.len(), "resolving choices");

    let batches: Vec<Vec<Row>> = stream::iter(filters.into_iter().enumerate())
        .map(|(batch, filter)| async move {
            lookup
                .lookup(table, &filter)
                .await
                .map_err(|source| ChoiceError::Lookup { batch, source })
        })
        .buffer_unordered(config.max_concurrent.max(1))
        .try_collect()
        .await?;
    let rows: Vec<Row> = batches.into_iter().flatten().collect();

    Ok(values
        .iter()
        .map(|value| {
            let row = if value.is_null() {
                None
            } else {
                rows.iter()
                    .find(|row| row.get(&column.name).is_some_and(|v| same_value(v, value)))
                    .cloned()
            };
            ResolvedChoice {
                value: value.clone(),
                row,
            }
        })
        .collect())
}

/// Rows may carry a value in another JSON type than the choice, e.g. a
/// number for a string choice
fn same_value(a: &Value, b: &Value) -> bool {
    a == b || text(a) == text(b)
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnType, Features};
    use futures::executor::block_on;
    use serde_json::json;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::task::{Context, Poll};

    /// Suspends once so other lookups get polled in between
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    /// Echoes one row per `id=<v>` clause of the filter
    #[derive(Default)]
    struct EchoLookup {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        filters: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl RowLookup for EchoLookup {
        async fn lookup(&self, _table: &TableName, filter: &str) -> Result<Vec<Row>, LookupError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.filters.lock().unwrap().push(filter.to_string());
            YieldOnce(false).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on.as_deref() == Some(filter) {
                return Err("lookup refused".into());
            }
            Ok(filter
                .split(';')
                .filter_map(|clause| clause.strip_prefix("id="))
                .map(|v| json!({"id": v, "name": format!("row {v}")}).as_object().cloned().unwrap())
                .collect())
        }
    }

    fn table() -> TableName {
        TableName::new("s", "t")
    }

    fn id() -> Column {
        Column::new("id", ColumnType::Text)
    }

    #[test]
    fn test_order_preserved_and_nulls_resolved_locally() {
        let lookup = EchoLookup::default();
        let config = ChoiceResolverConfig { max_concurrent: 4, batch_size: 2 };
        let values = vec![json!("c"), Value::Null, json!("a"), json!("b"), json!("a")];

        let resolved = block_on(resolve_choices(&lookup, &table(), &id(), &Features::default(), &values, &config)).unwrap();

        let got: Vec<(Value, Option<Value>)> = resolved
            .iter()
            .map(|r| (r.value.clone(), r.row.as_ref().map(|row| row["name"].clone())))
            .collect();
        assert_eq!(
            got,
            vec![
                (json!("c"), Some(json!("row c"))),
                (Value::Null, None),
                (json!("a"), Some(json!("row a"))),
                (json!("b"), Some(json!("row b"))),
                (json!("a"), Some(json!("row a"))),
            ]
        );
        // three distinct values in batches of two
        assert_eq!(lookup.filters.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_concurrency_is_capped() {
        let lookup = EchoLookup::default();
        let config = ChoiceResolverConfig { max_concurrent: 4, batch_size: 1 };
        let values: Vec<Value> = (0..10).map(|i| json!(i.to_string())).collect();

        let resolved = block_on(resolve_choices(&lookup, &table(), &id(), &Features::default(), &values, &config)).unwrap();

        assert_eq!(resolved.len(), 10);
        assert!(resolved.iter().all(|r| r.row.is_some()));
        assert_eq!(lookup.max_in_flight.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_first_failure_fails_the_call() {
        let lookup = EchoLookup {
            fail_on: Some("id=b".to_string()),
            ..Default::default()
        };
        let config = ChoiceResolverConfig { max_concurrent: 2, batch_size: 1 };
        let values = vec![json!("a"), json!("b"), json!("c")];

        let err = block_on(resolve_choices(&lookup, &table(), &id(), &Features::default(), &values, &config)).unwrap_err();
        assert!(matches!(err, ChoiceError::Lookup { batch: 1, .. }));
    }

    #[test]
    fn test_only_nulls_needs_no_lookup() {
        let lookup = EchoLookup::default();
        let resolved = block_on(resolve_choices(
            &lookup,
            &table(),
            &id(),
            &Features::default(),
            &[Value::Null],
            &ChoiceResolverConfig::default(),
        ))
        .unwrap();
        assert_eq!(resolved, vec![ResolvedChoice { value: Value::Null, row: None }]);
        assert!(lookup.filters.lock().unwrap().is_empty());
    }

    #[test]
    fn test_config_defaults() {
        let config: ChoiceResolverConfig = serde_yaml::from_str("batch_size: 10").unwrap();
        assert_eq!(config, ChoiceResolverConfig { max_concurrent: 4, batch_size: 10 });
    }
}
