use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_where::{column_sql, compare_values, lookup};
use super::types::{CollectionSchema, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse a `sort` parameter such as `-createdAt,name`; a leading `-`
    /// means descending
    pub fn validate_and_parse(
        schema: &CollectionSchema,
        order: &str,
    ) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in order.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (path, sort) = match trimmed.strip_prefix('-') {
                Some(rest) => (rest, SortDirection::Desc),
                None => (trimmed.strip_prefix('+').unwrap_or(trimmed), SortDirection::Asc),
            };
            if schema.is_hidden(path) {
                return Err(FilterError::InvalidColumn(path.to_string()));
            }
            let field = schema
                .field(path)
                .ok_or_else(|| FilterError::InvalidColumn(path.to_string()))?;
            out.push(FilterOrderInfo { column: field.path, kind: field.kind, sort });
        }
        Ok(out)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {}", column_sql(i.column, i.kind), i.sort.to_sql()))
            .collect();
        // insertion order breaks ties
        parts.push("created_at ASC".to_string());
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Compare two documents; missing values sort after present ones in
    /// ascending order, matching PostgreSQL's default null placement
    pub fn compare(infos: &[FilterOrderInfo], a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
        for info in infos {
            let ordering = match (lookup(a, info.column), lookup(b, info.column)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => compare_values(info.kind, x, y).unwrap_or(Ordering::Equal),
            };
            let ordering = match info.sort {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::BOOTCAMPS;
    use serde_json::json;

    #[test]
    fn parses_direction_prefixes() {
        let infos = FilterOrder::validate_and_parse(&BOOTCAMPS, "-averageCost, name").unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].column, "averageCost");
        assert_eq!(infos[0].sort, SortDirection::Desc);
        assert_eq!(infos[1].sort, SortDirection::Asc);
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(FilterOrder::validate_and_parse(&BOOTCAMPS, "nope").is_err());
    }

    #[test]
    fn sorts_documents_in_memory() {
        let infos = FilterOrder::validate_and_parse(&BOOTCAMPS, "-averageCost").unwrap();
        let mut docs: Vec<Map<String, Value>> = vec![
            json!({ "name": "a", "averageCost": 1000 }),
            json!({ "name": "b" }),
            json!({ "name": "c", "averageCost": 9000 }),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        docs.sort_by(|a, b| FilterOrder::compare(&infos, a, b));
        let names: Vec<_> = docs.iter().map(|d| d["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn generates_order_clause() {
        let infos = FilterOrder::validate_and_parse(&BOOTCAMPS, "name").unwrap();
        assert_eq!(
            FilterOrder::generate(&infos),
            "ORDER BY (doc #>> '{name}') ASC, created_at ASC"
        );
    }
}
