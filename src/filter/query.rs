use once_cell::sync::Lazy;
use regex::Regex;

use super::error::FilterError;
use super::types::FilterOp;

/// Keys with a meaning of their own; everything else is a field filter
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

static OPERATOR_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_.]+)\[([A-Za-z]+)\]$").expect("static regex"));

/// Field filter as it arrived on the query string, before schema coercion
#[derive(Debug, Clone, PartialEq)]
pub struct RawCondition {
    pub field: String,
    pub operator: FilterOp,
    pub value: String,
}

/// List-endpoint query: field filters, projection, sort and paging
#[derive(Debug, Clone, PartialEq)]
pub struct FilterData {
    pub select: Option<Vec<String>>,
    pub conditions: Vec<RawCondition>,
    pub sort: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl FilterData {
    /// Build from raw query pairs; `page` and `limit` read their leading
    /// integer and fall back to 1 and `default_limit` when there is none or
    /// it is not positive. `limit` never exceeds `max_limit`
    pub fn from_query(
        pairs: &[(String, String)],
        default_limit: u32,
        max_limit: u32,
    ) -> Result<Self, FilterError> {
        let mut data = FilterData {
            select: None,
            conditions: vec![],
            sort: None,
            page: 1,
            limit: default_limit,
        };

        for (key, value) in pairs {
            match key.as_str() {
                "select" => {
                    let fields: Vec<String> = value
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(str::to_string)
                        .collect();
                    if !fields.is_empty() {
                        data.select = Some(fields);
                    }
                }
                "sort" => data.sort = Some(value.clone()),
                "page" => data.page = positive(value).unwrap_or(1),
                "limit" => data.limit = positive(value).unwrap_or(default_limit),
                _ => data.conditions.push(parse_condition(key, value)?),
            }
        }

        data.limit = data.limit.min(max_limit.max(1));
        Ok(data)
    }

    pub fn start_index(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    pub fn end_index(&self) -> u64 {
        self.page as u64 * self.limit as u64
    }
}

/// Leading integer of `value` (`"5abc"` is 5), kept only when positive
fn positive(value: &str) -> Option<u32> {
    let value = value.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    let end = value.find(|c: char| !c.is_ascii_digit()).unwrap_or(value.len());
    value[..end].parse::<u32>().ok().filter(|n| *n > 0)
}

fn parse_condition(key: &str, value: &str) -> Result<RawCondition, FilterError> {
    if let Some(caps) = OPERATOR_KEY.captures(key) {
        let token = &caps[2];
        let operator = FilterOp::from_token(token)
            .ok_or_else(|| FilterError::UnsupportedOperator(token.to_string()))?;
        return Ok(RawCondition {
            field: caps[1].to_string(),
            operator,
            value: value.to_string(),
        });
    }
    if key.contains('[') {
        return Err(FilterError::InvalidColumn(key.to_string()));
    }
    Ok(RawCondition {
        field: key.to_string(),
        operator: FilterOp::Eq,
        value: value.to_string(),
    })
}
