use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comparison operators accepted on list endpoints (`?field[op]=value`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$gt")] Gt,
    #[serde(rename = "$gte")] Gte,
    #[serde(rename = "$lt")] Lt,
    #[serde(rename = "$lte")] Lte,
    #[serde(rename = "$in")] In,
}

impl FilterOp {
    /// Map a bare query-string token (`gte`, `in`, ...) to an operator
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(FilterOp::Eq),
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::In => "= ANY",
        }
    }
}

/// Storage type of a document field, used for coercion and comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Id,
    Text,
    Number,
    Bool,
    Date,
    /// Array of strings; equality means "contains"
    TextList,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub path: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(path: &'static str, kind: FieldKind) -> Self {
        Self { path, kind }
    }
}

/// Static description of one collection: its declared fields, unique
/// constraints and fields that never leave the service.
#[derive(Debug)]
pub struct CollectionSchema {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
    pub unique: &'static [&'static [&'static str]],
    pub hidden: &'static [&'static str],
}

impl CollectionSchema {
    pub fn field(&self, path: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.path == path)
    }

    pub fn is_hidden(&self, path: &str) -> bool {
        let root = path.split('.').next().unwrap_or(path);
        self.hidden.contains(&root)
    }

    /// True when `path` names a declared field or the parent of one
    /// (`location` for `location.city`)
    pub fn is_selectable(&self, path: &str) -> bool {
        if self.is_hidden(path) {
            return false;
        }
        self.fields.iter().any(|f| {
            f.path == path
                || f.path
                    .strip_prefix(path)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: &'static str,
    pub kind: FieldKind,
    pub operator: FilterOp,
    pub data: serde_json::Value,
}

/// Spherical-cap constraint on a `[lng, lat]` coordinate pair
#[derive(Debug, Clone, Copy)]
pub struct GeoWithin {
    pub longitude: f64,
    pub latitude: f64,
    /// Angular radius in radians
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub kind: FieldKind,
    pub sort: SortDirection,
}

/// Typed bind parameter for generated SQL
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    TextArray(Vec<String>),
    NumberArray(Vec<f64>),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
