use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::FilterError;
use super::types::{FieldKind, FilterOp, FilterWhereInfo, GeoWithin, SqlParam};

/// Earth's mean radius in miles, used to turn a distance into an angle
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

pub struct FilterWhere {
    params: Vec<SqlParam>,
}

impl FilterWhere {
    /// Coerce a raw query-string value into the JSON type of `kind`
    pub fn coerce(field: &str, kind: FieldKind, raw: &str) -> Result<Value, FilterError> {
        let invalid = || FilterError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
        };
        match kind {
            FieldKind::Text | FieldKind::TextList => Ok(Value::String(raw.to_string())),
            FieldKind::Id => Uuid::parse_str(raw.trim())
                .map(|id| Value::String(id.to_string()))
                .map_err(|_| invalid()),
            FieldKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(invalid),
            FieldKind::Bool => match raw.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            FieldKind::Date => DateTime::parse_from_rfc3339(raw.trim())
                .map(|d| Value::String(d.with_timezone(&Utc).to_rfc3339()))
                .map_err(|_| invalid()),
        }
    }

    /// Coerce the raw value of a condition; `in` takes a comma-separated list
    pub fn coerce_operand(
        field: &str,
        kind: FieldKind,
        operator: FilterOp,
        raw: &str,
    ) -> Result<Value, FilterError> {
        if operator == FilterOp::In {
            let values = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Self::coerce(field, kind, s))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Value::Array(values));
        }
        Self::coerce(field, kind, raw)
    }

    /// Render conditions as a parameterized SQL predicate over the `doc` column
    pub fn generate(
        conditions: &[FilterWhereInfo],
        geo: Option<&GeoWithin>,
    ) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut builder = FilterWhere { params: vec![] };
        let mut parts = Vec::new();
        for condition in conditions {
            parts.push(builder.build_sql_condition(condition)?);
        }
        if let Some(geo) = geo {
            parts.push(builder.build_geo_condition(geo));
        }
        let where_clause = if parts.is_empty() {
            "1=1".to_string()
        } else {
            parts.join(" AND ")
        };
        Ok((where_clause, builder.params))
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let column = column_sql(condition.column, condition.kind);

        if condition.kind == FieldKind::TextList {
            let json_column = format!("(doc #> '{}')", json_path(condition.column));
            return match condition.operator {
                FilterOp::Eq => {
                    let p = self.param(text_param(condition)?);
                    Ok(format!("{} @> jsonb_build_array({}::text)", json_column, p))
                }
                FilterOp::In => {
                    let p = self.param(SqlParam::TextArray(string_list(&condition.data)));
                    Ok(format!("jsonb_exists_any({}, {})", json_column, p))
                }
                other => Err(FilterError::UnsupportedOperator(format!(
                    "{:?} on list field {}",
                    other, condition.column
                ))),
            };
        }

        match condition.operator {
            FilterOp::In => {
                let values = condition.data.as_array().cloned().unwrap_or_default();
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let param = match condition.kind {
                    FieldKind::Number => SqlParam::NumberArray(values.iter().filter_map(Value::as_f64).collect()),
                    _ => SqlParam::TextArray(string_list(&condition.data)),
                };
                let p = self.param(param);
                Ok(format!("{} = ANY({})", column, p))
            }
            op => {
                let param = scalar_param(condition.kind, &condition.data, condition.column)?;
                let p = self.param(param);
                Ok(format!("{} {} {}", column, op.to_sql(), p))
            }
        }
    }

    fn build_geo_condition(&mut self, geo: &GeoWithin) -> String {
        let lng = "(doc #>> '{location,coordinates,0}')::double precision";
        let lat = "(doc #>> '{location,coordinates,1}')::double precision";
        let p_lat = self.param(SqlParam::Number(geo.latitude));
        let p_lng = self.param(SqlParam::Number(geo.longitude));
        let p_radius = self.param(SqlParam::Number(geo.radius));
        format!(
            "acos(LEAST(1.0, GREATEST(-1.0, sin(radians({p_lat})) * sin(radians({lat})) + cos(radians({p_lat})) * cos(radians({lat})) * cos(radians({lng}) - radians({p_lng}))))) <= {p_radius}"
        )
    }

    /// Evaluate conditions against an in-memory document
    pub fn matches(conditions: &[FilterWhereInfo], geo: Option<&GeoWithin>, doc: &Map<String, Value>) -> bool {
        conditions.iter().all(|c| Self::matches_condition(c, doc))
            && geo.map_or(true, |g| Self::matches_geo(g, doc))
    }

    fn matches_condition(condition: &FilterWhereInfo, doc: &Map<String, Value>) -> bool {
        let Some(actual) = lookup(doc, condition.column) else {
            return false;
        };

        if condition.kind == FieldKind::TextList {
            let items: Vec<&Value> = match actual {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            return match condition.operator {
                FilterOp::Eq => items.contains(&&condition.data),
                FilterOp::In => condition
                    .data
                    .as_array()
                    .is_some_and(|wanted| wanted.iter().any(|w| items.contains(&w))),
                _ => false,
            };
        }

        let compare = |expected: &Value| compare_values(condition.kind, actual, expected);
        match condition.operator {
            FilterOp::Eq => compare(&condition.data) == Some(Ordering::Equal),
            FilterOp::Gt => compare(&condition.data) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(compare(&condition.data), Some(Ordering::Greater | Ordering::Equal)),
            FilterOp::Lt => compare(&condition.data) == Some(Ordering::Less),
            FilterOp::Lte => matches!(compare(&condition.data), Some(Ordering::Less | Ordering::Equal)),
            FilterOp::In => condition
                .data
                .as_array()
                .is_some_and(|values| values.iter().any(|v| compare(v) == Some(Ordering::Equal))),
        }
    }

    fn matches_geo(geo: &GeoWithin, doc: &Map<String, Value>) -> bool {
        let coordinates = lookup(doc, "location.coordinates").and_then(Value::as_array);
        let Some([lng, lat]) = coordinates.map(|c| c.as_slice()) else {
            return false;
        };
        match (lng.as_f64(), lat.as_f64()) {
            (Some(lng), Some(lat)) => central_angle(geo.latitude, geo.longitude, lat, lng) <= geo.radius,
            _ => false,
        }
    }
}

/// Great-circle angle between two points, in radians (haversine)
pub fn central_angle(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = phi2 - phi1;
    let d_lambda = (lng2 - lng1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * a.sqrt().min(1.0).asin()
}

/// Resolve a dotted path inside a document
pub fn lookup<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Order two values of the same field kind
pub fn compare_values(kind: FieldKind, a: &Value, b: &Value) -> Option<Ordering> {
    match kind {
        FieldKind::Number => a.as_f64()?.partial_cmp(&b.as_f64()?),
        FieldKind::Bool => Some(a.as_bool()?.cmp(&b.as_bool()?)),
        FieldKind::Date => {
            let a = DateTime::parse_from_rfc3339(a.as_str()?).ok()?;
            let b = DateTime::parse_from_rfc3339(b.as_str()?).ok()?;
            Some(a.cmp(&b))
        }
        FieldKind::Id | FieldKind::Text | FieldKind::TextList => Some(a.as_str()?.cmp(b.as_str()?)),
    }
}

pub(super) fn json_path(path: &str) -> String {
    format!("{{{}}}", path.replace('.', ","))
}

pub(super) fn column_sql(path: &str, kind: FieldKind) -> String {
    let text = format!("(doc #>> '{}')", json_path(path));
    match kind {
        FieldKind::Number => format!("{}::double precision", text),
        FieldKind::Bool => format!("{}::boolean", text),
        FieldKind::Date => format!("{}::timestamptz", text),
        FieldKind::Id | FieldKind::Text | FieldKind::TextList => text,
    }
}

fn string_list(data: &Value) -> Vec<String> {
    match data {
        Value::Array(values) => values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        Value::String(s) => vec![s.clone()],
        _ => vec![],
    }
}

fn text_param(condition: &FilterWhereInfo) -> Result<SqlParam, FilterError> {
    condition
        .data
        .as_str()
        .map(|s| SqlParam::Text(s.to_string()))
        .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} expects a string", condition.column)))
}

fn scalar_param(kind: FieldKind, data: &Value, column: &str) -> Result<SqlParam, FilterError> {
    let bad = || FilterError::InvalidOperatorData(format!("{} has a mismatched value: {}", column, data));
    match kind {
        FieldKind::Number => data.as_f64().map(SqlParam::Number).ok_or_else(bad),
        FieldKind::Bool => data.as_bool().map(SqlParam::Bool).ok_or_else(bad),
        FieldKind::Date => data
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| SqlParam::Timestamp(d.with_timezone(&Utc)))
            .ok_or_else(bad),
        FieldKind::Id | FieldKind::Text | FieldKind::TextList => {
            data.as_str().map(|s| SqlParam::Text(s.to_string())).ok_or_else(bad)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn cond(column: &'static str, kind: FieldKind, operator: FilterOp, data: Value) -> FilterWhereInfo {
        FilterWhereInfo { column, kind, operator, data }
    }

    #[test]
    fn coerces_numbers_and_lists() {
        assert_eq!(FilterWhere::coerce("tuition", FieldKind::Number, "1000").unwrap(), json!(1000.0));
        assert!(FilterWhere::coerce("tuition", FieldKind::Number, "lots").is_err());
        assert_eq!(
            FilterWhere::coerce_operand("careers", FieldKind::TextList, FilterOp::In, "Business, UI/UX").unwrap(),
            json!(["Business", "UI/UX"])
        );
    }

    #[test]
    fn matches_numeric_ranges() {
        let d = doc(json!({ "tuition": 12000 }));
        let gte = cond("tuition", FieldKind::Number, FilterOp::Gte, json!(1000.0));
        let lt = cond("tuition", FieldKind::Number, FilterOp::Lt, json!(12000.0));
        assert!(FilterWhere::matches(&[gte.clone()], None, &d));
        assert!(!FilterWhere::matches(&[gte, lt], None, &d));
    }

    #[test]
    fn list_equality_means_contains() {
        let d = doc(json!({ "careers": ["Web Development", "Business"] }));
        let eq = cond("careers", FieldKind::TextList, FilterOp::Eq, json!("Business"));
        let miss = cond("careers", FieldKind::TextList, FilterOp::In, json!(["Other", "UI/UX"]));
        assert!(FilterWhere::matches(&[eq], None, &d));
        assert!(!FilterWhere::matches(&[miss], None, &d));
    }

    #[test]
    fn nested_paths_resolve() {
        let d = doc(json!({ "location": { "state": "MA", "coordinates": [-71.1, 42.3] } }));
        let eq = cond("location.state", FieldKind::Text, FilterOp::Eq, json!("MA"));
        assert!(FilterWhere::matches(&[eq], None, &d));
        assert_eq!(lookup(&d, "location.coordinates.1"), Some(&json!(42.3)));
    }

    #[test]
    fn missing_fields_never_match() {
        let d = doc(json!({ "name": "x" }));
        let gt = cond("averageCost", FieldKind::Number, FilterOp::Gt, json!(0.0));
        assert!(!FilterWhere::matches(&[gt], None, &d));
    }

    #[test]
    fn geo_within_uses_angular_radius() {
        // Boston and Cambridge are a few miles apart; New York is ~190 miles away
        let boston = doc(json!({ "location": { "coordinates": [-71.0589, 42.3601] } }));
        let new_york = doc(json!({ "location": { "coordinates": [-74.0060, 40.7128] } }));
        let geo = GeoWithin { longitude: -71.1097, latitude: 42.3736, radius: 10.0 / EARTH_RADIUS_MILES };
        assert!(FilterWhere::matches(&[], Some(&geo), &boston));
        assert!(!FilterWhere::matches(&[], Some(&geo), &new_york));
    }

    #[test]
    fn generates_parameterized_sql() {
        let conditions = vec![
            cond("tuition", FieldKind::Number, FilterOp::Gte, json!(1000.0)),
            cond("careers", FieldKind::TextList, FilterOp::In, json!(["Business"])),
        ];
        let (sql, params) = FilterWhere::generate(&conditions, None).unwrap();
        assert_eq!(
            sql,
            "(doc #>> '{tuition}')::double precision >= $1 AND jsonb_exists_any((doc #> '{careers}'), $2)"
        );
        assert_eq!(params, vec![SqlParam::Number(1000.0), SqlParam::TextArray(vec!["Business".into()])]);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let (sql, params) =
            FilterWhere::generate(&[cond("title", FieldKind::Text, FilterOp::In, json!([]))], None).unwrap();
        assert_eq!(sql, "1=0");
        assert!(params.is_empty());
    }
}
