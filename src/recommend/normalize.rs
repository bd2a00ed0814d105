use serde_json::{Map, Value};

use super::error::{RecommendError, RecommendResult};
use super::request::{RecommendKind, Recommendation};
use crate::util::QueryParams;

/// One place a request field can come from.
///
/// `Ok(None)` means the source does not carry the field and the next
/// source should be tried.
pub trait FieldSource {
    fn lookup(&self, field: &str) -> RecommendResult<Option<String>>;
}

pub struct QuerySource {
    params: QueryParams,
}

impl QuerySource {
    pub fn new(raw: Option<&str>) -> Self {
        Self {
            params: QueryParams::parse(raw.unwrap_or("")),
        }
    }
}

impl FieldSource for QuerySource {
    fn lookup(&self, field: &str) -> RecommendResult<Option<String>> {
        Ok(self.params.get(field).map(|v| v.to_string()))
    }
}

pub struct JsonBodySource<'a> {
    body: &'a [u8],
}

impl<'a> JsonBodySource<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self { body }
    }
}

impl FieldSource for JsonBodySource<'_> {
    fn lookup(&self, field: &str) -> RecommendResult<Option<String>> {
        let object: Map<String, Value> = serde_json::from_slice(self.body)
            .map_err(|_| RecommendError::Malformed("Invalid request body".to_string()))?;

        match object.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(RecommendError::Malformed("Invalid request body".to_string())),
        }
    }
}

/// Try each source in order; the first one that has the field wins.
/// An absent or empty value is a missing-field error.
pub fn resolve_field(
    sources: &[&dyn FieldSource],
    field: &str,
    missing: &'static str,
) -> RecommendResult<String> {
    for source in sources {
        if let Some(value) = source.lookup(field)? {
            if value.is_empty() {
                return Err(RecommendError::MissingField(missing));
            }
            return Ok(value);
        }
    }
    Err(RecommendError::MissingField(missing))
}

/// Build a request of the given kind from the query string, falling back
/// to the JSON body.
pub fn normalize(
    kind: RecommendKind,
    query: Option<&str>,
    body: &[u8],
) -> RecommendResult<Recommendation> {
    let query = QuerySource::new(query);
    let json = JsonBodySource::new(body);

    let sources: [&dyn FieldSource; 2] = [&query, &json];

    let value = resolve_field(&sources, kind.field(), kind.missing_message())?;
    Ok(kind.with_value(value))
}
