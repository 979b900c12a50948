//! JSON:API document envelopes shared by every resource module.

use serde::{Deserialize, Deserializer, Serialize};

/// Media type for requests and responses.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Page size requested from list endpoints (the API maximum).
pub const PAGE_SIZE: u32 = 100;

/// `{"data": ...}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

impl<T> Document<T> {
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}

/// List response with optional pagination metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ListDocument<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<ListMeta>,
}

impl<T> ListDocument<T> {
    /// Next page number, if the server advertises one.
    pub fn next_page(&self) -> Option<u32> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.pagination.as_ref())
            .and_then(|pagination| pagination.next_page)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMeta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Pagination {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Marker for resources whose relationships we never read or send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoRelationships {}

/// A resource object as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>, R: Deserialize<'de> + Default"))]
pub struct Resource<A, R = NoRelationships> {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub attributes: A,
    #[serde(default)]
    pub relationships: R,
}

/// A resource object sent to the API (no ID yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewResource<A, R = NoRelationships> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: A,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<R>,
}

impl<A> NewResource<A> {
    pub const fn new(kind: &'static str, attributes: A) -> Self {
        Self {
            kind,
            attributes,
            relationships: None,
        }
    }
}

impl<A, R> NewResource<A, R> {
    pub const fn with_relationships(kind: &'static str, attributes: A, relationships: R) -> Self {
        Self {
            kind,
            attributes,
            relationships: Some(relationships),
        }
    }
}

/// `{"type": ..., "id": ...}` linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: String,
}

impl ResourceRef {
    pub fn new(kind: &str, id: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.into(),
        }
    }
}

/// `{"data": ...}` relationship wrapper; `T` is a ref, an optional ref, or a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct Relationship<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: T,
}

impl<T> Relationship<T> {
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}

/// Treat an explicit JSON `null` the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Append a JSON:API filter (`filter[a][b]=value`) to a path.
pub fn with_filter(path: &str, keys: &[&str], value: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    let keys: String = keys.iter().map(|key| format!("[{key}]")).collect();
    format!(
        "{path}{separator}filter{keys}={}",
        urlencoding::encode(value)
    )
}

/// Append page parameters to a path.
pub fn with_page(path: &str, page: u32) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}page[number]={page}&page[size]={PAGE_SIZE}")
}
