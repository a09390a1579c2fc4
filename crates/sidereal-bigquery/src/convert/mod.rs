//! OTLP to row conversion.
//!
//! Converts OpenTelemetry protocol buffer messages into flat [`Row`]s with
//! denormalised resource and scope fields. Each converter is a pure function
//! over a borrowed request: rows come out in resource, scope, then record
//! order, and the request is left untouched.

pub mod encode;
pub mod logs;
pub mod metrics;
pub mod traces;

use opentelemetry_proto::tonic::{common::v1::InstrumentationScope, resource::v1::Resource};

pub use encode::{encode_array, encode_attributes, EMPTY_ARRAY, EMPTY_OBJECT};
pub use logs::logs_to_rows;
pub use metrics::metrics_to_rows;
pub use traces::traces_to_rows;

use crate::row::Row;
use crate::ConvertError;

/// Resource fields encoded once per resource and copied onto each row.
#[derive(Debug)]
pub(crate) struct ResourceFields {
    attributes: String,
    schema_url: String,
}

impl ResourceFields {
    pub(crate) fn new(resource: Option<&Resource>, schema_url: &str) -> Result<Self, ConvertError> {
        let attributes = encode_attributes(resource.map_or(&[][..], |r| &r.attributes[..]))?;
        Ok(Self {
            attributes,
            schema_url: schema_url.to_owned(),
        })
    }
}

/// Instrumentation scope fields encoded once per scope and copied onto each row.
#[derive(Debug)]
pub(crate) struct ScopeFields {
    name: String,
    version: String,
    attributes: String,
    schema_url: String,
}

impl ScopeFields {
    pub(crate) fn new(
        scope: Option<&InstrumentationScope>,
        schema_url: &str,
    ) -> Result<Self, ConvertError> {
        let (name, version, attrs) = scope.map_or(("", "", &[][..]), |s| {
            (s.name.as_str(), s.version.as_str(), &s.attributes[..])
        });
        Ok(Self {
            name: name.to_owned(),
            version: version.to_owned(),
            attributes: encode_attributes(attrs)?,
            schema_url: schema_url.to_owned(),
        })
    }
}

/// Append the denormalised resource and scope columns to a row.
pub(crate) fn push_resource_scope(row: &mut Row, resource: &ResourceFields, scope: &ScopeFields) {
    row.push("resource_attributes", resource.attributes.clone());
    row.push("resource_schema_url", resource.schema_url.clone());
    row.push("scope_name", scope.name.clone());
    row.push("scope_version", scope.version.clone());
    row.push("scope_attributes", scope.attributes.clone());
    row.push("scope_schema_url", scope.schema_url.clone());
}
