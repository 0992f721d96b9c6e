use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    pub uid: String,
    pub resource_version: String,
    pub creation_timestamp: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn named(namespace: &str, name: &str) -> Self {
        Self { name: name.to_string(), namespace: namespace.to_string(), ..Self::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Status {
    pub is_ready: bool,
    pub phase: String,
    pub messages: Vec<String>,
}

/// A sampled metric attached to connections and links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metric {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub units: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Namespace {
    pub metadata: ObjectMeta,
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressSpaceSpec {
    #[serde(rename = "type")]
    pub space_type: String,
    pub plan: String,
    pub authentication_service: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressSpace {
    pub metadata: ObjectMeta,
    pub spec: AddressSpaceSpec,
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressSpec {
    pub address: String,
    pub address_space: String,
    #[serde(rename = "type")]
    pub address_type: String,
    pub plan: String,
    pub topic: Option<String>,
}

/// Address names are `<addressSpace>.<resource name>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub metadata: ObjectMeta,
    pub spec: AddressSpec,
    pub status: Status,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSpec {
    pub address_space: String,
    pub hostname: String,
    pub container_id: String,
    pub protocol: String,
    pub encrypted: bool,
    pub principal: String,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Connection {
    pub metadata: ObjectMeta,
    pub spec: ConnectionSpec,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkSpec {
    pub connection: String,
    pub address_space: String,
    pub address: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Link {
    pub metadata: ObjectMeta,
    pub spec: LinkSpec,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanSummary {
    pub display_name: String,
    pub display_order: i64,
    pub short_description: String,
    pub long_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressPlanSpec {
    #[serde(flatten)]
    pub summary: PlanSummary,
    pub address_type: String,
    pub resources: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressPlan {
    pub metadata: ObjectMeta,
    pub spec: AddressPlanSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressSpacePlanSpec {
    #[serde(flatten)]
    pub summary: PlanSummary,
    pub address_space_type: String,
    pub address_plans: Vec<String>,
    pub resource_limits: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressSpacePlan {
    pub metadata: ObjectMeta,
    pub spec: AddressSpacePlanSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressSpaceSchemaSpec {
    pub description: String,
    pub address_types: Vec<String>,
    pub plans: Vec<String>,
    pub authentication_services: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressSpaceSchema {
    pub metadata: ObjectMeta,
    pub spec: AddressSpaceSchemaSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthenticationServiceSpec {
    #[serde(rename = "type")]
    pub service_type: String,
    pub realm: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthenticationService {
    pub metadata: ObjectMeta,
    pub spec: AuthenticationServiceSpec,
    pub status: Status,
}
