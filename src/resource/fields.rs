//! `Node` views of the resource types. Members answer to both their serialized
//! camelCase name and their Rust field name.

use super::types::{
    Address, AddressPlan, AddressSpace, AddressSpacePlan, AddressSpaceSchema, AuthenticationService, Connection, Link,
    Metric, Namespace, ObjectMeta, PlanSummary, Status,
};
use crate::field::{Field, Node, Record};
use std::collections::BTreeMap;

fn number_map(map: &BTreeMap<String, f64>) -> Node {
    Node::Struct(map.iter().map(|(k, v)| Field { wire: k.clone(), native: k.clone(), value: Node::Float(*v) }).collect())
}

fn metrics(list: &[Metric]) -> Node {
    Node::List(list.iter().map(Node::from).collect())
}

impl From<&ObjectMeta> for Node {
    fn from(m: &ObjectMeta) -> Self {
        Node::record()
            .plain("name", &m.name)
            .plain("namespace", &m.namespace)
            .plain("uid", &m.uid)
            .field("resourceVersion", "resource_version", &m.resource_version)
            .field("creationTimestamp", "creation_timestamp", m.creation_timestamp.clone())
            .plain("labels", &m.labels)
            .plain("annotations", &m.annotations)
            .build()
    }
}

impl From<&Status> for Node {
    fn from(s: &Status) -> Self {
        Node::record()
            .field("isReady", "is_ready", s.is_ready)
            .plain("phase", &s.phase)
            .plain("messages", s.messages.clone())
            .build()
    }
}

impl From<&Metric> for Node {
    fn from(m: &Metric) -> Self {
        Node::record()
            .plain("name", &m.name)
            .field("type", "kind", &m.kind)
            .plain("value", m.value)
            .plain("units", &m.units)
            .build()
    }
}

fn with_summary(r: Record, s: &PlanSummary) -> Record {
    r.field("displayName", "display_name", &s.display_name)
        .field("displayOrder", "display_order", s.display_order)
        .field("shortDescription", "short_description", &s.short_description)
        .field("longDescription", "long_description", &s.long_description)
}

fn head(kind: &str, meta: &ObjectMeta) -> Record {
    Node::record().plain("kind", kind).plain("metadata", meta)
}

impl From<&Namespace> for Node {
    fn from(o: &Namespace) -> Self {
        head("Namespace", &o.metadata).plain("status", &o.status).build()
    }
}

impl From<&AddressSpace> for Node {
    fn from(o: &AddressSpace) -> Self {
        let spec = Node::record()
            .field("type", "space_type", &o.spec.space_type)
            .plain("plan", &o.spec.plan)
            .field("authenticationService", "authentication_service", o.spec.authentication_service.clone());
        head("AddressSpace", &o.metadata).plain("spec", spec).plain("status", &o.status).build()
    }
}

impl From<&Address> for Node {
    fn from(o: &Address) -> Self {
        let spec = Node::record()
            .plain("address", &o.spec.address)
            .field("addressSpace", "address_space", &o.spec.address_space)
            .field("type", "address_type", &o.spec.address_type)
            .plain("plan", &o.spec.plan)
            .plain("topic", o.spec.topic.clone());
        head("Address", &o.metadata)
            .plain("spec", spec)
            .plain("status", &o.status)
            .plain("metrics", metrics(&o.metrics))
            .build()
    }
}

impl From<&Connection> for Node {
    fn from(o: &Connection) -> Self {
        let s = &o.spec;
        let spec = Node::record()
            .field("addressSpace", "address_space", &s.address_space)
            .plain("hostname", &s.hostname)
            .field("containerId", "container_id", &s.container_id)
            .plain("protocol", &s.protocol)
            .plain("encrypted", s.encrypted)
            .plain("principal", &s.principal)
            .plain("properties", &s.properties);
        head("Connection", &o.metadata).plain("spec", spec).plain("metrics", metrics(&o.metrics)).build()
    }
}

impl From<&Link> for Node {
    fn from(o: &Link) -> Self {
        let spec = Node::record()
            .plain("connection", &o.spec.connection)
            .field("addressSpace", "address_space", &o.spec.address_space)
            .plain("address", &o.spec.address)
            .plain("role", &o.spec.role);
        head("Link", &o.metadata).plain("spec", spec).plain("metrics", metrics(&o.metrics)).build()
    }
}

impl From<&AddressPlan> for Node {
    fn from(o: &AddressPlan) -> Self {
        let spec = with_summary(Node::record(), &o.spec.summary)
            .field("addressType", "address_type", &o.spec.address_type)
            .plain("resources", number_map(&o.spec.resources));
        head("AddressPlan", &o.metadata).plain("spec", spec).build()
    }
}

impl From<&AddressSpacePlan> for Node {
    fn from(o: &AddressSpacePlan) -> Self {
        let spec = with_summary(Node::record(), &o.spec.summary)
            .field("addressSpaceType", "address_space_type", &o.spec.address_space_type)
            .field("addressPlans", "address_plans", o.spec.address_plans.clone())
            .field("resourceLimits", "resource_limits", number_map(&o.spec.resource_limits));
        head("AddressSpacePlan", &o.metadata).plain("spec", spec).build()
    }
}

impl From<&AddressSpaceSchema> for Node {
    fn from(o: &AddressSpaceSchema) -> Self {
        let s = &o.spec;
        let spec = Node::record()
            .plain("description", &s.description)
            .field("addressTypes", "address_types", s.address_types.clone())
            .plain("plans", s.plans.clone())
            .field("authenticationServices", "authentication_services", s.authentication_services.clone());
        head("AddressSpaceSchema", &o.metadata).plain("spec", spec).build()
    }
}

impl From<&AuthenticationService> for Node {
    fn from(o: &AuthenticationService) -> Self {
        let spec = Node::record().field("type", "service_type", &o.spec.service_type).plain("realm", o.spec.realm.clone());
        head("AuthenticationService", &o.metadata).plain("spec", spec).plain("status", &o.status).build()
    }
}
