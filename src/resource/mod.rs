//! Console resource model and the object cache built over it.

mod fields;
mod types;

pub use types::{
    Address, AddressPlan, AddressPlanSpec, AddressSpace, AddressSpacePlan, AddressSpacePlanSpec, AddressSpaceSchema,
    AddressSpaceSchemaSpec, AddressSpaceSpec, AddressSpec, AuthenticationService, AuthenticationServiceSpec, Connection,
    ConnectionSpec, Link, LinkSpec, Metric, Namespace, ObjectMeta, PlanSummary, Status,
};

use crate::config::IndexConfig;
use crate::errors::CacheError;
use crate::field::{FieldSource, Node};
use crate::store::{IndexSpec, IndexedStore};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Every kind the console cache holds, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Resource {
    Namespace(Namespace),
    AddressSpace(AddressSpace),
    Address(Address),
    Connection(Connection),
    Link(Link),
    AddressPlan(AddressPlan),
    AddressSpacePlan(AddressSpacePlan),
    AddressSpaceSchema(AddressSpaceSchema),
    AuthenticationService(AuthenticationService),
}

impl Resource {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Namespace(_) => "Namespace",
            Self::AddressSpace(_) => "AddressSpace",
            Self::Address(_) => "Address",
            Self::Connection(_) => "Connection",
            Self::Link(_) => "Link",
            Self::AddressPlan(_) => "AddressPlan",
            Self::AddressSpacePlan(_) => "AddressSpacePlan",
            Self::AddressSpaceSchema(_) => "AddressSpaceSchema",
            Self::AuthenticationService(_) => "AuthenticationService",
        }
    }

    #[must_use]
    pub const fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Namespace(o) => &o.metadata,
            Self::AddressSpace(o) => &o.metadata,
            Self::Address(o) => &o.metadata,
            Self::Connection(o) => &o.metadata,
            Self::Link(o) => &o.metadata,
            Self::AddressPlan(o) => &o.metadata,
            Self::AddressSpacePlan(o) => &o.metadata,
            Self::AddressSpaceSchema(o) => &o.metadata,
            Self::AuthenticationService(o) => &o.metadata,
        }
    }

    /// Parses one JSON document such as a line of an NDJSON dump.
    ///
    /// # Errors
    /// Returns `CacheError::Json` for unknown kinds or malformed documents.
    pub fn from_json(text: &str) -> Result<Self, CacheError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl FieldSource for Resource {
    fn to_node(&self) -> Cow<'_, Node> {
        Cow::Owned(match self {
            Self::Namespace(o) => Node::from(o),
            Self::AddressSpace(o) => Node::from(o),
            Self::Address(o) => Node::from(o),
            Self::Connection(o) => Node::from(o),
            Self::Link(o) => Node::from(o),
            Self::AddressPlan(o) => Node::from(o),
            Self::AddressSpacePlan(o) => Node::from(o),
            Self::AddressSpaceSchema(o) => Node::from(o),
            Self::AuthenticationService(o) => Node::from(o),
        })
    }
}

/// Unique key: `Kind/name` for cluster-wide kinds, `Kind/namespace/name` for namespaced ones,
/// and `Link/namespace/connection/name` for links.
///
/// # Errors
/// `CacheError::Registration` for an address whose name has no `.` separator.
pub fn primary_key(obj: &Resource) -> Result<Option<String>, CacheError> {
    let kind = obj.kind();
    let key = match obj {
        Resource::Namespace(o) => format!("{kind}/{}", o.metadata.name),
        Resource::AddressPlan(o) => format!("{kind}/{}", o.metadata.name),
        Resource::AddressSpacePlan(o) => format!("{kind}/{}", o.metadata.name),
        Resource::AddressSpaceSchema(o) => format!("{kind}/{}", o.metadata.name),
        Resource::AuthenticationService(o) => format!("{kind}/{}", o.metadata.name),
        Resource::Address(o) => {
            if !o.metadata.name.contains('.') {
                return Err(CacheError::Registration(format!(
                    "unexpected address name formation '{}', expected dot separator",
                    o.metadata.name
                )));
            }
            format!("{kind}/{}/{}", o.metadata.namespace, o.metadata.name)
        }
        Resource::AddressSpace(o) => format!("{kind}/{}/{}", o.metadata.namespace, o.metadata.name),
        Resource::Connection(o) => format!("{kind}/{}/{}", o.metadata.namespace, o.metadata.name),
        Resource::Link(o) => format!("{kind}/{}/{}/{}", o.metadata.namespace, o.spec.connection, o.metadata.name),
    };
    Ok(Some(key))
}

/// Files links under `Link/namespace/addressSpace/address/name`; other kinds have no key.
///
/// # Errors
/// Never fails; the signature matches [`crate::store::KeyCreator`].
pub fn address_link_key(obj: &Resource) -> Result<Option<String>, CacheError> {
    Ok(match obj {
        Resource::Link(l) => Some(format!(
            "Link/{}/{}/{}/{}",
            l.metadata.namespace, l.spec.address_space, l.spec.address, l.metadata.name
        )),
        _ => None,
    })
}

/// Builds the console object cache with its primary and address-link indices.
///
/// # Errors
/// `CacheError::IndexConfig` when both index names are the same.
pub fn create_object_cache(config: &IndexConfig) -> Result<IndexedStore<Resource>, CacheError> {
    IndexedStore::with_indexes(vec![
        IndexSpec::new(&config.primary, primary_key),
        IndexSpec::new(&config.address_link, address_link_key).allow_missing(true),
    ])
}
