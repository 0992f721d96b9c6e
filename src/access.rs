//! Read access checks with a per-session decision cache.
//!
//! Decisions are keyed by [`ResourceAttributes`], so every address in a namespace shares one
//! authorization call. The cache can be exported with [`CachingAccessController::state`] and used to
//! seed the controller for the next request of the same session.

use crate::errors::CacheError;
use crate::resource::Resource;
use crate::store::Predicate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// What an access review asks about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceAttributes {
    pub namespace: String,
    pub name: String,
    pub group: String,
    pub version: String,
    pub resource: String,
    pub verb: String,
}

impl ResourceAttributes {
    /// The attributes checked before `obj` may be read.
    #[must_use]
    pub fn for_read(obj: &Resource) -> Self {
        let meta = obj.metadata();
        let (group, version, resource) = match obj {
            Resource::Namespace(_) => ("", "v1", "namespaces"),
            Resource::AddressSpace(_) | Resource::Connection(_) | Resource::Link(_) => {
                ("enmasse.io", "v1beta1", "addressspaces")
            }
            Resource::Address(_) => ("enmasse.io", "v1beta1", "addresses"),
            Resource::AddressSpaceSchema(_) => ("enmasse.io", "v1beta1", "addressspaceschemas"),
            Resource::AddressPlan(_) => ("admin.enmasse.io", "v1beta2", "addressplans"),
            Resource::AddressSpacePlan(_) => ("admin.enmasse.io", "v1beta2", "addressspaceplans"),
            Resource::AuthenticationService(_) => ("admin.enmasse.io", "v1beta1", "authenticationservices"),
        };
        // namespaces are checked by name; everything else per namespace
        let (namespace, name) = match obj {
            Resource::Namespace(_) => (meta.name.clone(), meta.name.clone()),
            _ => (meta.namespace.clone(), String::new()),
        };
        Self {
            namespace,
            name,
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
            verb: "list".to_string(),
        }
    }
}

/// The external authorization check.
pub trait Authorizer: Send + Sync {
    /// # Errors
    /// Implementations return `CacheError::Authorization` when the check itself fails.
    fn allowed(&self, attributes: &ResourceAttributes) -> Result<bool, CacheError>;
}

impl<F> Authorizer for F
where
    F: Fn(&ResourceAttributes) -> Result<bool, CacheError> + Send + Sync,
{
    fn allowed(&self, attributes: &ResourceAttributes) -> Result<bool, CacheError> {
        self(attributes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub attributes: ResourceAttributes,
    pub allowed: bool,
}

/// Serializable snapshot of cached decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessState {
    pub decisions: Vec<Decision>,
}

pub struct CachingAccessController<A> {
    authorizer: A,
    decisions: RwLock<HashMap<ResourceAttributes, bool>>,
    updated: AtomicBool,
}

impl<A: Authorizer> CachingAccessController<A> {
    pub fn new(authorizer: A, prior: Option<AccessState>) -> Self {
        let decisions = prior
            .map(|s| s.decisions.into_iter().map(|d| (d.attributes, d.allowed)).collect())
            .unwrap_or_default();
        Self { authorizer, decisions: RwLock::new(decisions), updated: AtomicBool::new(false) }
    }

    /// # Errors
    /// Propagates authorizer failures; failed checks are not cached.
    pub fn can_read(&self, obj: &Resource) -> Result<bool, CacheError> {
        let attributes = ResourceAttributes::for_read(obj);
        if let Some(allowed) = self.decisions.read().get(&attributes).copied() {
            return Ok(allowed);
        }
        // lock released while the authorizer runs
        let allowed = self.authorizer.allowed(&attributes)?;
        crate::audit!(
            "read {} {}/{} namespace='{}' name='{}': {}",
            attributes.verb,
            attributes.group,
            attributes.resource,
            attributes.namespace,
            attributes.name,
            if allowed { "allowed" } else { "denied" }
        );
        self.decisions.write().insert(attributes, allowed);
        self.updated.store(true, Ordering::Release);
        Ok(allowed)
    }

    /// Whether new decisions were made since construction, and all cached decisions.
    #[must_use]
    pub fn state(&self) -> (bool, AccessState) {
        let mut decisions: Vec<Decision> = self
            .decisions
            .read()
            .iter()
            .map(|(attributes, allowed)| Decision { attributes: attributes.clone(), allowed: *allowed })
            .collect();
        decisions.sort_by(|a, b| a.attributes.cmp(&b.attributes));
        (self.updated.load(Ordering::Acquire), AccessState { decisions })
    }

    /// Store predicate admitting only readable resources.
    #[must_use]
    pub const fn view_filter(&self) -> ViewFilter<'_, A> {
        ViewFilter { controller: self }
    }
}

pub struct ViewFilter<'a, A> {
    controller: &'a CachingAccessController<A>,
}

impl<A: Authorizer> Predicate<Resource> for ViewFilter<'_, A> {
    fn test(&self, obj: &Resource) -> Result<bool, CacheError> {
        self.controller.can_read(obj)
    }
}
