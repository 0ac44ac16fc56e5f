//! Service packages and the registry assembled from them
//!
//! Each service package lists the resource and data source types it
//! provides, plus the wait presets its resources need. The registry is built
//! once at process start from a list of package constructors.

use crate::catalog::{IntentWaits, WaitCatalog, WaitSpecConfig};
use crate::error::{ConfigError, RegistryError};
use converge_waiter::WaitIntent;
use std::collections::BTreeMap;
use tracing::debug;

/// What a registered type is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    /// Managed resource with create/update/delete lifecycles
    Resource,
    /// Read-only lookup
    DataSource,
}

/// One type provided by a service package
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRegistration {
    pub type_name: String,
    /// Human-readable name used in logs and errors
    pub name: String,
    pub kind: RegistrationKind,
    pub waits: IntentWaits,
}

impl ResourceRegistration {
    pub fn resource(type_name: &str, name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
            kind: RegistrationKind::Resource,
            waits: IntentWaits::default(),
        }
    }

    pub fn data_source(type_name: &str, name: &str) -> Self {
        Self {
            kind: RegistrationKind::DataSource,
            ..Self::resource(type_name, name)
        }
    }

    /// Attach the preset for `intent`
    pub fn wait(mut self, intent: WaitIntent, preset: WaitSpecConfig) -> Self {
        self.waits.set(intent, preset);
        self
    }
}

/// Everything one AWS service contributes
#[derive(Debug, Clone, PartialEq)]
pub struct ServicePackage {
    pub service_name: String,
    pub resources: Vec<ResourceRegistration>,
    pub data_sources: Vec<ResourceRegistration>,
}

impl ServicePackage {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            resources: Vec::new(),
            data_sources: Vec::new(),
        }
    }

    /// Add a registration to the list matching its kind
    pub fn register(mut self, registration: ResourceRegistration) -> Self {
        match registration.kind {
            RegistrationKind::Resource => self.resources.push(registration),
            RegistrationKind::DataSource => self.data_sources.push(registration),
        }
        self
    }

    pub fn registrations(&self) -> impl Iterator<Item = &ResourceRegistration> {
        self.resources.iter().chain(&self.data_sources)
    }
}

/// Constructor supplied at process start
pub type PackageConstructor = fn() -> ServicePackage;

/// Service name to package map with a type-name index
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    packages: BTreeMap<String, ServicePackage>,
    /// type name -> service name
    types: BTreeMap<String, String>,
}

impl ServiceRegistry {
    /// Build the registry, rejecting duplicate services and type names
    pub fn new(
        constructors: impl IntoIterator<Item = PackageConstructor>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for constructor in constructors {
            registry.add(constructor())?;
        }
        debug!(
            services = registry.packages.len(),
            types = registry.types.len(),
            "Service registry assembled"
        );
        Ok(registry)
    }

    /// Registry with every built-in package
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(crate::packages::ALL.iter().copied())
    }

    fn add(&mut self, package: ServicePackage) -> Result<(), RegistryError> {
        if self.packages.contains_key(&package.service_name) {
            return Err(RegistryError::DuplicateService(package.service_name));
        }

        let mut new_types: BTreeMap<String, String> = BTreeMap::new();
        for registration in package.registrations() {
            let owner = self
                .types
                .get(&registration.type_name)
                .or(new_types.get(&registration.type_name));
            // Resource and data source may share a type name within one package
            if let Some(owner) = owner {
                if owner != &package.service_name {
                    return Err(RegistryError::DuplicateType {
                        type_name: registration.type_name.clone(),
                        first: owner.clone(),
                        second: package.service_name.clone(),
                    });
                }
            }
            new_types.insert(registration.type_name.clone(), package.service_name.clone());
        }

        self.types.extend(new_types);
        self.packages.insert(package.service_name.clone(), package);
        Ok(())
    }

    pub fn package(&self, service_name: &str) -> Option<&ServicePackage> {
        self.packages.get(service_name)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Service that provides `type_name`
    pub fn service_for(&self, type_name: &str) -> Result<&str, RegistryError> {
        self.types
            .get(type_name)
            .map(String::as_str)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))
    }

    /// Managed resource registration for `type_name`
    pub fn resource(&self, type_name: &str) -> Result<&ResourceRegistration, RegistryError> {
        let service = self.service_for(type_name)?;
        self.packages
            .get(service)
            .and_then(|p| p.resources.iter().find(|r| r.type_name == type_name))
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))
    }

    /// Collect every resource wait preset into a catalog
    pub fn wait_catalog(&self) -> Result<WaitCatalog, ConfigError> {
        let mut catalog = WaitCatalog::new();
        for package in self.packages.values() {
            for resource in &package.resources {
                for (intent, preset) in resource.waits.iter() {
                    catalog.insert(
                        resource.type_name.clone(),
                        preset.to_spec(&resource.type_name, intent)?,
                    );
                }
            }
        }
        Ok(catalog)
    }
}
