//! Built-in service packages
//!
//! Each package is data: type names plus wait presets. Status labels and
//! timeouts are the services' own; nothing here talks to AWS.

use crate::registry::PackageConstructor;

pub mod autoscaling;
pub mod ds;
pub mod logs;
pub mod neptune;
pub mod route53recoveryreadiness;
pub mod scheduler;

/// Constructors for every built-in package
pub const ALL: &[PackageConstructor] = &[
    autoscaling::service_package,
    ds::service_package,
    logs::service_package,
    neptune::service_package,
    route53recoveryreadiness::service_package,
    scheduler::service_package,
];
