//! Route 53 Recovery Readiness
//!
//! Readiness resources have no status; deletes wait for the resource to
//! disappear.

use crate::catalog::WaitSpecConfig;
use crate::registry::{ResourceRegistration, ServicePackage};
use converge_waiter::WaitIntent;

pub const SERVICE_NAME: &str = "route53recoveryreadiness";

const DELETE_TIMEOUT_SECS: u64 = 5 * 60;

fn deleted_on_absence(type_name: &str, name: &str) -> ResourceRegistration {
    ResourceRegistration::resource(type_name, name).wait(
        WaitIntent::Delete,
        WaitSpecConfig::statuses([], []).timeout_secs(DELETE_TIMEOUT_SECS),
    )
}

pub fn service_package() -> ServicePackage {
    ServicePackage::new(SERVICE_NAME)
        .register(deleted_on_absence("aws_route53recoveryreadiness_cell", "Cell"))
        .register(deleted_on_absence("aws_route53recoveryreadiness_readiness_check", "Readiness Check"))
        .register(deleted_on_absence("aws_route53recoveryreadiness_recovery_group", "Recovery Group"))
        .register(deleted_on_absence("aws_route53recoveryreadiness_resource_set", "Resource Set"))
}
