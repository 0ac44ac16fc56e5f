//! Neptune
//!
//! Global cluster statuses: `creating`, `available`, `modifying`,
//! `upgrading`, `deleting`, `failed`.

use crate::catalog::WaitSpecConfig;
use crate::registry::{ResourceRegistration, ServicePackage};
use converge_waiter::WaitIntent;

pub const SERVICE_NAME: &str = "neptune";

pub const GLOBAL_CLUSTER_CREATE_TIMEOUT_SECS: u64 = 5 * 60;
pub const GLOBAL_CLUSTER_UPDATE_TIMEOUT_SECS: u64 = 90 * 60;
pub const GLOBAL_CLUSTER_DELETE_TIMEOUT_SECS: u64 = 5 * 60;

const STATUS_AVAILABLE: &str = "available";
const STATUS_FAILED: &str = "failed";

/// Wait presets for `aws_neptune_global_cluster`
pub fn global_cluster() -> ResourceRegistration {
    ResourceRegistration::resource("aws_neptune_global_cluster", "Global Cluster")
        .wait(
            WaitIntent::Create,
            WaitSpecConfig::statuses([STATUS_AVAILABLE], [STATUS_FAILED])
                .timeout_secs(GLOBAL_CLUSTER_CREATE_TIMEOUT_SECS),
        )
        .wait(
            WaitIntent::Update,
            WaitSpecConfig::statuses([STATUS_AVAILABLE], [STATUS_FAILED])
                .timeout_secs(GLOBAL_CLUSTER_UPDATE_TIMEOUT_SECS),
        )
        .wait(
            WaitIntent::Delete,
            WaitSpecConfig::statuses([], [STATUS_FAILED]).timeout_secs(GLOBAL_CLUSTER_DELETE_TIMEOUT_SECS),
        )
}

pub fn service_package() -> ServicePackage {
    ServicePackage::new(SERVICE_NAME)
        .register(global_cluster())
        .register(ResourceRegistration::resource("aws_neptune_cluster", "Cluster"))
        .register(ResourceRegistration::resource("aws_neptune_cluster_instance", "Cluster Instance"))
}
