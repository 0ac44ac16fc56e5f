//! Directory Service

use crate::catalog::WaitSpecConfig;
use crate::registry::{ResourceRegistration, ServicePackage};
use converge_common::defaults::PROPAGATION_TIMEOUT_SECS;
use converge_waiter::WaitIntent;

pub const SERVICE_NAME: &str = "ds";

const SHARED_DIRECTORY_TIMEOUT_SECS: u64 = 10 * 60;

/// Share statuses that end an accept without sharing the directory
const SHARE_FAILURES: [&str; 4] = ["ShareFailed", "Rejected", "RejectFailed", "Deleted"];

pub fn service_package() -> ServicePackage {
    let accepter = ResourceRegistration::resource(
        "aws_directory_service_shared_directory_accepter",
        "Shared Directory Accepter",
    )
    .wait(
        WaitIntent::Create,
        WaitSpecConfig::statuses(["Shared"], SHARE_FAILURES)
            .timeout_secs(SHARED_DIRECTORY_TIMEOUT_SECS)
            .not_found_grace_secs(PROPAGATION_TIMEOUT_SECS),
    )
    .wait(
        WaitIntent::Delete,
        WaitSpecConfig::statuses(["Deleted"], []).timeout_secs(SHARED_DIRECTORY_TIMEOUT_SECS),
    );

    ServicePackage::new(SERVICE_NAME)
        .register(ResourceRegistration::resource("aws_directory_service_directory", "Directory"))
        .register(accepter)
}
