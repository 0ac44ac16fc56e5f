//! EventBridge Scheduler
//!
//! Schedule groups move through `ACTIVE` and `DELETING`. Schedules have no
//! lifecycle status, only `ENABLED`/`DISABLED`, but are not readable right
//! after creation.

use crate::catalog::WaitSpecConfig;
use crate::registry::{ResourceRegistration, ServicePackage};
use converge_common::defaults::PROPAGATION_TIMEOUT_SECS;
use converge_waiter::WaitIntent;

pub const SERVICE_NAME: &str = "scheduler";

const SCHEDULE_GROUP_TIMEOUT_SECS: u64 = 5 * 60;

pub fn service_package() -> ServicePackage {
    ServicePackage::new(SERVICE_NAME)
        .register(
            ResourceRegistration::resource("aws_scheduler_schedule_group", "Schedule Group")
                .wait(
                    WaitIntent::Create,
                    WaitSpecConfig::statuses(["ACTIVE"], [])
                        .timeout_secs(SCHEDULE_GROUP_TIMEOUT_SECS)
                        .not_found_grace_secs(PROPAGATION_TIMEOUT_SECS),
                )
                .wait(
                    WaitIntent::Delete,
                    WaitSpecConfig::statuses([], []).timeout_secs(SCHEDULE_GROUP_TIMEOUT_SECS),
                ),
        )
        .register(
            ResourceRegistration::resource("aws_scheduler_schedule", "Schedule")
                .wait(
                    WaitIntent::Create,
                    WaitSpecConfig::statuses(["ENABLED", "DISABLED"], [])
                        .timeout_secs(PROPAGATION_TIMEOUT_SECS)
                        .not_found_grace_secs(PROPAGATION_TIMEOUT_SECS),
                )
                .wait(
                    WaitIntent::Delete,
                    WaitSpecConfig::statuses([], []).timeout_secs(PROPAGATION_TIMEOUT_SECS),
                ),
        )
}
