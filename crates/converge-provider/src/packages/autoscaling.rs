//! Auto Scaling

use crate::catalog::WaitSpecConfig;
use crate::registry::{ResourceRegistration, ServicePackage};
use converge_common::defaults::PROPAGATION_TIMEOUT_SECS;
use converge_waiter::WaitIntent;

pub const SERVICE_NAME: &str = "autoscaling";

/// Groups wait for capacity on create and for instances to drain on delete
const GROUP_TIMEOUT_SECS: u64 = 600;

pub fn service_package() -> ServicePackage {
    ServicePackage::new(SERVICE_NAME)
        .register(ResourceRegistration::data_source("aws_autoscaling_group", "Group"))
        .register(ResourceRegistration::data_source("aws_autoscaling_groups", "Groups"))
        .register(ResourceRegistration::data_source("aws_launch_configuration", "Launch Configuration"))
        .register(ResourceRegistration::resource("aws_autoscaling_attachment", "Attachment"))
        .register(
            ResourceRegistration::resource("aws_autoscaling_group", "Group")
                .wait(
                    WaitIntent::Create,
                    WaitSpecConfig::statuses(["InService"], [])
                        .timeout_secs(GROUP_TIMEOUT_SECS)
                        .not_found_grace_secs(PROPAGATION_TIMEOUT_SECS),
                )
                .wait(
                    WaitIntent::Delete,
                    WaitSpecConfig::statuses([], []).timeout_secs(GROUP_TIMEOUT_SECS),
                ),
        )
        .register(ResourceRegistration::resource("aws_autoscaling_group_tag", "Group Tag"))
        .register(ResourceRegistration::resource("aws_autoscaling_lifecycle_hook", "Lifecycle Hook"))
        .register(ResourceRegistration::resource("aws_autoscaling_notification", "Notification"))
        .register(ResourceRegistration::resource("aws_autoscaling_policy", "Policy"))
        .register(ResourceRegistration::resource("aws_autoscaling_schedule", "Scheduled Action"))
        .register(
            ResourceRegistration::resource("aws_launch_configuration", "Launch Configuration").wait(
                WaitIntent::Create,
                WaitSpecConfig::statuses(["exists"], [])
                    .timeout_secs(PROPAGATION_TIMEOUT_SECS)
                    .not_found_grace_secs(PROPAGATION_TIMEOUT_SECS),
            ),
        )
}
