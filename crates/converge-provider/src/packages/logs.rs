//! CloudWatch Logs
//!
//! Log streams carry no status. A stream's fetcher reports `exists` once the
//! stream is listed in its group.

use crate::catalog::WaitSpecConfig;
use crate::registry::{ResourceRegistration, ServicePackage};
use converge_common::defaults::PROPAGATION_TIMEOUT_SECS;
use converge_waiter::WaitIntent;

pub const SERVICE_NAME: &str = "logs";

/// Status reported by existence-only fetchers
pub const STATUS_EXISTS: &str = "exists";

pub fn service_package() -> ServicePackage {
    ServicePackage::new(SERVICE_NAME)
        .register(ResourceRegistration::data_source("aws_cloudwatch_log_group", "Log Group"))
        .register(ResourceRegistration::resource("aws_cloudwatch_log_group", "Log Group"))
        .register(
            ResourceRegistration::resource("aws_cloudwatch_log_stream", "Log Stream")
                .wait(
                    WaitIntent::Create,
                    WaitSpecConfig::statuses([STATUS_EXISTS], [])
                        .timeout_secs(PROPAGATION_TIMEOUT_SECS)
                        .not_found_grace_secs(PROPAGATION_TIMEOUT_SECS),
                )
                .wait(
                    WaitIntent::Delete,
                    WaitSpecConfig::statuses([], []).timeout_secs(PROPAGATION_TIMEOUT_SECS),
                ),
        )
}
