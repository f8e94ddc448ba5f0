//! Folds the items of one session into the three-slot aggregate response.

use crate::config::DuplicatePolicy;
use crate::dtos::{AggregateResponse, EnrollmentResult, IdScanMatchResult, LivenessResult};
use crate::models::{SessionItem, SessionPath};
use metrics::counter;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseAggregator {
    policy: DuplicatePolicy,
}

impl ResponseAggregator {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self { policy }
    }

    pub fn aggregate(&self, reference: &str, items: &[SessionItem]) -> AggregateResponse {
        let mut response = AggregateResponse::default();

        for (index, item) in items.iter().enumerate() {
            let path = item.path();
            tracing::debug!(reference = %reference, index, path = %item.raw_path(), "Processing session item");

            match path {
                SessionPath::Liveness => {
                    self.place(&mut response.liveness, || LivenessResult::from(item))
                }
                SessionPath::Enrollment3d => {
                    self.place(&mut response.enrollment3d, || EnrollmentResult::from(item))
                }
                SessionPath::Match3d2dIdScan => self.place(&mut response.match3d2d_idscan, || {
                    IdScanMatchResult::from(item)
                }),
                SessionPath::Unrecognized(path) => {
                    tracing::warn!(reference = %reference, index, path = %path, "Unknown path found in session item");
                    counter!("session_items_unrecognized_total").increment(1);
                }
            }
        }

        response
    }

    fn place<T>(&self, slot: &mut Option<T>, build: impl FnOnce() -> T) {
        if self.policy == DuplicatePolicy::FirstWins && slot.is_some() {
            return;
        }
        *slot = Some(build());
    }
}
