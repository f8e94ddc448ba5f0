pub mod aggregate;

pub use aggregate::{AggregateResponse, EnrollmentResult, IdScanMatchResult, LivenessResult};
