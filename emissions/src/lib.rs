//! Re-estimation of the poly(A) HMM emission parameters.
//!
//! The samples produced under the new kmer models are labeled by the segmentation
//! computed under the old kmer models, then each region is fitted by a Gaussian (START, LEADER, POLYA)
//! or a Gaussian mixture (ADAPTER, TRANSCRIPT). The fit is compared against the old log-likelihoods in [benchmark].
pub mod aggregate;
pub mod benchmark;
pub mod error;
pub mod fit;
pub mod misc;
pub mod records;
pub mod segmentation;
#[macro_use]
extern crate log;

pub use error::ReestimateError;
pub type Result<T> = std::result::Result<T, ReestimateError>;
