pub mod booking;
pub mod discount;
pub mod kyc;
pub mod revenue;
pub mod tracking;
pub mod transaction;
pub mod workshop;

pub use booking::*;
pub use discount::*;
pub use kyc::*;
pub use revenue::*;
pub use tracking::*;
pub use transaction::*;
pub use workshop::*;
