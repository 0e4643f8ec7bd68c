pub mod overview;

pub use overview::{NetworkOverview, NetworkOverviewService, OverviewError};
