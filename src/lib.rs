//! Passenger survival dashboard: load a small table once, filter it, and
//! recompute every aggregate on each interaction.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;
pub mod view;

pub use data::filter::{FilterState, FilteredView, RangeFilter};
pub use data::model::{Dataset, Passenger, PassengerClass, Port, PortBucket, Sex};
pub use error::DataLoadError;
pub use state::AppState;
pub use view::RenderSnapshot;
