//! Public site: visit tracking and the static landing page

pub mod middleware;
pub mod routes;

pub use middleware::{track_visit, ClientIdentifier, TrackingState};
pub use routes::create_app_router;
