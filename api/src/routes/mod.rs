pub mod ask;
pub mod health_route;
pub mod sessions;
pub mod status_route;
