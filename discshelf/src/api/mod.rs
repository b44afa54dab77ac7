//! HTTP API handlers

pub mod albums;
pub mod artists;
pub mod discogs;
pub mod genres;
pub mod health;
pub mod resync;
pub mod settings;

pub use albums::album_routes;
pub use artists::artist_routes;
pub use discogs::discogs_routes;
pub use genres::genre_routes;
pub use health::health_routes;
pub use resync::resync_routes;
pub use settings::settings_routes;
