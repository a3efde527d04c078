pub mod achievements;

pub use achievements::configure_achievement_routes;
