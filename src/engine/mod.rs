pub mod arena;
pub mod bot;
pub mod bot_profiles;
pub mod clock;
pub mod game;
pub mod models;
pub mod session;
pub mod snapshot;
