pub mod game;
pub mod powerup;
pub mod scoring;
pub mod tier;
pub mod word;
