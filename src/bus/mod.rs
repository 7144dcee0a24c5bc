pub mod events;
pub mod guard;
pub mod state;
