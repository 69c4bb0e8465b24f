pub mod bounds;
pub mod events;
pub mod geo;
pub mod map;
pub mod viewport;
