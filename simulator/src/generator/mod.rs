pub mod collisions;
pub mod population;
