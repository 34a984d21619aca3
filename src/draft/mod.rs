// Draft domain: snake-slot math, pick ownership resolution, roster aggregation.

pub mod ownership;
pub mod roster;
pub mod slot;
