// Domain layer - Readings, units and warning bands
pub mod glucose;
pub mod reading;
