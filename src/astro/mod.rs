pub mod ephemeris;
pub mod strength;

pub use ephemeris::{Ephemeris, Observer};
pub use strength::StrengthCalculator;
