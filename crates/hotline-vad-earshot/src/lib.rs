pub mod wrapper;

pub use wrapper::{Aggressiveness, EarshotDetector};
