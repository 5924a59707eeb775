mod device_class;
mod mobile_grade;
mod name_or_key;

pub use device_class::*;
pub use mobile_grade::*;
pub use name_or_key::*;
