//! Built-in expression functions

pub mod conditional;
pub mod counter;
pub mod datetime;
pub mod external;
pub mod regex;
pub mod string;

pub use self::conditional::*;
pub use self::counter::*;
pub use self::datetime::*;
pub use self::external::*;
pub use self::regex::*;
pub use self::string::*;
