pub use display::{Display, SCALE};

mod display;
