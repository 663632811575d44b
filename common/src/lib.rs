pub mod buffer2;
pub mod buffer3;
pub mod float_ext;

pub use buffer2::Buffer2;
pub use buffer3::Buffer3;
pub use float_ext::FloatExt;

pub const EPSILON: f64 = 1e-6;
