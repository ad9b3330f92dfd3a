pub mod bit_coder;
pub mod mesh;
pub mod shared;
