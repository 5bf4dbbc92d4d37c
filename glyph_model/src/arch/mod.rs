mod activation;
pub mod ops;

pub use activation::Activation;
