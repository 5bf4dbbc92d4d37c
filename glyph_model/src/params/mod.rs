pub mod checkpoint;
mod dense;
mod store;
mod tensor;

pub use dense::Dense;
pub use store::ParameterStore;
pub use tensor::Tensor;
