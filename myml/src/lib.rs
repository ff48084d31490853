mod traits;
pub use traits::{ActivationFn, Loss, Optimizer};

pub mod activation;
pub mod loss;
pub mod optimizer;

mod embedding;
pub use embedding::Embedding;
