use crate::analysis::common::error::Result;
use crate::analysis::model::types::{ModelInfo, ModelOutput};
use crate::analysis::tensor::PackedTensor;

pub trait ModelLoader {
    type Session: ModelSession;

    fn load(&self) -> Result<Self::Session>;
}

/// A loaded model, used by exactly one analysis. Release happens in `Drop`.
pub trait ModelSession {
    fn describe(&self) -> ModelInfo;

    fn run(&mut self, tensor: &PackedTensor) -> Result<ModelOutput>;
}
