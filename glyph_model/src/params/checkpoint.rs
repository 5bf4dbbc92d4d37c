//! Reads trained parameters from a local `.safetensors` checkpoint.

use std::{collections::HashMap, fs, path::Path};

use log::{debug, info};
use safetensors::{Dtype, SafeTensors, tensor::TensorView};

use super::{ParameterStore, Tensor};
use crate::LoadErr;

/// Loads a checkpoint file and builds a validated `ParameterStore` from it.
///
/// # Arguments
/// * `path` - The location of the `.safetensors` file.
///
/// # Returns
/// The parameter store or a `LoadErr` if the file can't be read, parsed or
/// doesn't describe a valid glyph network.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ParameterStore, LoadErr> {
    let path = path.as_ref();
    info!("loading checkpoint from {}", path.display());

    let bytes = fs::read(path)?;
    from_bytes(&bytes)
}

/// Builds a `ParameterStore` from the raw contents of a `.safetensors` file.
pub fn from_bytes(bytes: &[u8]) -> Result<ParameterStore, LoadErr> {
    let vars = read_variables(bytes)?;
    Ok(ParameterStore::from_variables(vars)?)
}

/// Decodes every tensor of a `.safetensors` buffer.
///
/// # Arguments
/// * `bytes` - The raw file contents.
///
/// # Returns
/// The tensors by name or a `LoadErr` if any of them isn't an `F32` tensor of rank 1 or 2.
pub fn read_variables(bytes: &[u8]) -> Result<HashMap<String, Tensor>, LoadErr> {
    let tensors = SafeTensors::deserialize(bytes).map_err(|e| LoadErr::Format(e.to_string()))?;

    tensors
        .tensors()
        .into_iter()
        .map(|(name, view)| -> Result<(String, Tensor), LoadErr> {
            let tensor = to_tensor(&name, &view)?;
            debug!("read {name} with shape {:?}", tensor.shape());
            Ok((name, tensor))
        })
        .collect()
}

fn to_tensor(name: &str, view: &TensorView<'_>) -> Result<Tensor, LoadErr> {
    let unsupported = |detail: String| LoadErr::UnsupportedTensor {
        name: name.to_string(),
        detail,
    };

    if view.dtype() != Dtype::F32 {
        return Err(unsupported(format!("dtype {:?}", view.dtype())));
    }

    let shape = view.shape().to_vec();
    if shape.is_empty() || shape.len() > 2 {
        return Err(unsupported(format!("rank {}", shape.len())));
    }

    // The buffer inside the file has no alignment guarantee.
    let data: Vec<f32> = bytemuck::pod_collect_to_vec(view.data());
    Tensor::new(shape, data).map_err(|e| unsupported(e.to_string()))
}
