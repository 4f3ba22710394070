//! Layer list operations
//!
//! Each operation takes the current layer list and returns the complete new
//! list, or a rejection. Nothing is mutated in place, so a rejected edit
//! leaves no trace.

use crate::error::{MontageError, Result};
use crate::layers::{Layer, LayerId, LayerPatch};

/// Where a new layer goes in z-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// End of the list, rendered above everything else
    Top,
    /// Start of the list, rendered below everything else
    Bottom,
}

fn index_of(layers: &[Layer], id: &LayerId) -> Result<usize> {
    layers
        .iter()
        .position(|l| l.id() == id)
        .ok_or_else(|| MontageError::LayerNotFound { id: id.to_string() })
}

/// Add `layer` at the given end of the list.
pub fn insert_layer(layers: &[Layer], layer: Layer, placement: Placement) -> Vec<Layer> {
    let mut new_layers = Vec::with_capacity(layers.len() + 1);
    match placement {
        Placement::Top => {
            new_layers.extend_from_slice(layers);
            new_layers.push(layer);
        }
        Placement::Bottom => {
            new_layers.push(layer);
            new_layers.extend_from_slice(layers);
        }
    }
    new_layers
}

/// Shallow-merge `patch` into the layer with `id`; other layers are copied as is.
pub fn update_layer(layers: &[Layer], id: &LayerId, patch: &LayerPatch) -> Result<Vec<Layer>> {
    let index = index_of(layers, id)?;
    let updated = patch.apply(&layers[index])?;

    let mut new_layers = layers.to_vec();
    new_layers[index] = updated;
    Ok(new_layers)
}

/// Remove the layer with `id`. The background image cannot be deleted.
pub fn delete_layer(layers: &[Layer], id: &LayerId) -> Result<Vec<Layer>> {
    let index = index_of(layers, id)?;
    if layers[index].is_background() {
        return Err(MontageError::BackgroundLayerProtected { action: "deleted" });
    }

    let mut new_layers = layers.to_vec();
    new_layers.remove(index);
    Ok(new_layers)
}

/// Cut a layer in two at `at_frame`.
///
/// The first part keeps the original id and covers `[start, at_frame)`; the
/// second part gets `second_id`, covers `[at_frame, end)` and is placed
/// directly after the first. Names get " (1)" and " (2)" suffixes; every
/// other field is copied.
pub fn split_layer(
    layers: &[Layer],
    id: &LayerId,
    at_frame: u32,
    second_id: LayerId,
) -> Result<Vec<Layer>> {
    let index = index_of(layers, id)?;
    let layer = &layers[index];

    if layer.is_locked() {
        return Err(MontageError::LayerLocked {
            name: layer.name().to_string(),
            action: "split",
        });
    }
    if at_frame <= layer.start_frame() || at_frame >= layer.end_frame() {
        return Err(MontageError::SplitOutOfRange {
            frame: at_frame,
            start_frame: layer.start_frame(),
            end_frame: layer.end_frame(),
        });
    }
    if layer.is_background() {
        return Err(MontageError::BackgroundLayerProtected { action: "split" });
    }

    let mut first = layer.clone();
    {
        let common = first.common_mut();
        common.name = format!("{} (1)", layer.name());
        common.end_frame = at_frame;
    }

    let mut second = layer.clone();
    {
        let common = second.common_mut();
        common.id = second_id;
        common.name = format!("{} (2)", layer.name());
        common.start_frame = at_frame;
    }

    let mut new_layers = layers.to_vec();
    new_layers[index] = first;
    new_layers.insert(index + 1, second);
    Ok(new_layers)
}

/// Move the layer at `from` to `to`, shifting the layers in between.
///
/// Only the moved layer is checked for lock/background status; layers it
/// passes over may be displaced.
pub fn reorder_layers(layers: &[Layer], from: usize, to: usize) -> Result<Vec<Layer>> {
    if from >= layers.len() || to >= layers.len() || from == to {
        return Err(MontageError::InvalidReorder {
            from,
            to,
            len: layers.len(),
        });
    }

    let moving = &layers[from];
    if moving.is_locked() {
        return Err(MontageError::LayerLocked {
            name: moving.name().to_string(),
            action: "reordered",
        });
    }
    if moving.is_background() {
        return Err(MontageError::BackgroundLayerProtected { action: "reordered" });
    }

    let mut new_layers = layers.to_vec();
    let removed = new_layers.remove(from);
    new_layers.insert(to, removed);
    Ok(new_layers)
}

/// Move a layer one step toward the start of the list.
///
/// Returns `Ok(None)` when the layer is already first.
pub fn move_layer_up(layers: &[Layer], id: &LayerId) -> Result<Option<Vec<Layer>>> {
    let index = index_of(layers, id)?;
    if index == 0 {
        return Ok(None);
    }
    reorder_layers(layers, index, index - 1).map(Some)
}

/// Move a layer one step toward the end of the list.
///
/// Returns `Ok(None)` when the layer is already last.
pub fn move_layer_down(layers: &[Layer], id: &LayerId) -> Result<Option<Vec<Layer>>> {
    let index = index_of(layers, id)?;
    if index + 1 >= layers.len() {
        return Ok(None);
    }
    reorder_layers(layers, index, index + 1).map(Some)
}
