use crate::domain::model::PatchFolder;
use crate::domain::ports::PatchSelector;
use crate::utils::error::{PatchError, Result};

/// Selects the named patches in the order given.
#[derive(Debug, Clone, Default)]
pub struct NamedSelector {
    names: Vec<String>,
}

impl NamedSelector {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl PatchSelector for NamedSelector {
    fn select(&self, available: &[PatchFolder]) -> Result<Vec<PatchFolder>> {
        self.names
            .iter()
            .map(|name| {
                available
                    .iter()
                    .find(|p| &p.name == name)
                    .cloned()
                    .ok_or_else(|| PatchError::UnknownPatch { name: name.clone() })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllSelector;

impl PatchSelector for AllSelector {
    fn select(&self, available: &[PatchFolder]) -> Result<Vec<PatchFolder>> {
        Ok(available.to_vec())
    }
}

/// Checkbox prompt on the terminal. Escape selects nothing.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractiveSelector;

#[cfg(feature = "cli")]
impl PatchSelector for InteractiveSelector {
    fn select(&self, available: &[PatchFolder]) -> Result<Vec<PatchFolder>> {
        let items: Vec<&str> = available.iter().map(|p| p.name.as_str()).collect();
        let chosen = dialoguer::MultiSelect::new()
            .with_prompt("Select the patch folder(s) to import (use spacebar to select)")
            .items(&items)
            .interact_opt()
            .map_err(selection_error)?;

        Ok(chosen
            .unwrap_or_default()
            .into_iter()
            .map(|index| available[index].clone())
            .collect())
    }
}

#[cfg(feature = "cli")]
fn selection_error(err: dialoguer::Error) -> PatchError {
    let dialoguer::Error::IO(source) = err;
    PatchError::SelectionPrompt { source }
}
