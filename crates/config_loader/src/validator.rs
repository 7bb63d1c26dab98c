//! Config validation
//!
//! Rules:
//! - device path is not empty
//! - sink names are non-empty and unique
//! - file sinks carry a `path` param

use std::collections::HashSet;

use contracts::{ContractError, RangerBlueprint, SinkType};

/// Validate a RangerBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RangerBlueprint) -> Result<(), ContractError> {
    validate_device(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_device(blueprint: &RangerBlueprint) -> Result<(), ContractError> {
    if blueprint.device.path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "device.path",
            "device path cannot be empty",
        ));
    }
    Ok(())
}

fn validate_sinks(blueprint: &RangerBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.sink_type == SinkType::File
            && sink.params.get("path").is_none_or(|p| p.is_empty())
        {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.path", sink.name),
                "file sink requires a non-empty 'path' param",
            ));
        }
    }
    Ok(())
}
