//! The node's standard resource table.
//!
//! | Path          | Name               | Methods     | Observable | Initial             |
//! |---------------|--------------------|-------------|------------|---------------------|
//! | `3200/0/5501` | button             | READ        | yes        | `"0"`               |
//! | `3201/0/5853` | blink_pattern      | READ, WRITE | no         | config pattern      |
//! | `3201/0/5850` | blink              | EXECUTE     | no         | `""`                |
//! | `3313/0/5702` | accel_x            | READ        | yes        | `"0"`               |
//! | `3313/0/5703` | accel_y            | READ        | yes        | `"0"`               |
//! | `3313/0/5704` | accel_z            | READ        | yes        | `"0"`               |
//! | `3313/0/5701` | accel_unit         | READ        | no         | `"G"`               |
//! | `3303/0/5700` | temperature        | READ        | yes        | `"0"`               |
//! | `3303/0/5701` | temperature_unit   | READ        | no         | `"Cel"`             |

use log::{debug, info};

use super::commands::AppCommand;
use crate::config::NodeConfig;
use crate::error::RegistryError;
use crate::resource::{DeliveryStatus, Methods, ResourceHandle, ResourcePath, ResourceRegistry};

pub const BUTTON_PATH: &str = "3200/0/5501";
pub const PATTERN_PATH: &str = "3201/0/5853";
pub const BLINK_PATH: &str = "3201/0/5850";
pub const ACCEL_X_PATH: &str = "3313/0/5702";
pub const ACCEL_Y_PATH: &str = "3313/0/5703";
pub const ACCEL_Z_PATH: &str = "3313/0/5704";
pub const ACCEL_UNIT_PATH: &str = "3313/0/5701";
pub const TEMPERATURE_PATH: &str = "3303/0/5700";
pub const TEMPERATURE_UNIT_PATH: &str = "3303/0/5701";

/// Handles of every standard resource, minted by [`install`].
#[derive(Debug, Clone, Copy)]
pub struct ResourceTable {
    pub button: ResourceHandle,
    pub pattern: ResourceHandle,
    pub blink: ResourceHandle,
    pub accel: [ResourceHandle; 3],
    pub accel_unit: ResourceHandle,
    pub temperature: ResourceHandle,
    pub temperature_unit: ResourceHandle,
}

/// Create the standard resources and attach their handlers.
pub fn install(
    registry: &mut ResourceRegistry,
    config: &NodeConfig,
) -> Result<ResourceTable, RegistryError> {
    let observed = |registry: &mut ResourceRegistry, path, name| {
        let h = registry.create(path, "0", Methods::READ, true)?;
        registry.set_name(h, name);
        registry.attach_notify_result_handler(h, on_notify_result);
        Ok::<_, RegistryError>(h)
    };
    let constant = |registry: &mut ResourceRegistry, path, name, value| {
        let h = registry.create(path, value, Methods::READ, false)?;
        registry.set_name(h, name);
        Ok::<_, RegistryError>(h)
    };

    let button = observed(registry, BUTTON_PATH, "button")?;

    let pattern = registry.create(
        PATTERN_PATH,
        &config.default_pattern,
        Methods::READ | Methods::WRITE,
        false,
    )?;
    registry.set_name(pattern, "blink_pattern");
    registry.attach_write_handler(pattern, on_pattern_write);

    let blink = registry.create(BLINK_PATH, "", Methods::EXECUTE, false)?;
    registry.set_name(blink, "blink");
    registry.attach_execute_handler(blink, on_blink_execute);

    let accel = [
        observed(registry, ACCEL_X_PATH, "accel_x")?,
        observed(registry, ACCEL_Y_PATH, "accel_y")?,
        observed(registry, ACCEL_Z_PATH, "accel_z")?,
    ];
    let accel_unit = constant(registry, ACCEL_UNIT_PATH, "accel_unit", "G")?;

    let temperature = observed(registry, TEMPERATURE_PATH, "temperature")?;
    let temperature_unit = constant(registry, TEMPERATURE_UNIT_PATH, "temperature_unit", "Cel")?;

    info!("resources: {} installed", registry.len());

    Ok(ResourceTable {
        button,
        pattern,
        blink,
        accel,
        accel_unit,
        temperature,
        temperature_unit,
    })
}

// ── Handlers ──────────────────────────────────────────────────

fn on_pattern_write(path: &ResourcePath, value: &str) -> Option<AppCommand> {
    info!("resources: {} updated to '{}'", path, value);
    None
}

/// A non-empty argument overrides the stored pattern.
fn on_blink_execute(_path: &ResourcePath, arg: &str) -> Option<AppCommand> {
    let arg = arg.trim();
    Some(AppCommand::StartBlink {
        pattern: (!arg.is_empty()).then(|| arg.to_owned()),
    })
}

fn on_notify_result(path: &ResourcePath, status: DeliveryStatus) {
    debug!("resources: notification for {} -> {:?}", path, status);
}
