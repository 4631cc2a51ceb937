use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Rendering backend capabilities that change how parameter changes are
/// classified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Capabilities", inline)]
#[serde(default)]
pub struct CapabilityOptions {
    /// The backend can draw spheres and cylinders as volumetric impostors,
    /// so geometry detail and radius changes do not need new meshes.
    #[schemars(title = "Impostors")]
    pub impostor: bool,
}

impl Default for CapabilityOptions {
    fn default() -> Self {
        Self { impostor: true }
    }
}
