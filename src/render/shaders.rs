//! Built-in WGSL programs, each prefixed with the shared bindings.

macro_rules! program {
    ($file:literal) => {
        concat!(
            include_str!("../shaders/common.wgsl"),
            include_str!(concat!("../shaders/", $file))
        )
    };
}

const EMBEDDED: &[(&str, &str)] = &[
    ("default", program!("default.wgsl")),
    ("environment", program!("environment.wgsl")),
    ("parallax", program!("parallax.wgsl")),
    ("instanced_parallax", program!("instanced_parallax.wgsl")),
    ("chrome", program!("chrome.wgsl")),
    ("engine_particles", program!("engine_particles.wgsl")),
    ("explosion_particles", program!("explosion_particles.wgsl")),
];

/// WGSL source for a built-in shader key. Other keys are file paths.
pub fn embedded_shader(key: &str) -> Option<&'static str> {
    EMBEDDED
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, source)| *source)
}
