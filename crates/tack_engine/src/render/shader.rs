//! Shader program registry

use super::backend::RenderBackend;
use std::collections::HashMap;

/// Name of the default world shader
pub const OBJECT_SHADER: &str = "object";

/// Name of the GUI shader
pub const GUI_SHADER: &str = "gui";

const QUAD_VERTEX_SOURCE: &str = r"#version 330 core
layout (location = 0) in vec3 aPosition;
layout (location = 1) in vec3 aColour;
layout (location = 2) in vec2 aTexCoord;
out vec3 vColour;
out vec2 vTexCoord;
void main() {
    gl_Position = vec4(aPosition, 1.0);
    vColour = aColour;
    vTexCoord = aTexCoord;
}
";

const OBJECT_FRAGMENT_SOURCE: &str = r"#version 330 core
in vec3 vColour;
in vec2 vTexCoord;
out vec4 FragColour;
uniform sampler2D uTexture;
void main() {
    vec4 texel = texture(uTexture, vTexCoord);
    if (texel.a < 0.01) discard;
    FragColour = texel * vec4(vColour, 1.0);
}
";

const GUI_FRAGMENT_SOURCE: &str = r"#version 330 core
in vec3 vColour;
in vec2 vTexCoord;
out vec4 FragColour;
uniform sampler2D uTexture;
void main() {
    FragColour = texture(uTexture, vTexCoord) * vec4(vColour, 1.0);
}
";

/// A linked shader program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    name: String,
    handle: i32,
}

impl ShaderProgram {
    /// Name the program is registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend program handle
    pub fn handle(&self) -> i32 {
        self.handle
    }

    /// Whether the program compiled and linked
    pub fn is_valid(&self) -> bool {
        self.handle > 0
    }
}

/// Programs by name
#[derive(Debug, Default)]
pub struct ShaderRegistry {
    programs: HashMap<String, ShaderProgram>,
}

impl ShaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in object and GUI programs
    pub fn load_builtin(&mut self, backend: &mut dyn RenderBackend) {
        self.register(backend, OBJECT_SHADER, QUAD_VERTEX_SOURCE, OBJECT_FRAGMENT_SOURCE);
        self.register(backend, GUI_SHADER, QUAD_VERTEX_SOURCE, GUI_FRAGMENT_SOURCE);
    }

    /// Compile and register a program
    ///
    /// A compile or link failure is logged and yields an invalid program that
    /// is not registered. Registering a name twice keeps the first program.
    pub fn register(
        &mut self,
        backend: &mut dyn RenderBackend,
        name: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> ShaderProgram {
        if let Some(existing) = self.programs.get(name) {
            log::warn!("Shader '{}' is already registered", name);
            return existing.clone();
        }

        match backend.compile_program(vertex_source, fragment_source) {
            Ok(handle) if handle > 0 => {
                let program = ShaderProgram {
                    name: name.to_string(),
                    handle,
                };
                self.programs.insert(name.to_string(), program.clone());
                log::debug!("Registered shader '{}' ({})", name, handle);
                program
            }
            Ok(handle) => {
                log::error!("Shader '{}' returned invalid handle {}", name, handle);
                Self::invalid(name)
            }
            Err(err) => {
                log::error!("Shader '{}' failed: {}", name, err);
                Self::invalid(name)
            }
        }
    }

    /// Look up a program, falling back to the object shader
    ///
    /// Never fails: if neither exists the returned program is invalid.
    pub fn get_shader(&self, name: &str) -> ShaderProgram {
        self.programs
            .get(name)
            .or_else(|| {
                log::debug!("Shader '{}' not registered, using '{}'", name, OBJECT_SHADER);
                self.programs.get(OBJECT_SHADER)
            })
            .cloned()
            .unwrap_or_else(|| Self::invalid(name))
    }

    /// Whether a program is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.programs.contains_key(name)
    }

    /// Delete every program
    pub fn close(&mut self, backend: &mut dyn RenderBackend) {
        for (_, program) in self.programs.drain() {
            backend.delete_program(program.handle);
        }
    }

    fn invalid(name: &str) -> ShaderProgram {
        ShaderProgram {
            name: name.to_string(),
            handle: 0,
        }
    }
}
