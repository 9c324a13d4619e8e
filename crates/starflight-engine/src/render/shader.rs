use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use naga::valid::{Capabilities, ValidationFlags, Validator};

/// WGSL prepended to every shader: fullscreen-rect vertex stage, `image0`
/// bindings and sampling helpers.
pub const PRELUDE: &str = include_str!("shaders/prelude.wgsl");

/// Bind group slot of the user uniform block.
pub const USER_UNIFORM_BINDING: u32 = 3;

/// Largest user uniform block, in bytes.
pub const MAX_UNIFORM_BYTES: u32 = 256;

const FRAGMENT_ENTRY: &str = "fs_main";

static NEXT_SHADER_ID: AtomicU64 = AtomicU64::new(1);

/// Errors produced while compiling a named shader program.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("shader `{name}` failed to parse:\n{message}")]
    Parse { name: String, message: String },

    #[error("shader `{name}` failed validation:\n{message}")]
    Validation { name: String, message: String },

    #[error("shader `{name}` has no `@fragment fn {FRAGMENT_ENTRY}`")]
    MissingEntryPoint { name: String },

    #[error("shader `{name}`: uniform member `{member}` is not an f32")]
    UnsupportedUniform { name: String, member: String },

    #[error("shader `{name}`: uniform block is {size} bytes (max {MAX_UNIFORM_BYTES})")]
    UniformBlockTooLarge { name: String, size: u32 },

    #[error("shader `{name}`: binding @group({group}) @binding({binding}) is not provided by the engine")]
    UnsupportedBinding { name: String, group: u32, binding: u32 },

    #[error("shader `{name}` is defined twice")]
    Duplicate { name: String },
}

/// Byte layout of a shader's user uniform block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLayout {
    fields: Vec<(String, u32)>,
    size: u32,
}

impl UniformLayout {
    /// Buffer size in bytes: the block span rounded up to 16, never below 16.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size.max(16)
    }

    /// Byte offset of the member called `name`.
    pub fn offset_of(&self, name: &str) -> Option<u32> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|&(_, offset)| offset)
    }

    /// Member names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Packs named values into a buffer image of the block.
    ///
    /// Members with no value stay zero. Names the block does not declare are
    /// skipped.
    pub fn pack(&self, values: &[(&str, f32)]) -> Vec<u8> {
        let mut bytes = vec![0u8; self.size() as usize];
        for &(name, value) in values {
            match self.offset_of(name) {
                Some(offset) => {
                    let at = offset as usize;
                    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
                }
                None => log::debug!("uniform `{name}` not declared by shader; ignored"),
            }
        }
        bytes
    }
}

#[derive(Debug)]
struct ShaderInner {
    id: u64,
    name: String,
    source: String,
    uniforms: UniformLayout,
}

/// A compiled (parsed and validated) fragment program.
///
/// Cheap to clone; draw commands hold one per shader invocation.
#[derive(Debug, Clone)]
pub struct Shader(Arc<ShaderInner>);

impl Shader {
    /// Parses and validates `source` (with the prelude prepended).
    pub fn compile(name: &str, source: &str) -> Result<Self, ShaderError> {
        let full = format!("{PRELUDE}\n{source}");

        let module = naga::front::wgsl::parse_str(&full).map_err(|e| ShaderError::Parse {
            name: name.to_string(),
            message: e.emit_to_string(&full),
        })?;

        Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .map_err(|e| ShaderError::Validation {
                name: name.to_string(),
                message: e.emit_to_string(&full),
            })?;

        let has_fragment = module
            .entry_points
            .iter()
            .any(|ep| ep.stage == naga::ShaderStage::Fragment && ep.name == FRAGMENT_ENTRY);
        if !has_fragment {
            return Err(ShaderError::MissingEntryPoint { name: name.to_string() });
        }

        let uniforms = reflect_uniforms(name, &module)?;

        Ok(Self(Arc::new(ShaderInner {
            id: NEXT_SHADER_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            source: full,
            uniforms,
        })))
    }

    /// Process-unique identity, used to key GPU pipelines.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Full WGSL source, prelude included.
    #[inline]
    pub fn source(&self) -> &str {
        &self.0.source
    }

    #[inline]
    pub fn uniforms(&self) -> &UniformLayout {
        &self.0.uniforms
    }
}

fn reflect_uniforms(name: &str, module: &naga::Module) -> Result<UniformLayout, ShaderError> {
    let mut layout = UniformLayout::default();

    for (_, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };

        if binding.group != 0 || binding.binding > USER_UNIFORM_BINDING {
            return Err(ShaderError::UnsupportedBinding {
                name: name.to_string(),
                group: binding.group,
                binding: binding.binding,
            });
        }
        if binding.binding != USER_UNIFORM_BINDING {
            continue;
        }

        let var_name = var.name.clone().unwrap_or_default();
        if var.space != naga::AddressSpace::Uniform {
            return Err(ShaderError::UnsupportedUniform { name: name.to_string(), member: var_name });
        }

        let naga::TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            return Err(ShaderError::UnsupportedUniform { name: name.to_string(), member: var_name });
        };

        for member in members {
            let member_name = member.name.clone().unwrap_or_default();
            let is_f32 = matches!(
                module.types[member.ty].inner,
                naga::TypeInner::Scalar(s) if s == naga::Scalar::F32
            );
            if !is_f32 {
                return Err(ShaderError::UnsupportedUniform {
                    name: name.to_string(),
                    member: member_name,
                });
            }
            layout.fields.push((member_name, member.offset));
        }

        let size = span.next_multiple_of(16);
        if size > MAX_UNIFORM_BYTES {
            return Err(ShaderError::UniformBlockTooLarge { name: name.to_string(), size });
        }
        layout.size = size;
    }

    Ok(layout)
}

/// Named shader programs, compiled once at startup.
#[derive(Debug, Clone, Default)]
pub struct ShaderSet {
    shaders: BTreeMap<String, Shader>,
}

impl ShaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles every `(name, wgsl)` pair. Stops at the first failure.
    pub fn compile<'a, I>(sources: I) -> Result<Self, ShaderError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut set = Self::new();
        for (name, source) in sources {
            if set.shaders.contains_key(name) {
                return Err(ShaderError::Duplicate { name: name.to_string() });
            }
            let shader = Shader::compile(name, source)?;
            log::debug!(
                "compiled shader `{name}` ({} uniform bytes)",
                shader.uniforms().size()
            );
            set.shaders.insert(name.to_string(), shader);
        }
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&Shader> {
        self.shaders.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shaders.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}
