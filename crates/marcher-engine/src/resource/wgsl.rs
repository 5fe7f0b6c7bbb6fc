//! WGSL front-end: compilation diagnostics, stage interface reflection and
//! program linking.
//!
//! Runs entirely on the CPU through `naga`, so shader errors are reported
//! with the compiler's own annotated output before anything reaches the GPU.

use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::types::ShaderStage;

/// Scalar kind, width and component count of an inter-stage value.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VaryingType {
    pub kind: naga::ScalarKind,
    pub width: u8,
    pub components: u32,
}

impl VaryingType {
    fn from_inner(inner: &naga::TypeInner) -> Option<Self> {
        match *inner {
            naga::TypeInner::Scalar(scalar) => Some(Self {
                kind: scalar.kind,
                width: scalar.width,
                components: 1,
            }),
            naga::TypeInner::Vector { size, scalar } => Some(Self {
                kind: scalar.kind,
                width: scalar.width,
                components: size as u32,
            }),
            _ => None,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        u64::from(self.width) * u64::from(self.components)
    }
}

impl fmt::Display for VaryingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            naga::ScalarKind::Float => "f",
            naga::ScalarKind::Sint => "i",
            naga::ScalarKind::Uint => "u",
            naga::ScalarKind::Bool => return f.write_str("bool"),
            _ => "?",
        };
        let bits = u32::from(self.width) * 8;

        if self.components == 1 {
            write!(f, "{prefix}{bits}")
        } else {
            write!(f, "vec{}<{prefix}{bits}>", self.components)
        }
    }
}

/// A location-bound input or output of an entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Varying {
    pub location: u32,
    pub name: Option<String>,
    pub ty: VaryingType,
}

/// Reflected interface of one compiled stage.
#[derive(Debug, Clone)]
pub struct StageInterface {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub inputs: Vec<Varying>,
    pub outputs: Vec<Varying>,
}

/// One captured varying inside the interleaved transform-feedback record.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedVarying {
    pub name: String,
    pub offset: u64,
    pub ty: VaryingType,
}

/// Interleaved transform-feedback record layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformLayout {
    pub varyings: Vec<CapturedVarying>,
    pub stride: u64,
}

/// Result of a successful link.
#[derive(Debug, Clone)]
pub struct LinkedInterface {
    pub vertex_entry: String,
    pub fragment_entry: Option<String>,
    pub transform: Option<TransformLayout>,
}

/// Shader capabilities a device with `features` can execute.
///
/// Starts from what every wgpu device supports and adds the optional
/// shader features.
pub fn capabilities_for(features: wgpu::Features) -> Capabilities {
    let mut caps = Capabilities::default();
    if features.contains(wgpu::Features::SHADER_F16) {
        caps |= Capabilities::SHADER_FLOAT16;
    }
    if features.contains(wgpu::Features::SHADER_F64) {
        caps |= Capabilities::FLOAT64;
    }
    if features.contains(wgpu::Features::SHADER_INT64) {
        caps |= Capabilities::SHADER_INT64;
    }
    caps
}

/// Parses and validates `source` with every capability enabled, then reflects
/// the entry point for `stage`.
///
/// On failure returns the compiler log, annotated with source spans.
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<StageInterface, String> {
    compile_stage_with(stage, source, Capabilities::all())
}

/// Like [`compile_stage`], rejecting anything outside `capabilities`.
pub fn compile_stage_with(
    stage: ShaderStage,
    source: &str,
    capabilities: Capabilities,
) -> Result<StageInterface, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), capabilities)
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.to_naga())
        .ok_or_else(|| format!("error: no {stage} entry point found in module"))?;

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_varyings(&module, arg.ty, arg.binding.as_ref(), arg.name.as_deref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_varyings(&module, result.ty, result.binding.as_ref(), None, &mut outputs);
    }

    Ok(StageInterface {
        stage,
        entry_point: entry.name.clone(),
        inputs,
        outputs,
    })
}

fn collect_varyings(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    name: Option<&str>,
    out: &mut Vec<Varying>,
) {
    let inner = &module.types[ty].inner;

    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            if let Some(ty) = VaryingType::from_inner(inner) {
                out.push(Varying {
                    location: *location,
                    name: name.map(str::to_owned),
                    ty,
                });
            }
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = inner {
                for member in members {
                    collect_varyings(
                        module,
                        member.ty,
                        member.binding.as_ref(),
                        member.name.as_deref(),
                        out,
                    );
                }
            }
        }
    }
}

/// Matches stage interfaces and lays out transform-feedback outputs.
///
/// Every problem found is reported, one per line, like a linker log.
pub fn link(
    stages: &[&StageInterface],
    transform_outputs: Option<&[&str]>,
) -> Result<LinkedInterface, String> {
    let mut errors = Vec::new();

    let vertex: Vec<_> = stages.iter().filter(|s| s.stage == ShaderStage::Vertex).collect();
    let fragment: Vec<_> = stages.iter().filter(|s| s.stage == ShaderStage::Fragment).collect();

    if vertex.len() != 1 {
        errors.push(format!(
            "error: program requires exactly one vertex stage, found {}",
            vertex.len()
        ));
    }
    if fragment.len() > 1 {
        errors.push(format!(
            "error: program accepts at most one fragment stage, found {}",
            fragment.len()
        ));
    }
    if !errors.is_empty() {
        return Err(errors.join("\n"));
    }

    let vertex = vertex[0];
    let fragment = fragment.first().copied();

    if let Some(fragment) = fragment {
        for input in &fragment.inputs {
            let label = input.name.as_deref().unwrap_or("<unnamed>");
            match vertex.outputs.iter().find(|o| o.location == input.location) {
                None => errors.push(format!(
                    "error: fragment input `{label}` at location {} is not written by the vertex stage",
                    input.location
                )),
                Some(output) if output.ty != input.ty => errors.push(format!(
                    "error: type mismatch at location {}: vertex writes {}, fragment reads {}",
                    input.location, output.ty, input.ty
                )),
                Some(_) => {}
            }
        }
    }

    let transform = transform_outputs.map(|names| {
        let mut varyings: Vec<CapturedVarying> = Vec::with_capacity(names.len());
        let mut offset = 0;

        for &name in names {
            if varyings.iter().any(|v| v.name == name) {
                errors.push(format!("error: transform feedback varying `{name}` declared twice"));
                continue;
            }
            match vertex.outputs.iter().find(|o| o.name.as_deref() == Some(name)) {
                Some(output) => {
                    varyings.push(CapturedVarying {
                        name: name.to_owned(),
                        offset,
                        ty: output.ty,
                    });
                    offset += output.ty.size_bytes();
                }
                None => errors.push(format!(
                    "error: transform feedback varying `{name}` is not written by the vertex stage"
                )),
            }
        }

        TransformLayout {
            varyings,
            stride: offset,
        }
    });

    if !errors.is_empty() {
        return Err(errors.join("\n"));
    }

    Ok(LinkedInterface {
        vertex_entry: vertex.entry_point.clone(),
        fragment_entry: fragment.map(|f| f.entry_point.clone()),
        transform,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn vec(kind: naga::ScalarKind, components: u32) -> VaryingType {
        VaryingType {
            kind,
            width: 4,
            components,
        }
    }

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn reflects_vertex_interface() {
        let vs = compile_stage(ShaderStage::Vertex, VERTEX).unwrap();
        assert_eq!(vs.entry_point, "vs_main");
        assert_eq!(vs.inputs.len(), 1);
        assert_eq!(vs.inputs[0].location, 0);
        assert_eq!(vs.inputs[0].ty, vec(naga::ScalarKind::Float, 3));

        let names: Vec<_> = vs.outputs.iter().map(|o| o.name.as_deref()).collect();
        assert_eq!(names, [Some("uv"), Some("shade")]);
    }

    #[test]
    fn syntax_error_yields_annotated_log() {
        let log = compile_stage(ShaderStage::Fragment, FRAGMENT_SYNTAX_ERROR).unwrap_err();
        assert!(!log.trim().is_empty());
        assert!(log.contains("error"));
    }

    #[test]
    fn missing_entry_point_is_a_compile_error() {
        let log = compile_stage(ShaderStage::Fragment, VERTEX).unwrap_err();
        assert!(log.contains("no fragment entry point"));
    }

    #[test]
    fn empty_source_is_a_compile_error() {
        assert!(compile_stage(ShaderStage::Vertex, "").is_err());
    }

    #[test]
    fn validation_error_is_reported() {
        let src = "@fragment fn fs_main() -> @location(0) vec4<f32> { return 1.0; }";
        assert!(compile_stage(ShaderStage::Fragment, src).is_err());
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn links_matching_stages() {
        let vs = compile_stage(ShaderStage::Vertex, VERTEX).unwrap();
        let fs = compile_stage(ShaderStage::Fragment, FRAGMENT).unwrap();
        let linked = link(&[&vs, &fs], None).unwrap();
        assert_eq!(linked.vertex_entry, "vs_main");
        assert_eq!(linked.fragment_entry.as_deref(), Some("fs_main"));
        assert!(linked.transform.is_none());
    }

    #[test]
    fn vertex_only_program_links() {
        let vs = compile_stage(ShaderStage::Vertex, VERTEX).unwrap();
        let linked = link(&[&vs], None).unwrap();
        assert!(linked.fragment_entry.is_none());
    }

    #[test]
    fn missing_vertex_stage_fails() {
        let fs = compile_stage(ShaderStage::Fragment, FRAGMENT).unwrap();
        let log = link(&[&fs], None).unwrap_err();
        assert!(log.contains("exactly one vertex stage"));
    }

    #[test]
    fn mismatched_interface_types_fail() {
        let vs = compile_stage(ShaderStage::Vertex, VERTEX).unwrap();
        let fs = compile_stage(ShaderStage::Fragment, FRAGMENT_WRONG_TYPE).unwrap();
        let log = link(&[&vs, &fs], None).unwrap_err();
        assert!(log.contains("location 0"), "{log}");
        assert!(log.contains("vec2<f32>"), "{log}");
        assert!(log.contains("vec3<f32>"), "{log}");
    }

    #[test]
    fn unwritten_fragment_input_fails() {
        let vs = compile_stage(ShaderStage::Vertex, VERTEX).unwrap();
        let fs = compile_stage(ShaderStage::Fragment, FRAGMENT_UNWRITTEN_INPUT).unwrap();
        let log = link(&[&vs, &fs], None).unwrap_err();
        assert!(log.contains("`tint` at location 4"), "{log}");
    }

    #[test]
    fn transform_outputs_are_interleaved_in_declaration_order() {
        let vs = compile_stage(ShaderStage::Vertex, VERTEX).unwrap();
        let linked = link(&[&vs], Some(&["shade", "uv"])).unwrap();
        let layout = linked.transform.unwrap();

        assert_eq!(layout.varyings[0].name, "shade");
        assert_eq!(layout.varyings[0].offset, 0);
        assert_eq!(layout.varyings[1].name, "uv");
        assert_eq!(layout.varyings[1].offset, 4);
        assert_eq!(layout.stride, 12);
    }

    #[test]
    fn unknown_transform_output_fails() {
        let vs = compile_stage(ShaderStage::Vertex, VERTEX).unwrap();
        let log = link(&[&vs], Some(&["velocity"])).unwrap_err();
        assert!(log.contains("`velocity`"));
    }

    #[test]
    fn duplicate_transform_output_fails() {
        let vs = compile_stage(ShaderStage::Vertex, VERTEX).unwrap();
        let log = link(&[&vs], Some(&["uv", "uv"])).unwrap_err();
        assert!(log.contains("declared twice"));
    }

    #[test]
    fn varying_type_display() {
        assert_eq!(vec(naga::ScalarKind::Float, 3).to_string(), "vec3<f32>");
        assert_eq!(vec(naga::ScalarKind::Sint, 1).to_string(), "i32");
    }

    const FRAGMENT_F16: &str = r#"
enable f16;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    let h: f16 = 0.5h;
    return vec4<f32>(f32(h));
}
"#;

    #[test]
    fn shader_needing_a_missing_capability_fails() {
        let caps = capabilities_for(wgpu::Features::empty());
        let log = compile_stage_with(ShaderStage::Fragment, FRAGMENT_F16, caps).unwrap_err();
        assert!(!log.trim().is_empty());
    }

    #[test]
    fn device_features_unlock_capabilities() {
        let caps = capabilities_for(wgpu::Features::SHADER_F16);
        assert!(caps.contains(Capabilities::SHADER_FLOAT16));
        assert!(!caps.contains(Capabilities::FLOAT64));
        assert!(compile_stage_with(ShaderStage::Fragment, FRAGMENT_F16, caps).is_ok());
    }
}
