/// Fixed triangle shader: three hard-coded corners with red, green and blue.
pub const TRIANGLE_WGSL: &str = include_str!("shaders/triangle.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Shader source rejected while building the render pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("shader compilation failed:\n{0}")]
    Compile(String),

    #[error("pipeline validation failed: {0}")]
    Validation(String),
}

/// Compiles `source` and builds the one render pipeline used for every frame.
///
/// The pipeline has no vertex buffers (positions come from `vertex_index`), no
/// depth, and exactly one color target bound to `format`. Module and pipeline
/// creation run inside a validation error scope, so a missing entry point or
/// a stage interface mismatch is returned here instead of reaching the
/// uncaptured-error sink.
pub fn build_pipeline(
    device: &wgpu::Device,
    source: &str,
    format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, PipelineError> {
    let error_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("prism triangle shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let info = pollster::block_on(shader.get_compilation_info());
    let errors: Vec<String> = info
        .messages
        .iter()
        .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
        .map(|m| match &m.location {
            Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
            None => m.message.clone(),
        })
        .collect();

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("prism pipeline layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("prism triangle pipeline"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some(VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: &[],
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    // Popped before any early return so the scope stack stays balanced.
    let scoped = pollster::block_on(error_scope.pop());

    if !errors.is_empty() {
        return Err(PipelineError::Compile(errors.join("\n")));
    }
    if let Some(err) = scoped {
        log::error!("pipeline rejected: {err}");
        return Err(PipelineError::Validation(err.to_string()));
    }

    for m in &info.messages {
        log::warn!("shader: {}", m.message);
    }

    log::debug!("render pipeline built for {format:?}");
    Ok(pipeline)
}
