use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::coords::Viewport;
use crate::paint::{Color, Image};
use crate::render::{RenderCtx, RenderTarget, Shader, MAX_UNIFORM_BYTES, PRELUDE};
use crate::scene::{DrawCmd, DrawList, ImageSnapshot};

const CANVAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GeometryUniform {
    dst_size: [f32; 2],
    src_size: [f32; 2],
    flags: [f32; 4],
}

struct GpuImage {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
    generation: Option<u64>,
    used: bool,
}

/// How a canvas pass starts.
#[derive(Debug, Copy, Clone, PartialEq)]
enum CanvasLoad {
    Clear(Color),
    Keep,
}

/// Executes a frame's draw list on the GPU and presents the result.
///
/// Commands render into an offscreen canvas at the game's layout resolution.
/// The canvas is then scaled onto the window surface, aspect preserved, with
/// black bars filling the rest.
///
/// Images are cached as textures keyed by image id and re-uploaded when their
/// generation moves. An image drawn twice in one frame with different contents
/// shows its last contents both times.
#[derive(Default)]
pub struct Compositor {
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,
    sampler: Option<wgpu::Sampler>,
    fallback: Option<GpuImage>,

    blit_pipeline: Option<wgpu::RenderPipeline>,
    present_format: Option<wgpu::TextureFormat>,
    present_pipeline: Option<wgpu::RenderPipeline>,
    shader_pipelines: HashMap<u64, wgpu::RenderPipeline>,

    canvas: Option<GpuImage>,
    images: HashMap<u64, GpuImage>,
    uniform_pool: Vec<wgpu::Buffer>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `list` at `canvas_size` and presents it into `target`.
    ///
    /// `screen_pixels` backs `DrawCmd::ScreenPixels`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        list: &DrawList,
        screen_pixels: &Image,
        canvas_size: (u32, u32),
    ) {
        let canvas_size = (canvas_size.0.max(1), canvas_size.1.max(1));

        self.ensure_shared(ctx);
        self.ensure_present_pipeline(ctx);
        self.ensure_canvas(ctx, canvas_size);

        let pixels = ImageSnapshot::of(screen_pixels);
        let draws = self.prepare(ctx, list.items(), &pixels);
        // Two slots per draw (geometry + user block), two for the present pass.
        self.ensure_uniform_pool(ctx, draws * 2 + 2);

        let (Some(canvas), Some(blit), Some(present)) = (
            self.canvas.as_ref(),
            self.blit_pipeline.as_ref(),
            self.present_pipeline.as_ref(),
        ) else {
            return;
        };

        let dst = [canvas_size.0 as f32, canvas_size.1 as f32];
        let loads = canvas_loads(list.items());
        let mut slot = 0;

        for (cmd, load) in list.items().iter().zip(loads) {
            let (pipeline, view, src, user): (_, _, (u32, u32), &[u8]) = match cmd {
                DrawCmd::Fill(_) => {
                    canvas_pass(target.encoder, &canvas.view, load, None);
                    continue;
                }
                DrawCmd::Image(snap) => (blit, self.view_for(Some(snap)), (snap.width, snap.height), &[]),
                DrawCmd::ScreenPixels => (blit, self.view_for(Some(&pixels)), (pixels.width, pixels.height), &[]),
                DrawCmd::Shader(sc) => {
                    let Some(pipeline) = self.shader_pipelines.get(&sc.shader.id()) else {
                        continue;
                    };
                    (pipeline, self.view_for(sc.image.as_ref()), (sc.width, sc.height), sc.uniforms.as_slice())
                }
            };
            let Some(view) = view else { continue };

            let geometry = GeometryUniform {
                dst_size: dst,
                src_size: [src.0 as f32, src.1 as f32],
                flags: [0.0; 4],
            };
            let Some(bind_group) = self.bind_group(ctx, view, slot, &geometry, user) else {
                continue;
            };
            slot += 2;

            canvas_pass(target.encoder, &canvas.view, load, Some((pipeline, &bind_group)));
        }

        if list.is_empty() {
            canvas_pass(target.encoder, &canvas.view, CanvasLoad::Clear(Color::TRANSPARENT), None);
        }

        let geometry = GeometryUniform {
            dst_size: dst,
            src_size: dst,
            flags: [if ctx.surface_is_srgb() { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        };
        let Some(bind_group) = self.bind_group(ctx, &canvas.view, slot, &geometry, &[]) else {
            return;
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("starflight present pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if let Some((x, y, w, h)) = present_rect(ctx.surface, canvas_size) {
            rpass.set_viewport(x, y, w, h, 0.0, 1.0);
            rpass.set_pipeline(present);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.draw(0..6, 0..1);
        }
    }

    /// Uploads every image the list references and builds missing shader
    /// pipelines. Returns the number of draw passes the list needs.
    fn prepare(&mut self, ctx: &RenderCtx<'_>, items: &[DrawCmd], pixels: &ImageSnapshot) -> usize {
        for img in self.images.values_mut() {
            img.used = false;
        }

        let mut draws = 0;
        for cmd in items {
            match cmd {
                DrawCmd::Fill(_) => continue,
                DrawCmd::Image(snap) => self.upload(ctx, snap),
                DrawCmd::ScreenPixels => self.upload(ctx, pixels),
                DrawCmd::Shader(sc) => {
                    self.ensure_shader_pipeline(ctx, &sc.shader);
                    if let Some(img) = &sc.image {
                        self.upload(ctx, img);
                    }
                }
            }
            draws += 1;
        }

        let before = self.images.len();
        self.images.retain(|_, img| img.used);
        if self.images.len() != before {
            log::debug!("evicted {} image texture(s)", before - self.images.len());
        }

        draws
    }

    fn view_for(&self, snap: Option<&ImageSnapshot>) -> Option<&wgpu::TextureView> {
        snap.and_then(|s| self.images.get(&s.id))
            .or(self.fallback.as_ref())
            .map(|img| &img.view)
    }

    fn upload(&mut self, ctx: &RenderCtx<'_>, snap: &ImageSnapshot) {
        if snap.width == 0 || snap.height == 0 {
            return;
        }
        let size = (snap.width, snap.height);

        if self.images.get(&snap.id).is_none_or(|img| img.size != size) {
            log::debug!("creating texture for image {} ({}x{})", snap.id, size.0, size.1);
            let img = create_image(ctx.device, size, wgpu::TextureUsages::TEXTURE_BINDING, "starflight image");
            self.images.insert(snap.id, img);
        }
        let Some(img) = self.images.get_mut(&snap.id) else { return };
        img.used = true;

        if img.generation != Some(snap.generation) {
            write_pixels(ctx.queue, &img.texture, size, snap.pixels.as_slice());
            img.generation = Some(snap.generation);
        }
    }

    fn bind_group(
        &self,
        ctx: &RenderCtx<'_>,
        view: &wgpu::TextureView,
        slot: usize,
        geometry: &GeometryUniform,
        user: &[u8],
    ) -> Option<wgpu::BindGroup> {
        let bgl = self.bind_group_layout.as_ref()?;
        let sampler = self.sampler.as_ref()?;
        let geometry_ubo = self.uniform_pool.get(slot)?;
        let user_ubo = self.uniform_pool.get(slot + 1)?;

        ctx.queue.write_buffer(geometry_ubo, 0, bytemuck::bytes_of(geometry));
        if !user.is_empty() {
            let len = user.len().min(MAX_UNIFORM_BYTES as usize);
            ctx.queue.write_buffer(user_ubo, 0, &user[..len]);
        }

        Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("starflight draw bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: geometry_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: user_ubo.as_entire_binding(),
                },
            ],
        }))
    }

    fn ensure_shared(&mut self, ctx: &RenderCtx<'_>) {
        if self.blit_pipeline.is_some() {
            return;
        }

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("starflight draw bgl"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                        uniform_entry(2),
                        uniform_entry(3),
                    ],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("starflight pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        // Defaults are nearest filtering and clamp-to-edge: pixel art stays crisp.
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("starflight nearest sampler"),
            ..Default::default()
        });

        let fallback = create_image(ctx.device, (1, 1), wgpu::TextureUsages::TEXTURE_BINDING, "starflight fallback image");
        write_pixels(ctx.queue, &fallback.texture, (1, 1), &Color::TRANSPARENT.to_array());

        let blit_src = format!("{PRELUDE}\n{}", include_str!("shaders/blit.wgsl"));
        let blit_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("starflight blit shader"),
            source: wgpu::ShaderSource::Wgsl(blit_src.into()),
        });
        let blit = build_pipeline(
            ctx.device,
            &pipeline_layout,
            &blit_module,
            "fs_main",
            CANVAS_FORMAT,
            "starflight blit pipeline",
        );

        log::debug!("compositor pipelines created");

        self.bind_group_layout = Some(bind_group_layout);
        self.pipeline_layout = Some(pipeline_layout);
        self.sampler = Some(sampler);
        self.fallback = Some(fallback);
        self.blit_pipeline = Some(blit);
        self.present_pipeline = None;
        self.present_format = None;
    }

    fn ensure_present_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.present_format == Some(ctx.surface_format) && self.present_pipeline.is_some() {
            return;
        }
        let Some(layout) = self.pipeline_layout.as_ref() else { return };

        let src = format!("{PRELUDE}\n{}", include_str!("shaders/blit.wgsl"));
        let module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("starflight present shader"),
            source: wgpu::ShaderSource::Wgsl(src.into()),
        });

        self.present_pipeline = Some(build_pipeline(
            ctx.device,
            layout,
            &module,
            "fs_present",
            ctx.surface_format,
            "starflight present pipeline",
        ));
        self.present_format = Some(ctx.surface_format);
        log::debug!("present pipeline created for {:?}", ctx.surface_format);
    }

    fn ensure_shader_pipeline(&mut self, ctx: &RenderCtx<'_>, shader: &Shader) {
        if self.shader_pipelines.contains_key(&shader.id()) {
            return;
        }
        let Some(layout) = self.pipeline_layout.as_ref() else { return };

        let module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.name()),
            source: wgpu::ShaderSource::Wgsl(shader.source().into()),
        });
        let pipeline = build_pipeline(
            ctx.device,
            layout,
            &module,
            "fs_main",
            CANVAS_FORMAT,
            shader.name(),
        );

        log::debug!("pipeline created for shader `{}`", shader.name());
        self.shader_pipelines.insert(shader.id(), pipeline);
    }

    fn ensure_canvas(&mut self, ctx: &RenderCtx<'_>, size: (u32, u32)) {
        if self.canvas.as_ref().is_some_and(|c| c.size == size) {
            return;
        }

        log::debug!("creating canvas {}x{}", size.0, size.1);
        self.canvas = Some(create_image(
            ctx.device,
            size,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
            "starflight canvas",
        ));
    }

    fn ensure_uniform_pool(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        while self.uniform_pool.len() < required {
            self.uniform_pool.push(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("starflight uniform ubo"),
                size: MAX_UNIFORM_BYTES as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }
    }
}

/// Load op for each command's canvas pass.
///
/// `Fill` clears to its color. The first drawing pass of a frame clears to
/// transparent so nothing from the previous frame survives.
fn canvas_loads(items: &[DrawCmd]) -> Vec<CanvasLoad> {
    let mut cleared = false;
    items
        .iter()
        .map(|cmd| match cmd {
            DrawCmd::Fill(color) => {
                cleared = true;
                CanvasLoad::Clear(*color)
            }
            _ if !cleared => {
                cleared = true;
                CanvasLoad::Clear(Color::TRANSPARENT)
            }
            _ => CanvasLoad::Keep,
        })
        .collect()
}

/// Letterboxed present viewport as `(x, y, w, h)`, clamped to the surface.
fn present_rect(surface: Viewport, canvas: (u32, u32)) -> Option<(f32, f32, f32, f32)> {
    let rect = surface.letterbox(canvas);
    if rect.is_empty() {
        return None;
    }

    let x = rect.origin.x.max(0.0);
    let y = rect.origin.y.max(0.0);
    let max = rect.max();
    let w = max.x.min(surface.width) - x;
    let h = max.y.min(surface.height) - y;
    (w > 0.0 && h > 0.0).then_some((x, y, w, h))
}

fn canvas_pass(
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    load: CanvasLoad,
    draw: Option<(&wgpu::RenderPipeline, &wgpu::BindGroup)>,
) {
    let load = match load {
        CanvasLoad::Clear(c) => wgpu::LoadOp::Clear(c.to_wgpu()),
        CanvasLoad::Keep => wgpu::LoadOp::Load,
    };

    let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("starflight canvas pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    if let Some((pipeline, bind_group)) = draw {
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..6, 0..1);
    }
}

fn create_image(
    device: &wgpu::Device,
    size: (u32, u32),
    usage: wgpu::TextureUsages,
    label: &str,
) -> GpuImage {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: CANVAS_FORMAT,
        usage: usage | wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    GpuImage {
        texture,
        view,
        size,
        generation: None,
        used: true,
    }
}

fn write_pixels(queue: &wgpu::Queue, texture: &wgpu::Texture, size: (u32, u32), bytes: &[u8]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytes,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.0),
            rows_per_image: Some(size.1),
        },
        wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        },
    );
}

fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    fs_entry: &str,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[],
        },

        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(premul_alpha_blend()),
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
    })
}
