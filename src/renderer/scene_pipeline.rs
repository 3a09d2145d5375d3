//! Raymarched WebGPU scene pipeline
//!
//! Draws the whole scene in the fragment shader: vehicles and obstacles are
//! yawed boxes, the road and grass are an analytic ground plane.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::consts::ROAD_HALF_WIDTH;
use crate::sim::{AgentBehavior, RaceState};

/// Maximum boxes in the scene uniform (player car uses two)
pub const MAX_BOXES: usize = 32;

/// Vertical field of view (radians), matching a 75 degree perspective camera
const FOV_Y: f32 = 75.0 * std::f32::consts::PI / 180.0;

/// Box material ids (must match shader)
pub mod material {
    pub const PLAYER: u32 = 0;
    pub const OPPONENT: u32 = 1;
    pub const OBSTACLE: u32 = 2;
    pub const CABIN: u32 = 3;
}

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],     // offset 0
    time: f32,                // offset 8
    box_count: u32,           // offset 12
    eye: [f32; 3],            // offset 16 (vec3 aligned to 16)
    fov_y: f32,               // offset 28
    forward: [f32; 3],        // offset 32
    barrier_half_width: f32,  // offset 44 - 0 when the track has no barriers
    right: [f32; 3],          // offset 48
    road_half_width: f32,     // offset 60
    up: [f32; 3],             // offset 64
    _pad: f32,                // pad to 80 bytes
}

impl Globals {
    fn new(size: (u32, u32), time: f32, box_count: u32, eye: Vec3, target: Vec3, barrier: f32) -> Self {
        let basis = camera_basis(eye, target);
        Self {
            resolution: [size.0 as f32, size.1 as f32],
            time,
            box_count,
            eye: eye.to_array(),
            fov_y: FOV_Y,
            forward: basis.forward.to_array(),
            barrier_half_width: barrier,
            right: basis.right.to_array(),
            road_half_width: ROAD_HALF_WIDTH,
            up: basis.up.to_array(),
            _pad: 0.0,
        }
    }
}

/// Right-handed view basis: +Y up, screen-right is `forward x up`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

pub fn camera_basis(eye: Vec3, target: Vec3) -> CameraBasis {
    let forward = (target - eye).normalize_or(Vec3::Z);
    let right = forward.cross(Vec3::Y).normalize_or(Vec3::NEG_X);
    let up = right.cross(forward);
    CameraBasis { forward, right, up }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BoxData {
    pub center: [f32; 3],
    pub yaw: f32,
    pub half_extents: [f32; 3],
    pub material: u32,
}

impl BoxData {
    fn new(center: Vec3, half_extents: Vec3, yaw: f32, material: u32) -> Self {
        Self {
            center: center.to_array(),
            yaw,
            half_extents: half_extents.to_array(),
            material,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SceneUniform {
    boxes: [BoxData; MAX_BOXES],
}

/// Lay the vehicle and agents out as boxes. Returns at most `MAX_BOXES`.
pub fn scene_boxes(state: &RaceState) -> Vec<BoxData> {
    let mut boxes = Vec::with_capacity(MAX_BOXES);
    let car = &state.vehicle;

    boxes.push(BoxData::new(
        car.position + Vec3::new(0.0, 0.5, 0.0),
        Vec3::new(1.0, 0.4, 2.0),
        car.heading,
        material::PLAYER,
    ));
    boxes.push(BoxData::new(
        car.position + Vec3::new(0.0, 1.1, 0.0),
        Vec3::new(0.9, 0.3, 0.9),
        car.heading,
        material::CABIN,
    ));

    for agent in &state.agents {
        if boxes.len() >= MAX_BOXES {
            break;
        }
        let data = match state.behavior {
            AgentBehavior::LaneFollowing => BoxData::new(
                agent.position + Vec3::new(0.0, 0.5, 0.0),
                Vec3::new(1.0, 0.4, 2.0),
                0.0,
                material::OPPONENT,
            ),
            AgentBehavior::Recycled => {
                let half = 0.6 * agent.size;
                BoxData::new(
                    agent.position + Vec3::new(0.0, half, 0.0),
                    Vec3::splat(half),
                    0.0,
                    material::OBSTACLE,
                )
            }
        };
        boxes.push(data);
    }
    boxes
}

// ============================================================================
// SCENE RENDER STATE
// ============================================================================

pub struct SceneRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    scene_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    start_time: f64,
}

impl SceneRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("scene-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals::new(
                (width, height),
                0.0,
                0,
                Vec3::new(0.0, 2.0, -5.0),
                Vec3::ZERO,
                0.0,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: scene_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // Fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            scene_buffer,
            bind_group,
            size: (width, height),
            start_time: 0.0,
        })
    }

    /// Reconfigure the surface after a viewport resize
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn set_start_time(&mut self, time: f64) {
        self.start_time = time;
    }

    /// Upload the current frame's state and draw it
    pub fn render(&mut self, state: &RaceState, time: f64) -> Result<(), wgpu::SurfaceError> {
        let elapsed = ((time - self.start_time) / 1000.0) as f32;

        let boxes = scene_boxes(state);
        let mut scene = SceneUniform {
            boxes: [BoxData::zeroed(); MAX_BOXES],
        };
        scene.boxes[..boxes.len()].copy_from_slice(&boxes);

        let globals = Globals::new(
            self.size,
            elapsed,
            boxes.len() as u32,
            state.camera.eye,
            state.camera.target,
            state.barrier_half_width().unwrap_or(0.0),
        );
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&scene));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
