use crate::solver::gpu::context::GpuContext;
use crate::solver::grid::{BoundaryMask, ElementGrid, FacetGeometry, VectorField};
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use wgpu::util::DeviceExt;

const WORKGROUP_SIZE: u32 = 64;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Params {
    lx: u32,
    m: u32,
    padding: [u32; 2],
}

/// Device twin of `SymmetryBc`: the facet-normal projection as a compute
/// shader. Mask and geometry are uploaded once at construction; fields move
/// across the boundary per apply. Device arithmetic is f32, converted at the
/// upload/readback edges.
pub struct GpuSymmetryBc {
    context: GpuContext,

    // Field buffers
    b_x: wgpu::Buffer,
    b_y: wgpu::Buffer,
    b_z: wgpu::Buffer,
    b_u: wgpu::Buffer,
    b_v: wgpu::Buffer,
    b_w: wgpu::Buffer,

    b_staging_x: wgpu::Buffer,
    b_staging_y: wgpu::Buffer,
    b_staging_z: wgpu::Buffer,

    bg_mask: wgpu::BindGroup,
    bg_fields: wgpu::BindGroup,
    bg_geometry: wgpu::BindGroup,

    pipeline: wgpu::ComputePipeline,

    m: u32,
    num_points: u32,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn to_f32(src: &[f64]) -> Vec<f32> {
    src.iter().map(|&v| v as f32).collect()
}

impl GpuSymmetryBc {
    pub fn new(
        context: GpuContext,
        grid: &ElementGrid,
        mask: &BoundaryMask,
        geom: &FacetGeometry<f64>,
    ) -> Self {
        assert_eq!(geom.len(), grid.facet_storage_len());
        let device = &context.device;
        let m = mask.len() as u32;
        let num_points = grid.num_points() as u32;
        let field_size = (num_points as usize * std::mem::size_of::<f32>()) as u64;

        let b_msk = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Boundary Mask Buffer"),
            contents: bytemuck::cast_slice(&mask.msk),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let b_facet = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Facet Tag Buffer"),
            contents: bytemuck::cast_slice(&mask.facet),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let params = Params {
            lx: grid.lx as u32,
            m,
            padding: [0; 2],
        };
        let b_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Params Buffer"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let mut geometry_buffers = Vec::with_capacity(4);
        for (label, values) in [
            ("Normal X Buffer", &geom.nx),
            ("Normal Y Buffer", &geom.ny),
            ("Normal Z Buffer", &geom.nz),
            ("Facet Area Buffer", &geom.area),
        ] {
            geometry_buffers.push(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&to_f32(values)),
                usage: wgpu::BufferUsages::STORAGE,
            }));
        }

        let field_buffer = |label: &str, writable: bool| {
            let mut usage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST;
            if writable {
                usage |= wgpu::BufferUsages::COPY_SRC;
            }
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: field_size,
                usage,
                mapped_at_creation: false,
            })
        };
        let b_x = field_buffer("Field X Buffer", true);
        let b_y = field_buffer("Field Y Buffer", true);
        let b_z = field_buffer("Field Z Buffer", true);
        let b_u = field_buffer("Field U Buffer", false);
        let b_v = field_buffer("Field V Buffer", false);
        let b_w = field_buffer("Field W Buffer", false);

        let staging = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: field_size,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let b_staging_x = staging("Staging X Buffer");
        let b_staging_y = staging("Staging Y Buffer");
        let b_staging_z = staging("Staging Z Buffer");

        let bgl_mask = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mask Bind Group Layout"),
            entries: &[storage_entry(0, true), storage_entry(1, true), uniform_entry(2)],
        });
        let bgl_fields = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Fields Bind Group Layout"),
            entries: &[
                storage_entry(0, false),
                storage_entry(1, false),
                storage_entry(2, false),
                storage_entry(3, true),
                storage_entry(4, true),
                storage_entry(5, true),
            ],
        });
        let bgl_geometry = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Geometry Bind Group Layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, true),
            ],
        });

        let bg_mask = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mask Bind Group"),
            layout: &bgl_mask,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: b_msk.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: b_facet.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: b_params.as_entire_binding() },
            ],
        });
        let bg_fields = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Fields Bind Group"),
            layout: &bgl_fields,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: b_x.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: b_y.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: b_z.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: b_u.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 4, resource: b_v.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 5, resource: b_w.as_entire_binding() },
            ],
        });
        let bg_geometry = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Geometry Bind Group"),
            layout: &bgl_geometry,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: geometry_buffers[0].as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: geometry_buffers[1].as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: geometry_buffers[2].as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: geometry_buffers[3].as_entire_binding() },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Facet Normal Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "shaders/facet_normal.wgsl"
            ))),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Facet Normal Pipeline Layout"),
            bind_group_layouts: &[&bgl_mask, &bgl_fields, &bgl_geometry],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Facet Normal Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        Self {
            context,
            b_x,
            b_y,
            b_z,
            b_u,
            b_v,
            b_w,
            b_staging_x,
            b_staging_y,
            b_staging_z,
            bg_mask,
            bg_fields,
            bg_geometry,
            pipeline,
            m,
            num_points,
        }
    }

    /// Applies the projection on the device. `out` is uploaded first so that
    /// points outside the mask come back unchanged.
    pub fn apply_surfvec(&self, out: &mut VectorField<f64>, inp: &VectorField<f64>) {
        assert_eq!(out.len(), self.num_points as usize);
        assert_eq!(inp.len(), self.num_points as usize);
        let queue = &self.context.queue;

        queue.write_buffer(&self.b_x, 0, bytemuck::cast_slice(&to_f32(&out.x)));
        queue.write_buffer(&self.b_y, 0, bytemuck::cast_slice(&to_f32(&out.y)));
        queue.write_buffer(&self.b_z, 0, bytemuck::cast_slice(&to_f32(&out.z)));
        queue.write_buffer(&self.b_u, 0, bytemuck::cast_slice(&to_f32(&inp.x)));
        queue.write_buffer(&self.b_v, 0, bytemuck::cast_slice(&to_f32(&inp.y)));
        queue.write_buffer(&self.b_w, 0, bytemuck::cast_slice(&to_f32(&inp.z)));

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Facet Normal Encoder"),
            });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Facet Normal Pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline);
            cpass.set_bind_group(0, &self.bg_mask, &[]);
            cpass.set_bind_group(1, &self.bg_fields, &[]);
            cpass.set_bind_group(2, &self.bg_geometry, &[]);
            let num_groups = (self.m + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
            cpass.dispatch_workgroups(num_groups.max(1), 1, 1);
        }
        let field_size = (self.num_points as usize * std::mem::size_of::<f32>()) as u64;
        encoder.copy_buffer_to_buffer(&self.b_x, 0, &self.b_staging_x, 0, field_size);
        encoder.copy_buffer_to_buffer(&self.b_y, 0, &self.b_staging_y, 0, field_size);
        encoder.copy_buffer_to_buffer(&self.b_z, 0, &self.b_staging_z, 0, field_size);
        queue.submit(Some(encoder.finish()));

        for (staging, dst) in [
            (&self.b_staging_x, &mut out.x),
            (&self.b_staging_y, &mut out.y),
            (&self.b_staging_z, &mut out.z),
        ] {
            let values = self.read_staging(staging);
            for (d, v) in dst.iter_mut().zip(values) {
                *d = v as f64;
            }
        }
    }

    fn read_staging(&self, staging: &wgpu::Buffer) -> Vec<f32> {
        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| tx.send(result).unwrap());
        let _ = self.context.device.poll(wgpu::Maintain::Wait);
        rx.recv().unwrap().unwrap();
        let data = slice.get_mapped_range();
        let values = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();
        values
    }
}
