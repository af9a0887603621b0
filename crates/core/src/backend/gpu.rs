//! GPU compute backend
//!
//! This module implements the `ComputeBackend` trait with wgpu compute shaders
//! and storage buffers. It is only available when the `gpu` feature is enabled.
//!
//! # Shader Files
//!
//! GPU compute shaders are located in `shaders/`:
//! - `update_spectrum.wgsl` - Evolves `H0` into height and choppy spectra
//! - `fft.wgsl` - One radix-2 Stockham stage of the inverse FFT
//! - `displacement.wgsl` - Recentering sign, choppy and amplitude scaling
//! - `gradient.wgsl` - Wrapped central differences and Jacobian foam
//!
//! # Implementation
//!
//! The three spectra live back to back in one storage buffer. The 2D inverse
//! FFT runs `2·log2(N)` Stockham stages that ping-pong between that buffer and
//! a scratch buffer of the same size; the stage count is even so the result
//! lands back in the spectra buffer. Displacement and gradient are stored as
//! `vec4<f32>` texels and read back through one staging buffer.

use super::context::GpuContext;
use super::ComputeBackend;
use crate::compose::ComposeSettings;
use crate::core_types::{DisplacementField, GradientField, GradientSample, Vec2, Vec3};
use crate::error::OceanSimError;
use crate::spectrum::InitialSpectrum;
use crate::transform::validate_dimension;
use bytemuck::{Pod, Zeroable};
use tracing::debug;
use wgpu::util::DeviceExt;

/// 2D shaders run 16×16 workgroups
const WORKGROUP_2D: u32 = 16;

/// FFT shader runs 64 butterflies per workgroup
const WORKGROUP_FFT: u32 = 64;

/// Spectrum evolution parameters (must match WGSL struct layout)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct SpectrumParams {
    n: u32,
    patch_length: f32,
    time: f32,
    _pad: u32,
}

/// FFT stage parameters (must match WGSL struct layout)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FftParams {
    n: u32,
    p: u32,
    axis: u32,
    _pad: u32,
}

/// Displacement composition parameters (must match WGSL struct layout)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct DisplacementParams {
    n: u32,
    choppy_scale: f32,
    wave_amplitude: f32,
    _pad: u32,
}

/// Gradient parameters (must match WGSL struct layout)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct GradientParams {
    n: u32,
    inv_two_cells: f32,
    _pad0: u32,
    _pad1: u32,
}

/// GPU backend running the ocean pipeline in wgpu compute shaders
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    name: String,

    dimension: usize,
    n: u32,
    patch_length: f32,

    // Inputs written on upload
    h0_buffer: wgpu::Buffer,
    omega_buffer: wgpu::Buffer,

    // Outputs (vec4 texels) and their shared readback buffer
    displacement_buffer: wgpu::Buffer,
    gradient_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    texel_bytes: u64,

    // Uniforms rewritten per frame
    spectrum_params_buffer: wgpu::Buffer,
    displacement_params_buffer: wgpu::Buffer,
    gradient_params_buffer: wgpu::Buffer,

    spectrum_pipeline: wgpu::ComputePipeline,
    fft_pipeline: wgpu::ComputePipeline,
    displacement_pipeline: wgpu::ComputePipeline,
    gradient_pipeline: wgpu::ComputePipeline,

    spectrum_bind_group: wgpu::BindGroup,
    // One per Stockham stage: rows first, then columns
    fft_bind_groups: Vec<wgpu::BindGroup>,
    displacement_bind_group: wgpu::BindGroup,
    gradient_bind_group: wgpu::BindGroup,
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

fn bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffers: &[&wgpu::Buffer],
) -> wgpu::BindGroup {
    let entries: Vec<wgpu::BindGroupEntry<'_>> = buffers
        .iter()
        .zip(0_u32..)
        .map(|(buffer, binding)| wgpu::BindGroupEntry {
            binding,
            resource: buffer.as_entire_binding(),
        })
        .collect();

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &entries,
    })
}

fn compute_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    module: &wgpu::ShaderModule,
) -> wgpu::ComputePipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        module,
        entry_point: "main",
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    })
}

impl GpuBackend {
    /// Create a GPU backend for `dimension × dimension` grids
    ///
    /// # Arguments
    ///
    /// * `context` - Initialized GPU context (consumed)
    /// * `dimension` - Grid cells per side
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Configuration` for an unsupported dimension,
    /// `OceanSimError::ResourceAllocation` if the device runs out of memory and
    /// `OceanSimError::Backend` if pipeline creation fails validation.
    pub fn new(context: GpuContext, dimension: usize) -> Result<Self, OceanSimError> {
        validate_dimension(dimension)?;
        let n = u32::try_from(dimension).map_err(|_| {
            OceanSimError::configuration("grid_dimension", "does not fit the GPU index range")
        })?;

        let (device, queue, adapter_info) = context.into_parts();
        let cells = u64::from(n) * u64::from(n);
        let complex_bytes = cells * 8;
        let texel_bytes = cells * 16;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let h0_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("H0"),
            size: complex_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let omega_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Omega"),
            size: cells * 4,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let spectra_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Spectra"),
            size: 3 * complex_bytes,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });
        let scratch_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("FFT Scratch"),
            size: 3 * complex_bytes,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });
        let displacement_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Displacement"),
            size: texel_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let gradient_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Gradient"),
            size: texel_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Surface Staging"),
            size: 2 * texel_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(OceanSimError::ResourceAllocation(format!(
                "GPU buffers for {dimension}x{dimension} grid: {err}"
            )));
        }

        // Uniform buffers
        let spectrum_params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Spectrum Params"),
            contents: bytemuck::bytes_of(&SpectrumParams {
                n,
                patch_length: 1.0,
                time: 0.0,
                _pad: 0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let displacement_params_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Displacement Params"),
                contents: bytemuck::bytes_of(&DisplacementParams {
                    n,
                    choppy_scale: 0.0,
                    wave_amplitude: 0.0,
                    _pad: 0,
                }),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let gradient_params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Gradient Params"),
            contents: bytemuck::bytes_of(&GradientParams {
                n,
                inv_two_cells: 0.0,
                _pad0: 0,
                _pad1: 0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Load shaders using wgpu::include_wgsl! macro
        let spectrum_shader =
            device.create_shader_module(wgpu::include_wgsl!("shaders/update_spectrum.wgsl"));
        let fft_shader = device.create_shader_module(wgpu::include_wgsl!("shaders/fft.wgsl"));
        let displacement_shader =
            device.create_shader_module(wgpu::include_wgsl!("shaders/displacement.wgsl"));
        let gradient_shader =
            device.create_shader_module(wgpu::include_wgsl!("shaders/gradient.wgsl"));

        // Bind group layouts
        let spectrum_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Spectrum Bind Group Layout"),
            entries: &[
                uniform_entry(0),
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, false),
            ],
        });
        // FFT, displacement and gradient share the uniform / src / dst shape
        let pass_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pass Bind Group Layout"),
            entries: &[uniform_entry(0), storage_entry(1, true), storage_entry(2, false)],
        });

        let spectrum_pipeline =
            compute_pipeline(&device, "Spectrum Pipeline", &spectrum_layout, &spectrum_shader);
        let fft_pipeline = compute_pipeline(&device, "FFT Pipeline", &pass_layout, &fft_shader);
        let displacement_pipeline = compute_pipeline(
            &device,
            "Displacement Pipeline",
            &pass_layout,
            &displacement_shader,
        );
        let gradient_pipeline =
            compute_pipeline(&device, "Gradient Pipeline", &pass_layout, &gradient_shader);

        let spectrum_bind_group = bind_group(
            &device,
            "Spectrum Bind Group",
            &spectrum_layout,
            &[
                &spectrum_params_buffer,
                &h0_buffer,
                &omega_buffer,
                &spectra_buffer,
            ],
        );

        let log_n = n.trailing_zeros();
        let mut fft_bind_groups = Vec::with_capacity(2 * log_n as usize);
        for stage in 0..2 * log_n {
            let params = FftParams {
                n,
                p: 1 << (stage % log_n),
                axis: stage / log_n,
                _pad: 0,
            };
            let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("FFT Stage Params"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let (src, dst) = if stage % 2 == 0 {
                (&spectra_buffer, &scratch_buffer)
            } else {
                (&scratch_buffer, &spectra_buffer)
            };
            fft_bind_groups.push(bind_group(
                &device,
                "FFT Stage Bind Group",
                &pass_layout,
                &[&params_buffer, src, dst],
            ));
        }

        let displacement_bind_group = bind_group(
            &device,
            "Displacement Bind Group",
            &pass_layout,
            &[
                &displacement_params_buffer,
                &spectra_buffer,
                &displacement_buffer,
            ],
        );
        let gradient_bind_group = bind_group(
            &device,
            "Gradient Bind Group",
            &pass_layout,
            &[
                &gradient_params_buffer,
                &displacement_buffer,
                &gradient_buffer,
            ],
        );

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(OceanSimError::Backend(format!(
                "GPU pipeline setup failed: {err}"
            )));
        }

        debug!(
            "GPU backend ready: {}x{} grid, {} FFT stages",
            n,
            n,
            fft_bind_groups.len()
        );

        Ok(Self {
            device,
            queue,
            name: format!("GPU ({})", adapter_info.name),
            dimension,
            n,
            patch_length: 1.0,
            h0_buffer,
            omega_buffer,
            displacement_buffer,
            gradient_buffer,
            staging_buffer,
            texel_bytes,
            spectrum_params_buffer,
            displacement_params_buffer,
            gradient_params_buffer,
            spectrum_pipeline,
            fft_pipeline,
            displacement_pipeline,
            gradient_pipeline,
            spectrum_bind_group,
            fft_bind_groups,
            displacement_bind_group,
            gradient_bind_group,
        })
    }

    /// Workgroup counts for the 16×16 per-cell shaders
    fn workgroup_count(&self) -> u32 {
        self.n.div_ceil(WORKGROUP_2D)
    }
}

impl ComputeBackend for GpuBackend {
    fn upload_spectrum(&mut self, spectrum: &InitialSpectrum) -> Result<(), OceanSimError> {
        if spectrum.dimension() != self.dimension {
            return Err(OceanSimError::configuration(
                "grid_dimension",
                format!(
                    "spectrum is {0}x{0} but the backend was built for {1}x{1}",
                    spectrum.dimension(),
                    self.dimension
                ),
            ));
        }

        let h0: Vec<[f32; 2]> = spectrum
            .h0
            .as_slice()
            .iter()
            .map(|c| [c.re, c.im])
            .collect();
        self.queue
            .write_buffer(&self.h0_buffer, 0, bytemuck::cast_slice(&h0));
        self.queue.write_buffer(
            &self.omega_buffer,
            0,
            bytemuck::cast_slice(spectrum.omega.as_slice()),
        );
        self.patch_length = spectrum.patch_length;
        Ok(())
    }

    fn evolve(&mut self, time: f32) -> Result<(), OceanSimError> {
        let params = SpectrumParams {
            n: self.n,
            patch_length: self.patch_length,
            time,
            _pad: 0,
        };
        self.queue.write_buffer(
            &self.spectrum_params_buffer,
            0,
            bytemuck::bytes_of(&params),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Spectrum Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Spectrum Pass"),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.spectrum_pipeline);
            compute_pass.set_bind_group(0, &self.spectrum_bind_group, &[]);

            let groups = self.workgroup_count();
            compute_pass.dispatch_workgroups(groups, groups, 1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn transform(&mut self) -> Result<(), OceanSimError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("FFT Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("FFT Pass"),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.fft_pipeline);

            // One dispatch per stage: x = butterflies, y = grid line, z = spectrum
            let butterflies = (self.n / 2).div_ceil(WORKGROUP_FFT);
            for stage in &self.fft_bind_groups {
                compute_pass.set_bind_group(0, stage, &[]);
                compute_pass.dispatch_workgroups(butterflies, self.n, 3);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn compose(&mut self, settings: &ComposeSettings) -> Result<(), OceanSimError> {
        self.queue.write_buffer(
            &self.displacement_params_buffer,
            0,
            bytemuck::bytes_of(&DisplacementParams {
                n: self.n,
                choppy_scale: settings.choppy_scale,
                wave_amplitude: settings.wave_amplitude,
                _pad: 0,
            }),
        );
        self.queue.write_buffer(
            &self.gradient_params_buffer,
            0,
            bytemuck::bytes_of(&GradientParams {
                n: self.n,
                inv_two_cells: 0.5 / settings.cell_length,
                _pad0: 0,
                _pad1: 0,
            }),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Compose Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Compose Pass"),
                timestamp_writes: None,
            });

            let groups = self.workgroup_count();

            compute_pass.set_pipeline(&self.displacement_pipeline);
            compute_pass.set_bind_group(0, &self.displacement_bind_group, &[]);
            compute_pass.dispatch_workgroups(groups, groups, 1);

            // Gradient reads neighbouring displacement texels written above
            compute_pass.set_pipeline(&self.gradient_pipeline);
            compute_pass.set_bind_group(0, &self.gradient_bind_group, &[]);
            compute_pass.dispatch_workgroups(groups, groups, 1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn read_surface(
        &mut self,
        displacement: &mut DisplacementField,
        gradient: &mut GradientField,
    ) -> Result<(), OceanSimError> {
        if displacement.dimension != self.dimension || gradient.dimension != self.dimension {
            return Err(OceanSimError::Backend(format!(
                "readback target is not {0}x{0}",
                self.dimension
            )));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Surface Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(
            &self.displacement_buffer,
            0,
            &self.staging_buffer,
            0,
            self.texel_bytes,
        );
        encoder.copy_buffer_to_buffer(
            &self.gradient_buffer,
            0,
            &self.staging_buffer,
            self.texel_bytes,
            self.texel_bytes,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        // Map and read
        let buffer_slice = self.staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // Receiver outlives the poll below; a failed send only means it was dropped
            let _ = tx.send(result);
        });

        let _ = self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| OceanSimError::Backend(format!("readback never completed: {e}")))?
            .map_err(|e| OceanSimError::Backend(format!("failed to map surface buffer: {e}")))?;

        {
            let data = buffer_slice.get_mapped_range();
            let texels: &[f32] = bytemuck::cast_slice(&data);
            let (disp_texels, grad_texels) = texels.split_at(texels.len() / 2);

            for (out, t) in displacement
                .as_mut_slice()
                .iter_mut()
                .zip(disp_texels.chunks_exact(4))
            {
                *out = Vec3::new(t[0], t[1], t[2]);
            }
            for (out, t) in gradient
                .as_mut_slice()
                .iter_mut()
                .zip(grad_texels.chunks_exact(4))
            {
                *out = GradientSample {
                    slope: Vec2::new(t[0], t[1]),
                    foam: t[3],
                };
            }
        }
        self.staging_buffer.unmap();

        Ok(())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_gpu_accelerated(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}
