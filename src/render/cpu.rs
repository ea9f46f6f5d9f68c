//! CPU evaluation of the warp kernel, row-parallel with rayon.

use rayon::prelude::*;

use crate::{
    foundation::core::{FrameRgba, SurfaceSize},
    foundation::error::{DockwarpError, DockwarpResult},
    warp::kernel::warp_uv,
    warp::params::{TargetRect, WarpParams},
};

pub struct CpuWarpRenderer {
    viewport: SurfaceSize,
    target: TargetRect,
    params: WarpParams,
}

impl CpuWarpRenderer {
    pub fn new(
        viewport: SurfaceSize,
        target: TargetRect,
        params: WarpParams,
    ) -> DockwarpResult<Self> {
        target.validate()?;
        params.validate()?;
        Ok(Self {
            viewport,
            target,
            params,
        })
    }

    pub fn viewport(&self) -> SurfaceSize {
        self.viewport
    }
}

impl crate::render::backend::WarpBackend for CpuWarpRenderer {
    fn resize(&mut self, viewport: SurfaceSize) -> DockwarpResult<()> {
        self.viewport = viewport;
        Ok(())
    }

    fn render(&mut self, source: &FrameRgba, progress: f32) -> DockwarpResult<FrameRgba> {
        if !progress.is_finite() {
            return Err(DockwarpError::render("progress must be finite"));
        }

        let viewport = self.viewport;
        let target = self.target;
        let params = self.params;
        let width = viewport.width;
        let height = viewport.height;
        let source_size = source.size();
        let row_bytes = width as usize * 4;

        let mut data = vec![0u8; row_bytes * height as usize];
        data.par_chunks_exact_mut(row_bytes)
            .enumerate()
            .for_each(|(y, row)| {
                let v = (y as f32 + 0.5) / height as f32;
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let u = (x as f32 + 0.5) / width as f32;
                    let Some(sample) =
                        warp_uv([u, v], progress, &target, &params, viewport, source_size)
                    else {
                        continue;
                    };

                    let [r, g, b, a] = sample_bilinear(source, sample.source_uv);
                    px[0] = r;
                    px[1] = g;
                    px[2] = b;
                    px[3] = ((f32::from(a) * sample.mask).round()).clamp(0.0, 255.0) as u8;
                }
            });

        FrameRgba::new(width, height, data)
    }
}

/// Bilinear clamp-to-edge sample of a straight-alpha RGBA8 frame at a
/// normalized coordinate (top-left origin).
fn sample_bilinear(frame: &FrameRgba, uv: [f32; 2]) -> [u8; 4] {
    let w = frame.width as usize;
    let h = frame.height as usize;

    // Texel-center convention: uv 0.5/w lands exactly on texel 0's center.
    let x = uv[0] * frame.width as f32 - 0.5;
    let y = uv[1] * frame.height as f32 - 0.5;

    let x0 = x.floor();
    let y0 = y.floor();
    let tx = x - x0;
    let ty = y - y0;

    let xi0 = (x0 as i64).clamp(0, w as i64 - 1) as usize;
    let yi0 = (y0 as i64).clamp(0, h as i64 - 1) as usize;
    let xi1 = (x0 as i64 + 1).clamp(0, w as i64 - 1) as usize;
    let yi1 = (y0 as i64 + 1).clamp(0, h as i64 - 1) as usize;

    let texel = |xi: usize, yi: usize| -> [f32; 4] {
        let off = (yi * w + xi) * 4;
        [
            f32::from(frame.data[off]),
            f32::from(frame.data[off + 1]),
            f32::from(frame.data[off + 2]),
            f32::from(frame.data[off + 3]),
        ]
    };

    let t00 = texel(xi0, yi0);
    let t10 = texel(xi1, yi0);
    let t01 = texel(xi0, yi1);
    let t11 = texel(xi1, yi1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = t00[c] + (t10[c] - t00[c]) * tx;
        let bottom = t01[c] + (t11[c] - t01[c]) * tx;
        out[c] = (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
