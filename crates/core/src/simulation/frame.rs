//! Published surface frames
//!
//! A frame is written completely in a back buffer and then swapped in under a
//! lock, so a reader either sees the previous frame or the new one, never a
//! mix of both. Readers hold an `Arc` to the frame they got; the simulator
//! only reuses a frame's allocation once no reader still holds it.

use crate::core_types::{DisplacementField, GradientField, GradientSample, Vec3};
use crate::error::OceanSimError;
use std::sync::{Arc, PoisonError, RwLock};

/// One complete simulated surface
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFrame {
    /// Per-cell `(horizontal x, horizontal y, vertical)` displacement
    pub displacement: DisplacementField,
    /// Per-cell slope and foam
    pub gradient: GradientField,
    /// Caller time passed to `update()`
    pub time: f32,
    /// Time the spectrum was evolved to (scaled, wrapped by the loop period)
    pub effective_time: f32,
    /// Number of successful updates since (re)initialization; 0 for the flat frame
    pub frame_index: u64,
}

/// Summary statistics of a frame, used for logging and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStatistics {
    /// Highest vertical displacement (meters)
    pub max_height: f32,
    /// Lowest vertical displacement (meters)
    pub min_height: f32,
    /// Root-mean-square vertical displacement (meters)
    pub rms_height: f32,
    /// Largest horizontal displacement magnitude (meters)
    pub max_horizontal: f32,
    /// Mean foam indicator in `[0, 1]`
    pub mean_foam: f32,
    /// Fraction of cells with any foam
    pub foam_coverage: f32,
}

impl SurfaceFrame {
    /// Flat sea: zero displacement, zero slope, no foam
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::ResourceAllocation` if the fields cannot be allocated.
    pub fn try_flat(dimension: usize) -> Result<Self, OceanSimError> {
        Ok(Self {
            displacement: DisplacementField::try_filled(dimension, Vec3::zeros())?,
            gradient: GradientField::try_filled(dimension, GradientSample::flat())?,
            time: 0.0,
            effective_time: 0.0,
            frame_index: 0,
        })
    }

    /// Grid cells per side
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.displacement.dimension
    }

    /// Compute height, displacement and foam statistics
    #[must_use]
    pub fn statistics(&self) -> SurfaceStatistics {
        let cells = self.displacement.cell_count().max(1) as f64;

        let mut max_height = f32::NEG_INFINITY;
        let mut min_height = f32::INFINITY;
        let mut sum_sq = 0.0_f64;
        let mut max_horizontal = 0.0_f32;
        for d in self.displacement.as_slice() {
            max_height = max_height.max(d.z);
            min_height = min_height.min(d.z);
            sum_sq += f64::from(d.z) * f64::from(d.z);
            max_horizontal = max_horizontal.max(d.xy().norm());
        }

        let mut foam_sum = 0.0_f64;
        let mut foamy = 0_usize;
        for g in self.gradient.as_slice() {
            foam_sum += f64::from(g.foam);
            if g.foam > 0.0 {
                foamy += 1;
            }
        }

        SurfaceStatistics {
            max_height,
            min_height,
            rms_height: (sum_sq / cells).sqrt() as f32,
            max_horizontal,
            mean_foam: (foam_sum / cells) as f32,
            foam_coverage: (foamy as f64 / cells) as f32,
        }
    }
}

/// Cloneable handle for reading the latest frame from any thread
#[derive(Debug, Clone)]
pub struct SurfaceReader {
    shared: Arc<RwLock<Arc<SurfaceFrame>>>,
}

impl SurfaceReader {
    pub(crate) fn new(shared: Arc<RwLock<Arc<SurfaceFrame>>>) -> Self {
        Self { shared }
    }

    /// Latest published frame
    ///
    /// The returned frame never changes; call again to observe later updates.
    #[must_use]
    pub fn latest(&self) -> Arc<SurfaceFrame> {
        let guard = self.shared.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}

/// Double-buffered frame publication
///
/// `back` is written by the simulator; `publish` swaps it with the front.
#[derive(Debug)]
pub(crate) struct FrameBuffers {
    shared: Arc<RwLock<Arc<SurfaceFrame>>>,
    current: Arc<SurfaceFrame>,
    back: Arc<SurfaceFrame>,
}

impl FrameBuffers {
    pub(crate) fn try_new(dimension: usize) -> Result<Self, OceanSimError> {
        let current = Arc::new(SurfaceFrame::try_flat(dimension)?);
        let back = Arc::new(SurfaceFrame::try_flat(dimension)?);
        Ok(Self {
            shared: Arc::new(RwLock::new(Arc::clone(&current))),
            current,
            back,
        })
    }

    /// Last published frame
    pub(crate) fn current(&self) -> &Arc<SurfaceFrame> {
        &self.current
    }

    pub(crate) fn reader(&self) -> SurfaceReader {
        SurfaceReader::new(Arc::clone(&self.shared))
    }

    /// Exclusive access to the back frame, reallocating it if a reader still
    /// holds the previous contents
    pub(crate) fn back_mut(&mut self) -> Result<&mut SurfaceFrame, OceanSimError> {
        let dimension = self.current.dimension();
        if Arc::get_mut(&mut self.back).is_none() || self.back.dimension() != dimension {
            self.back = Arc::new(SurfaceFrame::try_flat(dimension)?);
        }
        Arc::get_mut(&mut self.back)
            .ok_or_else(|| OceanSimError::Backend("back frame is still shared".to_string()))
    }

    /// Swap the back frame in as the new front
    pub(crate) fn publish(&mut self) {
        {
            let mut front = self.shared.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::swap(&mut *front, &mut self.back);
            self.current = Arc::clone(&front);
        }
    }

    /// Publish a flat frame of a (possibly new) dimension
    pub(crate) fn reset(&mut self, dimension: usize) -> Result<(), OceanSimError> {
        let flat = Arc::new(SurfaceFrame::try_flat(dimension)?);
        let back = Arc::new(SurfaceFrame::try_flat(dimension)?);

        let mut front = self.shared.write().unwrap_or_else(PoisonError::into_inner);
        *front = Arc::clone(&flat);
        self.current = flat;
        self.back = back;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_frame_statistics() {
        let stats = SurfaceFrame::try_flat(8).unwrap().statistics();
        assert_eq!(stats.max_height, 0.0);
        assert_eq!(stats.min_height, 0.0);
        assert_eq!(stats.rms_height, 0.0);
        assert_eq!(stats.max_horizontal, 0.0);
        assert_eq!(stats.mean_foam, 0.0);
        assert_eq!(stats.foam_coverage, 0.0);
    }

    #[test]
    fn test_statistics() {
        let mut frame = SurfaceFrame::try_flat(2).unwrap();
        frame.displacement.set(0, 0, Vec3::new(3.0, 4.0, 2.0));
        frame.displacement.set(1, 1, Vec3::new(0.0, 0.0, -2.0));
        frame.gradient.set(1, 0, GradientSample {
            slope: crate::core_types::Vec2::zeros(),
            foam: 0.8,
        });

        let stats = frame.statistics();
        assert_eq!(stats.max_height, 2.0);
        assert_eq!(stats.min_height, -2.0);
        assert!((stats.rms_height - 2.0_f32.sqrt()).abs() < 1e-6);
        assert_eq!(stats.max_horizontal, 5.0);
        assert!((stats.mean_foam - 0.2).abs() < 1e-6);
        assert_eq!(stats.foam_coverage, 0.25);
    }

    #[test]
    fn test_reader_snapshot_survives_publish() {
        let mut buffers = FrameBuffers::try_new(4).unwrap();
        let reader = buffers.reader();
        let before = reader.latest();

        buffers.back_mut().unwrap().frame_index = 1;
        buffers.publish();

        assert_eq!(before.frame_index, 0);
        assert_eq!(reader.latest().frame_index, 1);
        assert_eq!(buffers.current().frame_index, 1);

        // `before` still pins the old front, so the next back frame is fresh
        let back = buffers.back_mut().unwrap();
        assert_eq!(back.frame_index, 0);
        back.frame_index = 2;
        buffers.publish();
        assert_eq!(before.frame_index, 0);
        assert_eq!(reader.latest().frame_index, 2);
    }

    #[test]
    fn test_back_frame_is_reused_when_unshared() {
        let mut buffers = FrameBuffers::try_new(4).unwrap();
        buffers.back_mut().unwrap().frame_index = 1;
        buffers.publish();
        buffers.back_mut().unwrap().frame_index = 2;
        buffers.publish();

        // The frame published first came back as the back buffer
        assert_eq!(buffers.back_mut().unwrap().frame_index, 1);
    }

    #[test]
    fn test_reset_changes_dimension() {
        let mut buffers = FrameBuffers::try_new(4).unwrap();
        let reader = buffers.reader();
        buffers.reset(8).unwrap();
        assert_eq!(reader.latest().dimension(), 8);
        assert_eq!(buffers.back_mut().unwrap().dimension(), 8);
    }
}
