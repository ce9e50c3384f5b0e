use tracing::{debug, trace};

use crate::core::Viewport;
use crate::error::ChartResult;
use crate::render::{ChartSurface, SurfaceFactory};

/// A live surface together with the series handles installed on it.
///
/// Dropping it releases the surface, so every path that discards a mounted
/// chart (unmount, remount, drop of the owner) releases exactly once.
#[derive(Debug)]
pub struct MountedSurface<S: ChartSurface, H> {
    surface: S,
    handles: H,
}

impl<S: ChartSurface, H> MountedSurface<S, H> {
    /// Creates a surface and runs `install` to add its series. A surface
    /// whose installation fails is released before the error is returned.
    pub fn mount<F>(
        factory: &mut F,
        viewport: Viewport,
        install: impl FnOnce(&mut S) -> ChartResult<H>,
    ) -> ChartResult<Self>
    where
        F: SurfaceFactory<Surface = S>,
    {
        let mut surface = factory.create(viewport)?;
        match install(&mut surface) {
            Ok(handles) => {
                debug!(
                    width = viewport.width,
                    height = viewport.height,
                    "mounted surface"
                );
                Ok(Self { surface, handles })
            }
            Err(err) => {
                surface.release();
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn handles(&self) -> &H {
        &self.handles
    }

    /// Surface and handles borrowed together for one update pass.
    pub fn parts_mut(&mut self) -> (&mut S, &H) {
        (&mut self.surface, &self.handles)
    }
}

impl<S: ChartSurface, H> Drop for MountedSurface<S, H> {
    fn drop(&mut self) {
        trace!("releasing surface");
        self.surface.release();
    }
}

/// Mount state of one chart.
#[derive(Debug)]
pub enum SurfaceState<S: ChartSurface, H> {
    Unmounted,
    Mounted(MountedSurface<S, H>),
}

impl<S: ChartSurface, H> Default for SurfaceState<S, H> {
    fn default() -> Self {
        Self::Unmounted
    }
}

impl<S: ChartSurface, H> SurfaceState<S, H> {
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        matches!(self, Self::Mounted(_))
    }

    #[must_use]
    pub fn mounted(&self) -> Option<&MountedSurface<S, H>> {
        match self {
            Self::Mounted(mounted) => Some(mounted),
            Self::Unmounted => None,
        }
    }

    pub fn mounted_mut(&mut self) -> Option<&mut MountedSurface<S, H>> {
        match self {
            Self::Mounted(mounted) => Some(mounted),
            Self::Unmounted => None,
        }
    }

    /// Replaces the current surface; the previous one is released first.
    pub fn replace(&mut self, mounted: MountedSurface<S, H>) {
        self.unmount();
        *self = Self::Mounted(mounted);
    }

    /// Releases the surface if one is mounted.
    pub fn unmount(&mut self) {
        *self = Self::Unmounted;
    }
}
