//! Display topology.
//!
//! Works out which rectangles of the desktop windows can be tiled onto: the
//! primary display, plus one secondary region when the virtual desktop is
//! wider than the primary.  The secondary region is inferred, not measured;
//! it assumes every other display sits to the right of the primary with the
//! same top edge.  Displays stacked vertically or placed to the left are not
//! detected.
//!
//! Topology is re-derived on every call so that monitor reconfiguration is
//! picked up without any invalidation logic.

use crate::command::DisplayRegion;
use crate::traits::WindowPrimitives;
use log::{debug, warn};

/// Resolve the tiling regions, primary first.
///
/// Returns an empty vector if any metric query fails; callers must treat
/// that as "cannot proceed".
pub fn resolve<W: WindowPrimitives>(wm: &W) -> Vec<DisplayRegion> {
    match try_resolve(wm) {
        Ok(regions) => {
            debug!("display regions: {:?}", regions);
            regions
        }
        Err(e) => {
            warn!("failed to read display metrics: {}", e);
            Vec::new()
        }
    }
}

fn try_resolve<W: WindowPrimitives>(wm: &W) -> Result<Vec<DisplayRegion>, W::Error> {
    let (width, height) = wm.primary_display_size()?;
    if width == 0 || height == 0 {
        warn!("primary display reports {}x{}", width, height);
        return Ok(Vec::new());
    }
    let primary = DisplayRegion::new(0, 0, width, height);
    let mut regions = vec![primary];

    if wm.monitor_count()? > 1 {
        let virtual_bounds = wm.virtual_desktop_bounds()?;
        if let Some(secondary) = secondary_region(&primary, &virtual_bounds) {
            regions.push(secondary);
        }
    }
    Ok(regions)
}

/// The horizontal remainder of the virtual desktop to the right of
/// `primary`, if the virtual desktop is wider.
pub fn secondary_region(
    primary: &DisplayRegion,
    virtual_bounds: &DisplayRegion,
) -> Option<DisplayRegion> {
    if virtual_bounds.width <= primary.width {
        return None;
    }
    Some(DisplayRegion::new(
        primary.width as i32,
        0,
        virtual_bounds.width - primary.width,
        virtual_bounds.height,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDesktop;

    #[test]
    fn single_display_is_primary_only() {
        let desk = FakeDesktop::single(1920, 1080);
        assert_eq!(resolve(&desk), vec![DisplayRegion::new(0, 0, 1920, 1080)]);
    }

    #[test]
    fn single_display_ignores_virtual_bounds() {
        let desk = FakeDesktop::single(1920, 1080);
        desk.virtual_bounds.set(DisplayRegion::new(0, 0, 3840, 1080));
        assert_eq!(resolve(&desk).len(), 1);
    }

    #[test]
    fn wider_virtual_desktop_adds_region_on_the_right() {
        let desk = FakeDesktop::dual((1920, 1080), DisplayRegion::new(0, 0, 3200, 1200));
        let regions = resolve(&desk);
        assert_eq!(
            regions,
            vec![
                DisplayRegion::new(0, 0, 1920, 1080),
                DisplayRegion::new(1920, 0, 1280, 1200),
            ]
        );
        // Together the regions span the full virtual width.
        let total: u32 = regions.iter().map(|r| r.width).sum();
        assert_eq!(total, 3200);
        assert_eq!(regions[1].right(), 3200);
    }

    #[test]
    fn secondary_height_is_virtual_height() {
        let desk = FakeDesktop::dual((2560, 1440), DisplayRegion::new(0, 0, 4480, 1440));
        let regions = resolve(&desk);
        assert_eq!(regions[1], DisplayRegion::new(2560, 0, 1920, 1440));
    }

    #[test]
    fn stacked_displays_are_not_detected() {
        // Second monitor below the primary: virtual desktop is taller, not
        // wider, so only the primary is returned.
        let desk = FakeDesktop::dual((1920, 1080), DisplayRegion::new(0, 0, 1920, 2160));
        assert_eq!(resolve(&desk), vec![DisplayRegion::new(0, 0, 1920, 1080)]);
    }

    #[test]
    fn metric_failure_yields_empty() {
        let desk = FakeDesktop::single(1920, 1080);
        desk.metrics_fail.set(true);
        assert!(resolve(&desk).is_empty());
    }

    #[test]
    fn zero_sized_primary_yields_empty() {
        let desk = FakeDesktop::single(0, 0);
        assert!(resolve(&desk).is_empty());
    }

    #[test]
    fn secondary_region_requires_strictly_wider() {
        let primary = DisplayRegion::new(0, 0, 1920, 1080);
        assert!(secondary_region(&primary, &DisplayRegion::new(0, 0, 1920, 1080)).is_none());
        assert!(secondary_region(&primary, &DisplayRegion::new(-1280, 0, 1280, 1080)).is_none());
    }
}
