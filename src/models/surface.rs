//! Per-surface serve and return statistics, and the significance-gated advantage
//! they imply relative to a player's overall averages.

use crate::numerical::ConfidenceTable;
use std::collections::HashMap;

/// Below this many matches on a surface, no advantage is applied at all.
pub const MIN_SURFACE_MATCHES: usize = 5;
/// Each match contributes roughly this many service points to the sample.
const POINTS_PER_MATCH: usize = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceStats {
    pub ser: f64,
    pub ret: f64,
    pub n: usize,
}

impl SurfaceStats {
    /// Average serve and return percentages, or zeros if nothing was recorded.
    pub fn averages(&self) -> (f64, f64) {
        if self.n == 0 {
            return (0., 0.);
        }
        let n = self.n as f64;
        (self.ser / n, self.ret / n)
    }

    pub fn add(&mut self, ser: f64, ret: f64) {
        self.ser += ser;
        self.ret += ret;
        self.n += 1;
    }
}

/// The raw gaps between a surface's averages and the overall averages, with the
/// confidence half-widths of the surface averages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceAdvantage {
    pub serve: f64,
    pub ret: f64,
    pub h_serve: f64,
    pub h_ret: f64,
}

impl SurfaceAdvantage {
    pub const NONE: Self = Self {
        serve: 0.,
        ret: 0.,
        h_serve: 1.,
        h_ret: 1.,
    };
}

#[derive(Clone, Debug, Default)]
pub struct SurfaceProfile {
    overall: SurfaceStats,
    by_surface: HashMap<String, SurfaceStats>,
}

impl SurfaceProfile {
    pub fn overall(&self) -> &SurfaceStats {
        &self.overall
    }

    pub fn surface(&self, surface: &str) -> SurfaceStats {
        self.by_surface.get(surface).copied().unwrap_or_default()
    }

    pub fn advantage(&self, surface: &str, table: &ConfidenceTable) -> SurfaceAdvantage {
        let on_surface = self.surface(surface);
        let n = on_surface.n;
        if n <= MIN_SURFACE_MATCHES {
            return SurfaceAdvantage::NONE;
        }

        let (ser_all, ret_all) = self.overall.averages();
        let (ser, ret) = on_surface.averages();
        let t = table.get(n);
        let half_width = |p: f64| (p * (1. - p) / (POINTS_PER_MATCH * n) as f64).sqrt() * t;

        SurfaceAdvantage {
            serve: ser - ser_all,
            ret: ret - ret_all,
            h_serve: half_width(ser),
            h_ret: half_width(ret),
        }
    }

    pub fn update(&mut self, ser: f64, ret: f64, surface: &str) {
        self.overall.add(ser, ret);
        match self.by_surface.get_mut(surface) {
            Some(stats) => stats.add(ser, ret),
            None => {
                let mut stats = SurfaceStats::default();
                stats.add(ser, ret);
                self.by_surface.insert(surface.to_owned(), stats);
            }
        }
    }
}

/// Zeroes `gap` inside the dead zone `[-h, h]` and moves it towards zero by `h`
/// outside of it, so the correction is continuous in `gap`.
pub fn shrink(gap: f64, h: f64) -> f64 {
    if gap + h < 0. {
        gap + h
    } else if gap - h > 0. {
        gap - h
    } else {
        0.
    }
}
