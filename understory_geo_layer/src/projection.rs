// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Map projections between geographic coordinates and screen space.
//!
//! Screen space follows Kurbo conventions: `x` grows to the right and `y`
//! grows downward, so north is towards smaller `y`.

use kurbo::{Point, Rect};
use understory_geoquad::{GeoBox, GeoPoint};

/// A monotone mapping between geographic coordinates and the screen.
///
/// Implementations must be monotone in both axes (longitude to `x`,
/// latitude to `-y`) so that a box maps to the rectangle spanned by its
/// projected corners.
pub trait GeoProjection {
    /// Screen position of a geographic point.
    fn project(&self, point: GeoPoint) -> Point;

    /// Geographic position under a screen point.
    fn unproject(&self, point: Point) -> GeoPoint;

    /// The screen rectangle the map is drawn into.
    fn viewport(&self) -> Rect;

    /// Screen rectangle covered by `bounds`.
    fn project_box(&self, bounds: &GeoBox) -> Rect {
        let nw = self.project(GeoPoint::new(bounds.lng_min, bounds.lat_max));
        let se = self.project(GeoPoint::new(bounds.lng_max, bounds.lat_min));
        Rect::from_points(nw, se)
    }

    /// Geographic box covered by `rect`.
    fn unproject_rect(&self, rect: Rect) -> GeoBox {
        let a = self.unproject(Point::new(rect.x0, rect.y0));
        let b = self.unproject(Point::new(rect.x1, rect.y1));
        GeoBox::from_point(a).union_point(b)
    }

    /// Geographic box currently on screen.
    fn viewport_frame(&self) -> GeoBox {
        self.unproject_rect(self.viewport())
    }
}

/// Plate carrée: a linear mapping from a geographic frame onto the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Equirectangular {
    /// Geographic box shown in the viewport.
    pub frame: GeoBox,
    /// Screen rectangle.
    pub viewport: Rect,
}

impl Equirectangular {
    /// Show `frame` stretched over `viewport`.
    pub fn new(frame: GeoBox, viewport: Rect) -> Self {
        Self { frame, viewport }
    }

    /// Same viewport, shifted by `dlng`/`dlat` degrees.
    #[must_use]
    pub fn panned(&self, dlng: f64, dlat: f64) -> Self {
        let f = self.frame;
        Self {
            frame: GeoBox::new(
                f.lng_min + dlng,
                f.lat_min + dlat,
                f.lng_max + dlng,
                f.lat_max + dlat,
            ),
            viewport: self.viewport,
        }
    }
}

impl GeoProjection for Equirectangular {
    fn project(&self, point: GeoPoint) -> Point {
        let f = &self.frame;
        let v = &self.viewport;
        Point::new(
            v.x0 + (point.lng - f.lng_min) * (v.width() / f.width()),
            v.y0 + (f.lat_max - point.lat) * (v.height() / f.height()),
        )
    }

    fn unproject(&self, point: Point) -> GeoPoint {
        let f = &self.frame;
        let v = &self.viewport;
        GeoPoint::new(
            f.lng_min + (point.x - v.x0) * (f.width() / v.width()),
            f.lat_max - (point.y - v.y0) * (f.height() / v.height()),
        )
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }
}

/// Spherical Web Mercator, as used by slippy-map tile servers.
///
/// At zoom `z` the whole world is a square of `tile_size * 2^z` pixels.
/// Latitudes are clamped to [`WebMercator::MAX_LATITUDE`].
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WebMercator {
    /// Geographic point drawn at the viewport center.
    pub center: GeoPoint,
    /// Zoom level; fractional values are allowed.
    pub zoom: f64,
    /// Screen rectangle.
    pub viewport: Rect,
    /// Edge length of one tile in pixels.
    pub tile_size: f64,
}

#[cfg(feature = "std")]
impl WebMercator {
    /// Latitude at which the projected world becomes square.
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

    /// 256-pixel tiles centered on `center` at `zoom`.
    pub fn new(center: GeoPoint, zoom: f64, viewport: Rect) -> Self {
        Self {
            center,
            zoom,
            viewport,
            tile_size: 256.0,
        }
    }

    fn world_size(&self) -> f64 {
        self.tile_size * self.zoom.exp2()
    }

    fn world_x(&self, lng: f64) -> f64 {
        (lng + 180.0) / 360.0 * self.world_size()
    }

    fn world_y(&self, lat: f64) -> f64 {
        use core::f64::consts::{FRAC_PI_4, PI};
        let phi = lat.clamp(-Self::MAX_LATITUDE, Self::MAX_LATITUDE).to_radians();
        let merc = (FRAC_PI_4 + phi / 2.0).tan().ln();
        (1.0 - merc / PI) / 2.0 * self.world_size()
    }
}

#[cfg(feature = "std")]
impl GeoProjection for WebMercator {
    fn project(&self, point: GeoPoint) -> Point {
        let c = self.viewport.center();
        Point::new(
            c.x + self.world_x(point.lng) - self.world_x(self.center.lng),
            c.y + self.world_y(point.lat) - self.world_y(self.center.lat),
        )
    }

    fn unproject(&self, point: Point) -> GeoPoint {
        use core::f64::consts::PI;
        let c = self.viewport.center();
        let size = self.world_size();
        let wx = point.x - c.x + self.world_x(self.center.lng);
        let wy = point.y - c.y + self.world_y(self.center.lat);
        let lng = wx / size * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * wy / size)).sinh().atan().to_degrees();
        GeoPoint::new(lng, lat)
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }
}
