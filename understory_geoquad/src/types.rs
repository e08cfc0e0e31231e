// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geographic primitives: points, boxes, quadrants, and the item capability trait.

/// A longitude/latitude position in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoPoint {
    /// Longitude (x).
    pub lng: f64,
    /// Latitude (y).
    pub lat: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Whether both coordinates are finite.
    pub fn is_defined(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

/// Axis-aligned bounding box in longitude/latitude space.
///
/// A box is *defined* when all four edges are finite. The canonical undefined
/// box is [`GeoBox::UNDEFINED`], which is the identity element of
/// [`union_box`](Self::union_box): folding unions over an empty set yields it,
/// and unioning it with any box yields that box unchanged.
///
/// Containment and intersection use closed intervals on both axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBox {
    /// Western edge.
    pub lng_min: f64,
    /// Southern edge.
    pub lat_min: f64,
    /// Eastern edge.
    pub lng_max: f64,
    /// Northern edge.
    pub lat_max: f64,
}

impl Default for GeoBox {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl GeoBox {
    /// The empty box; identity element for unions.
    pub const UNDEFINED: Self = Self::new(
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    );

    /// The whole globe, `[-180, -90, 180, 90]`.
    pub const GLOBE: Self = Self::new(-180.0, -90.0, 180.0, 90.0);

    /// Create a box from its edges.
    pub const fn new(lng_min: f64, lat_min: f64, lng_max: f64, lat_max: f64) -> Self {
        Self {
            lng_min,
            lat_min,
            lng_max,
            lat_max,
        }
    }

    /// A zero-area box at `point`.
    pub const fn from_point(point: GeoPoint) -> Self {
        Self::new(point.lng, point.lat, point.lng, point.lat)
    }

    /// Whether all four edges are finite.
    pub fn is_defined(&self) -> bool {
        self.lng_min.is_finite()
            && self.lat_min.is_finite()
            && self.lng_max.is_finite()
            && self.lat_max.is_finite()
    }

    /// Extent along the longitude axis. Negative or non-finite for undefined boxes.
    pub fn width(&self) -> f64 {
        self.lng_max - self.lng_min
    }

    /// Extent along the latitude axis. Negative or non-finite for undefined boxes.
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Midpoint of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            0.5 * (self.lng_min + self.lng_max),
            0.5 * (self.lat_min + self.lat_max),
        )
    }

    /// Whether `point` lies inside the box, edges included.
    pub fn contains_point(&self, point: GeoPoint) -> bool {
        self.lng_min <= point.lng
            && point.lng <= self.lng_max
            && self.lat_min <= point.lat
            && point.lat <= self.lat_max
    }

    /// Whether `that` lies entirely inside this box, edges included.
    pub fn contains_box(&self, that: &Self) -> bool {
        self.lng_min <= that.lng_min
            && that.lng_max <= self.lng_max
            && self.lat_min <= that.lat_min
            && that.lat_max <= self.lat_max
    }

    /// Same as [`contains_point`](Self::contains_point).
    pub fn intersects_point(&self, point: GeoPoint) -> bool {
        self.contains_point(point)
    }

    /// Closed-interval overlap test. The undefined box intersects nothing.
    pub fn intersects_box(&self, that: &Self) -> bool {
        self.lng_min <= that.lng_max
            && that.lng_min <= self.lng_max
            && self.lat_min <= that.lat_max
            && that.lat_min <= self.lat_max
    }

    /// Smallest box covering this box and `point`.
    #[must_use]
    pub fn union_point(&self, point: GeoPoint) -> Self {
        self.union_box(&Self::from_point(point))
    }

    /// Smallest box covering both boxes. Non-finite edges of either side lose
    /// against finite ones, so undefined operands drop out.
    #[must_use]
    pub fn union_box(&self, that: &Self) -> Self {
        Self::new(
            self.lng_min.min(that.lng_min),
            self.lat_min.min(that.lat_min),
            self.lng_max.max(that.lng_max),
            self.lat_max.max(that.lat_max),
        )
    }

    /// The sub-frame of this box covering `quadrant` when split at `center`.
    pub fn quadrant(&self, quadrant: Quadrant, center: GeoPoint) -> Self {
        match quadrant {
            Quadrant::Southwest => Self::new(self.lng_min, self.lat_min, center.lng, center.lat),
            Quadrant::Northwest => Self::new(self.lng_min, center.lat, center.lng, self.lat_max),
            Quadrant::Southeast => Self::new(center.lng, self.lat_min, self.lng_max, center.lat),
            Quadrant::Northeast => Self::new(center.lng, center.lat, self.lng_max, self.lat_max),
        }
    }
}

impl FromIterator<GeoBox> for GeoBox {
    fn from_iter<It: IntoIterator<Item = Self>>(iter: It) -> Self {
        iter.into_iter()
            .fold(Self::UNDEFINED, |acc, b| acc.union_box(&b))
    }
}

/// One of the four children of a quadtree node.
///
/// The discriminant is the child slot; [`Quadrant::ALL`] is the forward
/// traversal order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// West of and south of the center (edges on the center line included).
    Southwest = 0,
    /// West of and north of the center.
    Northwest = 1,
    /// East of and south of the center.
    Southeast = 2,
    /// East of and north of the center.
    Northeast = 3,
}

impl Quadrant {
    /// Forward traversal order: SW, NW, SE, NE.
    pub const ALL: [Self; 4] = [
        Self::Southwest,
        Self::Northwest,
        Self::Southeast,
        Self::Northeast,
    ];

    /// Child slot index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The single quadrant of `center` that fully holds `bounds`, or `None`
    /// when the box straddles a center line.
    ///
    /// A box touching the center line from the west or south side still
    /// routes west or south. Non-finite edges fail every comparison and
    /// therefore straddle.
    pub fn route(bounds: &GeoBox, center: GeoPoint) -> Option<Self> {
        let in_west = bounds.lng_min <= center.lng;
        let in_east = bounds.lng_max > center.lng;
        let in_south = bounds.lat_min <= center.lat;
        let in_north = bounds.lat_max > center.lat;
        if in_west == in_east || in_south == in_north {
            return None;
        }
        Some(match (in_west, in_south) {
            (true, true) => Self::Southwest,
            (true, false) => Self::Northwest,
            (false, true) => Self::Southeast,
            (false, false) => Self::Northeast,
        })
    }
}

/// Capability required of every indexed item.
///
/// Items are handles; the index compares them with `PartialEq`, which must
/// express identity (two handles to the same view compare equal, regardless of
/// where the view currently is).
pub trait HasGeoBounds {
    /// Current geographic extent of the item.
    fn geo_bounds(&self) -> GeoBox;
}

impl<T: HasGeoBounds + ?Sized> HasGeoBounds for &T {
    fn geo_bounds(&self) -> GeoBox {
        (**self).geo_bounds()
    }
}
