use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Map a display-space point into [0, 1] surface space.
    pub fn normalize(self, width: u32, height: u32) -> Self {
        Self {
            x: self.x / width.max(1) as f32,
            y: self.y / height.max(1) as f32,
        }
    }

    pub fn denormalize(self, width: u32, height: u32) -> Self {
        Self {
            x: self.x * width as f32,
            y: self.y * height as f32,
        }
    }
}

/// Tool selection. `None` means pointer input does not paint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushMode {
    #[default]
    None,
    Paint,
    Erase,
}

impl BrushMode {
    pub fn stroke_mode(self) -> Option<StrokeMode> {
        match self {
            BrushMode::None => None,
            BrushMode::Paint => Some(StrokeMode::Paint),
            BrushMode::Erase => Some(StrokeMode::Erase),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeMode {
    Paint,
    Erase,
}

/// One freehand stroke in normalized surface coordinates.
///
/// `diameter` is a fraction of the surface width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub mode: StrokeMode,
    pub diameter: f32,
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn new(mode: StrokeMode, diameter: f32, first: Point) -> Self {
        Self {
            mode,
            diameter,
            points: vec![first],
        }
    }

    /// Consecutive point pairs. A single-point stroke yields one zero-length
    /// segment so it still leaves a round dab.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let dab = (self.points.len() == 1).then(|| (self.points[0], self.points[0]));
        dab.into_iter()
            .chain(self.points.windows(2).map(|w| (w[0], w[1])))
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }
}
