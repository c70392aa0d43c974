/// Visible plot area in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Default for ViewRect {
    fn default() -> Self {
        Self {
            x: (0.0, 1.0),
            y: (0.0, 1.0),
        }
    }
}

impl ViewRect {
    pub fn width(&self) -> f64 {
        self.x.1 - self.x.0
    }

    pub fn center(&self) -> [f64; 2] {
        [(self.x.0 + self.x.1) / 2.0, (self.y.0 + self.y.1) / 2.0]
    }

    pub fn contains(&self, p: [f64; 2]) -> bool {
        (self.x.0..=self.x.1).contains(&p[0]) && (self.y.0..=self.y.1).contains(&p[1])
    }
}
