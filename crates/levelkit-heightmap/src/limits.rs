use serde::{Deserialize, Serialize};

/// Machine travel limits as stored on a machine profile
///
/// `xmin..zmax` are the configured limits the height map must cover; the
/// `available*` fields describe the full physical travel. Missing values
/// deserialize as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MachineLimits {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
    pub available_xmin: f64,
    pub available_xmax: f64,
    pub available_ymin: f64,
    pub available_ymax: f64,
    pub available_zmin: f64,
    pub available_zmax: f64,
}

impl MachineLimits {
    /// Limits covering only the XY rectangle, everything else zero
    pub fn xy(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            ..Self::default()
        }
    }

    /// Axes whose min exceeds max
    pub fn inverted_axes(&self) -> Vec<&'static str> {
        [
            ("X", self.xmin, self.xmax),
            ("Y", self.ymin, self.ymax),
            ("Z", self.zmin, self.zmax),
        ]
        .into_iter()
        .filter(|(_, min, max)| min > max)
        .map(|(axis, _, _)| axis)
        .collect()
    }
}
