use geo::Point;

use super::ExtraData;

/// Attribute name that selects on the sensor name rather than its extra data.
pub const NAME_ATTRIBUTE: &str = "name";

#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub id: u64,
    /// x = longitude, y = latitude
    pub geom: Point<f64>,
    pub name: String,
    pub extra_data: ExtraData,
}

impl Sensor {
    pub fn new(id: u64, geom: Point<f64>, name: String, extra_data: ExtraData) -> Self {
        Self {
            id,
            geom,
            name,
            extra_data,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.geom.x()
    }

    pub fn latitude(&self) -> f64 {
        self.geom.y()
    }

    /// Look up a selectable attribute: `name`, or a key of the extra data.
    pub fn attribute(&self, attribute: &str) -> Option<&str> {
        if attribute == NAME_ATTRIBUTE {
            Some(self.name.as_str())
        } else {
            self.extra_data.get(attribute).map(String::as_str)
        }
    }
}
