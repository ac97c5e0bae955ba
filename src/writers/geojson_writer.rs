//! Map layers: sensors as points, regions as multipolygons.

use crate::error::Result;
use crate::models::{ExtraData, Region, Sensor};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use std::io::Write;

pub fn sensor_feature(sensor: &Sensor) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(sensor.name.clone()));
    insert_extra(&mut properties, &sensor.extra_data);

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&sensor.geom))),
        id: Some(geojson::feature::Id::Number(sensor.id.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn region_feature(region: &Region) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("region_id".to_string(), JsonValue::from(region.region_id.clone()));
    insert_extra(&mut properties, &region.extra_data);

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&region.geom))),
        id: Some(geojson::feature::Id::String(region.region_id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn sensors_collection(sensors: &[Sensor]) -> FeatureCollection {
    collection(sensors.iter().map(sensor_feature).collect())
}

pub fn regions_collection(regions: &[Region]) -> FeatureCollection {
    collection(regions.iter().map(region_feature).collect())
}

pub fn write_collection<W: Write>(mut output: W, collection: &FeatureCollection) -> Result<()> {
    serde_json::to_writer(&mut output, collection)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Extra data sits beside the identifying property; a clashing key does
/// not overwrite it.
fn insert_extra(properties: &mut JsonObject, extra: &ExtraData) {
    for (key, value) in extra {
        properties
            .entry(key.clone())
            .or_insert_with(|| JsonValue::from(value.clone()));
    }
}
