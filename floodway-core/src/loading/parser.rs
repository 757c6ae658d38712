use std::fs::File;
use std::path::Path;

use geo::LineString;
use log::warn;
use serde::Deserialize;
use wkt::TryFromWkt;

use crate::model::{RoadEdge, RoadNode};
use crate::{EdgeKey, Error, NodeId};

#[derive(Debug, Deserialize)]
struct RawNode {
    osmid: NodeId,
    x: Option<f64>,
    y: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    u: NodeId,
    v: NodeId,
    #[serde(default)]
    key: EdgeKey,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    highway: Option<String>,
    length: f64,
    #[serde(default)]
    geometry: Option<String>,
}

fn deserialize_rows<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: for<'de> Deserialize<'de>,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;

    let mut skipped = 0usize;
    let rows = csv::Reader::from_reader(file)
        .deserialize()
        .filter_map(|row| match row {
            Ok(row) => Some(row),
            Err(e) => {
                skipped += 1;
                log::debug!("{}: {e}", path.display());
                None
            }
        })
        .collect::<Vec<T>>();

    if skipped > 0 {
        warn!("Skipped {skipped} malformed rows in {}", path.display());
    }
    Ok(rows)
}

/// Read road nodes; rows without `x`/`y` become coordinate-less nodes
pub fn read_nodes(path: &Path) -> Result<Vec<RoadNode>, Error> {
    Ok(deserialize_rows::<RawNode>(path)?
        .into_iter()
        .map(|raw| match (raw.x, raw.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => RoadNode::new(raw.osmid, x, y),
            _ => RoadNode::without_coordinates(raw.osmid),
        })
        .collect())
}

/// Read road edges; an unparsable geometry is dropped in favour of the
/// straight node-to-node fallback
pub fn read_edges(path: &Path) -> Result<Vec<RoadEdge>, Error> {
    Ok(deserialize_rows::<RawEdge>(path)?
        .into_iter()
        .map(|raw| RoadEdge {
            geometry: raw.geometry.as_deref().and_then(|text| parse_line(text, raw.u, raw.v)),
            u: raw.u,
            v: raw.v,
            key: raw.key,
            name: raw.name,
            highway: raw.highway,
            length_m: raw.length,
        })
        .collect())
}

fn parse_line(text: &str, u: NodeId, v: NodeId) -> Option<LineString<f64>> {
    match LineString::<f64>::try_from_wkt_str(text) {
        Ok(line) if line.0.len() >= 2 => Some(line),
        Ok(_) => {
            warn!("Edge {u} -> {v}: geometry has fewer than two points");
            None
        }
        Err(e) => {
            warn!("Edge {u} -> {v}: invalid WKT geometry ({e})");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wkt_linestrings() {
        let line = parse_line("LINESTRING (103.8350704 1.4248212, 103.8350717 1.4248739)", 1, 2)
            .unwrap();
        assert_eq!(line.0.len(), 2);
        assert_eq!(line.0[0].x, 103.835_070_4);

        assert!(parse_line("LINESTRING (103.8 1.4)", 1, 2).is_none());
        assert!(parse_line("POINT (103.8 1.4)", 1, 2).is_none());
        assert!(parse_line("not wkt", 1, 2).is_none());
    }
}
