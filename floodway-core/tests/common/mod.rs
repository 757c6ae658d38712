#![allow(dead_code)]

use floodway_core::prelude::*;
use floodway_core::{RoadEdge, RoadNode};
use geo::LineString;

pub const YISHUN_AVENUE_2_LENGTH: f64 = 616.487_338_850_422_4;
pub const MACKENZIE_ROAD_LENGTH: f64 = 257.563_567_139_655_1;

/// Three roads around Singapore, in WGS84
pub fn sample_network() -> RoadNetwork {
    let nodes = vec![
        RoadNode::new(10, 103.835_070_4, 1.424_821_2),
        RoadNode::new(11, 103.835_2, 1.430_0),
        RoadNode::new(20, 103.848_449_2, 1.305_551_8),
        RoadNode::new(21, 103.848_111_1, 1.305_797_6),
        RoadNode::new(30, 103.84, 1.36),
        RoadNode::new(31, 103.85, 1.36),
    ];

    let yishun = LineString::from(vec![
        (103.835_070_4, 1.424_821_2),
        (103.835_071_7, 1.424_873_9),
        (103.835_100_6, 1.426_011_3),
        (103.835_2, 1.430_0),
    ]);

    let edges = vec![
        RoadEdge {
            u: 10,
            v: 11,
            key: 0,
            name: Some("Yishun Avenue 2".to_string()),
            highway: Some("primary".to_string()),
            length_m: YISHUN_AVENUE_2_LENGTH,
            geometry: Some(yishun),
        },
        RoadEdge {
            u: 20,
            v: 21,
            key: 0,
            name: Some("MacKenzie Road".to_string()),
            highway: Some("residential".to_string()),
            length_m: MACKENZIE_ROAD_LENGTH,
            geometry: None,
        },
        RoadEdge {
            u: 30,
            v: 31,
            key: 0,
            name: Some("Braddell Road".to_string()),
            highway: Some("primary".to_string()),
            length_m: 1113.0,
            geometry: None,
        },
    ];

    RoadNetwork::new(nodes, edges, Some(Crs::Wgs84)).expect("sample network is valid")
}

pub fn sample_store() -> MemoryRecordStore {
    let mut yishun = FloodPoint::new(1, 1.429_5, 103.834_995_1);
    yishun.location = Some("Yishun MRT".to_string());
    let mut mackenzie = FloodPoint::new(12, 1.305_6, 103.848_3);
    mackenzie.location = Some("MacKenzie Road".to_string());

    MemoryRecordStore::new([yishun, mackenzie, FloodPoint::new(13, 95.0, 103.85)])
}

/// Store whose backend cannot be reached
pub struct UnreachableStore;

impl RecordStore for UnreachableStore {
    fn get_point(&self, _id: FloodId) -> Result<Option<FloodPoint>, Error> {
        Err(Error::UpstreamUnavailable("connection refused".to_string()))
    }

    fn all_points(&self) -> Result<Vec<FloodPoint>, Error> {
        Err(Error::UpstreamUnavailable("connection refused".to_string()))
    }
}
