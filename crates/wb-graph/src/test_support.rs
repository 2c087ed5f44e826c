//! Asset fixtures shared by unit tests.

use std::fs;
use std::path::Path;

use wb_core::{Point, mm};

use crate::config::AssetConfig;
use crate::graph::BoardGraph;

pub(crate) const R1: &str = r#"{"name":"R1","footprint":[[0,"0m"],["1m","0m"]],"ports":{"a":{"name":"A","pos":["0m","0m"]}}}"#;

pub(crate) const R2: &str = r#"{
    "name": "R2",
    "footprint": [["0mm","0mm"],["10mm","0mm"],["10mm","4mm"],["0mm","4mm"]],
    "mass": "0.2g",
    "ports": {
        "a": {"name": "A", "pos": ["0mm","2mm"]},
        "b": {"name": "B", "pos": ["10mm","2mm"]}
    }
}"#;

pub(crate) const JST_XH: &str = r#"{"name":"JST XH","purchase":[{"price":"$0.12","url":"https://example.com/xh"}]}"#;

pub(crate) fn pt(x_mm: f64, y_mm: f64) -> Point {
    Point::new(mm(x_mm), mm(y_mm))
}

/// A temporary asset tree with a couple of components and connectors.
pub(crate) struct TestBoard {
    pub dir: tempfile::TempDir,
}

impl TestBoard {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "assets/components/res/r1.json", R1);
        write(root, "assets/components/res/r2.json", R2);
        write(root, "assets/connectors/jst/xh.json", JST_XH);
        write(root, "assets/connectors/bare.json", r#"{"name":"Bare"}"#);
        Self { dir }
    }

    pub fn assets(&self) -> AssetConfig {
        AssetConfig::under(self.dir.path().join("assets"))
    }

    pub fn graph(&self) -> BoardGraph {
        BoardGraph::with_assets(&self.assets()).unwrap()
    }
}

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}
