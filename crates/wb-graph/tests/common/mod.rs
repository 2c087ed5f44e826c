#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use wb_core::{Point, mm};
use wb_graph::{AssetConfig, BoardConfig, BoardGraph};

pub fn write(root: &Path, rel: &str, body: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, body).unwrap();
    path
}

pub fn pt(x_mm: f64, y_mm: f64) -> Point {
    Point::new(mm(x_mm), mm(y_mm))
}

/// Temporary directory holding `assets/components`, `assets/connectors`
/// and room for board files.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "assets/components/res/r1.json",
            r#"{"name":"R1","footprint":[[0,"0m"],["1m","0m"]],"ports":{"a":{"name":"A","pos":["0m","0m"]}}}"#,
        );
        write(
            root,
            "assets/components/res/r2.json",
            r#"{
                "name": "R2",
                "footprint": [["0mm","0mm"],["10mm","0mm"],["10mm","4mm"],["0mm","4mm"]],
                "ports": {
                    "a": {"name": "A", "pos": ["0mm","2mm"]},
                    "b": {"name": "B", "pos": ["10mm","2mm"]}
                }
            }"#,
        );
        write(
            root,
            "assets/connectors/jst/xh.json",
            r#"{"name":"JST XH","purchase":[{"price":"$0.12","url":"https://example.com/xh"}]}"#,
        );
        write(root, "assets/connectors/bare.json", r#"{"name":"Bare"}"#);
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn assets(&self) -> AssetConfig {
        AssetConfig::under(self.root().join("assets"))
    }

    pub fn config(&self, save_on_drop: bool) -> BoardConfig {
        BoardConfig {
            assets: self.assets(),
            save_on_drop,
            create_missing: true,
        }
    }

    pub fn empty_graph(&self) -> BoardGraph {
        BoardGraph::with_assets(&self.assets()).unwrap()
    }

    pub fn load(&self, json: serde_json::Value) -> wb_graph::GraphResult<BoardGraph> {
        let res = wb_graph::resource_store(&self.assets())?;
        BoardGraph::from_json(json, res)
    }
}

/// Two resistors joined by a routed wire, plus a one-port part with a
/// wire hanging off it.
pub fn sample_board() -> serde_json::Value {
    serde_json::json!({
        "nodes": {
            "n1": {
                "name": "R1", "type": "res.r2", "pos": ["0mm", "0mm"],
                "conns": [{"port": "b", "edge": "w1", "side": 0}]
            },
            "n2": {
                "name": "R2", "type": "res.r2", "pos": ["30mm", "0mm"],
                "conns": [{"port": "a", "edge": "w1", "side": 1}]
            },
            "n3": {
                "name": "Probe", "type": "res.r1", "pos": ["1m", "1m"],
                "conns": [{"port": "a", "edge": "w2", "side": 0}]
            }
        },
        "edges": {
            "w1": {
                "conns": [
                    {"connector": "jst.xh", "node": "n1", "port": "b"},
                    {"connector": "jst.xh", "node": "n2", "port": "a"}
                ],
                "pts": [["15mm", "5mm"]]
            },
            "w2": {
                "conns": [
                    {"connector": "bare", "node": "n3", "port": "a"},
                    {"connector": "bare", "pos": ["2m", "0m"]}
                ]
            }
        }
    })
}
