//! Object dump builder for tests

use rigport_asset::{AssetEnvironment, RawObject};
use rigport_core::PathHash;
use serde_json::{json, Value};

/// Path ids of a GameObject and its Transform
#[derive(Debug, Clone, Copy)]
pub struct NodeIds {
    pub game_object: i64,
    pub transform: i64,
}

fn pptr(path_id: i64) -> Value {
    json!({"m_FileID": 0, "m_PathID": path_id})
}

pub struct DumpBuilder {
    next_id: i64,
    objects: Vec<RawObject>,
}

impl DumpBuilder {
    pub fn new() -> Self {
        Self {
            next_id: 100,
            objects: Vec::new(),
        }
    }

    fn push(&mut self, class: &str, data: Value) -> i64 {
        let path_id = self.next_id;
        self.next_id += 1;
        self.objects.push(RawObject {
            path_id,
            class: class.to_string(),
            data,
        });
        path_id
    }

    fn data_mut(&mut self, path_id: i64) -> &mut Value {
        &mut self
            .objects
            .iter_mut()
            .find(|o| o.path_id == path_id)
            .expect("object exists")
            .data
    }

    fn attach(&mut self, node: NodeIds, component: i64) {
        self.data_mut(node.game_object)["m_Component"]
            .as_array_mut()
            .expect("component list")
            .push(json!({ "component": pptr(component) }));
    }

    /// A GameObject + Transform pair under `parent`, at a small offset
    pub fn node(&mut self, name: &str, parent: Option<NodeIds>) -> NodeIds {
        let game_object = self.push("GameObject", json!({"m_Name": name, "m_Component": []}));
        let father = parent.map(|p| p.transform).unwrap_or(0);
        let transform = self.push(
            "Transform",
            json!({
                "m_GameObject": pptr(game_object),
                "m_LocalPosition": {"x": 0.0, "y": 0.1, "z": 0.0},
                "m_LocalRotation": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0},
                "m_LocalScale": {"x": 1.0, "y": 1.0, "z": 1.0},
                "m_Children": [],
                "m_Father": pptr(father),
            }),
        );
        let ids = NodeIds {
            game_object,
            transform,
        };
        self.attach(ids, transform);
        if let Some(parent) = parent {
            self.add_child_link(parent, ids);
        }
        ids
    }

    pub fn add_child_link(&mut self, parent: NodeIds, child: NodeIds) {
        self.data_mut(parent.transform)["m_Children"]
            .as_array_mut()
            .expect("children list")
            .push(pptr(child.transform));
    }

    pub fn script(&mut self, node: NodeIds, script_name: &str, fields: Value) -> i64 {
        let script = self.push(
            "MonoScript",
            json!({"m_Name": script_name, "m_ClassName": script_name}),
        );
        let mut data = json!({
            "m_GameObject": pptr(node.game_object),
            "m_Script": pptr(script),
            "m_Name": "",
        });
        if let (Some(target), Value::Object(extra)) = (data.as_object_mut(), fields) {
            target.extend(extra);
        }
        let behaviour = self.push("MonoBehaviour", data);
        self.attach(node, behaviour);
        behaviour
    }

    pub fn spring_bone(&mut self, node: NodeIds, pivot: Option<NodeIds>) -> i64 {
        let mut fields = json!({
            "radius": 0.02,
            "angularStiffness": 20.0,
            "dragForce": 0.4,
            "springForce": 0.0,
            "yAngleLimits": {"active": 1, "min": -30.0, "max": 30.0},
            "zAngleLimits": {"active": 1, "min": -10.0, "max": 60.0},
        });
        if let Some(pivot) = pivot {
            fields["pivotNode"] = pptr(pivot.transform);
        }
        self.script(node, "SekaiSpringBone", fields)
    }

    pub fn skinned_mesh(&mut self, node: NodeIds, mesh_name: &str, bone_paths: &[&str]) -> i64 {
        let hashes: Vec<u32> = bone_paths.iter().map(|p| PathHash::of(p).value()).collect();
        let mesh = self.push(
            "Mesh",
            json!({"m_Name": mesh_name, "m_BoneNameHashes": hashes}),
        );
        let renderer = self.push(
            "SkinnedMeshRenderer",
            json!({"m_GameObject": pptr(node.game_object), "m_Mesh": pptr(mesh)}),
        );
        self.attach(node, renderer);
        mesh
    }

    pub fn static_mesh(&mut self, node: NodeIds, mesh_name: &str) -> i64 {
        let mesh = self.push("Mesh", json!({"m_Name": mesh_name}));
        let filter = self.push(
            "MeshFilter",
            json!({"m_GameObject": pptr(node.game_object), "m_Mesh": pptr(mesh)}),
        );
        let renderer = self.push(
            "MeshRenderer",
            json!({"m_GameObject": pptr(node.game_object)}),
        );
        self.attach(node, filter);
        self.attach(node, renderer);
        mesh
    }

    pub fn animation_clip(&mut self, name: &str) -> i64 {
        self.push("AnimationClip", json!({"m_Name": name, "m_SampleRate": 60.0}))
    }

    pub fn build(self) -> AssetEnvironment {
        AssetEnvironment::new(self.objects).expect("valid dump")
    }
}
