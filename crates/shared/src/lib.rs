use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod parameters;
pub mod project;
pub mod schema;

pub use parameters::{evaluate_expression, expression_dependencies, ParameterError, ParameterResult};
pub use project::{parse_entities, serialize_entities};
pub use schema::{ParamDef, ParamError, ParamSchema, ParamSpec};

/// Уникальный идентификатор сущности в сцене
pub type EntityId = String;

/// Трансформация объекта
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    /// Углы Эйлера (XYZ), радианы
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    pub fn from_position(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: [x, y, z],
            ..Self::new()
        }
    }

    /// Копия со сдвигом позиции
    pub fn translated(&self, offset: [f64; 3]) -> Self {
        let mut t = self.clone();
        for (p, d) in t.position.iter_mut().zip(offset) {
            *p += d;
        }
        t
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::new()
    }

    /// Все компоненты конечны (JSON не хранит NaN и бесконечность)
    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(&self.rotation)
            .chain(&self.scale)
            .all(|v| v.is_finite())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Параметры сущностей
// ============================================================================

/// Значение параметра. Значения перечислений хранятся как текст.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Имя вида значения (для сообщений об ошибках)
    pub fn kind_name(&self) -> &'static str {
        match self {
            ParamValue::Number(_) => "number",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Text(_) => "text",
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Набор значений параметров сущности (упорядочен по имени)
pub type ParamRecord = BTreeMap<String, ParamValue>;

// ============================================================================
// Сохраняемая запись сущности
// ============================================================================

/// Запись сущности в файле проекта
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub params: ParamRecord,
    #[serde(default)]
    pub transform: Transform,
    /// Родительская сущность (для вложенных сущностей)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
}

// ============================================================================
// Описание визуального узла (результат построителя)
// ============================================================================

/// Описание геометрии меша
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometryDesc {
    Box {
        width: f64,
        height: f64,
        depth: f64,
    },
    Cylinder {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        segments: u32,
    },
    Sphere {
        radius: f64,
        segments: u32,
    },
    Plane {
        width: f64,
        height: f64,
    },
}

/// Описание материала
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    pub color: [u8; 3],
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_opacity() -> f32 {
    1.0
}

impl MaterialDesc {
    pub fn solid(color: [u8; 3]) -> Self {
        Self {
            color,
            opacity: 1.0,
        }
    }

    pub fn translucent(color: [u8; 3], opacity: f32) -> Self {
        Self { color, opacity }
    }
}

/// Вид узла
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKindDesc {
    Group,
    Mesh {
        geometry: GeometryDesc,
        material: MaterialDesc,
    },
}

/// Отсоединённое поддерево сцены
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNodeData {
    pub name: String,
    #[serde(default)]
    pub transform: Transform,
    pub kind: NodeKindDesc,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNodeData>,
}

impl SceneNodeData {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            kind: NodeKindDesc::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: GeometryDesc, material: MaterialDesc) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            kind: NodeKindDesc::Mesh { geometry, material },
            children: Vec::new(),
        }
    }

    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.transform.position = [x, y, z];
        self
    }

    pub fn rotated(mut self, rx: f64, ry: f64, rz: f64) -> Self {
        self.transform.rotation = [rx, ry, rz];
        self
    }

    pub fn with_child(mut self, child: SceneNodeData) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: SceneNodeData) {
        self.children.push(child);
    }

    /// Число узлов в поддереве (включая этот)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Число мешей в поддереве
    pub fn mesh_count(&self) -> usize {
        let own = usize::from(matches!(self.kind, NodeKindDesc::Mesh { .. }));
        own + self.children.iter().map(|c| c.mesh_count()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_new_is_identity() {
        let t = Transform::new();
        assert_eq!(t.position, [0.0; 3]);
        assert_eq!(t.rotation, [0.0; 3]);
        assert_eq!(t.scale, [1.0; 3]);
        assert!(t.is_identity());
        assert_eq!(Transform::default(), t);
    }

    #[test]
    fn test_transform_translated() {
        let t = Transform::from_position(1.0, 2.0, 3.0).translated([1.0, 0.0, 1.0]);
        assert_eq!(t.position, [2.0, 2.0, 4.0]);
        assert_eq!(t.scale, [1.0; 3]);
    }

    #[test]
    fn test_transform_is_finite() {
        assert!(Transform::new().is_finite());
        assert!(!Transform::from_position(f64::INFINITY, 0.0, 0.0).is_finite());
        let mut t = Transform::new();
        t.scale[2] = f64::NAN;
        assert!(!t.is_finite());
    }

    #[test]
    fn test_param_value_untagged_serde() {
        let mut record = ParamRecord::new();
        record.insert("height".into(), 3.5.into());
        record.insert("roof".into(), "dome".into());
        record.insert("battlements".into(), true.into());

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"battlements":true,"height":3.5,"roof":"dome"}"#);

        let back: ParamRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_param_value_accessors() {
        assert_eq!(ParamValue::Number(2.0).as_number(), Some(2.0));
        assert_eq!(ParamValue::Bool(true).as_number(), None);
        assert_eq!(ParamValue::Text("a".into()).as_text(), Some("a"));
        assert_eq!(ParamValue::Bool(false).kind_name(), "boolean");
    }

    #[test]
    fn test_entity_record_uses_type_key() {
        let json = r#"{"id": "entity_1", "type": "tower", "params": {"floors": 3}}"#;
        let record: EntityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.type_name, "tower");
        assert_eq!(record.transform, Transform::new());
        assert!(record.parent.is_none());

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["type"], "tower");
        assert!(out.get("parent").is_none());
    }

    #[test]
    fn test_node_data_counts() {
        let tree = SceneNodeData::group("root")
            .with_child(SceneNodeData::mesh(
                "a",
                GeometryDesc::Sphere {
                    radius: 1.0,
                    segments: 8,
                },
                MaterialDesc::solid([255, 0, 0]),
            ))
            .with_child(SceneNodeData::group("empty"));
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.mesh_count(), 1);
    }

    #[test]
    fn test_node_data_serde_tags() {
        let node = SceneNodeData::mesh(
            "slab",
            GeometryDesc::Box {
                width: 1.0,
                height: 2.0,
                depth: 3.0,
            },
            MaterialDesc::solid([10, 20, 30]),
        );
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["kind"]["type"], "mesh");
        assert_eq!(v["kind"]["geometry"]["type"], "box");
        let back: SceneNodeData = serde_json::from_value(v).unwrap();
        assert_eq!(back, node);
    }
}
