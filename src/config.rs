/*

    Configuration of a bounding box manipulator and the JSON
    session files replayed by the `manipulate` binary.

    Keys are PascalCase. Vectors are accepted both as a string
    "x y z" and as an array [x, y, z], numbers may be quoted:

        {
            "Config": {
                "Preset": "AllResize",
                "InitBoundsFromActor": "false",
                "AffordanceClasses": { "Corner": "Knob", "Edge": null }
            },
            "Owner": { "Translation": "0 0 100", "Rotation": { "Yaw": 90 } },
            "LocalBounds": { "Min": "-1 -1 -1", "Max": [1, 1, 1] },
            "GrabAffordance": 3,
            "Samples": [ { "Time": 0.0, "Position": "1 1 1" }, ... ]
        }

    @date: 24 Oct, 2025
*/

use std::fmt;
use std::fs::File;
use std::io::BufReader;

use serde::de::{self, Deserializer, SeqAccess, Visitor};

use crate::affordance::{Affordance, AffordanceKind, ProxyClass};
use crate::bbox::AxisAlignedBox;
use crate::grab::PointerId;
use crate::presets::ManipulatorPreset;
use crate::prelude::*;

/// Proxy class spawned for each affordance kind, unless the affordance overrides it.
/// None means affordances of that kind are skipped.
#[derive(Debug, Clone, PartialEq, SmartDefault, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AffordanceClasses {
    #[default(Some(ProxyClass::new("CenterAffordance")))]
    pub center: Option<ProxyClass>,
    #[default(Some(ProxyClass::new("FaceAffordance")))]
    pub face: Option<ProxyClass>,
    #[default(Some(ProxyClass::new("EdgeAffordance")))]
    pub edge: Option<ProxyClass>,
    #[default(Some(ProxyClass::new("CornerAffordance")))]
    pub corner: Option<ProxyClass>,
}

impl AffordanceClasses {
    pub fn class_for(&self, kind: AffordanceKind) -> Option<&ProxyClass> {
        match kind {
            AffordanceKind::Center => self.center.as_ref(),
            AffordanceKind::Face => self.face.as_ref(),
            AffordanceKind::Edge => self.edge.as_ref(),
            AffordanceKind::Corner => self.corner.as_ref(),
        }
    }
}

#[derive(Debug, Clone, SmartDefault, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ManipulatorConfig {
    /// Preset used when no custom affordances are given.
    pub preset: ManipulatorPreset,

    /// Use the custom list instead of the preset.
    #[serde(deserialize_with = "deser_bool")]
    pub use_custom_affordances: bool,

    pub custom_affordances: Vec<Affordance>,

    /// Compute the bounds from the owner's geometry when play begins,
    /// otherwise start from a zero box.
    #[default = true]
    #[serde(deserialize_with = "deser_bool")]
    pub init_bounds_from_actor: bool,

    pub affordance_classes: AffordanceClasses,
}

/// World pose of the manipulated owner.
#[derive(Debug, Clone, Copy, SmartDefault, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OwnerPose {
    #[serde(deserialize_with = "deser_vec3")]
    pub translation: Vector3,
    pub rotation: Rotator,
    #[default(Vector3::ONE)]
    #[serde(deserialize_with = "deser_vec3")]
    pub scale: Vector3,
}

impl OwnerPose {
    pub fn to_transform(&self) -> Transform {
        Transform::new(self.rotation.to_quat(), self.translation, self.scale)
    }
}

/// Pointer pose at a point in time.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PointerSample {
    #[serde(deserialize_with = "deser_float")]
    pub time: Float,
    #[serde(deserialize_with = "deser_vec3")]
    pub position: Vector3,
    #[serde(default)]
    pub rotation: Rotator,
}

impl PointerSample {
    pub fn to_transform(&self) -> Transform {
        Transform::new(self.rotation.to_quat(), self.position, Vector3::ONE)
    }
}

/// Scripted manipulation: one pointer grabs one affordance and follows the samples.
#[derive(Debug, Clone, SmartDefault, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Session {
    pub config: ManipulatorConfig,
    pub owner: OwnerPose,
    /// Local bounds reported by the owner's geometry, unit box if not given.
    pub local_bounds: Option<AxisAlignedBox>,
    /// Index into the affordances in use.
    pub grab_affordance: usize,
    #[default(PointerId(0))]
    pub pointer: PointerId,
    pub samples: Vec<PointerSample>,
}

pub fn load_session(path: &str) -> Result<Session, Box<dyn std::error::Error>> {
    let span = tracing::span!(tracing::Level::INFO, "load_session");
    let _enter = span.enter();

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    debug!("Reading session from {}", path);

    let session: Session = serde_json::from_reader(reader)?;
    info!(
        "Loaded session with preset {:?}, {} custom affordances, {} pointer samples",
        session.config.preset,
        session.config.custom_affordances.len(),
        session.samples.len()
    );
    Ok(session)
}

pub(crate) fn deser_float<'de, D>(deserializer: D) -> Result<Float, D::Error>
where
    D: Deserializer<'de>,
{
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| de::Error::custom("Invalid float")),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<Float>()
            .map_err(|_| de::Error::custom("Failed to parse float from string")),
        t => Err(de::Error::custom(format!("Expected float or string, found {t}"))),
    }
}

pub(crate) fn deser_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct BoolVisitor;

    impl<'de> Visitor<'de> for BoolVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a boolean or a string containing true/false")
        }

        fn visit_bool<E>(self, v: bool) -> Result<bool, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_str<E>(self, v: &str) -> Result<bool, E>
        where
            E: de::Error,
        {
            match v.to_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(E::custom(format!("invalid bool '{}'", v))),
            }
        }

        fn visit_u64<E>(self, v: u64) -> Result<bool, E>
        where
            E: de::Error,
        {
            Ok(v != 0)
        }
    }

    deserializer.deserialize_any(BoolVisitor)
}

fn parse_vec3_str(value: &str) -> Result<Vector3, String> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(format!("Expected 3 components for Vec3 string, found '{}'", value));
    }
    let mut xyz = [0.0; 3];
    for (dst, part) in xyz.iter_mut().zip(parts) {
        *dst = part
            .parse::<Float>()
            .map_err(|e| format!("Failed parsing '{}': {}", part, e))?;
    }
    Ok(Vector3::from_array(xyz))
}

pub(crate) fn deser_vec3<'de, D>(deserializer: D) -> Result<Vector3, D::Error>
where
    D: Deserializer<'de>,
{
    struct Vec3Visitor;

    impl<'de> Visitor<'de> for Vec3Visitor {
        type Value = Vector3;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a Vec3 as a string 'x y z' or an array [x, y, z]")
        }

        // Given "X Y Z"
        fn visit_str<E>(self, value: &str) -> Result<Vector3, E>
        where
            E: de::Error,
        {
            parse_vec3_str(value).map_err(de::Error::custom)
        }

        // Given [X, Y, Z]
        fn visit_seq<A>(self, mut seq: A) -> Result<Vector3, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut xyz = [0.0; 3];
            for dst in xyz.iter_mut() {
                *dst = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::custom("Expected 3 elements in Vec3 array"))?;
            }
            if seq.next_element::<Float>()?.is_some() {
                return Err(de::Error::custom("Expected only 3 elements in Vec3 array"));
            }
            Ok(Vector3::from_array(xyz))
        }
    }

    deserializer.deserialize_any(Vec3Visitor)
}

/// Matrix given as its three columns, each a Vec3.
pub(crate) fn deser_mat3_cols<'de, D>(deserializer: D) -> Result<Option<Matrix3>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Column(#[serde(deserialize_with = "deser_vec3")] Vector3);

    let cols = Option::<[Column; 3]>::deserialize(deserializer)?;
    Ok(cols.map(|[x, y, z]| Matrix3::from_cols(x.0, y.0, z.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affordance::AffordanceAction;

    #[test]
    fn test_vec3_string_and_array() {
        #[derive(Deserialize)]
        struct V(#[serde(deserialize_with = "deser_vec3")] Vector3);

        let a: V = serde_json::from_str(r#""1 -2.5 3""#).unwrap();
        let b: V = serde_json::from_str("[1, -2.5, 3]").unwrap();
        assert_eq!(a.0, Vector3::new(1.0, -2.5, 3.0));
        assert_eq!(a.0, b.0);

        assert!(serde_json::from_str::<V>(r#""1 2""#).is_err());
        assert!(serde_json::from_str::<V>("[1, 2, 3, 4]").is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config: ManipulatorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.preset, ManipulatorPreset::Default);
        assert!(!config.use_custom_affordances);
        assert!(config.init_bounds_from_actor);
        assert_eq!(config.affordance_classes, AffordanceClasses::default());
    }

    #[test]
    fn test_config_with_custom_affordances() {
        let json = r#"{
            "UseCustomAffordances": "true",
            "InitBoundsFromActor": 0,
            "CustomAffordances": [
                { "Action": "Translate", "BoundsLocation": [0, 0, 0],
                  "ConstraintMatrix": ["1 0 0", "0 1 0", "0 0 0"] },
                { "Action": "Resize", "BoundsLocation": "1 0 0", "Constraint": "axial" }
            ],
            "AffordanceClasses": { "Face": "Handle", "Center": null }
        }"#;
        let config: ManipulatorConfig = serde_json::from_str(json).unwrap();
        assert!(config.use_custom_affordances);
        assert!(!config.init_bounds_from_actor);
        assert_eq!(config.custom_affordances.len(), 2);

        let translate = &config.custom_affordances[0];
        assert_eq!(translate.action, AffordanceAction::Translate);
        assert_eq!(translate.kind, AffordanceKind::Center);
        assert_eq!(translate.constraint_matrix, Matrix3::from_diagonal(Vector3::new(1.0, 1.0, 0.0)));

        assert_eq!(config.affordance_classes.class_for(AffordanceKind::Face), Some(&ProxyClass::new("Handle")));
        assert_eq!(config.affordance_classes.class_for(AffordanceKind::Center), None);
        // Kinds that are not mentioned keep their default class
        assert!(config.affordance_classes.class_for(AffordanceKind::Corner).is_some());
    }

    #[test]
    fn test_session() {
        let json = r#"{
            "Owner": { "Translation": "0 0 100", "Rotation": { "Yaw": 90 } },
            "LocalBounds": { "Min": "-1 -1 -1", "Max": [1, 1, 1] },
            "GrabAffordance": 2,
            "Samples": [ { "Time": "0.0", "Position": "1 1 1" }, { "Time": 0.1, "Position": "1.5 1 1" } ]
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.owner.scale, Vector3::ONE);
        assert_eq!(session.owner.rotation.yaw, 90.0);
        assert_eq!(session.local_bounds.unwrap().max, Vector3::ONE);
        assert_eq!(session.grab_affordance, 2);
        assert_eq!(session.pointer, PointerId(0));
        assert_eq!(session.samples[1].time, 0.1);
        assert_eq!(session.samples[1].to_transform().translation, Vector3::new(1.5, 1.0, 1.0));
    }

    #[test]
    fn test_load_session_missing_file() {
        assert!(load_session("/nonexistent/session.json").is_err());
    }
}
