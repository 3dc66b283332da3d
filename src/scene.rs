//! JSON scene descriptions.
//!
//! A scene file describes the camera, the lights and a tree of shapes:
//!
//! ```json
//! {
//!   "camera": { "width": 400, "height": 200, "field_of_view": 1.0472,
//!               "from": [0, 1.5, -5], "to": [0, 1, 0], "up": [0, 1, 0] },
//!   "lights": [ { "position": [-10, 10, -10], "intensity": [1, 1, 1] } ],
//!   "shapes": [ { "type": "sphere", "transform": [ { "translate": [0, 1, 0] } ],
//!                 "material": { "color": [1, 0.2, 1], "diffuse": 0.7 } } ]
//! }
//! ```
//!
//! Transform lists apply in order, so the first entry is applied to the
//! object first. Relative file names (OBJ models, PPM textures) are resolved
//! against the directory of the scene file.

use std::fs;
use std::io;
use std::path::{ Path, PathBuf };
use std::sync::Arc;

use serde::{ Serialize, Deserialize };
use thiserror::Error;

use crate::camera::Camera;
use crate::canvas::{ Canvas, PpmError };
use crate::color::Color;
use crate::consts::{ AIR_RI, DEFAULT_DIVIDE_THRESHOLD, DEFAULT_RECURSION_DEPTH,
    DIAMOND_RI, GLASS_RI, VACUUM_RI, WATER_RI };
use crate::light::{ Material, PointLight };
use crate::matrix::Matrix;
use crate::obj::{ ObjError, ObjParser };
use crate::pattern::{ Pattern, UvMap, UvTexture };
use crate::shape::{ CsgOp, Shape };
use crate::tuple::Tuple;
use crate::world::World;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} transform is not invertible")]
    SingularTransform(&'static str),

    #[error("CSG needs exactly two operands, found {0}")]
    CsgOperands(usize),

    #[error("unknown material preset {0:?}")]
    UnknownPreset(String),

    #[error("OBJ model {path:?}: {source}")]
    Obj { path: PathBuf, source: ObjError },

    #[error("texture {path:?}: {source}")]
    Texture { path: PathBuf, source: PpmError },
}

/// A loaded scene, ready to render.
#[derive(Debug)]
pub struct Scene {
    pub world: World,
    pub camera: Camera,
    pub divide_threshold: usize,
    pub max_depth: usize,
}

impl Scene {
    /// Reads and builds the scene at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
        let path = path.as_ref();
        let json: SceneJson = serde_json::from_str(&fs::read_to_string(path)?)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        let scene = Scene::build(json, base)?;
        log::info!(
            "loaded {:?}: {} objects, {} lights, camera {}x{}",
            path, scene.world.objects().len(), scene.world.lights.len(),
            scene.camera.hsize, scene.camera.vsize
        );
        Ok(scene)
    }

    /// Builds a scene from JSON text, resolving files against the current
    /// directory.
    pub fn from_json_str(text: &str) -> Result<Scene, SceneError> {
        Scene::build(serde_json::from_str(text)?, Path::new("."))
    }

    pub fn build(json: SceneJson, base: &Path) -> Result<Scene, SceneError> {
        let c = &json.camera;
        let view = Matrix::view_transform(point(c.from), point(c.to), vector(c.up));
        if !view.is_invertible() {
            return Err(SceneError::SingularTransform("camera"));
        }
        let camera = Camera::new(c.width, c.height, c.field_of_view).with_transform(view);

        let lights = json.lights
            .iter()
            .map(|l| PointLight::new(Color::from(l.intensity), point(l.position)))
            .collect();

        let shapes = json.shapes
            .into_iter()
            .map(|s| s.build(base))
            .collect::<Result<Vec<Shape>, SceneError>>()?;

        Ok(Scene {
            world: World::new(lights, shapes),
            camera,
            divide_threshold: json.divide_threshold.unwrap_or(DEFAULT_DIVIDE_THRESHOLD),
            max_depth: json.max_depth.unwrap_or(DEFAULT_RECURSION_DEPTH),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneJson {
    pub camera: CameraJson,
    #[serde(default)]
    pub lights: Vec<LightJson>,
    #[serde(default)]
    pub shapes: Vec<ShapeJson>,

    pub divide_threshold: Option<usize>,
    pub max_depth: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraJson {
    pub width: usize,
    pub height: usize,
    pub field_of_view: f64,

    pub from: [f64; 3],
    pub to: [f64; 3],
    pub up: [f64; 3],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightJson {
    pub position: [f64; 3],
    pub intensity: [f64; 3],
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformJson {
    Translate([f64; 3]),
    Scale([f64; 3]),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
    Shear([f64; 6]),
}

impl TransformJson {
    fn matrix(&self) -> Matrix {
        match *self {
            TransformJson::Translate([x, y, z]) => Matrix::translation(x, y, z),
            TransformJson::Scale([x, y, z]) => Matrix::scaling(x, y, z),
            TransformJson::RotateX(r) => Matrix::rotation_x(r),
            TransformJson::RotateY(r) => Matrix::rotation_y(r),
            TransformJson::RotateZ(r) => Matrix::rotation_z(r),
            TransformJson::Shear([xy, xz, yx, yz, zx, zy]) => Matrix::shearing(xy, xz, yx, yz, zx, zy),
        }
    }
}

/// Composes a transform list; earlier entries apply to the object first.
fn compose(list: &[TransformJson], what: &'static str) -> Result<Matrix, SceneError> {
    let m = list.iter().fold(Matrix::identity(), |acc, t| t.matrix() * acc);
    if !m.is_invertible() {
        return Err(SceneError::SingularTransform(what));
    }

    Ok(m)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShapeJson {
    #[serde(flatten)]
    pub kind: ShapeKindJson,
    #[serde(default)]
    pub transform: Vec<TransformJson>,
    pub material: Option<MaterialJson>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKindJson {
    Sphere,
    Plane,
    Cube,
    Cylinder {
        minimum: Option<f64>,
        maximum: Option<f64>,
        #[serde(default)]
        closed: bool,
    },
    Cone {
        minimum: Option<f64>,
        maximum: Option<f64>,
        #[serde(default)]
        closed: bool,
    },
    Triangle {
        p1: [f64; 3],
        p2: [f64; 3],
        p3: [f64; 3],
    },
    SmoothTriangle {
        p1: [f64; 3],
        p2: [f64; 3],
        p3: [f64; 3],
        n1: [f64; 3],
        n2: [f64; 3],
        n3: [f64; 3],
    },
    Group {
        #[serde(default)]
        children: Vec<ShapeJson>,
    },
    Csg {
        operation: CsgOpJson,
        children: Vec<ShapeJson>,
    },
    Obj {
        file: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsgOpJson {
    Union,
    Intersection,
    Difference,
}

impl From<CsgOpJson> for CsgOp {
    fn from(op: CsgOpJson) -> CsgOp {
        match op {
            CsgOpJson::Union => CsgOp::Union,
            CsgOpJson::Intersection => CsgOp::Intersection,
            CsgOpJson::Difference => CsgOp::Difference,
        }
    }
}

impl ShapeJson {
    fn build(self, base: &Path) -> Result<Shape, SceneError> {
        let transform = compose(&self.transform, "shape")?;

        let mut shape = match self.kind {
            ShapeKindJson::Sphere => Shape::sphere(),
            ShapeKindJson::Plane => Shape::plane(),
            ShapeKindJson::Cube => Shape::cube(),
            ShapeKindJson::Cylinder { minimum, maximum, closed } => {
                let (min, max) = limits(minimum, maximum);
                if closed { Shape::capped_cylinder(min, max) } else { Shape::bounded_cylinder(min, max) }
            }
            ShapeKindJson::Cone { minimum, maximum, closed } => {
                let (min, max) = limits(minimum, maximum);
                if closed { Shape::capped_cone(min, max) } else { Shape::bounded_cone(min, max) }
            }
            ShapeKindJson::Triangle { p1, p2, p3 } => Shape::triangle(point(p1), point(p2), point(p3)),
            ShapeKindJson::SmoothTriangle { p1, p2, p3, n1, n2, n3 } => Shape::smooth_triangle(
                point(p1), point(p2), point(p3),
                vector(n1), vector(n2), vector(n3),
            ),
            ShapeKindJson::Group { children } => {
                let mut group = Shape::group();
                for child in children {
                    group.add_child(child.build(base)?);
                }
                group
            }
            ShapeKindJson::Csg { operation, children } => {
                if children.len() != 2 {
                    return Err(SceneError::CsgOperands(children.len()));
                }

                let mut operands = children.into_iter();
                let (left, right) = match (operands.next(), operands.next()) {
                    (Some(l), Some(r)) => (l.build(base)?, r.build(base)?),
                    _ => return Err(SceneError::CsgOperands(0)),
                };
                Shape::csg(operation.into(), left, right)
            }
            ShapeKindJson::Obj { file } => {
                let path = base.join(file);
                match ObjParser::parse_file(&path) {
                    Ok(obj) => obj.into_group(),
                    Err(source) => return Err(SceneError::Obj { path, source }),
                }
            }
        };

        if let Some(material) = self.material {
            shape.set_material(material.build(base)?);
        }
        shape.set_transform(transform);

        Ok(shape)
    }
}

fn limits(minimum: Option<f64>, maximum: Option<f64>) -> (f64, f64) {
    (minimum.unwrap_or(f64::NEG_INFINITY), maximum.unwrap_or(f64::INFINITY))
}

/// Material overrides. Unset fields keep the preset's (or the default
/// material's) values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialJson {
    pub preset: Option<String>,
    pub color: Option<[f64; 3]>,
    pub pattern: Option<PatternJson>,

    pub ambient: Option<f64>,
    pub diffuse: Option<f64>,
    pub specular: Option<f64>,
    pub shininess: Option<f64>,

    pub reflective: Option<f64>,
    pub transparency: Option<f64>,
    pub refractive_index: Option<f64>,
}

impl MaterialJson {
    fn build(self, base: &Path) -> Result<Material, SceneError> {
        let mut m = match self.preset.as_deref() {
            None => Material::default(),
            Some("glass") => Material::transparent(GLASS_RI),
            Some("water") => Material::transparent(WATER_RI),
            Some("diamond") => Material::transparent(DIAMOND_RI),
            Some("air") => Material::transparent(AIR_RI),
            Some("vacuum") => Material::transparent(VACUUM_RI),
            Some(other) => return Err(SceneError::UnknownPreset(other.to_string())),
        };

        if let Some(c) = self.color {
            m.color = Color::from(c);
        }
        if let Some(p) = self.pattern {
            m.pattern = Some(p.build(base)?);
        }

        let fields = [
            (self.ambient, &mut m.ambient),
            (self.diffuse, &mut m.diffuse),
            (self.specular, &mut m.specular),
            (self.shininess, &mut m.shininess),
            (self.reflective, &mut m.reflective),
            (self.transparency, &mut m.transparency),
            (self.refractive_index, &mut m.refractive_index),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }

        Ok(m)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternJson {
    #[serde(flatten)]
    pub kind: PatternKindJson,
    #[serde(default)]
    pub transform: Vec<TransformJson>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternKindJson {
    Solid { color: [f64; 3] },
    Stripe { a: [f64; 3], b: [f64; 3] },
    Gradient { a: [f64; 3], b: [f64; 3] },
    Ring { a: [f64; 3], b: [f64; 3] },
    Checker { a: [f64; 3], b: [f64; 3] },
    Map { mapping: UvMapJson, texture: TextureJson },
    CubeMap {
        left: TextureJson,
        front: TextureJson,
        right: TextureJson,
        back: TextureJson,
        up: TextureJson,
        down: TextureJson,
    },
    Chain { patterns: Vec<PatternJson> },
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UvMapJson {
    Spherical,
    Planar,
    Cylindrical,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureJson {
    Checkers { width: f64, height: f64, a: [f64; 3], b: [f64; 3] },
    AlignCheck { main: [f64; 3], ul: [f64; 3], ur: [f64; 3], bl: [f64; 3], br: [f64; 3] },
    Image { file: PathBuf },
}

impl PatternJson {
    fn build(self, base: &Path) -> Result<Pattern, SceneError> {
        let transform = compose(&self.transform, "pattern")?;
        let c = Color::from;

        let pattern = match self.kind {
            PatternKindJson::Solid { color } => Pattern::solid(c(color)),
            PatternKindJson::Stripe { a, b } => Pattern::stripe(c(a), c(b)),
            PatternKindJson::Gradient { a, b } => Pattern::gradient(c(a), c(b)),
            PatternKindJson::Ring { a, b } => Pattern::ring(c(a), c(b)),
            PatternKindJson::Checker { a, b } => Pattern::checker(c(a), c(b)),
            PatternKindJson::Map { mapping, texture } => {
                let map = match mapping {
                    UvMapJson::Spherical => UvMap::Spherical,
                    UvMapJson::Planar => UvMap::Planar,
                    UvMapJson::Cylindrical => UvMap::Cylindrical,
                };
                Pattern::uv(map, texture.build(base)?)
            }
            PatternKindJson::CubeMap { left, front, right, back, up, down } => Pattern::cube_map([
                left.build(base)?,
                front.build(base)?,
                right.build(base)?,
                back.build(base)?,
                up.build(base)?,
                down.build(base)?,
            ]),
            PatternKindJson::Chain { patterns } => Pattern::chain(
                patterns
                    .into_iter()
                    .map(|p| p.build(base))
                    .collect::<Result<Vec<Pattern>, SceneError>>()?,
            ),
        };

        Ok(pattern.with_transform(transform))
    }
}

impl TextureJson {
    fn build(self, base: &Path) -> Result<UvTexture, SceneError> {
        Ok(match self {
            TextureJson::Checkers { width, height, a, b } => UvTexture::Checkers {
                width,
                height,
                a: Color::from(a),
                b: Color::from(b),
            },
            TextureJson::AlignCheck { main, ul, ur, bl, br } => UvTexture::AlignCheck {
                main: Color::from(main),
                ul: Color::from(ul),
                ur: Color::from(ur),
                bl: Color::from(bl),
                br: Color::from(br),
            },
            TextureJson::Image { file } => {
                let path = base.join(file);
                match Canvas::load(&path) {
                    Ok(canvas) => UvTexture::Image(Arc::new(canvas)),
                    Err(source) => return Err(SceneError::Texture { path, source }),
                }
            }
        })
    }
}

fn point([x, y, z]: [f64; 3]) -> Tuple {
    Tuple::point(x, y, z)
}

fn vector([x, y, z]: [f64; 3]) -> Tuple {
    Tuple::vector(x, y, z)
}

#[cfg(test)]
const EXAMPLE: &str = r#"{
  "camera": { "width": 400, "height": 200, "field_of_view": 1.0472,
              "from": [0, 1.5, -5], "to": [0, 1, 0], "up": [0, 1, 0] },
  "lights": [ { "position": [-10, 10, -10], "intensity": [1, 1, 1] } ],
  "shapes": [ { "type": "sphere", "transform": [ { "translate": [0, 1, 0] } ],
                "material": { "color": [1, 0.2, 1], "diffuse": 0.7 } } ],
  "divide_threshold": 4
}"#;

#[cfg(test)]
fn scene_with_shapes(shapes: &str) -> Result<Scene, SceneError> {
    let text = format!(
        r#"{{ "camera": {{ "width": 10, "height": 10, "field_of_view": 1.0,
              "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] }},
              "shapes": {} }}"#,
        shapes
    );
    Scene::from_json_str(&text)
}

#[test]
fn loading_example_scene() {
    let scene = Scene::from_json_str(EXAMPLE).unwrap();

    assert_eq!((scene.camera.hsize, scene.camera.vsize), (400, 200));
    assert_eq!(scene.divide_threshold, 4);
    assert_eq!(scene.max_depth, DEFAULT_RECURSION_DEPTH);
    assert_eq!(
        *scene.camera.transform(),
        Matrix::view_transform(Tuple::point(0.0, 1.5, -5.0), Tuple::point(0.0, 1.0, 0.0), Tuple::vector(0.0, 1.0, 0.0))
    );

    assert_eq!(scene.world.lights, vec![PointLight::new(Color::white(), Tuple::point(-10.0, 10.0, -10.0))]);

    let sphere = &scene.world.objects()[0];
    assert_eq!(*sphere.transform(), Matrix::translation(0.0, 1.0, 0.0));
    assert_eq!(sphere.material.color, Color::rgb(1.0, 0.2, 1.0));
    assert_eq!(sphere.material.diffuse, 0.7);
    assert_eq!(sphere.material.specular, 0.9);
}

#[test]
fn transforms_apply_in_listed_order() {
    let scene = scene_with_shapes(
        r#"[ { "type": "cube", "transform": [ { "scale": [2, 2, 2] }, { "translate": [1, 0, 0] },
              { "rotate_y": 0.5 } ] } ]"#,
    ).unwrap();

    let expected = Matrix::rotation_y(0.5) * Matrix::translation(1.0, 0.0, 0.0) * Matrix::scaling(2.0, 2.0, 2.0);
    assert_eq!(*scene.world.objects()[0].transform(), expected);
}

#[test]
fn nested_groups_and_csg() {
    let scene = scene_with_shapes(
        r#"[ { "type": "group", "children": [
               { "type": "csg", "operation": "difference",
                 "children": [ { "type": "cube" },
                               { "type": "sphere", "transform": [ { "scale": [1.3, 1.3, 1.3] } ] } ] },
               { "type": "cylinder", "minimum": 0, "maximum": 2, "closed": true },
               { "type": "cone" } ] } ]"#,
    ).unwrap();

    let group = &scene.world.objects()[0];
    assert_eq!(group.children().len(), 3);

    let (left, right) = group.children()[0].operands().unwrap();
    assert_eq!(*left, Shape::cube());
    assert_eq!(right.parent(), Some(group.children()[0].id()));

    assert_eq!(group.children()[1], Shape::capped_cylinder(0.0, 2.0));
    assert_eq!(group.children()[2], Shape::cone());
}

#[test]
fn presets_and_patterns() {
    let scene = scene_with_shapes(
        r#"[ { "type": "plane", "material": { "preset": "water", "reflective": 0.3,
               "pattern": { "type": "checker", "a": [1, 1, 1], "b": [0, 0, 0],
                            "transform": [ { "scale": [0.5, 0.5, 0.5] } ] } } },
             { "type": "sphere", "material": { "pattern": { "type": "map", "mapping": "spherical",
               "texture": { "type": "checkers", "width": 16, "height": 8, "a": [0, 0, 0], "b": [1, 1, 1] } } } } ]"#,
    ).unwrap();

    let plane = &scene.world.objects()[0].material;
    assert_eq!((plane.transparency, plane.refractive_index, plane.reflective), (1.0, WATER_RI, 0.3));
    let expected = Pattern::checker(Color::white(), Color::black())
        .with_transform(Matrix::scaling(0.5, 0.5, 0.5));
    assert_eq!(plane.pattern, Some(expected));

    let sphere = &scene.world.objects()[1].material;
    let texture = UvTexture::Checkers { width: 16.0, height: 8.0, a: Color::black(), b: Color::white() };
    assert_eq!(sphere.pattern, Some(Pattern::uv(UvMap::Spherical, texture)));
}

#[test]
fn group_material_reaches_children() {
    let scene = scene_with_shapes(
        r#"[ { "type": "group", "material": { "preset": "glass" },
               "children": [ { "type": "sphere" } ] } ]"#,
    ).unwrap();

    assert_eq!(scene.world.objects()[0].children()[0].material, Material::glass());
}

#[test]
fn obj_models_load_relative_to_scene() {
    let dir = std::env::temp_dir().join(format!("whitted-scene-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("tri.obj"), "v 0 1 0\nv -1 0 0\nv 1 0 0\nf 1 2 3\n").unwrap();
    fs::write(dir.join("scene.json"), r#"{
        "camera": { "width": 4, "height": 4, "field_of_view": 1.0,
                    "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0] },
        "shapes": [ { "type": "obj", "file": "tri.obj" } ] }"#).unwrap();

    let scene = Scene::load(dir.join("scene.json")).unwrap();
    let model = &scene.world.objects()[0];
    assert_eq!(model.children().len(), 1);
    assert_eq!(model.children()[0].children().len(), 1);

    let missing = scene_with_shapes(r#"[ { "type": "obj", "file": "/nonexistent/model.obj" } ]"#);
    assert!(matches!(missing, Err(SceneError::Obj { .. })));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn invalid_scenes_are_rejected() {
    let singular = scene_with_shapes(r#"[ { "type": "sphere", "transform": [ { "scale": [0, 1, 1] } ] } ]"#);
    assert!(matches!(singular, Err(SceneError::SingularTransform("shape"))));

    let one_operand = scene_with_shapes(r#"[ { "type": "csg", "operation": "union", "children": [ { "type": "cube" } ] } ]"#);
    assert!(matches!(one_operand, Err(SceneError::CsgOperands(1))));

    let unknown = scene_with_shapes(r#"[ { "type": "teapot" } ]"#);
    assert!(matches!(unknown, Err(SceneError::Json(_))));

    let preset = scene_with_shapes(r#"[ { "type": "cube", "material": { "preset": "cheese" } } ]"#);
    assert!(matches!(preset, Err(SceneError::UnknownPreset(_))));

    let camera = Scene::from_json_str(
        r#"{ "camera": { "width": 1, "height": 1, "field_of_view": 1.0,
              "from": [0, 0, 0], "to": [0, 1, 0], "up": [0, 1, 0] } }"#,
    );
    assert!(matches!(camera, Err(SceneError::SingularTransform("camera"))));

    let looking_at_itself = Scene::from_json_str(
        r#"{ "camera": { "width": 1, "height": 1, "field_of_view": 1.0,
              "from": [0, 1, 0], "to": [0, 1, 0], "up": [0, 1, 0] } }"#,
    );
    assert!(matches!(looking_at_itself, Err(SceneError::SingularTransform("camera"))));
}
