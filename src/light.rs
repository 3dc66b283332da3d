use crate::color::Color;
use crate::consts::{ GLASS_RI, VACUUM_RI };
use crate::pattern::Pattern;
use crate::shape::Shape;
use crate::tuple::Tuple;

/// A point light: a position and the color it emits.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple,
}

impl PointLight {
    /// Creates a point light.
    ///
    /// If `position` isn't a point, it is converted to a point automatically.
    pub fn new(intensity: Color, mut position: Tuple) -> PointLight {
        if !position.is_point() {
            position.w = 1.0;
        }

        PointLight { intensity, position }
    }
}

/// Surface attributes for the Phong model, plus how much the surface
/// reflects and lets light through.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub pattern: Option<Pattern>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub transparency: f64,
    pub refractive_index: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::white(),
            pattern: None,

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,

            reflective: 0.0,
            transparency: 0.0,
            refractive_index: VACUUM_RI,
        }
    }
}

impl Material {
    /// A fully transparent material with the given refractive index.
    pub fn transparent(refractive_index: f64) -> Material {
        Material {
            transparency: 1.0,
            refractive_index,
            ..Default::default()
        }
    }

    pub fn glass() -> Material {
        Material::transparent(GLASS_RI)
    }
}

/// Phong shading of `point` on `object` under one light.
///
/// `point` is in world space; the material's pattern, if any, is evaluated
/// through the object's hierarchy. When `in_shadow` is set only the ambient
/// term contributes.
pub fn lighting(m: &Material, object: &Shape, light: &PointLight,
    point: Tuple, eyev: Tuple, normalv: Tuple, in_shadow: bool) -> Color {
    let color = match m.pattern {
        Some(ref pattern) => pattern.pattern_at_shape(object, point),
        None => m.color,
    };

    let effective_color = color.hadamard(&light.intensity);
    let lightv = (light.position - point).normalize();
    let ambient = effective_color * m.ambient;

    if in_shadow {
        return ambient;
    }

    // Light on the far side of the surface, or grazing it
    let light_dot_normal = lightv.dot(&normalv);
    if light_dot_normal <= 0.0 {
        return ambient;
    }

    let diffuse = effective_color * m.diffuse * light_dot_normal;

    let reflectv = (-lightv).reflect(&normalv);
    let reflect_dot_eye = reflectv.dot(&eyev);
    let specular = if reflect_dot_eye <= 0.0 {
        Color::black()
    } else {
        light.intensity * m.specular * reflect_dot_eye.powf(m.shininess)
    };

    ambient + diffuse + specular
}

#[cfg(test)]
fn light_at(x: f64, y: f64, z: f64) -> PointLight {
    PointLight::new(Color::white(), Tuple::point(x, y, z))
}

#[test]
fn default_and_glass_materials() {
    let m = Material::default();
    assert_eq!(m.color, Color::white());
    assert_eq!((m.ambient, m.diffuse, m.specular, m.shininess), (0.1, 0.9, 0.9, 200.0));
    assert_eq!((m.reflective, m.transparency, m.refractive_index), (0.0, 0.0, 1.0));

    let g = Material::glass();
    assert_eq!((g.transparency, g.refractive_index), (1.0, 1.5));
}

#[test]
fn light_position_becomes_point() {
    let l = PointLight::new(Color::white(), Tuple::vector(1.0, 2.0, 3.0));
    assert!(l.position.is_point());
}

#[test]
fn eye_between_light_and_surface() {
    let s = Shape::sphere();
    let eyev = Tuple::vector(0.0, 0.0, -1.0);
    let normalv = Tuple::vector(0.0, 0.0, -1.0);

    let res = lighting(&s.material, &s, &light_at(0.0, 0.0, -10.0), Tuple::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_offset_45_degrees() {
    let s = Shape::sphere();
    let h = 2f64.sqrt() / 2.0;
    let normalv = Tuple::vector(0.0, 0.0, -1.0);

    let res = lighting(&s.material, &s, &light_at(0.0, 0.0, -10.0), Tuple::origin(),
        Tuple::vector(0.0, h, h), normalv, false);
    assert_eq!(res, Color::rgb(1.0, 1.0, 1.0));

    let res = lighting(&s.material, &s, &light_at(0.0, 10.0, -10.0), Tuple::origin(),
        Tuple::vector(0.0, 0.0, -1.0), normalv, false);
    assert_eq!(res, Color::rgb(0.7364, 0.7364, 0.7364));

    let res = lighting(&s.material, &s, &light_at(0.0, 10.0, -10.0), Tuple::origin(),
        Tuple::vector(0.0, -h, -h), normalv, false);
    assert_eq!(res, Color::rgb(1.6364, 1.6364, 1.6364));
}

#[test]
fn light_behind_surface_or_shadowed_is_ambient() {
    let s = Shape::sphere();
    let eyev = Tuple::vector(0.0, 0.0, -1.0);
    let normalv = Tuple::vector(0.0, 0.0, -1.0);

    let behind = lighting(&s.material, &s, &light_at(0.0, 0.0, 10.0), Tuple::origin(), eyev, normalv, false);
    assert_eq!(behind, Color::rgb(0.1, 0.1, 0.1));

    let shadowed = lighting(&s.material, &s, &light_at(0.0, 0.0, -10.0), Tuple::origin(), eyev, normalv, true);
    assert_eq!(shadowed, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn grazing_light_is_ambient() {
    let s = Shape::sphere();
    let eyev = Tuple::vector(-1.0, 0.0, 0.0);
    let normalv = Tuple::vector(0.0, 0.0, -1.0);

    let res = lighting(&s.material, &s, &light_at(10.0, 0.0, 0.0), Tuple::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn lighting_with_stripe_pattern() {
    let m = Material {
        pattern: Some(Pattern::stripe(Color::white(), Color::black())),
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        ..Default::default()
    };
    let s = Shape::sphere();
    let eyev = Tuple::vector(0.0, 0.0, -1.0);
    let normalv = Tuple::vector(0.0, 0.0, -1.0);
    let light = light_at(0.0, 0.0, -10.0);

    assert_eq!(lighting(&m, &s, &light, Tuple::point(0.9, 0.0, 0.0), eyev, normalv, false), Color::white());
    assert_eq!(lighting(&m, &s, &light, Tuple::point(1.1, 0.0, 0.0), eyev, normalv, false), Color::black());
}
