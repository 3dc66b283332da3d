use crate::color::Color;
use crate::intersect::{ Computations, Intersections };
use crate::light::{ PointLight, Material, lighting };
use crate::matrix::Matrix;
use crate::ray::Ray;
use crate::shape::{ Shape, ShapeId, intersect };
use crate::tuple::Tuple;

/// A world with objects and lights.
///
/// The world owns its top-level shapes. Adding a shape detaches it from any
/// parent and numbers it, and all of its descendants, from the world's own
/// counter, so the same scene always gets the same ids.
#[derive(Debug)]
pub struct World {
    objects: Vec<Shape>,
    pub lights: Vec<PointLight>,
    next_id: u64,
}

/// The classic test world: two concentric spheres lit from the upper left.
impl Default for World {
    fn default() -> World {
        let light = PointLight::new(Color::white(), Tuple::point(-10.0, 10.0, -10.0));

        let mut outer = Shape::sphere();
        outer.set_material(Material {
            color: Color::rgb(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        });

        let mut inner = Shape::sphere();
        inner.set_transform(Matrix::scaling(0.5, 0.5, 0.5));

        World::new(vec![light], vec![outer, inner])
    }
}

impl World {
    pub fn new(lights: Vec<PointLight>, shapes: Vec<Shape>) -> World {
        let mut world = World { objects: Vec::new(), lights, next_id: 0 };
        for shape in shapes {
            world.add_object(shape);
        }

        world
    }

    pub fn add_object(&mut self, mut shape: Shape) {
        let next_id = &mut self.next_id;
        shape.make_root(&mut || {
            *next_id += 1;
            ShapeId(*next_id)
        });

        self.objects.push(shape);
    }

    pub fn objects(&self) -> &[Shape] {
        &self.objects
    }

    /// Mutable access to the top-level shapes. Shapes can be changed in
    /// place but not added or removed.
    pub fn objects_mut(&mut self) -> &mut [Shape] {
        &mut self.objects
    }

    /// Builds a bounding volume hierarchy inside every top-level object.
    pub fn divide(&mut self, threshold: usize) {
        for object in self.objects.iter_mut() {
            object.divide(threshold);
        }

        log::info!("divided {} top-level objects with threshold {}", self.objects.len(), threshold);
    }

    /// Intersects a ray with every object, sorted by `t`.
    pub fn intersect(&self, ray: &Ray) -> Intersections<'_> {
        Intersections::aggregate(self.objects.iter().map(|o| intersect(o, ray)).collect())
    }

    /// Whether anything lies between `point` and `light`.
    pub fn is_shadowed(&self, point: Tuple, light: &PointLight) -> bool {
        let v = light.position - point;
        let distance = v.magnitude();

        let ray = Ray::new(point, v.normalize());
        match self.intersect(&ray).hit() {
            Some(hit) => hit.t < distance,
            None => false,
        }
    }

    /// Color at a prepared hit: Phong lighting from every light, plus
    /// reflection and refraction with `depth` bounces left.
    pub fn shade_hit(&self, comps: &Computations, depth: usize) -> Color {
        let material = &comps.object.material;

        // Fresnel mix for surfaces that both reflect and refract
        let (reflectance, refractance) = if material.reflective > 0.0 && material.transparency > 0.0 {
            let r = comps.schlick();
            (r, 1.0 - r)
        } else {
            (1.0, 1.0)
        };

        let mut color = Color::black();
        for light in self.lights.iter() {
            let shadowed = self.is_shadowed(comps.over_point, light);
            color += lighting(material, comps.object, light,
                comps.over_point, comps.eyev, comps.normalv, shadowed);
            color += self.reflected_color(comps, depth) * reflectance;
            color += self.refracted_color(comps, depth) * refractance;
        }

        color
    }

    /// Traces `ray` into the world. Misses are black.
    pub fn color_at(&self, ray: &Ray, depth: usize) -> Color {
        let xs = self.intersect(ray);

        match xs.hit() {
            Some(hit) => {
                let comps = Computations::new(ray, hit, Some(&xs));
                self.shade_hit(&comps, depth)
            }
            None => Color::black(),
        }
    }

    /// Color seen along the reflection of the eye ray, scaled by how
    /// reflective the surface is.
    ///
    /// Nonreflective surfaces and an exhausted `depth` contribute black, which
    /// is what stops two facing mirrors from recursing forever.
    pub fn reflected_color(&self, comps: &Computations, depth: usize) -> Color {
        let reflective = comps.object.material.reflective;
        if reflective == 0.0 || depth < 1 {
            return Color::black();
        }

        let ray = Ray::new(comps.over_point, comps.reflectv);
        self.color_at(&ray, depth - 1) * reflective
    }

    /// Color seen through a transparent surface, bent by Snell's law between
    /// `n1` and `n2` and scaled by the transparency.
    ///
    /// Black for opaque surfaces, an exhausted `depth`, or total internal
    /// reflection (when `sin^2` of the refracted angle exceeds one).
    pub fn refracted_color(&self, comps: &Computations, depth: usize) -> Color {
        let transparency = comps.object.material.transparency;
        if transparency == 0.0 || depth < 1 {
            return Color::black();
        }

        // Snell's law
        let n_ratio = comps.n1 / comps.n2;
        let cos_i = comps.eyev.dot(&comps.normalv);
        let sin2_t = n_ratio * n_ratio * (1.0 - cos_i * cos_i);
        if sin2_t > 1.0 {
            return Color::black();
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normalv * (n_ratio * cos_i - cos_t) - comps.eyev * n_ratio;

        let ray = Ray::new(comps.under_point, direction);
        self.color_at(&ray, depth - 1) * transparency
    }
}

#[cfg(test)]
use crate::intersect::Intersection;

#[cfg(test)]
fn assert_near(actual: Color, expected: Color) {
    let close = (actual.r - expected.r).abs() < 1e-4
        && (actual.g - expected.g).abs() < 1e-4
        && (actual.b - expected.b).abs() < 1e-4;
    assert!(close, "{:?} != {:?}", actual, expected);
}

#[cfg(test)]
fn slanted_ray() -> Ray {
    let h = 2f64.sqrt() / 2.0;
    Ray::new(Tuple::point(0.0, 0.0, -3.0), Tuple::vector(0.0, -h, h))
}

#[test]
fn default_world_contents() {
    let w = World::default();

    assert_eq!(w.lights, vec![PointLight::new(Color::white(), Tuple::point(-10.0, 10.0, -10.0))]);
    assert_eq!(w.objects().len(), 2);
    assert_eq!(w.objects()[0].material.color, Color::rgb(0.8, 1.0, 0.6));
    assert_eq!(*w.objects()[1].transform(), Matrix::scaling(0.5, 0.5, 0.5));
}

#[test]
fn ids_are_deterministic() {
    let build = || {
        let mut g = Shape::group();
        g.add_child(Shape::sphere());
        World::new(Vec::new(), vec![Shape::plane(), g])
    };
    let (a, b) = (build(), build());

    let ids = |w: &World| vec![
        w.objects()[0].id(),
        w.objects()[1].id(),
        w.objects()[1].children()[0].id(),
    ];
    assert_eq!(ids(&a), ids(&b));
    assert_eq!(ids(&a), vec![ShapeId(1), ShapeId(2), ShapeId(3)]);
    assert_eq!(a.objects()[1].children()[0].parent(), Some(ShapeId(2)));
    assert_eq!(a.objects()[0].parent(), None);
}

#[test]
fn intersect_default_world() {
    let w = World::default();
    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    let xs = w.intersect(&r);

    let ts: Vec<f64> = xs.iter().map(|i| i.t).collect();
    assert_eq!(ts, vec![4.0, 4.5, 5.5, 6.0]);
}

#[test]
fn shading_from_outside_and_inside() {
    let w = World::default();
    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(4.0, &w.objects()[0]);
    let comps = Computations::new(&r, &i, None);
    assert_near(w.shade_hit(&comps, 5), Color::rgb(0.38066, 0.47583, 0.2855));

    let mut w = World::default();
    w.lights = vec![PointLight::new(Color::white(), Tuple::point(0.0, 0.25, 0.0))];
    let r = Ray::new(Tuple::point(0.0, 0.0, 0.0), Tuple::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(0.5, &w.objects()[1]);
    let comps = Computations::new(&r, &i, None);
    assert_near(w.shade_hit(&comps, 5), Color::rgb(0.90498, 0.90498, 0.90498));
}

#[test]
fn shading_in_shadow() {
    let mut s2 = Shape::sphere();
    s2.set_transform(Matrix::translation(0.0, 0.0, 10.0));
    let light = PointLight::new(Color::white(), Tuple::point(0.0, 0.0, -10.0));
    let w = World::new(vec![light], vec![Shape::sphere(), s2]);

    let r = Ray::new(Tuple::point(0.0, 0.0, 5.0), Tuple::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(4.0, &w.objects()[1]);
    let comps = Computations::new(&r, &i, None);

    assert_eq!(w.shade_hit(&comps, 5), Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn every_light_contributes() {
    let mut w = World::default();
    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    let one = w.color_at(&r, 5);

    let light = w.lights[0];
    w.lights.push(light);
    assert_near(w.color_at(&r, 5), one * 2.0);
}

#[test]
fn color_at_miss_hit_and_behind() {
    let w = World::default();
    let miss = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 1.0, 0.0));
    assert_eq!(w.color_at(&miss, 5), Color::black());

    let hit = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    assert_near(w.color_at(&hit, 5), Color::rgb(0.38066, 0.47583, 0.2855));

    let mut w = World::default();
    for object in w.objects_mut() {
        object.material.ambient = 1.0;
    }
    let inside = Ray::new(Tuple::point(0.0, 0.0, 0.75), Tuple::vector(0.0, 0.0, -1.0));
    assert_eq!(w.color_at(&inside, 5), w.objects()[1].material.color);
}

#[test]
fn shadow_queries() {
    let w = World::default();
    let light = w.lights[0];

    assert!(!w.is_shadowed(Tuple::point(0.0, 10.0, 0.0), &light));
    assert!(w.is_shadowed(Tuple::point(10.0, -10.0, 10.0), &light));
    assert!(!w.is_shadowed(Tuple::point(-20.0, 20.0, -20.0), &light));
    assert!(!w.is_shadowed(Tuple::point(-2.0, 2.0, -2.0), &light));
}

#[test]
fn reflected_color_of_nonreflective_surface_is_black() {
    let mut w = World::default();
    w.objects_mut()[1].material.ambient = 1.0;

    let r = Ray::new(Tuple::point(0.0, 0.0, 0.0), Tuple::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(1.0, &w.objects()[1]);
    let comps = Computations::new(&r, &i, None);

    assert_eq!(w.reflected_color(&comps, 5), Color::black());
}

#[cfg(test)]
fn world_with_mirror_floor() -> World {
    let mut w = World::default();
    let mut floor = Shape::plane();
    floor.material.reflective = 0.5;
    floor.set_transform(Matrix::translation(0.0, -1.0, 0.0));
    w.add_object(floor);
    w
}

#[test]
fn reflected_color_of_reflective_surface() {
    let w = world_with_mirror_floor();
    let r = slanted_ray();
    let i = Intersection::new(2f64.sqrt(), &w.objects()[2]);
    let comps = Computations::new(&r, &i, None);

    assert_near(w.reflected_color(&comps, 5), Color::rgb(0.19033, 0.23791, 0.14274));
    assert_near(w.shade_hit(&comps, 5), Color::rgb(0.87676, 0.92435, 0.82918));
    assert_eq!(w.reflected_color(&comps, 0), Color::black());
}

#[test]
fn mutual_reflection_terminates() {
    let mut lower = Shape::plane();
    lower.material.reflective = 1.0;
    lower.set_transform(Matrix::translation(0.0, -1.0, 0.0));

    let mut upper = Shape::plane();
    upper.material.reflective = 1.0;
    upper.set_transform(Matrix::translation(0.0, 1.0, 0.0));

    let light = PointLight::new(Color::white(), Tuple::origin());
    let w = World::new(vec![light], vec![lower, upper]);

    let r = Ray::new(Tuple::origin(), Tuple::vector(0.0, 1.0, 0.0));
    let c = w.color_at(&r, 5);
    assert!(c.r > 0.0 && c.r.is_finite());
}

#[test]
fn refracted_color_of_opaque_surface_or_exhausted_depth() {
    let mut w = World::default();
    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    {
        let shape = &w.objects()[0];
        let xs = Intersections::from(vec![Intersection::new(4.0, shape), Intersection::new(6.0, shape)]);
        let comps = Computations::new(&r, &xs[0], Some(&xs));
        assert_eq!(w.refracted_color(&comps, 5), Color::black());
    }

    w.objects_mut()[0].set_material(Material::glass());
    let shape = &w.objects()[0];
    let xs = Intersections::from(vec![Intersection::new(4.0, shape), Intersection::new(6.0, shape)]);
    let comps = Computations::new(&r, &xs[0], Some(&xs));
    assert_eq!(w.refracted_color(&comps, 0), Color::black());
}

#[test]
fn total_internal_reflection_is_black() {
    let mut w = World::default();
    w.objects_mut()[0].set_material(Material::glass());

    let h = 2f64.sqrt() / 2.0;
    let r = Ray::new(Tuple::point(0.0, 0.0, h), Tuple::vector(0.0, 1.0, 0.0));
    let shape = &w.objects()[0];
    let xs = Intersections::from(vec![Intersection::new(-h, shape), Intersection::new(h, shape)]);
    let comps = Computations::new(&r, &xs[1], Some(&xs));

    assert_eq!(w.refracted_color(&comps, 5), Color::black());
}

#[cfg(test)]
fn world_with_glass_floor(reflective: f64) -> World {
    let mut w = World::default();

    let mut floor = Shape::plane();
    floor.set_transform(Matrix::translation(0.0, -1.0, 0.0));
    floor.material.reflective = reflective;
    floor.material.transparency = 0.5;
    floor.material.refractive_index = 1.5;
    w.add_object(floor);

    let mut ball = Shape::sphere();
    ball.material.color = Color::red();
    ball.material.ambient = 0.5;
    ball.set_transform(Matrix::translation(0.0, -3.5, -0.5));
    w.add_object(ball);

    w
}

#[test]
fn shading_transparent_floor() {
    let w = world_with_glass_floor(0.0);
    let r = slanted_ray();
    let xs = Intersections::from(vec![Intersection::new(2f64.sqrt(), &w.objects()[2])]);
    let comps = Computations::new(&r, &xs[0], Some(&xs));

    assert_near(w.shade_hit(&comps, 5), Color::rgb(0.93642, 0.68642, 0.68642));
}

#[test]
fn shading_reflective_transparent_floor_uses_schlick() {
    let w = world_with_glass_floor(0.5);
    let r = slanted_ray();
    let xs = Intersections::from(vec![Intersection::new(2f64.sqrt(), &w.objects()[2])]);
    let comps = Computations::new(&r, &xs[0], Some(&xs));

    assert_near(w.shade_hit(&comps, 5), Color::rgb(0.93391, 0.69643, 0.69243));
}

#[test]
fn dividing_world_keeps_colors() {
    let mut g = Shape::group();
    for i in 0..5 {
        let mut s = Shape::sphere();
        s.set_transform(Matrix::translation(i as f64 * 3.0 - 6.0, 0.0, 0.0));
        g.add_child(s);
    }
    let light = PointLight::new(Color::white(), Tuple::point(-10.0, 10.0, -10.0));
    let mut w = World::new(vec![light], vec![g]);

    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    let before = w.color_at(&r, 5);
    w.divide(1);

    assert!(w.objects()[0].children().len() < 5);
    assert_eq!(w.color_at(&r, 5), before);
}
