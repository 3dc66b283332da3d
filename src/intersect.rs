use std::ops::Index;

use crate::consts::{ EPSILON, VACUUM_RI };
use crate::ray::Ray;
use crate::shape::{ CsgOp, Shape, normal_at };
use crate::tuple::Tuple;

/// A ray hitting a shape at distance `t`.
///
/// Smooth triangles also record the barycentric `(u, v)` of the hit so the
/// normal can be interpolated later.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub what: &'a Shape,
    pub uv: Option<(f64, f64)>,
}

/// Two intersections are the same if they hit the same shape at the same `t`.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t && self.what.id() == other.what.id()
    }
}

impl<'a> Intersection<'a> {
    pub fn new(t: f64, what: &'a Shape) -> Intersection<'a> {
        Intersection { t, what, uv: None }
    }

    pub fn new_uv(t: f64, what: &'a Shape, u: f64, v: f64) -> Intersection<'a> {
        Intersection { t, what, uv: Some((u, v)) }
    }
}

/// A list of intersections, always kept sorted by ascending `t`.
#[derive(Clone, Debug, Default)]
pub struct Intersections<'a> {
    intersections: Vec<Intersection<'a>>,
}

impl<'a> From<Vec<Intersection<'a>>> for Intersections<'a> {
    fn from(intersections: Vec<Intersection<'a>>) -> Intersections<'a> {
        let mut xs = Intersections { intersections };
        xs.sort();
        xs
    }
}

impl<'a> Index<usize> for Intersections<'a> {
    type Output = Intersection<'a>;

    fn index(&self, i: usize) -> &Intersection<'a> {
        &self.intersections[i]
    }
}

impl<'a> Intersections<'a> {
    pub fn new() -> Intersections<'a> {
        Intersections { intersections: Vec::new() }
    }

    /// Merges several lists into one sorted list.
    pub fn aggregate(lists: Vec<Intersections<'a>>) -> Intersections<'a> {
        let all: Vec<Intersection<'a>> = lists
            .into_iter()
            .flat_map(|xs| xs.intersections)
            .collect();

        Intersections::from(all)
    }

    /// The visible intersection: the one with the smallest non-negative `t`.
    pub fn hit(&self) -> Option<&Intersection<'a>> {
        self.intersections.iter().find(|i| i.t >= 0.0)
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Intersection<'a>> {
        self.intersections.iter()
    }

    fn sort(&mut self) {
        self.intersections.retain(|i| !i.t.is_nan());
        self.intersections.sort_by(|a, b| a.t.total_cmp(&b.t));
    }
}

/// Whether a hit survives a CSG operation.
///
/// `lhit` says the hit belongs to the left operand; `inl` and `inr` say
/// whether the ray is currently inside the left and right operands.
pub fn intersection_allowed(op: CsgOp, lhit: bool, inl: bool, inr: bool) -> bool {
    match op {
        CsgOp::Union => (lhit && !inr) || (!lhit && !inl),
        CsgOp::Intersection => (lhit && inr) || (!lhit && inl),
        CsgOp::Difference => (lhit && !inr) || (!lhit && inl),
    }
}

/// Keeps the intersections of a CSG's operands that lie on its surface.
///
/// `xs` must be sorted; the result stays sorted.
pub fn filter_intersections<'a>(op: CsgOp, left: &Shape, xs: Intersections<'a>)
    -> Intersections<'a> {
    let mut inl = false;
    let mut inr = false;
    let mut kept = Vec::with_capacity(xs.len());

    for i in xs.intersections {
        let lhit = left.includes(i.what);
        if intersection_allowed(op, lhit, inl, inr) {
            kept.push(i);
        }

        if lhit {
            inl = !inl;
        } else {
            inr = !inr;
        }
    }

    Intersections { intersections: kept }
}

/// Everything the shading code needs to know about a hit.
#[derive(Clone, Debug)]
pub struct Computations<'a> {
    pub t: f64,
    pub object: &'a Shape,

    pub point: Tuple,

    /// `point` nudged along the normal, for shadow and reflection rays.
    pub over_point: Tuple,

    /// `point` nudged against the normal, for refraction rays.
    pub under_point: Tuple,

    pub eyev: Tuple,
    pub normalv: Tuple,
    pub reflectv: Tuple,

    /// The hit was on the inside of the surface; `normalv` has been flipped.
    pub inside: bool,

    /// Refractive index of the material being exited.
    pub n1: f64,

    /// Refractive index of the material being entered.
    pub n2: f64,
}

impl<'a> Computations<'a> {
    /// Prepares shading state for `hit` along `ray`.
    ///
    /// When the full intersection list `xs` is given, `n1` and `n2` are found
    /// by walking it; otherwise both are vacuum.
    pub fn new(ray: &Ray, hit: &Intersection<'a>, xs: Option<&Intersections<'a>>)
        -> Computations<'a> {
        let point = ray.position(hit.t);
        let eyev = -ray.direction;
        let mut normalv = normal_at(hit.what, point, hit);

        let inside = normalv.dot(&eyev) < 0.0;
        if inside {
            normalv = -normalv;
        }

        let (n1, n2) = match xs {
            Some(xs) => refractive_indices(hit, xs),
            None => (VACUUM_RI, VACUUM_RI),
        };

        Computations {
            t: hit.t,
            object: hit.what,
            point,
            over_point: point + normalv * EPSILON,
            under_point: point - normalv * EPSILON,
            eyev,
            normalv,
            reflectv: ray.direction.reflect(&normalv),
            inside,
            n1,
            n2,
        }
    }

    /// Schlick's approximation of the Fresnel reflectance, in `[0, 1]`.
    pub fn schlick(&self) -> f64 {
        let mut cos = self.eyev.dot(&self.normalv);

        if self.n1 > self.n2 {
            let n = self.n1 / self.n2;
            let sin2_t = n * n * (1.0 - cos * cos);
            if sin2_t > 1.0 {
                return 1.0;
            }

            cos = (1.0 - sin2_t).sqrt();
        }

        let r0 = ((self.n1 - self.n2) / (self.n1 + self.n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

/// Walks the sorted list tracking which objects the ray is inside of, and
/// returns the indices on either side of `hit`.
fn refractive_indices(hit: &Intersection, xs: &Intersections) -> (f64, f64) {
    let mut containers: Vec<&Shape> = Vec::new();
    let outermost = |containers: &Vec<&Shape>| {
        containers.last().map_or(VACUUM_RI, |s| s.material.refractive_index)
    };

    for i in xs.iter() {
        let is_hit = i == hit;
        let n1 = outermost(&containers);

        match containers.iter().position(|s| s.id() == i.what.id()) {
            Some(j) => {
                containers.remove(j);
            }
            None => containers.push(i.what),
        }

        if is_hit {
            return (n1, outermost(&containers));
        }
    }

    (VACUUM_RI, VACUUM_RI)
}

#[cfg(test)]
fn glass_sphere() -> Shape {
    let mut s = Shape::sphere();
    s.material = crate::light::Material::glass();
    s
}

#[test]
fn aggregating_sorts_by_t() {
    let s = Shape::sphere();
    let xs = Intersections::aggregate(vec![
        Intersections::from(vec![Intersection::new(2.0, &s), Intersection::new(-1.0, &s)]),
        Intersections::from(vec![Intersection::new(1.0, &s)]),
    ]);

    let ts: Vec<f64> = xs.iter().map(|i| i.t).collect();
    assert_eq!(ts, vec![-1.0, 1.0, 2.0]);
}

#[test]
fn hit_is_lowest_nonnegative() {
    let s = Shape::sphere();

    let xs = Intersections::from(vec![Intersection::new(1.0, &s), Intersection::new(2.0, &s)]);
    assert_eq!(xs.hit().map(|i| i.t), Some(1.0));

    let xs = Intersections::from(vec![Intersection::new(-1.0, &s), Intersection::new(1.0, &s)]);
    assert_eq!(xs.hit().map(|i| i.t), Some(1.0));

    let xs = Intersections::from(vec![Intersection::new(-2.0, &s), Intersection::new(-1.0, &s)]);
    assert!(xs.hit().is_none());

    let xs = Intersections::from(vec![
        Intersection::new(5.0, &s),
        Intersection::new(7.0, &s),
        Intersection::new(-3.0, &s),
        Intersection::new(2.0, &s),
    ]);
    assert_eq!(xs.hit().map(|i| i.t), Some(2.0));
}

#[test]
fn csg_rules() {
    use CsgOp::*;

    // (op, lhit, inl, inr, allowed)
    let table = [
        (Union, true, true, true, false),
        (Union, true, true, false, true),
        (Union, true, false, true, false),
        (Union, true, false, false, true),
        (Union, false, true, true, false),
        (Union, false, true, false, false),
        (Union, false, false, true, true),
        (Union, false, false, false, true),
        (Intersection, true, true, true, true),
        (Intersection, true, true, false, false),
        (Intersection, true, false, true, true),
        (Intersection, true, false, false, false),
        (Intersection, false, true, true, true),
        (Intersection, false, true, false, true),
        (Intersection, false, false, true, false),
        (Intersection, false, false, false, false),
        (Difference, true, true, true, false),
        (Difference, true, true, false, true),
        (Difference, true, false, true, false),
        (Difference, true, false, false, true),
        (Difference, false, true, true, true),
        (Difference, false, true, false, true),
        (Difference, false, false, true, false),
        (Difference, false, false, false, false),
    ];

    for &(op, lhit, inl, inr, expected) in table.iter() {
        assert_eq!(intersection_allowed(op, lhit, inl, inr), expected,
            "{:?} {} {} {}", op, lhit, inl, inr);
    }
}

#[test]
fn filtering_csg_hits() {
    let cases = [
        (CsgOp::Union, 0, 3),
        (CsgOp::Intersection, 1, 2),
        (CsgOp::Difference, 0, 1),
    ];

    for &(op, x0, x1) in cases.iter() {
        let c = Shape::csg(op, Shape::sphere(), Shape::cube());
        let (left, right) = c.operands().unwrap();
        let xs = Intersections::from(vec![
            Intersection::new(1.0, left),
            Intersection::new(2.0, right),
            Intersection::new(3.0, left),
            Intersection::new(4.0, right),
        ]);

        let result = filter_intersections(op, left, xs.clone());
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], xs[x0]);
        assert_eq!(result[1], xs[x1]);
    }
}

#[test]
fn precomputing_outside_and_inside_hits() {
    let shape = Shape::sphere();

    let outside = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    let comps = Computations::new(&outside, &Intersection::new(4.0, &shape), None);
    assert_eq!(comps.point, Tuple::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);

    let inside = Ray::new(Tuple::point(0.0, 0.0, 0.0), Tuple::vector(0.0, 0.0, 1.0));
    let comps = Computations::new(&inside, &Intersection::new(1.0, &shape), None);
    assert_eq!(comps.point, Tuple::point(0.0, 0.0, 1.0));
    assert_eq!(comps.normalv, Tuple::vector(0.0, 0.0, -1.0));
    assert!(comps.inside);
}

#[test]
fn over_and_under_points() {
    use crate::matrix::Matrix;

    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    let mut shape = glass_sphere();
    shape.set_transform(Matrix::translation(0.0, 0.0, 1.0));

    let i = Intersection::new(5.0, &shape);
    let xs = Intersections::from(vec![i]);
    let comps = Computations::new(&r, &i, Some(&xs));

    assert!(comps.over_point.z < -EPSILON / 2.0);
    assert!(comps.point.z > comps.over_point.z);
    assert!(comps.under_point.z > EPSILON / 2.0);
    assert!(comps.point.z < comps.under_point.z);
}

#[test]
fn precomputing_reflection_vector() {
    let shape = Shape::plane();
    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray::new(Tuple::point(0.0, 1.0, -1.0), Tuple::vector(0.0, -h, h));
    let comps = Computations::new(&r, &Intersection::new(2.0f64.sqrt(), &shape), None);

    assert_eq!(comps.reflectv, Tuple::vector(0.0, h, h));
}

#[test]
fn refractive_indices_at_each_boundary() {
    use crate::matrix::Matrix;

    let mut a = glass_sphere();
    a.set_transform(Matrix::scaling(2.0, 2.0, 2.0));
    a.material.refractive_index = 1.5;

    let mut b = glass_sphere();
    b.set_transform(Matrix::translation(0.0, 0.0, -0.25));
    b.material.refractive_index = 2.0;

    let mut c = glass_sphere();
    c.set_transform(Matrix::translation(0.0, 0.0, 0.25));
    c.material.refractive_index = 2.5;

    let r = Ray::new(Tuple::point(0.0, 0.0, -4.0), Tuple::vector(0.0, 0.0, 1.0));
    let xs = Intersections::from(vec![
        Intersection::new(2.0, &a),
        Intersection::new(2.75, &b),
        Intersection::new(3.25, &c),
        Intersection::new(4.75, &b),
        Intersection::new(5.25, &c),
        Intersection::new(6.0, &a),
    ]);

    let expected = [(1.0, 1.5), (1.5, 2.0), (2.0, 2.5), (2.5, 2.5), (2.5, 1.5), (1.5, 1.0)];
    for (i, &(n1, n2)) in expected.iter().enumerate() {
        let comps = Computations::new(&r, &xs[i], Some(&xs));
        assert_eq!((comps.n1, comps.n2), (n1, n2), "index {}", i);
    }
}

#[test]
fn schlick_reflectance() {
    let shape = glass_sphere();
    let h = 2.0f64.sqrt() / 2.0;

    // Total internal reflection.
    let r = Ray::new(Tuple::point(0.0, 0.0, h), Tuple::vector(0.0, 1.0, 0.0));
    let xs = Intersections::from(vec![Intersection::new(-h, &shape), Intersection::new(h, &shape)]);
    let comps = Computations::new(&r, &xs[1], Some(&xs));
    assert_eq!(comps.schlick(), 1.0);

    // Perpendicular.
    let r = Ray::new(Tuple::point(0.0, 0.0, 0.0), Tuple::vector(0.0, 1.0, 0.0));
    let xs = Intersections::from(vec![Intersection::new(-1.0, &shape), Intersection::new(1.0, &shape)]);
    let comps = Computations::new(&r, &xs[1], Some(&xs));
    assert!(crate::feq(comps.schlick(), 0.04));

    // Small angle, n2 > n1.
    let r = Ray::new(Tuple::point(0.0, 0.99, -2.0), Tuple::vector(0.0, 0.0, 1.0));
    let xs = Intersections::from(vec![Intersection::new(1.8589, &shape)]);
    let comps = Computations::new(&r, &xs[0], Some(&xs));
    assert!((comps.schlick() - 0.48873).abs() < 1e-4);
}
