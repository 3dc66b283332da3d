use std::sync::atomic::{ AtomicU64, Ordering };

use crate::bounds::{ Bounds, check_axis };
use crate::consts::EPSILON;
use crate::geometry::{ TriangleInfo, SmoothTriangleInfo };
use crate::intersect::{ Intersection, Intersections, filter_intersections };
use crate::light::Material;
use crate::matrix::Matrix;
use crate::ray::Ray;
use crate::tuple::Tuple;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies a shape node. CSG membership and the refraction stack compare
/// shapes by id, never by value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u64);

impl ShapeId {
    fn fresh() -> ShapeId {
        ShapeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CsgOp {
    Union,
    Intersection,
    Difference,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    /// A unit sphere centred on the object-space origin.
    Sphere,

    /// The infinite `y = 0` plane.
    Plane,

    /// The axis-aligned cube spanning `[-1, 1]` on every axis.
    Cube,

    /// A unit-radius cylinder around the Y axis, cut at `minimum` and
    /// `maximum` (exclusive) and optionally capped.
    Cylinder { minimum: f64, maximum: f64, closed: bool },

    /// A double-napped cone `x^2 + z^2 = y^2`, cut like a cylinder.
    Cone { minimum: f64, maximum: f64, closed: bool },

    Triangle(TriangleInfo),
    SmoothTriangle(SmoothTriangleInfo),

    Group(Vec<Shape>),
    Csg(CsgOp, Box<Shape>, Box<Shape>),
}

/// A renderable shape.
///
/// Containers (groups and CSG nodes) own their children by value. Each child
/// remembers its parent's id and caches the inverse of its full
/// world-to-object transform, so hits deep in a hierarchy never need to walk
/// back up the tree. The caches are refreshed at the few mutation points
/// (`set_transform`, `add_child`, `divide`) which keeps a built scene
/// read-only and shareable across render threads.
#[derive(Debug)]
pub struct Shape {
    id: ShapeId,
    parent: Option<ShapeId>,
    kind: ShapeKind,
    pub material: Material,

    transform: Matrix,
    inverse: Matrix,

    /// Inverse of the product of every ancestor transform.
    parent_inverse: Matrix,
    world_inverse: Matrix,
    world_inverse_transpose: Matrix,

    /// Object-space bounds.
    bounds: Bounds,
}

/// Shapes compare structurally; ids and parent links are ignored.
impl PartialEq for Shape {
    fn eq(&self, other: &Shape) -> bool {
        self.kind == other.kind
            && self.transform == other.transform
            && self.material == other.material
    }
}

/// A clone is a new node: it and all of its descendants get fresh ids.
impl Clone for Shape {
    fn clone(&self) -> Shape {
        let mut copy = Shape {
            id: self.id,
            parent: self.parent,
            kind: self.kind.clone(),
            material: self.material.clone(),
            transform: self.transform,
            inverse: self.inverse,
            parent_inverse: self.parent_inverse,
            world_inverse: self.world_inverse,
            world_inverse_transpose: self.world_inverse_transpose,
            bounds: self.bounds,
        };

        copy.restamp(self.parent, &mut ShapeId::fresh);
        copy
    }
}

impl Shape {
    fn new(kind: ShapeKind) -> Shape {
        let mut shape = Shape {
            id: ShapeId::fresh(),
            parent: None,
            kind,
            material: Material::default(),
            transform: Matrix::identity(),
            inverse: Matrix::identity(),
            parent_inverse: Matrix::identity(),
            world_inverse: Matrix::identity(),
            world_inverse_transpose: Matrix::identity(),
            bounds: Bounds::empty(),
        };

        shape.adopt_children();
        shape
    }

    /// A unit sphere at the origin.
    pub fn sphere() -> Shape {
        Shape::new(ShapeKind::Sphere)
    }

    /// The `xz` plane through the origin.
    pub fn plane() -> Shape {
        Shape::new(ShapeKind::Plane)
    }

    /// An axis-aligned cube from `-1` to `1` on every axis.
    pub fn cube() -> Shape {
        Shape::new(ShapeKind::Cube)
    }

    /// An infinitely long, open cylinder.
    pub fn cylinder() -> Shape {
        Shape::new(ShapeKind::Cylinder {
            minimum: f64::NEG_INFINITY,
            maximum: f64::INFINITY,
            closed: false,
        })
    }

    /// An open cylinder cut at `minimum` and `maximum`.
    pub fn bounded_cylinder(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cylinder { minimum, maximum, closed: false })
    }

    /// A cylinder cut at `minimum` and `maximum` with both ends capped.
    pub fn capped_cylinder(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cylinder { minimum, maximum, closed: true })
    }

    /// An infinite, open double cone.
    pub fn cone() -> Shape {
        Shape::new(ShapeKind::Cone {
            minimum: f64::NEG_INFINITY,
            maximum: f64::INFINITY,
            closed: false,
        })
    }

    /// An open double cone cut at `minimum` and `maximum`. The cut points are
    /// exclusive, so the tips at `y = 0` are only hit when the range spans them.
    pub fn bounded_cone(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cone { minimum, maximum, closed: false })
    }

    /// A cone cut at `minimum` and `maximum` with both ends capped. Each cap's
    /// radius is the absolute value of its `y`.
    pub fn capped_cone(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeKind::Cone { minimum, maximum, closed: true })
    }

    /// A flat triangle. Edges and the face normal are computed once here,
    /// since every ray test needs them.
    pub fn triangle(p1: Tuple, p2: Tuple, p3: Tuple) -> Shape {
        Shape::new(ShapeKind::Triangle(TriangleInfo::new(p1, p2, p3)))
    }

    /// A triangle whose normal is interpolated from the vertex normals using
    /// the `u`/`v` of each hit.
    pub fn smooth_triangle(p1: Tuple, p2: Tuple, p3: Tuple,
        n1: Tuple, n2: Tuple, n3: Tuple) -> Shape {
        Shape::new(ShapeKind::SmoothTriangle(
            SmoothTriangleInfo::new(p1, p2, p3, n1, n2, n3)
        ))
    }

    /// An empty group. Its bounds grow as children are added.
    pub fn group() -> Shape {
        Shape::new(ShapeKind::Group(Vec::new()))
    }

    /// Combines `left` and `right` with `op`. Both operands become children of
    /// the new node.
    pub fn csg(op: CsgOp, left: Shape, right: Shape) -> Shape {
        Shape::new(ShapeKind::Csg(op, Box::new(left), Box::new(right)))
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Id of the group or CSG node this shape belongs to, if any.
    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn transform(&self) -> &Matrix {
        &self.transform
    }

    pub fn inverse(&self) -> &Matrix {
        &self.inverse
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Children of a group; empty for every other kind of shape.
    pub fn children(&self) -> &[Shape] {
        match self.kind {
            ShapeKind::Group(ref children) => children,
            _ => &[],
        }
    }

    /// Left and right operands of a CSG node.
    pub fn operands(&self) -> Option<(&Shape, &Shape)> {
        match self.kind {
            ShapeKind::Csg(_, ref left, ref right) => Some((left, right)),
            _ => None,
        }
    }

    /// Replaces the transform and refreshes every cached matrix below this
    /// node.
    ///
    /// # Panics
    ///
    /// Panics if `transform` is singular.
    pub fn set_transform(&mut self, transform: Matrix) {
        let inverse = match transform.inverse() {
            Some(inverse) => inverse,
            None => panic!("shape transform is not invertible:\n{}", transform),
        };

        self.transform = transform;
        self.inverse = inverse;
        self.propagate(self.parent_inverse);
    }

    /// Right-multiplies `transform` onto the current one, so it applies to
    /// the object before anything set earlier.
    pub fn compose_transform(&mut self, transform: Matrix) {
        self.set_transform(self.transform * transform);
    }

    /// Sets the material of this shape. On groups and CSG nodes the material
    /// is also handed down to every descendant, since containers have no
    /// surface of their own.
    pub fn set_material(&mut self, material: Material) {
        let inherited = material.clone();
        self.for_each_child(|child| child.set_material(inherited.clone()));
        self.material = material;
    }

    /// Adds `child` to a group.
    ///
    /// # Panics
    ///
    /// Panics if `self` is not a group.
    pub fn add_child(&mut self, mut child: Shape) {
        let (id, world_inverse) = (self.id, self.world_inverse);
        let children = match self.kind {
            ShapeKind::Group(ref mut children) => children,
            _ => panic!("add_child called on a shape that is not a group"),
        };

        child.parent = Some(id);
        child.propagate(world_inverse);
        self.bounds.merge(&child.parent_space_bounds());
        children.push(child);
    }

    /// Whether `other` is this shape or one of its descendants.
    pub fn includes(&self, other: &Shape) -> bool {
        if self.id == other.id {
            return true;
        }

        match self.kind {
            ShapeKind::Group(ref children) => children.iter().any(|c| c.includes(other)),
            ShapeKind::Csg(_, ref left, ref right) => left.includes(other) || right.includes(other),
            _ => false,
        }
    }

    /// Object-space bounding box.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Bounding box in the space of this shape's parent.
    pub fn parent_space_bounds(&self) -> Bounds {
        self.bounds.transform(&self.transform)
    }

    /// Maps a world-space point into this shape's object space, through every
    /// ancestor.
    pub fn world_to_object(&self, point: Tuple) -> Tuple {
        self.world_inverse * point
    }

    /// Maps an object-space normal back to a normalised world-space vector.
    pub fn normal_to_world(&self, normal: Tuple) -> Tuple {
        (self.world_inverse_transpose * normal).as_vector().normalize()
    }

    /// Turns this group into a bounding volume hierarchy.
    ///
    /// Groups with more than `threshold` children are split in two along
    /// their longest axis. Children that fit entirely in one half move into
    /// a new subgroup; the rest stay put. The same is then applied to every
    /// child group and CSG operand.
    pub fn divide(&mut self, threshold: usize) {
        if self.children().len() > threshold {
            let (left, right) = self.partition_children();
            if !left.is_empty() {
                self.make_subgroup(left);
            }
            if !right.is_empty() {
                self.make_subgroup(right);
            }
        }

        self.for_each_child(|child| child.divide(threshold));
        self.refresh_bounds();
    }

    /// Removes and returns the children that fit entirely in the left and
    /// right halves of this group's bounds.
    pub fn partition_children(&mut self) -> (Vec<Shape>, Vec<Shape>) {
        let mut left = Vec::new();
        let mut right = Vec::new();

        let (left_box, right_box) = match self.bounds.split() {
            Some(halves) => halves,
            None => return (left, right),
        };
        let children = match self.kind {
            ShapeKind::Group(ref mut children) => children,
            _ => return (left, right),
        };

        let mut rest = Vec::with_capacity(children.len());
        for child in children.drain(..) {
            let b = child.parent_space_bounds();
            if left_box.contains_box(&b) {
                left.push(child);
            } else if right_box.contains_box(&b) {
                right.push(child);
            } else {
                rest.push(child);
            }
        }
        *children = rest;

        self.refresh_bounds();
        (left, right)
    }

    /// Wraps `children` in a new group and adds that group to `self`.
    pub fn make_subgroup(&mut self, children: Vec<Shape>) {
        let mut subgroup = Shape::group();
        for child in children {
            subgroup.add_child(child);
        }

        self.add_child(subgroup);
    }

    /// Detaches this shape from any parent, making it a scene root, and
    /// reassigns ids from `next`.
    pub(crate) fn make_root(&mut self, next: &mut dyn FnMut() -> ShapeId) {
        self.restamp(None, next);
        self.propagate(Matrix::identity());
    }

    fn restamp(&mut self, parent: Option<ShapeId>, next: &mut dyn FnMut() -> ShapeId) {
        self.id = next();
        self.parent = parent;

        let id = self.id;
        self.for_each_child(|child| child.restamp(Some(id), &mut *next));
    }

    fn for_each_child(&mut self, mut f: impl FnMut(&mut Shape)) {
        match self.kind {
            ShapeKind::Group(ref mut children) => children.iter_mut().for_each(f),
            ShapeKind::Csg(_, ref mut left, ref mut right) => {
                f(&mut **left);
                f(&mut **right);
            }
            _ => (),
        }
    }

    /// Links freshly constructed children to this node.
    fn adopt_children(&mut self) {
        let id = self.id;
        let world_inverse = self.world_inverse;
        self.for_each_child(|child| {
            child.parent = Some(id);
            child.propagate(world_inverse);
        });

        self.refresh_bounds();
    }

    /// Recomputes the world matrices of this node and everything below it.
    fn propagate(&mut self, parent_inverse: Matrix) {
        self.parent_inverse = parent_inverse;
        self.world_inverse = self.inverse * parent_inverse;
        self.world_inverse_transpose = self.world_inverse.transpose();

        let world_inverse = self.world_inverse;
        self.for_each_child(|child| child.propagate(world_inverse));
    }

    fn refresh_bounds(&mut self) {
        self.bounds = match self.kind {
            ShapeKind::Sphere | ShapeKind::Cube => Bounds::new(
                Tuple::point(-1.0, -1.0, -1.0),
                Tuple::point(1.0, 1.0, 1.0),
            ),
            ShapeKind::Plane => Bounds::new(
                Tuple::point(f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY),
                Tuple::point(f64::INFINITY, 0.0, f64::INFINITY),
            ),
            ShapeKind::Cylinder { minimum, maximum, .. } => Bounds::new(
                Tuple::point(-1.0, minimum, -1.0),
                Tuple::point(1.0, maximum, 1.0),
            ),
            ShapeKind::Cone { minimum, maximum, .. } => {
                let limit = minimum.abs().max(maximum.abs());
                Bounds::new(
                    Tuple::point(-limit, minimum, -limit),
                    Tuple::point(limit, maximum, limit),
                )
            }
            ShapeKind::Triangle(ref info) => info.bounds(),
            ShapeKind::SmoothTriangle(ref info) => info.triangle.bounds(),
            ShapeKind::Group(ref children) => {
                let mut b = Bounds::empty();
                for child in children.iter() {
                    b.merge(&child.parent_space_bounds());
                }
                b
            }
            ShapeKind::Csg(_, ref left, ref right) => {
                let mut b = left.parent_space_bounds();
                b.merge(&right.parent_space_bounds());
                b
            }
        };
    }

    /// Intersects a ray already in this shape's object space.
    pub fn local_intersect(&self, ray: &Ray) -> Intersections<'_> {
        match self.kind {
            ShapeKind::Sphere => self.intersect_sphere(ray),
            ShapeKind::Plane => self.intersect_plane(ray),
            ShapeKind::Cube => self.intersect_cube(ray),
            ShapeKind::Cylinder { minimum, maximum, closed }
                => self.intersect_cylinder(ray, minimum, maximum, closed),
            ShapeKind::Cone { minimum, maximum, closed }
                => self.intersect_cone(ray, minimum, maximum, closed),
            ShapeKind::Triangle(ref info) => {
                match info.intersect(ray.origin, ray.direction, EPSILON) {
                    Some((t, _, _)) => Intersections::from(vec![Intersection::new(t, self)]),
                    None => Intersections::new(),
                }
            }
            ShapeKind::SmoothTriangle(ref info) => {
                match info.triangle.intersect(ray.origin, ray.direction, EPSILON) {
                    Some((t, u, v)) => Intersections::from(vec![Intersection::new_uv(t, self, u, v)]),
                    None => Intersections::new(),
                }
            }
            ShapeKind::Group(ref children) => {
                if !self.bounds.intersects(ray) {
                    return Intersections::new();
                }

                Intersections::aggregate(children.iter().map(|c| intersect(c, ray)).collect())
            }
            ShapeKind::Csg(op, ref left, ref right) => {
                if !self.bounds.intersects(ray) {
                    return Intersections::new();
                }

                let xs = Intersections::aggregate(vec![intersect(left, ray), intersect(right, ray)]);
                filter_intersections(op, left, xs)
            }
        }
    }

    /// Surface normal at an object-space point.
    ///
    /// Only primitives have a surface; intersections never refer to groups
    /// or CSG nodes, so asking one for a normal is a logic error.
    pub fn local_normal_at(&self, p: Tuple, hit: &Intersection) -> Tuple {
        match self.kind {
            ShapeKind::Sphere => p - Tuple::origin(),
            ShapeKind::Plane => Tuple::vector(0.0, 1.0, 0.0),
            ShapeKind::Cube => {
                let (ax, ay, az) = (p.x.abs(), p.y.abs(), p.z.abs());
                let maxc = ax.max(ay).max(az);

                if maxc == ax {
                    Tuple::vector(p.x, 0.0, 0.0)
                } else if maxc == ay {
                    Tuple::vector(0.0, p.y, 0.0)
                } else {
                    Tuple::vector(0.0, 0.0, p.z)
                }
            }
            ShapeKind::Cylinder { minimum, maximum, .. } => {
                let dist = p.x * p.x + p.z * p.z;

                if dist < 1.0 && p.y >= maximum - EPSILON {
                    Tuple::vector(0.0, 1.0, 0.0)
                } else if dist < 1.0 && p.y <= minimum + EPSILON {
                    Tuple::vector(0.0, -1.0, 0.0)
                } else {
                    Tuple::vector(p.x, 0.0, p.z)
                }
            }
            ShapeKind::Cone { minimum, maximum, .. } => {
                let dist = p.x * p.x + p.z * p.z;

                if dist < maximum * maximum && p.y >= maximum - EPSILON {
                    Tuple::vector(0.0, 1.0, 0.0)
                } else if dist < minimum * minimum && p.y <= minimum + EPSILON {
                    Tuple::vector(0.0, -1.0, 0.0)
                } else {
                    let y = if p.y > 0.0 { -dist.sqrt() } else { dist.sqrt() };
                    Tuple::vector(p.x, y, p.z)
                }
            }
            ShapeKind::Triangle(ref info) => info.normal,
            ShapeKind::SmoothTriangle(ref info) => match hit.uv {
                Some((u, v)) => info.normal_at(u, v),
                None => info.triangle.normal,
            },
            ShapeKind::Group(_) | ShapeKind::Csg(..)
                => unreachable!("containers have no surface normal"),
        }
    }

    fn intersect_sphere(&self, ray: &Ray) -> Intersections<'_> {
        let sphere_to_ray = ray.origin - Tuple::origin();

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * ray.direction.dot(&sphere_to_ray);
        let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return Intersections::new();
        }

        let root = discriminant.sqrt();
        Intersections::from(vec![
            Intersection::new((-b - root) / (2.0 * a), self),
            Intersection::new((-b + root) / (2.0 * a), self),
        ])
    }

    fn intersect_plane(&self, ray: &Ray) -> Intersections<'_> {
        if ray.direction.y.abs() < EPSILON {
            return Intersections::new();
        }

        let t = -ray.origin.y / ray.direction.y;
        Intersections::from(vec![Intersection::new(t, self)])
    }

    fn intersect_cube(&self, ray: &Ray) -> Intersections<'_> {
        let (xtmin, xtmax) = check_axis(ray.origin.x, ray.direction.x, -1.0, 1.0);
        let (ytmin, ytmax) = check_axis(ray.origin.y, ray.direction.y, -1.0, 1.0);
        let (ztmin, ztmax) = check_axis(ray.origin.z, ray.direction.z, -1.0, 1.0);

        let tmin = xtmin.max(ytmin).max(ztmin);
        let tmax = xtmax.min(ytmax).min(ztmax);

        if tmin > tmax {
            return Intersections::new();
        }

        Intersections::from(vec![Intersection::new(tmin, self), Intersection::new(tmax, self)])
    }

    fn intersect_cylinder(&self, ray: &Ray, minimum: f64, maximum: f64, closed: bool)
        -> Intersections<'_> {
        let mut xs = Vec::new();
        let (o, d) = (ray.origin, ray.direction);

        let a = d.x * d.x + d.z * d.z;
        if a.abs() >= EPSILON {
            let b = 2.0 * o.x * d.x + 2.0 * o.z * d.z;
            let c = o.x * o.x + o.z * o.z - 1.0;

            match solve_quadratic(a, b, c) {
                Some((t0, t1)) => self.push_sides(ray, [t0, t1], minimum, maximum, &mut xs),
                None => return Intersections::new(),
            }
        }

        if closed {
            self.push_caps(ray, minimum, maximum, |_| 1.0, &mut xs);
        }

        Intersections::from(xs)
    }

    fn intersect_cone(&self, ray: &Ray, minimum: f64, maximum: f64, closed: bool)
        -> Intersections<'_> {
        let mut xs = Vec::new();
        let (o, d) = (ray.origin, ray.direction);

        let a = d.x * d.x - d.y * d.y + d.z * d.z;
        let b = 2.0 * o.x * d.x - 2.0 * o.y * d.y + 2.0 * o.z * d.z;
        let c = o.x * o.x - o.y * o.y + o.z * o.z;

        if a.abs() < EPSILON {
            // Parallel to one nappe: the quadratic collapses to a line.
            if b.abs() >= EPSILON {
                let t = -c / (2.0 * b);
                self.push_sides(ray, [t], minimum, maximum, &mut xs);
            }
        } else if let Some((t0, t1)) = solve_quadratic(a, b, c) {
            self.push_sides(ray, [t0, t1], minimum, maximum, &mut xs);
        }

        if closed {
            self.push_caps(ray, minimum, maximum, |y| y * y, &mut xs);
        }

        Intersections::from(xs)
    }

    /// Keeps side hits strictly between the cut planes.
    fn push_sides<'a, const N: usize>(&'a self, ray: &Ray, ts: [f64; N],
        minimum: f64, maximum: f64, xs: &mut Vec<Intersection<'a>>) {
        for t in ts {
            let y = ray.origin.y + t * ray.direction.y;
            if minimum < y && y < maximum {
                xs.push(Intersection::new(t, self));
            }
        }
    }

    /// Intersects the end caps at `minimum` and `maximum`. `radius_sq` gives
    /// the squared cap radius at a given height.
    fn push_caps<'a>(&'a self, ray: &Ray, minimum: f64, maximum: f64,
        radius_sq: impl Fn(f64) -> f64, xs: &mut Vec<Intersection<'a>>) {
        if ray.direction.y.abs() < EPSILON {
            return;
        }

        for y in [minimum, maximum] {
            let t = (y - ray.origin.y) / ray.direction.y;
            let x = ray.origin.x + t * ray.direction.x;
            let z = ray.origin.z + t * ray.direction.z;

            if x * x + z * z <= radius_sq(y) {
                xs.push(Intersection::new(t, self));
            }
        }
    }
}

/// Real roots of `a t^2 + b t + c`, smaller first. Discriminants a hair
/// below zero count as tangent hits.
fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < -EPSILON {
        return None;
    }

    let root = discriminant.max(0.0).sqrt();
    let t0 = (-b - root) / (2.0 * a);
    let t1 = (-b + root) / (2.0 * a);

    Some(if t0 > t1 { (t1, t0) } else { (t0, t1) })
}

/// Intersects a world-space (or parent-space) ray with `s`.
pub fn intersect<'a>(s: &'a Shape, ray: &Ray) -> Intersections<'a> {
    s.local_intersect(&ray.transform(&s.inverse))
}

/// World-space surface normal of `s` at `world_point`.
pub fn normal_at(s: &Shape, world_point: Tuple, hit: &Intersection) -> Tuple {
    let local_point = s.world_to_object(world_point);
    let local_normal = s.local_normal_at(local_point, hit);

    s.normal_to_world(local_normal)
}

#[cfg(test)]
fn ts(xs: &Intersections) -> Vec<f64> {
    xs.iter().map(|i| i.t).collect()
}

#[cfg(test)]
fn local_normal(s: &Shape, p: Tuple) -> Tuple {
    s.local_normal_at(p, &Intersection::new(0.0, s))
}

#[test]
fn ray_through_sphere() {
    let s = Shape::sphere();

    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    assert_eq!(ts(&intersect(&s, &r)), vec![4.0, 6.0]);

    let tangent = Ray::new(Tuple::point(0.0, 1.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    assert_eq!(ts(&intersect(&s, &tangent)), vec![5.0, 5.0]);

    let miss = Ray::new(Tuple::point(0.0, 2.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    assert!(intersect(&s, &miss).is_empty());

    let inside = Ray::new(Tuple::point(0.0, 0.0, 0.0), Tuple::vector(0.0, 0.0, 1.0));
    assert_eq!(ts(&intersect(&s, &inside)), vec![-1.0, 1.0]);

    let behind = Ray::new(Tuple::point(0.0, 0.0, 5.0), Tuple::vector(0.0, 0.0, 1.0));
    assert_eq!(ts(&intersect(&s, &behind)), vec![-6.0, -4.0]);
}

#[test]
fn intersect_tags_the_shape() {
    let s = Shape::sphere();
    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    let xs = intersect(&s, &r);

    assert!(xs.iter().all(|i| i.what.id() == s.id()));
}

#[test]
fn ray_through_transformed_sphere() {
    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));

    let mut scaled = Shape::sphere();
    scaled.set_transform(Matrix::scaling(2.0, 2.0, 2.0));
    assert_eq!(ts(&intersect(&scaled, &r)), vec![3.0, 7.0]);

    let mut moved = Shape::sphere();
    moved.set_transform(Matrix::translation(5.0, 0.0, 0.0));
    assert!(intersect(&moved, &r).is_empty());
}

#[test]
fn set_transform_replaces_and_compose_accumulates() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix::translation(2.0, 3.0, 4.0));
    s.set_transform(Matrix::translation(1.0, 0.0, 0.0));
    assert_eq!(*s.transform(), Matrix::translation(1.0, 0.0, 0.0));

    s.compose_transform(Matrix::translation(0.0, 2.0, 0.0));
    assert_eq!(*s.transform(), Matrix::translation(1.0, 2.0, 0.0));
    assert_eq!(*s.inverse(), Matrix::translation(-1.0, -2.0, 0.0));
}

#[test]
#[should_panic]
fn singular_transform_panics() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix::scaling(0.0, 1.0, 1.0));
}

#[test]
fn identity_transform_changes_nothing() {
    let plain = Shape::sphere();
    let mut same = Shape::sphere();
    same.set_transform(Matrix::identity());

    let r = Ray::new(Tuple::point(0.3, 0.2, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    assert_eq!(ts(&intersect(&plain, &r)), ts(&intersect(&same, &r)));
    assert_eq!(plain.parent_space_bounds(), same.parent_space_bounds());

    let p = Tuple::point(0.0, 0.6, 0.8);
    let i = Intersection::new(0.0, &plain);
    assert_eq!(normal_at(&plain, p, &i), normal_at(&same, p, &i));
}

#[test]
fn sphere_normals() {
    let s = Shape::sphere();
    let i = Intersection::new(0.0, &s);
    let k = 3f64.sqrt() / 3.0;

    assert_eq!(normal_at(&s, Tuple::point(1.0, 0.0, 0.0), &i), Tuple::vector(1.0, 0.0, 0.0));
    assert_eq!(normal_at(&s, Tuple::point(0.0, 0.0, 1.0), &i), Tuple::vector(0.0, 0.0, 1.0));

    let n = normal_at(&s, Tuple::point(k, k, k), &i);
    assert_eq!(n, Tuple::vector(k, k, k));
    assert_eq!(n, n.normalize());
}

#[test]
fn transformed_sphere_normals() {
    use std::f64::consts::PI;

    let mut moved = Shape::sphere();
    moved.set_transform(Matrix::translation(0.0, 1.0, 0.0));
    let i = Intersection::new(0.0, &moved);
    let n = normal_at(&moved, Tuple::point(0.0, 1.70711, -0.70711), &i);
    assert_eq!(n, Tuple::vector(0.0, 0.70711, -0.70711));

    let mut squashed = Shape::sphere();
    squashed.set_transform(Matrix::scaling(1.0, 0.5, 1.0) * Matrix::rotation_z(PI / 5.0));
    let i = Intersection::new(0.0, &squashed);
    let h = 2f64.sqrt() / 2.0;
    let n = normal_at(&squashed, Tuple::point(0.0, h, -h), &i);
    assert_eq!(n, Tuple::vector(0.0, 0.97014, -0.24254));
}

#[test]
fn plane_intersections_and_normal() {
    let p = Shape::plane();

    let parallel = Ray::new(Tuple::point(0.0, 10.0, 0.0), Tuple::vector(0.0, 0.0, 1.0));
    assert!(intersect(&p, &parallel).is_empty());

    let coplanar = Ray::new(Tuple::point(0.0, 0.0, 0.0), Tuple::vector(0.0, 0.0, 1.0));
    assert!(intersect(&p, &coplanar).is_empty());

    let above = Ray::new(Tuple::point(0.0, 1.0, 0.0), Tuple::vector(0.0, -1.0, 0.0));
    assert_eq!(ts(&intersect(&p, &above)), vec![1.0]);

    let below = Ray::new(Tuple::point(0.0, -1.0, 0.0), Tuple::vector(0.0, 1.0, 0.0));
    assert_eq!(ts(&intersect(&p, &below)), vec![1.0]);

    for pt in [Tuple::point(0.0, 0.0, 0.0), Tuple::point(10.0, 0.0, -10.0), Tuple::point(-5.0, 0.0, 150.0)] {
        assert_eq!(local_normal(&p, pt), Tuple::vector(0.0, 1.0, 0.0));
    }
}

#[test]
fn cube_intersections() {
    let c = Shape::cube();
    let hits = [
        (Tuple::point(5.0, 0.5, 0.0), Tuple::vector(-1.0, 0.0, 0.0), 4.0, 6.0),
        (Tuple::point(-5.0, 0.5, 0.0), Tuple::vector(1.0, 0.0, 0.0), 4.0, 6.0),
        (Tuple::point(0.5, 5.0, 0.0), Tuple::vector(0.0, -1.0, 0.0), 4.0, 6.0),
        (Tuple::point(0.5, -5.0, 0.0), Tuple::vector(0.0, 1.0, 0.0), 4.0, 6.0),
        (Tuple::point(0.5, 0.0, 5.0), Tuple::vector(0.0, 0.0, -1.0), 4.0, 6.0),
        (Tuple::point(0.5, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0), 4.0, 6.0),
        (Tuple::point(0.0, 0.5, 0.0), Tuple::vector(0.0, 0.0, 1.0), -1.0, 1.0),
    ];
    for (origin, direction, t1, t2) in hits.iter() {
        let xs = intersect(&c, &Ray::new(*origin, *direction));
        assert_eq!(ts(&xs), vec![*t1, *t2], "{:?}", origin);
    }

    let misses = [
        (Tuple::point(-2.0, 0.0, 0.0), Tuple::vector(0.2673, 0.5345, 0.8018)),
        (Tuple::point(0.0, -2.0, 0.0), Tuple::vector(0.8018, 0.2673, 0.5345)),
        (Tuple::point(0.0, 0.0, -2.0), Tuple::vector(0.5345, 0.8018, 0.2673)),
        (Tuple::point(2.0, 0.0, 2.0), Tuple::vector(0.0, 0.0, -1.0)),
        (Tuple::point(0.0, 2.0, 2.0), Tuple::vector(0.0, -1.0, 0.0)),
        (Tuple::point(2.0, 2.0, 0.0), Tuple::vector(-1.0, 0.0, 0.0)),
    ];
    for (origin, direction) in misses.iter() {
        assert!(intersect(&c, &Ray::new(*origin, *direction)).is_empty(), "{:?}", origin);
    }
}

#[test]
fn cube_normals() {
    let c = Shape::cube();
    let cases = [
        (Tuple::point(1.0, 0.5, -0.8), Tuple::vector(1.0, 0.0, 0.0)),
        (Tuple::point(-1.0, -0.2, 0.9), Tuple::vector(-1.0, 0.0, 0.0)),
        (Tuple::point(-0.4, 1.0, -0.1), Tuple::vector(0.0, 1.0, 0.0)),
        (Tuple::point(0.3, -1.0, -0.7), Tuple::vector(0.0, -1.0, 0.0)),
        (Tuple::point(-0.6, 0.3, 1.0), Tuple::vector(0.0, 0.0, 1.0)),
        (Tuple::point(0.4, 0.4, -1.0), Tuple::vector(0.0, 0.0, -1.0)),
        (Tuple::point(1.0, 1.0, 1.0), Tuple::vector(1.0, 0.0, 0.0)),
        (Tuple::point(-1.0, -1.0, -1.0), Tuple::vector(-1.0, 0.0, 0.0)),
    ];

    for (p, n) in cases.iter() {
        assert_eq!(local_normal(&c, *p), *n);
    }
}

#[test]
fn cylinder_intersections() {
    let cyl = Shape::cylinder();

    for (origin, direction) in [
        (Tuple::point(1.0, 0.0, 0.0), Tuple::vector(0.0, 1.0, 0.0)),
        (Tuple::point(0.0, 0.0, 0.0), Tuple::vector(0.0, 1.0, 0.0)),
        (Tuple::point(0.0, 0.0, -5.0), Tuple::vector(1.0, 1.0, 1.0)),
    ] {
        let r = Ray::new(origin, direction.normalize());
        assert!(intersect(&cyl, &r).is_empty());
    }

    let hits = [
        (Tuple::point(1.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0), 5.0, 5.0),
        (Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0), 4.0, 6.0),
        (Tuple::point(0.5, 0.0, -5.0), Tuple::vector(0.1, 1.0, 1.0), 6.80798, 7.08872),
    ];
    for (origin, direction, t0, t1) in hits.iter() {
        let xs = intersect(&cyl, &Ray::new(*origin, direction.normalize()));
        assert_eq!(xs.len(), 2);
        assert!((xs[0].t - t0).abs() < 1e-4 && (xs[1].t - t1).abs() < 1e-4);
    }
}

#[test]
fn truncated_and_capped_cylinders() {
    let open = Shape::bounded_cylinder(1.0, 2.0);
    let cases = [
        (Tuple::point(0.0, 1.5, 0.0), Tuple::vector(0.1, 1.0, 0.0), 0),
        (Tuple::point(0.0, 3.0, -5.0), Tuple::vector(0.0, 0.0, 1.0), 0),
        (Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0), 0),
        (Tuple::point(0.0, 2.0, -5.0), Tuple::vector(0.0, 0.0, 1.0), 0),
        (Tuple::point(0.0, 1.0, -5.0), Tuple::vector(0.0, 0.0, 1.0), 0),
        (Tuple::point(0.0, 1.5, -2.0), Tuple::vector(0.0, 0.0, 1.0), 2),
    ];
    for (origin, direction, count) in cases.iter() {
        let r = Ray::new(*origin, direction.normalize());
        assert_eq!(intersect(&open, &r).len(), *count, "{:?}", origin);
    }

    let capped = Shape::capped_cylinder(1.0, 2.0);
    let cases = [
        (Tuple::point(0.0, 3.0, 0.0), Tuple::vector(0.0, -1.0, 0.0)),
        (Tuple::point(0.0, 3.0, -2.0), Tuple::vector(0.0, -1.0, 2.0)),
        (Tuple::point(0.0, 4.0, -2.0), Tuple::vector(0.0, -1.0, 1.0)),
        (Tuple::point(0.0, 0.0, -2.0), Tuple::vector(0.0, 1.0, 2.0)),
        (Tuple::point(0.0, -1.0, -2.0), Tuple::vector(0.0, 1.0, 1.0)),
    ];
    for (origin, direction) in cases.iter() {
        let r = Ray::new(*origin, direction.normalize());
        assert_eq!(intersect(&capped, &r).len(), 2, "{:?}", origin);
    }
}

#[test]
fn cylinder_normals() {
    let cyl = Shape::cylinder();
    assert_eq!(local_normal(&cyl, Tuple::point(1.0, 0.0, 0.0)), Tuple::vector(1.0, 0.0, 0.0));
    assert_eq!(local_normal(&cyl, Tuple::point(0.0, 5.0, -1.0)), Tuple::vector(0.0, 0.0, -1.0));
    assert_eq!(local_normal(&cyl, Tuple::point(0.0, -2.0, 1.0)), Tuple::vector(0.0, 0.0, 1.0));
    assert_eq!(local_normal(&cyl, Tuple::point(-1.0, 1.0, 0.0)), Tuple::vector(-1.0, 0.0, 0.0));

    let capped = Shape::capped_cylinder(1.0, 2.0);
    let down = Tuple::vector(0.0, -1.0, 0.0);
    let up = Tuple::vector(0.0, 1.0, 0.0);
    assert_eq!(local_normal(&capped, Tuple::point(0.0, 1.0, 0.0)), down);
    assert_eq!(local_normal(&capped, Tuple::point(0.5, 1.0, 0.0)), down);
    assert_eq!(local_normal(&capped, Tuple::point(0.0, 1.0, 0.5)), down);
    assert_eq!(local_normal(&capped, Tuple::point(0.0, 2.0, 0.0)), up);
    assert_eq!(local_normal(&capped, Tuple::point(0.5, 2.0, 0.0)), up);
    assert_eq!(local_normal(&capped, Tuple::point(0.0, 2.0, 0.5)), up);
}

#[test]
fn cone_intersections() {
    let cone = Shape::cone();
    let cases = [
        (Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0), 5.0, 5.0),
        (Tuple::point(0.0, 0.0, -5.0), Tuple::vector(1.0, 1.0, 1.0), 8.66025, 8.66025),
        (Tuple::point(1.0, 1.0, -5.0), Tuple::vector(-0.5, -1.0, 1.0), 4.55006, 49.44994),
    ];
    for (origin, direction, t0, t1) in cases.iter() {
        let xs = intersect(&cone, &Ray::new(*origin, direction.normalize()));
        assert_eq!(xs.len(), 2, "{:?}", direction);
        assert!((xs[0].t - t0).abs() < 1e-4 && (xs[1].t - t1).abs() < 1e-4, "{:?}", direction);
    }

    // Parallel to one of the nappes.
    let r = Ray::new(Tuple::point(0.0, 0.0, -1.0), Tuple::vector(0.0, 1.0, 1.0).normalize());
    let xs = intersect(&cone, &r);
    assert_eq!(xs.len(), 1);
    assert!((xs[0].t - 0.35355).abs() < 1e-4);
}

#[test]
fn cone_end_caps() {
    let cone = Shape::capped_cone(-0.5, 0.5);
    let cases = [
        (Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 1.0, 0.0), 0),
        (Tuple::point(0.0, 0.0, -0.25), Tuple::vector(0.0, 1.0, 1.0), 2),
        (Tuple::point(0.0, 0.0, -0.25), Tuple::vector(0.0, 1.0, 0.0), 4),
    ];

    for (origin, direction, count) in cases.iter() {
        let r = Ray::new(*origin, direction.normalize());
        assert_eq!(intersect(&cone, &r).len(), *count, "{:?}", direction);
    }
}

#[test]
fn cone_normals() {
    let cone = Shape::cone();

    assert_eq!(local_normal(&cone, Tuple::point(0.0, 0.0, 0.0)), Tuple::vector(0.0, 0.0, 0.0));
    assert_eq!(local_normal(&cone, Tuple::point(1.0, 1.0, 1.0)), Tuple::vector(1.0, -2f64.sqrt(), 1.0));
    assert_eq!(local_normal(&cone, Tuple::point(-1.0, -1.0, 0.0)), Tuple::vector(-1.0, 1.0, 0.0));

    let capped = Shape::capped_cone(-1.0, 2.0);
    assert_eq!(local_normal(&capped, Tuple::point(0.5, 2.0, 0.0)), Tuple::vector(0.0, 1.0, 0.0));
    assert_eq!(local_normal(&capped, Tuple::point(0.0, -1.0, 0.5)), Tuple::vector(0.0, -1.0, 0.0));
}

#[test]
fn triangle_intersections() {
    let t = Shape::triangle(
        Tuple::point(0.0, 1.0, 0.0),
        Tuple::point(-1.0, 0.0, 0.0),
        Tuple::point(1.0, 0.0, 0.0),
    );

    let misses = [
        (Tuple::point(0.0, -1.0, -2.0), Tuple::vector(0.0, 1.0, 0.0)),
        (Tuple::point(1.0, 1.0, -2.0), Tuple::vector(0.0, 0.0, 1.0)),
        (Tuple::point(-1.0, 1.0, -2.0), Tuple::vector(0.0, 0.0, 1.0)),
        (Tuple::point(0.0, -1.0, -2.0), Tuple::vector(0.0, 0.0, 1.0)),
    ];
    for (origin, direction) in misses.iter() {
        assert!(intersect(&t, &Ray::new(*origin, *direction)).is_empty(), "{:?}", origin);
    }

    let r = Ray::new(Tuple::point(0.0, 0.5, -2.0), Tuple::vector(0.0, 0.0, 1.0));
    assert_eq!(ts(&intersect(&t, &r)), vec![2.0]);

    for p in [Tuple::point(0.0, 0.5, 0.0), Tuple::point(-0.5, 0.75, 0.0), Tuple::point(0.5, 0.25, 0.0)] {
        assert_eq!(local_normal(&t, p), Tuple::vector(0.0, 0.0, -1.0));
    }
}

#[test]
fn smooth_triangle_records_uv_and_interpolates() {
    let tri = Shape::smooth_triangle(
        Tuple::point(0.0, 1.0, 0.0),
        Tuple::point(-1.0, 0.0, 0.0),
        Tuple::point(1.0, 0.0, 0.0),
        Tuple::vector(0.0, 1.0, 0.0),
        Tuple::vector(-1.0, 0.0, 0.0),
        Tuple::vector(1.0, 0.0, 0.0),
    );

    let r = Ray::new(Tuple::point(-0.2, 0.3, -2.0), Tuple::vector(0.0, 0.0, 1.0));
    let xs = intersect(&tri, &r);
    let (u, v) = xs[0].uv.unwrap();
    assert!(crate::feq(u, 0.45));
    assert!(crate::feq(v, 0.25));

    let hit = Intersection::new_uv(1.0, &tri, 0.45, 0.25);
    let n = normal_at(&tri, Tuple::point(0.0, 0.0, 0.0), &hit);
    assert_eq!(n, Tuple::vector(-0.5547, 0.83205, 0.0));
}

#[test]
fn adding_children_sets_parent() {
    let mut g = Shape::group();
    assert!(g.children().is_empty());

    g.add_child(Shape::sphere());
    assert_eq!(g.children().len(), 1);
    assert_eq!(g.children()[0].parent(), Some(g.id()));

    let c = Shape::csg(CsgOp::Union, Shape::sphere(), Shape::cube());
    let (left, right) = c.operands().unwrap();
    assert_eq!(left.parent(), Some(c.id()));
    assert_eq!(right.parent(), Some(c.id()));
}

#[test]
#[should_panic]
fn adding_child_to_primitive_panics() {
    let mut s = Shape::sphere();
    s.add_child(Shape::cube());
}

#[test]
fn group_intersections_are_sorted() {
    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    assert!(intersect(&Shape::group(), &r).is_empty());

    let mut s2 = Shape::sphere();
    s2.set_transform(Matrix::translation(0.0, 0.0, -3.0));
    let mut s3 = Shape::sphere();
    s3.set_transform(Matrix::translation(5.0, 0.0, 0.0));

    let mut g = Shape::group();
    g.add_child(Shape::sphere());
    g.add_child(s2);
    g.add_child(s3);

    let xs = intersect(&g, &r);
    let (s1, s2) = (&g.children()[0], &g.children()[1]);
    let ids: Vec<ShapeId> = xs.iter().map(|i| i.what.id()).collect();
    assert_eq!(ids, vec![s2.id(), s2.id(), s1.id(), s1.id()]);
}

#[test]
fn transformed_group_intersection() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix::translation(5.0, 0.0, 0.0));

    let mut g = Shape::group();
    g.set_transform(Matrix::scaling(2.0, 2.0, 2.0));
    g.add_child(s);

    let r = Ray::new(Tuple::point(10.0, 0.0, -10.0), Tuple::vector(0.0, 0.0, 1.0));
    assert_eq!(intersect(&g, &r).len(), 2);
}

#[cfg(test)]
fn nested_sphere(inner_scale: Matrix) -> Shape {
    use std::f64::consts::PI;

    let mut s = Shape::sphere();
    s.set_transform(Matrix::translation(5.0, 0.0, 0.0));

    let mut g2 = Shape::group();
    g2.set_transform(inner_scale);
    g2.add_child(s);

    let mut g1 = Shape::group();
    g1.set_transform(Matrix::rotation_y(PI / 2.0));
    g1.add_child(g2);
    g1
}

#[test]
fn world_to_object_through_groups() {
    let g1 = nested_sphere(Matrix::scaling(2.0, 2.0, 2.0));
    let s = &g1.children()[0].children()[0];

    assert_eq!(s.world_to_object(Tuple::point(-2.0, 0.0, -10.0)), Tuple::point(0.0, 0.0, -1.0));
}

#[test]
fn transforms_survive_reparenting() {
    use std::f64::consts::PI;

    // Built top-down: the outer transform is set after the child was added.
    let mut g1 = Shape::group();
    let mut g2 = Shape::group();
    let mut s = Shape::sphere();
    s.set_transform(Matrix::translation(5.0, 0.0, 0.0));
    g2.set_transform(Matrix::scaling(2.0, 2.0, 2.0));
    g2.add_child(s);
    g1.add_child(g2);
    g1.set_transform(Matrix::rotation_y(PI / 2.0));

    let s = &g1.children()[0].children()[0];
    assert_eq!(s.world_to_object(Tuple::point(-2.0, 0.0, -10.0)), Tuple::point(0.0, 0.0, -1.0));
}

#[test]
fn normals_through_groups() {
    let g1 = nested_sphere(Matrix::scaling(1.0, 2.0, 3.0));
    let s = &g1.children()[0].children()[0];
    let expected = Tuple::vector(2.0 / 7.0, 3.0 / 7.0, -6.0 / 7.0);

    let k = 3f64.sqrt() / 3.0;
    assert_eq!(s.normal_to_world(Tuple::vector(k, k, k)), expected);

    let p = Tuple::point(3f64.sqrt(), 2.0 / 3f64.sqrt(), -(5.0 + 1.0 / 3f64.sqrt()));
    assert_eq!(normal_at(s, p, &Intersection::new(0.0, s)), expected);
}

#[test]
fn primitive_bounds() {
    let s = Shape::sphere();
    assert_eq!(s.bounds(), Bounds::new(Tuple::point(-1.0, -1.0, -1.0), Tuple::point(1.0, 1.0, 1.0)));

    let p = Shape::plane().bounds();
    assert_eq!(p.min, Tuple::point(f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY));
    assert_eq!(p.max, Tuple::point(f64::INFINITY, 0.0, f64::INFINITY));

    let c = Shape::bounded_cylinder(-5.0, 3.0).bounds();
    assert_eq!(c, Bounds::new(Tuple::point(-1.0, -5.0, -1.0), Tuple::point(1.0, 3.0, 1.0)));

    let cone = Shape::bounded_cone(-5.0, 3.0).bounds();
    assert_eq!(cone, Bounds::new(Tuple::point(-5.0, -5.0, -5.0), Tuple::point(5.0, 3.0, 5.0)));

    let unbounded = Shape::cone().bounds();
    assert_eq!(unbounded.min.x, f64::NEG_INFINITY);
    assert_eq!(unbounded.max.y, f64::INFINITY);

    let t = Shape::triangle(
        Tuple::point(-3.0, 7.0, 2.0),
        Tuple::point(6.0, 2.0, -4.0),
        Tuple::point(2.0, -1.0, -1.0),
    ).bounds();
    assert_eq!(t, Bounds::new(Tuple::point(-3.0, -1.0, -4.0), Tuple::point(6.0, 7.0, 2.0)));
}

#[test]
fn parent_space_bounds_of_transformed_shape() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix::translation(1.0, -3.0, 5.0) * Matrix::scaling(0.5, 2.0, 4.0));

    let b = s.parent_space_bounds();
    assert_eq!(b.min, Tuple::point(0.5, -5.0, 1.0));
    assert_eq!(b.max, Tuple::point(1.5, -1.0, 9.0));
}

#[test]
fn group_and_csg_bounds() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix::translation(2.0, 5.0, -3.0) * Matrix::scaling(2.0, 2.0, 2.0));
    let mut c = Shape::bounded_cylinder(-2.0, 2.0);
    c.set_transform(Matrix::translation(-4.0, -1.0, 4.0) * Matrix::scaling(0.5, 1.0, 0.5));

    let mut g = Shape::group();
    g.add_child(s);
    g.add_child(c);
    assert_eq!(g.bounds().min, Tuple::point(-4.5, -3.0, -5.0));
    assert_eq!(g.bounds().max, Tuple::point(4.0, 7.0, 4.5));

    let mut right = Shape::sphere();
    right.set_transform(Matrix::translation(2.0, 3.0, 4.0));
    let csg = Shape::csg(CsgOp::Difference, Shape::sphere(), right);
    assert_eq!(csg.bounds().min, Tuple::point(-1.0, -1.0, -1.0));
    assert_eq!(csg.bounds().max, Tuple::point(3.0, 4.0, 5.0));
}

#[test]
fn group_bounds_ignore_own_transform() {
    let mut g = Shape::group();
    g.set_transform(Matrix::translation(10.0, 0.0, 0.0));
    g.add_child(Shape::sphere());

    assert_eq!(g.bounds().min, Tuple::point(-1.0, -1.0, -1.0));
    assert_eq!(g.parent_space_bounds().min, Tuple::point(9.0, -1.0, -1.0));
}

#[test]
fn group_misses_when_bounds_miss() {
    let mut g = Shape::group();
    g.add_child(Shape::sphere());

    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 1.0, 0.0));
    assert!(intersect(&g, &r).is_empty());
}

#[test]
fn csg_union_of_overlapping_spheres() {
    let mut right = Shape::sphere();
    right.set_transform(Matrix::translation(0.0, 0.0, 0.5));
    let c = Shape::csg(CsgOp::Union, Shape::sphere(), right);

    let r = Ray::new(Tuple::point(0.0, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    let xs = intersect(&c, &r);
    let (left, right) = c.operands().unwrap();

    assert_eq!(xs.len(), 2);
    assert_eq!(xs[0], Intersection::new(4.0, left));
    assert_eq!(xs[1], Intersection::new(6.5, right));
}

#[test]
fn csg_misses() {
    let c = Shape::csg(CsgOp::Union, Shape::sphere(), Shape::cube());
    let r = Ray::new(Tuple::point(0.0, 2.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));

    assert!(intersect(&c, &r).is_empty());
}

#[test]
fn includes_looks_through_containers() {
    let mut g = Shape::group();
    g.add_child(Shape::csg(CsgOp::Difference, Shape::cube(), Shape::sphere()));
    let other = Shape::sphere();

    let (_, inner) = g.children()[0].operands().unwrap();
    assert!(g.includes(inner));
    assert!(!g.includes(&other));
}

#[test]
fn clones_get_fresh_ids() {
    let mut g = Shape::group();
    g.add_child(Shape::sphere());
    let copy = g.clone();

    assert_eq!(copy, g);
    assert_ne!(copy.id(), g.id());
    assert_ne!(copy.children()[0].id(), g.children()[0].id());
    assert_eq!(copy.children()[0].parent(), Some(copy.id()));
}

#[test]
fn set_material_reaches_descendants() {
    let mut g = Shape::group();
    g.add_child(Shape::sphere());

    let mut m = Material::default();
    m.ambient = 1.0;
    g.set_material(m.clone());

    assert_eq!(g.children()[0].material, m);
}

#[cfg(test)]
fn sphere_at(x: f64, y: f64, z: f64) -> Shape {
    let mut s = Shape::sphere();
    s.set_transform(Matrix::translation(x, y, z));
    s
}

#[test]
fn partitioning_children() {
    let mut g = Shape::group();
    g.add_child(sphere_at(-2.0, 0.0, 0.0));
    g.add_child(sphere_at(2.0, 0.0, 0.0));
    g.add_child(Shape::sphere());

    let (left, right) = g.partition_children();

    assert_eq!(g.children(), &[Shape::sphere()]);
    assert_eq!(left, vec![sphere_at(-2.0, 0.0, 0.0)]);
    assert_eq!(right, vec![sphere_at(2.0, 0.0, 0.0)]);
}

#[test]
fn making_subgroup() {
    let mut g = Shape::group();
    g.make_subgroup(vec![Shape::sphere(), sphere_at(1.0, 0.0, 0.0)]);

    assert_eq!(g.children().len(), 1);
    assert_eq!(g.children()[0].children().len(), 2);
}

#[test]
fn dividing_builds_hierarchy() {
    let mut s3 = Shape::sphere();
    s3.set_transform(Matrix::scaling(4.0, 4.0, 4.0));

    let mut g = Shape::group();
    g.add_child(sphere_at(-2.0, -2.0, 0.0));
    g.add_child(sphere_at(-2.0, 2.0, 0.0));
    g.add_child(s3.clone());
    g.divide(1);

    assert_eq!(g.children().len(), 2);
    assert_eq!(g.children()[0], s3);

    let subgroup = &g.children()[1];
    assert_eq!(subgroup.children().len(), 2);
    assert_eq!(subgroup.children()[0].children(), &[sphere_at(-2.0, -2.0, 0.0)]);
    assert_eq!(subgroup.children()[1].children(), &[sphere_at(-2.0, 2.0, 0.0)]);
}

#[test]
fn dividing_leaves_small_groups_alone() {
    let mut sub = Shape::group();
    sub.add_child(sphere_at(-2.0, 0.0, 0.0));
    sub.add_child(sphere_at(2.0, 1.0, 0.0));
    sub.add_child(sphere_at(2.0, -1.0, 0.0));

    let mut g = Shape::group();
    g.add_child(sub);
    g.add_child(Shape::sphere());
    g.divide(2);

    assert_eq!(g.children().len(), 2);
    let sub = &g.children()[0];
    assert_eq!(sub.children().len(), 2);
    assert_eq!(sub.children()[0].children(), &[sphere_at(-2.0, 0.0, 0.0)]);
    assert_eq!(sub.children()[1].children(), &[sphere_at(2.0, 1.0, 0.0), sphere_at(2.0, -1.0, 0.0)]);
}

#[test]
fn dividing_csg_reaches_operands() {
    let mut left = Shape::group();
    left.add_child(sphere_at(-2.0, 0.0, 0.0));
    left.add_child(sphere_at(2.0, 0.0, 0.0));

    let mut right = Shape::group();
    right.add_child(sphere_at(0.0, 0.0, -2.0));
    right.add_child(sphere_at(0.0, 0.0, 2.0));

    let mut c = Shape::csg(CsgOp::Difference, left, right);
    c.divide(1);

    let (left, right) = c.operands().unwrap();
    assert_eq!(left.children().len(), 2);
    assert_eq!(left.children()[0].children(), &[sphere_at(-2.0, 0.0, 0.0)]);
    assert_eq!(right.children()[1].children(), &[sphere_at(0.0, 0.0, 2.0)]);
}

#[test]
fn divided_group_renders_the_same_hits() {
    let mut g = Shape::group();
    for i in 0..6 {
        g.add_child(sphere_at(i as f64 * 3.0 - 7.5, 0.0, 0.0));
    }
    let before: Vec<f64> = {
        let r = Ray::new(Tuple::point(-7.5, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
        ts(&intersect(&g, &r))
    };

    g.divide(2);
    let r = Ray::new(Tuple::point(-7.5, 0.0, -5.0), Tuple::vector(0.0, 0.0, 1.0));
    assert_eq!(ts(&intersect(&g, &r)), before);
    assert_eq!(before, vec![4.0, 6.0]);
}
