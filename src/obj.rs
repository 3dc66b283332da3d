use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::shape::Shape;
use crate::tuple::Tuple;

/// Errors raised while reading Wavefront OBJ data. Line numbers start at 1.
#[derive(Error, Debug)]
pub enum ObjError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: invalid number {token:?}")]
    BadNumber { line: usize, token: String },

    #[error("line {line}: {what} index {index} out of range (1..={len})")]
    BadIndex { line: usize, what: &'static str, index: usize, len: usize },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: &'static str },
}

/// One corner of a face: a vertex index and an optional normal index, both
/// zero-based once parsed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaceVertex {
    pub vertex: usize,
    pub normal: Option<usize>,
}

/// A fan-triangulated face.
pub type ObjTriangle = [FaceVertex; 3];

/// The contents of an OBJ file.
///
/// Supported records are `v`, `vn`, `f` and the group switches `g` and `o`.
/// Anything else is counted in `ignored_lines` and skipped. Faces before the
/// first group switch go to the default group, named `""`.
#[derive(Clone, Debug, Default)]
pub struct ObjParser {
    pub ignored_lines: usize,

    pub vertices: Vec<Tuple>,
    pub normals: Vec<Tuple>,
    groups: BTreeMap<String, Vec<ObjTriangle>>,
}

impl ObjParser {
    /// Parses OBJ text.
    pub fn parse_str(text: &str) -> Result<ObjParser, ObjError> {
        let mut parser = ObjParser::default();
        let mut current_group = String::new();

        for (i, line) in text.lines().enumerate() {
            parser.handle_line(line, i + 1, &mut current_group)?;
        }

        log::debug!(
            "parsed OBJ: {} vertices, {} normals, {} groups, {} ignored lines",
            parser.vertices.len(), parser.normals.len(), parser.groups.len(), parser.ignored_lines
        );
        Ok(parser)
    }

    /// Reads and parses an OBJ file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ObjParser, ObjError> {
        ObjParser::parse_str(&fs::read_to_string(path)?)
    }

    /// Parses one line of an OBJ file.
    ///
    /// A sample OBJ file may look like the following:
    ///
    /// ```obj
    /// v -1 1 0
    /// v -1 0 0
    /// v 1 0 0
    /// v 1 1 0
    ///
    /// g FirstGroup
    /// f 1 2 3
    /// g SecondGroup
    /// f 1 3 4
    /// ```
    ///
    /// Groups do not nest; `SecondGroup` above is a sibling of `FirstGroup`.
    fn handle_line(&mut self, line: &str, number: usize, current_group: &mut String)
        -> Result<(), ObjError> {
        let mut params = line.split_whitespace();

        match params.next() {
            None => {}
            Some("v") => {
                let p = parse_triple(params, number)?;
                self.vertices.push(Tuple::point(p[0], p[1], p[2]));
            }
            Some("vn") => {
                let n = parse_triple(params, number)?;
                self.normals.push(Tuple::vector(n[0], n[1], n[2]));
            }
            Some("f") => {
                let face = params
                    .map(|token| self.parse_face_vertex(token, number))
                    .collect::<Result<Vec<FaceVertex>, ObjError>>()?;
                if face.len() < 3 {
                    return Err(ObjError::Malformed { line: number, reason: "face needs at least three vertices" });
                }

                let triangles = self.groups.entry(current_group.clone()).or_default();
                triangles.extend(fan_triangulation(&face));
            }
            Some("g") | Some("o") => match params.next() {
                Some(name) => {
                    *current_group = name.to_string();
                    self.groups.entry(name.to_string()).or_default();
                }
                None => self.ignored_lines += 1,
            },
            Some(_) => self.ignored_lines += 1,
        }

        Ok(())
    }

    /// Parses `v`, `v/t`, `v//n` or `v/t/n`. Texture indices are ignored.
    fn parse_face_vertex(&self, token: &str, line: usize) -> Result<FaceVertex, ObjError> {
        let mut parts = token.split('/');

        let vertex = match parts.next() {
            Some(v) => parse_index(v, "vertex", self.vertices.len(), line)?,
            None => return Err(ObjError::Malformed { line, reason: "empty face vertex" }),
        };

        let normal = match parts.nth(1) {
            Some(n) if !n.is_empty() => Some(parse_index(n, "normal", self.normals.len(), line)?),
            _ => None,
        };

        Ok(FaceVertex { vertex, normal })
    }

    /// Names of every group, default group first.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn triangles(&self, group: &str) -> Option<&[ObjTriangle]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// Builds the named group as a group of (smooth) triangles.
    pub fn group(&self, name: &str) -> Option<Shape> {
        let triangles = self.groups.get(name)?;

        let mut group = Shape::group();
        for t in triangles.iter() {
            group.add_child(self.make_triangle(t));
        }

        Some(group)
    }

    /// Builds one group holding a subgroup per non-empty OBJ group.
    pub fn into_group(self) -> Shape {
        let mut root = Shape::group();

        for (name, triangles) in self.groups.iter() {
            if triangles.is_empty() {
                log::warn!("OBJ group {:?} has no faces", name);
                continue;
            }

            let mut group = Shape::group();
            for t in triangles.iter() {
                group.add_child(self.make_triangle(t));
            }
            root.add_child(group);
        }

        root
    }

    fn make_triangle(&self, t: &ObjTriangle) -> Shape {
        let [a, b, c] = *t;
        let (p1, p2, p3) = (self.vertices[a.vertex], self.vertices[b.vertex], self.vertices[c.vertex]);

        match (a.normal, b.normal, c.normal) {
            (Some(n1), Some(n2), Some(n3)) => Shape::smooth_triangle(
                p1, p2, p3,
                self.normals[n1], self.normals[n2], self.normals[n3],
            ),
            _ => Shape::triangle(p1, p2, p3),
        }
    }

    /// Writes the parsed data back out as OBJ text, with every face already
    /// triangulated.
    pub fn to_obj(&self) -> String {
        let mut out = String::new();

        for v in self.vertices.iter() {
            out.push_str(&format!("v {} {} {}\n", v.x, v.y, v.z));
        }
        for n in self.normals.iter() {
            out.push_str(&format!("vn {} {} {}\n", n.x, n.y, n.z));
        }

        for (name, triangles) in self.groups.iter() {
            if !name.is_empty() {
                out.push_str(&format!("g {}\n", name));
            }

            for t in triangles.iter() {
                out.push('f');
                for corner in t.iter() {
                    match corner.normal {
                        Some(n) => out.push_str(&format!(" {}//{}", corner.vertex + 1, n + 1)),
                        None => out.push_str(&format!(" {}", corner.vertex + 1)),
                    }
                }
                out.push('\n');
            }
        }

        out
    }
}

fn parse_triple<'a>(mut params: impl Iterator<Item = &'a str>, line: usize)
    -> Result<[f64; 3], ObjError> {
    let mut out = [0.0; 3];
    for slot in out.iter_mut() {
        let token = params.next().ok_or(ObjError::Malformed { line, reason: "expected three coordinates" })?;
        *slot = token.parse().map_err(|_| ObjError::BadNumber { line, token: token.to_string() })?;
    }

    Ok(out)
}

/// Turns a one-based OBJ index into a zero-based one.
fn parse_index(token: &str, what: &'static str, len: usize, line: usize) -> Result<usize, ObjError> {
    let index: usize = token
        .parse()
        .map_err(|_| ObjError::BadNumber { line, token: token.to_string() })?;

    if index == 0 || index > len {
        return Err(ObjError::BadIndex { line, what, index, len });
    }

    Ok(index - 1)
}

/// Splits a convex polygon into triangles sharing its first vertex.
///
/// ```text
///         B *
///          / \
///         /   \
///     A *       * C
///       |       |
///     E * ----- * D
/// ```
///
/// gives `A-B-C`, `A-C-D` and `A-D-E`.
fn fan_triangulation(face: &[FaceVertex]) -> Vec<ObjTriangle> {
    (1..face.len() - 1)
        .map(|i| [face[0], face[i], face[i + 1]])
        .collect()
}

#[cfg(test)]
use crate::shape::ShapeKind;

#[cfg(test)]
fn corners(s: &Shape) -> (Tuple, Tuple, Tuple) {
    match s.kind() {
        ShapeKind::Triangle(t) => (t.p1, t.p2, t.p3),
        ShapeKind::SmoothTriangle(t) => (t.triangle.p1, t.triangle.p2, t.triangle.p3),
        other => panic!("not a triangle: {:?}", other),
    }
}

#[test]
fn ignoring_unrecognized_lines() {
    let text = "There was a young lady named Bright\n\
                who traveled much faster than light.\n\
                She set out one day\n\
                in a relative way,\n\
                and came back the previous night.\n";
    let obj = ObjParser::parse_str(text).unwrap();

    assert_eq!(obj.ignored_lines, 5);
    assert!(obj.vertices.is_empty());
}

#[test]
fn vertex_records() {
    let text = "v -1 1 0\nv -1.0000 0.5000 0.0000\nv 1 0 0\nv 1 1 0\n";
    let obj = ObjParser::parse_str(text).unwrap();

    assert_eq!(obj.vertices, vec![
        Tuple::point(-1.0, 1.0, 0.0),
        Tuple::point(-1.0, 0.5, 0.0),
        Tuple::point(1.0, 0.0, 0.0),
        Tuple::point(1.0, 1.0, 0.0),
    ]);
}

#[test]
fn parsing_triangle_faces() {
    let text = "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\nf 1 2 3\nf 1 3 4\n";
    let obj = ObjParser::parse_str(text).unwrap();
    let g = obj.group("").unwrap();
    let v = &obj.vertices;

    assert_eq!(g.children().len(), 2);
    assert_eq!(corners(&g.children()[0]), (v[0], v[1], v[2]));
    assert_eq!(corners(&g.children()[1]), (v[0], v[2], v[3]));
}

#[test]
fn triangulating_polygons() {
    let text = "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\nv 0 2 0\n\nf 1 2 3 4 5\n";
    let obj = ObjParser::parse_str(text).unwrap();
    let g = obj.group("").unwrap();
    let v = &obj.vertices;

    assert_eq!(g.children().len(), 3);
    assert_eq!(corners(&g.children()[0]), (v[0], v[1], v[2]));
    assert_eq!(corners(&g.children()[1]), (v[0], v[2], v[3]));
    assert_eq!(corners(&g.children()[2]), (v[0], v[3], v[4]));
}

#[test]
fn triangles_in_groups() {
    let text = "v -1 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\n\
                g FirstGroup\nf 1 2 3\no SecondGroup\nf 1 3 4\n";
    let obj = ObjParser::parse_str(text).unwrap();
    let v = obj.vertices.clone();

    let first = obj.group("FirstGroup").unwrap();
    let second = obj.group("SecondGroup").unwrap();
    assert_eq!(corners(&first.children()[0]), (v[0], v[1], v[2]));
    assert_eq!(corners(&second.children()[0]), (v[0], v[2], v[3]));
    assert!(obj.group("").is_none());

    let root = obj.into_group();
    assert_eq!(root.children().len(), 2);
    assert_eq!(root.children()[0], first);
    assert_eq!(root.children()[1], second);
}

#[test]
fn vertex_normal_records() {
    let obj = ObjParser::parse_str("vn 0 0 1\nvn 0.707 0 -0.707\nvn 1 2 3\n").unwrap();

    assert_eq!(obj.normals, vec![
        Tuple::vector(0.0, 0.0, 1.0),
        Tuple::vector(0.707, 0.0, -0.707),
        Tuple::vector(1.0, 2.0, 3.0),
    ]);
}

#[test]
fn faces_with_normals_are_smooth() {
    let text = "v 0 1 0\nv -1 0 0\nv 1 0 0\n\n\
                vn -1 0 0\nvn 1 0 0\nvn 0 1 0\n\n\
                f 1//3 2//1 3//2\nf 1/0/3 2/102/1 3/14/2\n";
    let obj = ObjParser::parse_str(text).unwrap();
    let g = obj.group("").unwrap();

    let expected = Shape::smooth_triangle(
        obj.vertices[0], obj.vertices[1], obj.vertices[2],
        obj.normals[2], obj.normals[0], obj.normals[1],
    );
    assert_eq!(g.children()[0], expected);
    assert_eq!(g.children()[1], expected);
}

#[test]
fn malformed_input_reports_line() {
    match ObjParser::parse_str("v 1 0 0\nv 1 x 0\n") {
        Err(ObjError::BadNumber { line: 2, token }) => assert_eq!(token, "x"),
        other => panic!("unexpected {:?}", other),
    }

    match ObjParser::parse_str("v 1 0 0\n\nf 1 2 3\n") {
        Err(ObjError::BadIndex { line: 3, what: "vertex", index: 2, len: 1 }) => {}
        other => panic!("unexpected {:?}", other),
    }

    match ObjParser::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3//1\n") {
        Err(ObjError::BadIndex { line: 4, what: "normal", .. }) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(matches!(
        ObjParser::parse_str("v 0 0\n"),
        Err(ObjError::Malformed { line: 1, .. })
    ));
    assert!(matches!(
        ObjParser::parse_str("v 0 0 0\nv 1 0 0\nf 1 2\n"),
        Err(ObjError::Malformed { line: 3, .. })
    ));
}

#[test]
fn emitting_obj_text() {
    let text = "v 0 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\nvn 0 0 1\n\
                f 1 2 3 4\ng Lid\nf 1//1 2//1 3//1\n";
    let obj = ObjParser::parse_str(text).unwrap();
    let out = obj.to_obj();

    assert_eq!(out, "v 0 1 0\nv -1 0 0\nv 1 0 0\nv 1 1 0\nvn 0 0 1\n\
                     f 1 2 3\nf 1 3 4\ng Lid\nf 1//1 2//1 3//1\n");

    let again = ObjParser::parse_str(&out).unwrap();
    assert_eq!(again.vertices, obj.vertices);
    assert_eq!(again.triangles("Lid"), obj.triangles("Lid"));
    assert_eq!(again.group_names().collect::<Vec<_>>(), vec!["", "Lid"]);
}
