//! Wavefront OBJ ingestion for convex hulls.
//!
//! Only the subset needed for hull geometry is read:
//!
//! - `v x y z` appends a vertex (a trailing `w` is ignored)
//! - `f i j k ...` appends a polygon; `i/t/n` tokens use the position index
//!   and negative indices count back from the last vertex
//! - `o name` starts a new object once geometry has been seen
//!
//! Everything else (normals, texture coordinates, groups, materials) is
//! skipped.
//!
//! # Example
//!
//! ```no_run
//! use hullsim::mesh::obj;
//!
//! let hull = obj::parse_obj("assets/box.obj", Some(1e-4)).unwrap();
//! println!("{} faces", hull.num_faces());
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use super::HalfEdgeMesh;
use crate::error::MeshError;
use crate::math::Vec3;

/// Checks that `path` names an `.obj` file that can be opened.
///
/// # Errors
///
/// [`MeshError::UnsupportedExtension`] for any other extension,
/// [`MeshError::Io`] if the file cannot be opened.
pub fn validate<P: AsRef<Path>>(path: P) -> Result<(), MeshError> {
    open(path.as_ref()).map(drop)
}

/// Loads every object of an OBJ file into one hull.
///
/// `merge` is the coplanar merge tolerance; `None` keeps the faces as stored.
pub fn parse_obj<P: AsRef<Path>>(path: P, merge: Option<f32>) -> Result<HalfEdgeMesh, MeshError> {
    let path = path.as_ref();
    let mesh = read_obj(open(path)?, merge)?;
    info!(
        path = %path.display(),
        vertices = mesh.num_vertices(),
        faces = mesh.num_faces(),
        "loaded OBJ hull"
    );
    Ok(mesh)
}

/// Loads each `o` object of an OBJ file as its own hull.
pub fn parse_obj_objects<P: AsRef<Path>>(
    path: P,
    merge: Option<f32>,
) -> Result<Vec<HalfEdgeMesh>, MeshError> {
    let path = path.as_ref();
    let meshes = read_obj_objects(open(path)?, merge)?;
    info!(path = %path.display(), objects = meshes.len(), "loaded OBJ hulls");
    Ok(meshes)
}

/// Reads an OBJ stream into one hull, ignoring object boundaries.
pub fn read_obj<R: BufRead>(reader: R, merge: Option<f32>) -> Result<HalfEdgeMesh, MeshError> {
    let object = parse(reader, false)?
        .pop()
        .ok_or(MeshError::Empty)?;
    object.build(merge)
}

/// Reads an OBJ stream into one hull per object.
pub fn read_obj_objects<R: BufRead>(
    reader: R,
    merge: Option<f32>,
) -> Result<Vec<HalfEdgeMesh>, MeshError> {
    parse(reader, true)?
        .into_iter()
        .map(|object| object.build(merge))
        .collect()
}

fn open(path: &Path) -> Result<BufReader<File>, MeshError> {
    let is_obj = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
    if !is_obj {
        return Err(MeshError::UnsupportedExtension {
            path: path.to_path_buf(),
        });
    }
    Ok(BufReader::new(File::open(path)?))
}

#[derive(Debug, Default)]
struct ObjObject {
    positions: Vec<Vec3>,
    faces: Vec<Vec<u32>>,
}

impl ObjObject {
    fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.faces.is_empty()
    }

    fn build(self, merge: Option<f32>) -> Result<HalfEdgeMesh, MeshError> {
        let mut mesh = HalfEdgeMesh::from_polygons(&self.positions, &self.faces)?;
        if let Some(tolerance) = merge {
            mesh.merge_coplanar_faces(tolerance)?;
        }
        Ok(mesh)
    }
}

fn parse<R: BufRead>(reader: R, split_objects: bool) -> Result<Vec<ObjObject>, MeshError> {
    let mut objects = Vec::new();
    let mut current = ObjObject::default();
    // Vertices read before the current object; face indices are file-global.
    let mut offset: i64 = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let content = line.split('#').next().unwrap_or_default();
        let mut tokens = content.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coord = || -> Result<f32, MeshError> {
                    let token = tokens
                        .next()
                        .ok_or_else(|| MeshError::parse(line_no, "vertex needs three coordinates"))?;
                    token
                        .parse()
                        .map_err(|_| MeshError::parse(line_no, format!("invalid coordinate `{token}`")))
                };
                let position = Vec3::new(coord()?, coord()?, coord()?);
                current.positions.push(position);
            }
            Some("f") => {
                let total = offset + current.positions.len() as i64;
                let face = tokens
                    .map(|token| face_index(token, total, offset, current.faces.len() + 1, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                current.faces.push(face);
            }
            Some("o") if split_objects && !current.is_empty() => {
                offset += current.positions.len() as i64;
                objects.push(std::mem::take(&mut current));
            }
            _ => {}
        }
    }

    if !current.is_empty() || objects.is_empty() {
        objects.push(current);
    }
    debug!(objects = objects.len(), "parsed OBJ stream");
    Ok(objects)
}

/// Resolves one `f` token to a 1-based index local to the current object.
fn face_index(
    token: &str,
    total: i64,
    offset: i64,
    face: usize,
    line_no: usize,
) -> Result<u32, MeshError> {
    let field = token.split('/').next().unwrap_or_default();
    let raw: i64 = field
        .parse()
        .map_err(|_| MeshError::parse(line_no, format!("invalid face index `{token}`")))?;
    let global = if raw < 0 { total + raw + 1 } else { raw };
    let local = global - offset;
    u32::try_from(local)
        .ok()
        .filter(|&v| v > 0)
        .ok_or(MeshError::VertexOutOfRange {
            face,
            vertex: raw,
            count: (total - offset) as usize,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CUBE: &str = "\
# unit cube
o cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
vn 0 0 1
f 1//1 4//1 3//1 2//1
f 5 6 7 8
f 1/1/1 2/1/1 6/1/1 5/1/1
f 3 4 8 7
f 1 5 8 4
f -7 -6 -2 -3
";

    #[test]
    fn test_read_cube() {
        let mesh = read_obj(Cursor::new(CUBE), None).unwrap();
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(mesh.num_edges(), 24);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_objects_are_offset() {
        let text = format!(
            "{CUBE}o tetra\nv 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\n\
             f 9 11 10\nf 9 10 12\nf 9 12 11\nf 10 11 12\n"
        );
        let meshes = read_obj_objects(Cursor::new(text.as_str()), None).unwrap();
        assert_eq!(meshes.len(), 2);
        assert_eq!(meshes[0].num_vertices(), 8);
        assert_eq!(meshes[1].num_vertices(), 4);
        assert_eq!(meshes[1].num_faces(), 4);
        meshes[1].validate().unwrap();

        let joined = read_obj(Cursor::new(text.as_str()), None).unwrap();
        assert_eq!(joined.num_vertices(), 12);
        assert_eq!(joined.num_faces(), 10);
    }

    #[test]
    fn test_leading_object_name_does_not_split() {
        let meshes = read_obj_objects(Cursor::new(CUBE), None).unwrap();
        assert_eq!(meshes.len(), 1);
    }

    #[test]
    fn test_bad_coordinate_reports_line() {
        let text = "v 0 0 0\nv 1 x 0\n";
        let err = read_obj(Cursor::new(text), None).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_missing_coordinate() {
        let err = read_obj(Cursor::new("v 1 2\n"), None).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_bad_face_index() {
        let err = read_obj(Cursor::new("v 0 0 0\nf 1 a 2\n"), None).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 2, .. }));

        let err = read_obj(Cursor::new("v 0 0 0\nf 1 -4 1\n"), None).unwrap_err();
        assert!(matches!(err, MeshError::VertexOutOfRange { vertex: -4, .. }));
    }

    #[test]
    fn test_empty_stream() {
        let err = read_obj(Cursor::new("# nothing\n"), None).unwrap_err();
        assert!(matches!(err, MeshError::Empty));
    }

    #[test]
    fn test_extension_is_checked() {
        let err = validate("model.stl").unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedExtension { .. }));

        let err = validate("does/not/exist.obj").unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
