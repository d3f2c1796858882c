//! STL support, binary and ASCII, read through `stl_io`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use framescope_core::{FramescopeError, Result};
use glam::Vec3;

use crate::RawMesh;

/// Load a mesh from an STL file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<RawMesh> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| FramescopeError::load(path, e))?;
    read(&mut file).map_err(|e| FramescopeError::load(path, e))
}

/// Read STL data, welding corners that share exact coordinates.
pub fn read<R: Read + Seek>(reader: &mut R) -> Result<RawMesh> {
    let stl = stl_io::read_stl(reader)?;

    let mut raw = RawMesh::default();
    let mut welded: HashMap<[u32; 3], u32> = HashMap::new();
    let mut remap = Vec::with_capacity(stl.vertices.len());
    for v in &stl.vertices {
        let key = [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()];
        let id = *welded.entry(key).or_insert_with(|| {
            raw.vertices.push(Vec3::new(v[0], v[1], v[2]));
            (raw.vertices.len() - 1) as u32
        });
        remap.push(id);
    }

    let mut degenerate = 0usize;
    for tri in &stl.faces {
        let [i0, i1, i2] = tri.vertices.map(|i| remap[i]);
        // Skip degenerate triangles
        if i0 != i1 && i1 != i2 && i0 != i2 {
            raw.faces.push([i0, i1, i2]);
        } else {
            degenerate += 1;
        }
    }
    if degenerate > 0 {
        log::warn!("STL: skipped {degenerate} degenerate triangle(s)");
    }
    if raw.faces.is_empty() {
        return Err(FramescopeError::InvalidMesh(
            "STL file contains no valid triangles".into(),
        ));
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_TRIANGLES: &str = "solid square
facet normal 0 0 1
 outer loop
  vertex 0 0 0
  vertex 1 0 0
  vertex 1 1 0
 endloop
endfacet
facet normal 0 0 1
 outer loop
  vertex 0 0 0
  vertex 1 1 0
  vertex 0 1 0
 endloop
endfacet
endsolid square
";

    #[test]
    fn test_read_ascii_welds_shared_corners() {
        let raw = read(&mut Cursor::new(TWO_TRIANGLES.as_bytes())).unwrap();
        assert_eq!(raw.vertices.len(), 4);
        assert_eq!(raw.faces.len(), 2);
        let surface = raw.into_surface().unwrap();
        assert_eq!(surface.num_edges(), 5);
    }

    #[test]
    fn test_read_rejects_garbage() {
        assert!(read(&mut Cursor::new(b"not an stl file".to_vec())).is_err());
    }
}
