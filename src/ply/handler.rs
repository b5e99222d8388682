//! Consumers of decoded records.
//!
//! A [`Handler`] is offered every element group of the file. In `setup` it
//! looks at the layout and decides whether it wants the group, remembering
//! where the properties it cares about are. Then `read` is called once per
//! record of each claimed group.

use cgmath::Point3;

use crate::error::Error;
use super::{
    layout::{ElementLayout, PropIndex},
    record::Record,
};


/// Element names the [`VertexHandler`] claims.
pub const VERTEX_ELEMENT_NAMES: &[&str] = &["vertex"];

/// Element names the [`TriangleHandler`] claims.
pub const FACE_ELEMENT_NAMES: &[&str] = &["face"];

/// Names of the face property holding vertex indices. Both are common.
pub const VERTEX_INDICES_NAMES: &[&str] = &["vertex_indices", "vertex_index"];


/// Receives the records of element groups it claims.
pub trait Handler {
    /// Called once per element group (in header order) before any data is
    /// decoded. Returns `true` to receive the records of this group.
    fn setup(&mut self, layout: &ElementLayout) -> bool;

    /// Called once per record of every claimed group, in file order.
    fn read(&mut self, record: &Record<'_>) -> Result<(), Error>;
}

/// Upper bound for reserving capacity up front. The count comes straight from
/// the file, so we don't trust it too much.
const MAX_RESERVE: u64 = 1 << 20;

fn reserve_hint(count: u64) -> usize {
    count.min(MAX_RESERVE) as usize
}


/// Collects the `x`, `y` and `z` properties of the first `vertex` group.
#[derive(Debug, Clone, Default)]
pub struct VertexHandler {
    props: Option<[PropIndex; 3]>,
    element: Option<usize>,
    positions: Vec<Point3<f32>>,
}

impl VertexHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<Point3<f32>> {
        self.positions
    }
}

impl Handler for VertexHandler {
    fn setup(&mut self, layout: &ElementLayout) -> bool {
        if self.element.is_some() || !layout.is_named(VERTEX_ELEMENT_NAMES) {
            return false;
        }

        // All three coordinates have to be scalars that are actually stored.
        let find = |name: &str| {
            layout.prop_pos(name)
                .filter(|&idx| layout.target(idx).map(|t| !t.ty.is_list()).unwrap_or(false))
        };
        let props = match (find("x"), find("y"), find("z")) {
            (Some(x), Some(y), Some(z)) => [x, y, z],
            _ => return false,
        };

        self.props = Some(props);
        self.element = Some(layout.index);
        self.positions.reserve(reserve_hint(layout.count));
        true
    }

    fn read(&mut self, record: &Record<'_>) -> Result<(), Error> {
        if let Some([x, y, z]) = self.props {
            let get = |idx| record.get_as::<f32>(idx).unwrap_or(0.0);
            self.positions.push(Point3::new(get(x), get(y), get(z)));
        }

        Ok(())
    }
}


/// Collects triangles from the vertex index list of the first `face` group.
///
/// Every face has to have exactly three indices, otherwise reading fails
/// with [`Error::ListArity`].
#[derive(Debug, Clone, Default)]
pub struct TriangleHandler {
    indices: Option<PropIndex>,
    element: Option<usize>,
    triangles: Vec<[u32; 3]>,
}

impl TriangleHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn into_triangles(self) -> Vec<[u32; 3]> {
        self.triangles
    }
}

impl Handler for TriangleHandler {
    fn setup(&mut self, layout: &ElementLayout) -> bool {
        if self.element.is_some() || !layout.is_named(FACE_ELEMENT_NAMES) {
            return false;
        }

        let idx = VERTEX_INDICES_NAMES.iter()
            .filter_map(|name| layout.prop_pos(name))
            .find(|&idx| layout.target(idx).map(|t| t.ty.is_list()).unwrap_or(false));

        match idx {
            Some(idx) => {
                self.indices = Some(idx);
                self.element = Some(layout.index);
                self.triangles.reserve(reserve_hint(layout.count));
                true
            }
            None => false,
        }
    }

    fn read(&mut self, record: &Record<'_>) -> Result<(), Error> {
        let list = match self.indices.and_then(|idx| record.list(idx)) {
            Some(list) => list,
            None => return Ok(()),
        };

        match *list.to_vec::<u32>() {
            [a, b, c] => self.triangles.push([a, b, c]),
            _ => return Err(Error::ListArity {
                element: record.layout().name.clone(),
                expected: 3,
                actual: list.len(),
            }),
        }

        Ok(())
    }
}
