//! A ground-plane quadtree used for view-frustum culling.
//!
//! The index is non-exclusive: an entity inserted into a node is offered to
//! every child of that node, and each child keeps it if the entity lies
//! strictly inside the child's bounds. Nodes only ever gain children and
//! entities; the whole tree is dropped together.

use log::{ debug, trace };
use serde::{ Serialize, Deserialize };

use crate::consts::{ QUADTREE_MAX_PER_NODE, QUADTREE_MAX_DEPTH };
use crate::frustum::Frustum;
use crate::matrix::Matrix4D;
use crate::tuple::{ Tuple2D, Tuple3D };

/// Anything with a world-space position.
///
/// Only the X and Z coordinates are used by the quadtree.
pub trait Located {
    fn world_position(&self) -> Tuple3D;
}

impl Located for Tuple3D {
    fn world_position(&self) -> Tuple3D {
        *self
    }
}

/// A world transform is located where it moves the local origin.
impl Located for Matrix4D {
    fn world_position(&self) -> Tuple3D {
        self.translation_part()
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn world_position(&self) -> Tuple3D {
        (**self).world_position()
    }
}

/// Subdivision parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// Entity count at which a node splits into four children.
    pub capacity: usize,

    /// Depth (root is 0) at which nodes stop splitting regardless of count.
    pub max_depth: u32,
}

impl Default for QuadTreeConfig {
    fn default() -> QuadTreeConfig {
        QuadTreeConfig {
            capacity: QUADTREE_MAX_PER_NODE,
            max_depth: QUADTREE_MAX_DEPTH,
        }
    }
}

/// The face normals of an axis-aligned quad, used as separating axes.
///
/// Opposite directions are redundant for interval tests but all four are
/// kept; the result does not depend on their order.
const SEPARATING_AXES: [Tuple2D; 4] = [
    Tuple2D { x:  1.0, y:  0.0 },
    Tuple2D { x:  0.0, y:  1.0 },
    Tuple2D { x: -1.0, y:  0.0 },
    Tuple2D { x:  0.0, y: -1.0 },
];

/// A node covering an axis-aligned rectangle of the XZ plane.
///
/// `origin` is the center of the rectangle; `origin.y` is a world Z
/// coordinate.
#[derive(Clone, Debug)]
pub struct QuadTreeNode<T> {
    pub origin: Tuple2D,
    pub width: f32,
    pub height: f32,

    depth: u32,
    children: Option<Box<[QuadTreeNode<T>; 4]>>,
    entities: Vec<T>,
}

impl<T> QuadTreeNode<T> {
    /// Creates an empty root node.
    pub fn new(origin: Tuple2D, width: f32, height: f32) -> QuadTreeNode<T> {
        Self::with_depth(origin, width, height, 0)
    }

    fn with_depth(origin: Tuple2D, width: f32, height: f32, depth: u32)
        -> QuadTreeNode<T> {
        QuadTreeNode {
            origin,
            width,
            height,
            depth,
            children: None,
            entities: Vec::new(),
        }
    }

    /// The four quadrants, present once the node has split.
    ///
    /// Order: `(-x, -z)`, `(+x, -z)`, `(-x, +z)`, `(+x, +z)`.
    pub fn children(&self) -> Option<&[QuadTreeNode<T>; 4]> {
        self.children.as_deref()
    }

    pub fn entities(&self) -> &[T] {
        &self.entities
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether `p` lies strictly inside the node's rectangle. Points on the
    /// boundary belong to neither side.
    pub fn contains(&self, p: Tuple2D) -> bool {
        let half_width = self.width * 0.5;
        let half_height = self.height * 0.5;

        p.x > self.origin.x - half_width && p.x < self.origin.x + half_width
            && p.y > self.origin.y - half_height
            && p.y < self.origin.y + half_height
    }

    /// Whether `p` lies inside the node's rectangle or on its boundary.
    pub fn covers(&self, p: Tuple2D) -> bool {
        let half_width = self.width * 0.5;
        let half_height = self.height * 0.5;

        p.x >= self.origin.x - half_width && p.x <= self.origin.x + half_width
            && p.y >= self.origin.y - half_height
            && p.y <= self.origin.y + half_height
    }

    pub fn corners(&self) -> [Tuple2D; 4] {
        let half_width = self.width * 0.5;
        let half_height = self.height * 0.5;

        [
            self.origin + Tuple2D::new(-half_width, -half_height),
            self.origin + Tuple2D::new( half_width, -half_height),
            self.origin + Tuple2D::new(-half_width,  half_height),
            self.origin + Tuple2D::new( half_width,  half_height),
        ]
    }

    /// Total number of nodes in this subtree, this node included.
    pub fn node_count(&self) -> usize {
        1 + self.children.as_ref().map_or(0, |children| {
            children.iter().map(|c| c.node_count()).sum()
        })
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self.children {
            None => 1,
            Some(ref children) => children.iter().map(|c| c.leaf_count()).sum(),
        }
    }

    /// Tests the node against a camera's view frustum.
    ///
    /// Nodes span the whole Y axis, so both shapes are projected onto the XZ
    /// plane where the quad and the frustum's footprint are convex polygons,
    /// and the separating axis theorem is applied along the quad's face
    /// normals. Touching intervals count as intersecting.
    ///
    /// `facing` must be unit length. The frustum is not validated; a
    /// degenerate one produces non-finite corners and an unspecified answer.
    pub fn intersect_frustum(&self, position: Tuple3D, facing: Tuple3D,
        frustum: &Frustum) -> bool {
        self.overlaps_footprint(&footprint(position, facing, frustum))
    }

    /// Leaves whose rectangle intersects the frustum.
    ///
    /// Subtrees whose root misses the frustum are skipped whole; intersecting
    /// internal nodes are replaced by their intersecting leaves.
    pub fn nodes_intersecting_frustum(&self, position: Tuple3D,
        facing: Tuple3D, frustum: &Frustum) -> Vec<&QuadTreeNode<T>> {
        let mut nodes = Vec::new();
        let footprint = footprint(position, facing, frustum);
        self.collect_frustum_nodes(&footprint, true, &mut nodes);

        debug!("{} quadtree leaves intersect the frustum", nodes.len());
        nodes
    }

    /// Nodes that do not intersect the frustum.
    ///
    /// The highest missing node of each culled subtree is reported; its
    /// descendants are not listed separately.
    pub fn nodes_not_intersecting_frustum(&self, position: Tuple3D,
        facing: Tuple3D, frustum: &Frustum) -> Vec<&QuadTreeNode<T>> {
        let mut nodes = Vec::new();
        let footprint = footprint(position, facing, frustum);
        self.collect_frustum_nodes(&footprint, false, &mut nodes);

        debug!("{} quadtree nodes are outside the frustum", nodes.len());
        nodes
    }

    fn collect_frustum_nodes<'a>(&'a self, footprint: &[Tuple2D; 8],
        intersecting: bool, nodes: &mut Vec<&'a QuadTreeNode<T>>) {
        if self.overlaps_footprint(footprint) {
            match self.children {
                Some(ref children) => {
                    for child in children.iter() {
                        child.collect_frustum_nodes(footprint, intersecting,
                            nodes);
                    }
                },

                // Only intersecting leaves are reported.
                None => if intersecting {
                    nodes.push(self);
                },
            }
        } else if !intersecting {
            nodes.push(self);
        }
    }

    fn overlaps_footprint(&self, footprint: &[Tuple2D; 8]) -> bool {
        let overlaps = !separated_on_any(footprint, &self.corners(),
            &SEPARATING_AXES);
        trace!("node at ({}, {}) size {}x{} overlaps frustum: {}",
            self.origin.x, self.origin.y, self.width, self.height, overlaps);

        overlaps
    }
}

impl<T: Located + Clone> QuadTreeNode<T> {
    /// Inserts an entity by its XZ position.
    ///
    /// Entities outside the node's open rectangle are ignored. Once the node
    /// holds `config.capacity` entities it splits into four quadrants (unless
    /// it sits at `config.max_depth`), and from then on every entity it
    /// accepts is offered to all four children; earlier entities stay where
    /// they are.
    pub fn insert(&mut self, entity: T, config: &QuadTreeConfig) {
        let position = entity.world_position().xz();
        if !self.contains(position) {
            return;
        }

        self.entities.push(entity.clone());
        if self.entities.len() < config.capacity {
            return;
        }

        if self.children.is_none() {
            if self.depth >= config.max_depth {
                trace!("node at depth {} reached the maximum depth",
                    self.depth);
                return;
            }

            self.subdivide();
        }

        if let Some(ref mut children) = self.children {
            for child in children.iter_mut() {
                child.insert(entity.clone(), config);
            }
        }
    }

    fn subdivide(&mut self) {
        let half_width = self.width * 0.5;
        let half_height = self.height * 0.5;
        let quarter_width = half_width * 0.5;
        let quarter_height = half_height * 0.5;
        let origin = self.origin;
        let depth = self.depth + 1;

        debug!("subdividing node at ({}, {}) depth {}",
            self.origin.x, self.origin.y, self.depth);

        let child = |dx: f32, dz: f32| QuadTreeNode::with_depth(
            origin + Tuple2D::new(dx, dz), half_width, half_height, depth
        );

        self.children = Some(Box::new([
            child(-quarter_width, -quarter_height),
            child( quarter_width, -quarter_height),
            child(-quarter_width,  quarter_height),
            child( quarter_width,  quarter_height),
        ]));
    }
}

/// A quadtree root together with its subdivision parameters.
#[derive(Clone, Debug)]
pub struct QuadTree<T> {
    root: QuadTreeNode<T>,
    config: QuadTreeConfig,
}

impl<T: Located + Clone> QuadTree<T> {
    /// Creates a tree covering `width` by `height` around `origin` with the
    /// default subdivision parameters.
    pub fn new(origin: Tuple2D, width: f32, height: f32) -> QuadTree<T> {
        Self::with_config(origin, width, height, Default::default())
    }

    pub fn with_config(origin: Tuple2D, width: f32, height: f32,
        config: QuadTreeConfig) -> QuadTree<T> {
        QuadTree { root: QuadTreeNode::new(origin, width, height), config }
    }

    pub fn insert(&mut self, entity: T) {
        self.root.insert(entity, &self.config);
    }

    pub fn root(&self) -> &QuadTreeNode<T> {
        &self.root
    }

    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }
}

impl<T: Located + Clone> Extend<T> for QuadTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for entity in iter {
            self.insert(entity);
        }
    }
}

/// The frustum's corners projected orthogonally onto the XZ plane.
fn footprint(position: Tuple3D, facing: Tuple3D, frustum: &Frustum)
    -> [Tuple2D; 8] {
    let corners = frustum.world_corners(position, facing);
    let mut projected = [Tuple2D::default(); 8];
    for (p, c) in projected.iter_mut().zip(corners.iter()) {
        *p = c.xz();
    }

    projected
}

/// The `[min, max]` interval of the points projected onto `axis`.
fn projection_interval(points: &[Tuple2D], axis: &Tuple2D) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Whether any of `axes` separates the two point sets. Only a strict gap
/// separates; touching intervals do not.
fn separated_on_any(frustum: &[Tuple2D], quad: &[Tuple2D], axes: &[Tuple2D])
    -> bool {
    axes.iter().any(|axis| {
        let (frustum_min, frustum_max) = projection_interval(frustum, axis);
        let (quad_min, quad_max) = projection_interval(quad, axis);

        quad_min > frustum_max || frustum_min > quad_max
    })
}

/* Tests */

#[cfg(test)]
fn narrow_frustum() -> Frustum {
    Frustum::new(1.0, 30.0, std::f32::consts::PI / 3.0, 100.0, 100.0).unwrap()
}

#[cfg(test)]
fn walk<'a, T>(node: &'a QuadTreeNode<T>, out: &mut Vec<&'a QuadTreeNode<T>>) {
    out.push(node);
    if let Some(children) = node.children() {
        for c in children.iter() {
            walk(c, out);
        }
    }
}

#[test]
fn empty_tree_is_a_single_leaf() {
    let tree: QuadTree<Tuple3D> = QuadTree::new(Tuple2D::new(0.0, 0.0),
        100.0, 100.0);

    assert!(tree.root().is_leaf());
    assert_eq!(tree.root().node_count(), 1);
    assert_eq!(tree.root().leaf_count(), 1);
}

#[test]
fn insert_subdivides_until_max_depth() {
    let config = QuadTreeConfig { capacity: 1, max_depth: 3 };
    let mut tree = QuadTree::with_config(Tuple2D::new(0.0, 0.0), 100.0, 100.0,
        config);
    tree.insert(Tuple3D::new(10.0, 3.0, 10.0));

    // One split per level along the entity's path.
    assert_eq!(tree.root().node_count(), 13);
    assert_eq!(tree.root().leaf_count(), 10);

    let mut nodes = Vec::new();
    walk(tree.root(), &mut nodes);
    let holders: Vec<_> = nodes.iter()
        .filter(|n| !n.entities().is_empty())
        .collect();
    assert_eq!(holders.len(), 4);
    assert!(nodes.iter().all(|n| n.depth() <= 3));
}

#[test]
fn children_halve_parent_bounds() {
    let mut tree = QuadTree::new(Tuple2D::new(4.0, -8.0), 40.0, 20.0);
    tree.insert(Tuple3D::new(5.0, 0.0, -7.0));

    let children = tree.root().children().expect("root should split");
    assert_eq!(children[0].origin, Tuple2D::new(-6.0, -13.0));
    assert_eq!(children[1].origin, Tuple2D::new(14.0, -13.0));
    assert_eq!(children[2].origin, Tuple2D::new(-6.0, -3.0));
    assert_eq!(children[3].origin, Tuple2D::new(14.0, -3.0));
    for c in children.iter() {
        assert_eq!(c.width, 20.0);
        assert_eq!(c.height, 10.0);
        assert_eq!(c.depth(), 1);
    }
}

#[test]
fn entities_stay_inside_open_bounds() {
    let mut tree = QuadTree::new(Tuple2D::new(0.0, 0.0), 100.0, 100.0);
    let positions = [
        (10.0, 10.0), (-20.0, 33.0), (0.0, 12.5), (49.0, -49.0),
        (-12.5, -12.5), (25.0, 0.0), (50.0, 10.0), (-3.0, 7.0),
    ];
    tree.extend(positions.iter().map(|&(x, z)| Tuple3D::new(x, 1.0, z)));

    let mut nodes = Vec::new();
    walk(tree.root(), &mut nodes);

    for node in nodes {
        for e in node.entities() {
            assert!(node.contains(e.xz()));
        }

        match node.children() {
            None => assert!(node.is_leaf()),
            Some(children) => assert_eq!(children.len(), 4),
        }
    }
}

#[test]
fn boundary_points_are_excluded() {
    let mut tree = QuadTree::new(Tuple2D::new(0.0, 0.0), 100.0, 100.0);

    // On the root's edge: rejected outright.
    tree.insert(Tuple3D::new(50.0, 0.0, 0.0));
    assert!(tree.root().entities().is_empty());
    assert!(tree.root().is_leaf());

    // On the seam between quadrants: the root keeps it, no child does.
    tree.insert(Tuple3D::new(0.0, 0.0, 10.0));
    assert_eq!(tree.root().entities().len(), 1);
    let children = tree.root().children().expect("root should split");
    assert!(children.iter().all(|c| c.entities().is_empty()));

    // Both children along the seam still cover the point.
    let seam = Tuple2D::new(0.0, 10.0);
    assert!(children[2].covers(seam));
    assert!(children[3].covers(seam));
    assert!(!children[0].covers(seam));
}

#[test]
fn earlier_entities_are_not_redistributed() {
    let config = QuadTreeConfig { capacity: 2, max_depth: 4 };
    let mut tree = QuadTree::with_config(Tuple2D::new(0.0, 0.0), 100.0, 100.0,
        config);
    tree.insert(Tuple3D::new(-10.0, 0.0, -10.0));
    assert!(tree.root().is_leaf());

    tree.insert(Tuple3D::new(10.0, 0.0, 10.0));
    let children = tree.root().children().expect("root should split");

    assert_eq!(tree.root().entities().len(), 2);
    assert!(children[0].entities().is_empty());
    assert_eq!(children[3].entities().len(), 1);
}

#[test]
fn world_transforms_are_indexed_by_translation() {
    let crates = vec![
        Matrix4D::translation(10.0, 1.0, 10.0) * Matrix4D::rotation_y(0.5),
        Matrix4D::translation(-10.0, 1.0, 20.0),
    ];

    let mut tree = QuadTree::new(Tuple2D::new(0.0, 0.0), 100.0, 100.0);
    tree.extend(crates.iter());

    let children = tree.root().children().expect("root should split");
    assert_eq!(tree.root().entities().len(), 2);
    assert_eq!(children[3].entities().len(), 1);
    assert_eq!(children[2].entities().len(), 1);
    assert!(std::ptr::eq(children[3].entities()[0], &crates[0]));
}

#[test]
fn frustum_covering_opposite_quadrant_skips_entity_leaf() {
    let mut tree = QuadTree::new(Tuple2D::new(0.0, 0.0), 100.0, 100.0);
    let entity = Tuple3D::new(10.0, 0.0, 10.0);
    tree.insert(entity);

    let position = Tuple3D::new(-25.0, 0.0, -5.0);
    let facing = Tuple3D::new(0.0, 0.0, -1.0);
    let frustum = narrow_frustum();

    let hits = tree.root().nodes_intersecting_frustum(position, facing,
        &frustum);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].origin, Tuple2D::new(-25.0, -25.0));
    assert!(hits.iter().all(|n| n.is_leaf()));
    assert!(hits.iter().all(|n| !n.contains(entity.xz())));

    let misses = tree.root().nodes_not_intersecting_frustum(position, facing,
        &frustum);
    assert_eq!(misses.len(), 3);
    assert!(misses.iter().all(|n| n.depth() == 1));
    assert!(misses.iter().any(|n| n.contains(entity.xz())));
}

#[test]
fn frustum_facing_away_culls_whole_tree() {
    let mut tree = QuadTree::new(Tuple2D::new(0.0, 0.0), 100.0, 100.0);
    tree.insert(Tuple3D::new(10.0, 0.0, 10.0));

    let position = Tuple3D::new(0.0, 0.0, 60.0);
    let facing = Tuple3D::new(0.0, 0.0, 1.0);
    let frustum = narrow_frustum();

    assert!(!tree.root().intersect_frustum(position, facing, &frustum));
    assert!(tree.root()
        .nodes_intersecting_frustum(position, facing, &frustum)
        .is_empty());

    let misses = tree.root().nodes_not_intersecting_frustum(position, facing,
        &frustum);
    assert_eq!(misses.len(), 1);
    assert!(std::ptr::eq(misses[0], tree.root()));
}

#[test]
fn camera_inside_node_intersects() {
    let node: QuadTreeNode<Tuple3D> = QuadTreeNode::new(
        Tuple2D::new(0.0, 0.0), 10.0, 10.0);
    let facing = Tuple3D::new(1.0, 0.0, 1.0).normalize();

    assert!(node.intersect_frustum(Tuple3D::new(1.0, 5.0, 1.0), facing,
        &narrow_frustum()));
}

#[test]
fn touching_intervals_count_as_intersecting() {
    let quad = QuadTreeNode::<Tuple3D>::new(Tuple2D::new(0.0, 0.0), 2.0, 2.0)
        .corners();
    let touching = [Tuple2D::new(1.0, 0.0); 8];
    let apart = [Tuple2D::new(1.5, 0.0); 8];

    assert!(!separated_on_any(&touching, &quad, &SEPARATING_AXES));
    assert!(separated_on_any(&apart, &quad, &SEPARATING_AXES));
}

#[test]
fn separating_axis_order_does_not_matter() {
    let frustum = narrow_frustum();
    let nodes: Vec<QuadTreeNode<Tuple3D>> = vec![
        QuadTreeNode::new(Tuple2D::new(0.0, 0.0), 100.0, 100.0),
        QuadTreeNode::new(Tuple2D::new(-25.0, -25.0), 50.0, 50.0),
        QuadTreeNode::new(Tuple2D::new(30.0, -10.0), 8.0, 8.0),
        QuadTreeNode::new(Tuple2D::new(-6.0, 40.0), 12.0, 4.0),
    ];
    let cameras = [
        (Tuple3D::new(0.0, 2.0, 0.0), Tuple3D::new(0.0, 0.0, -1.0)),
        (Tuple3D::new(-40.0, 0.0, 10.0), Tuple3D::new(1.0, 0.0, 0.0)),
        (Tuple3D::new(20.0, 5.0, 20.0), Tuple3D::new(-1.0, -0.2, -1.0)),
        (Tuple3D::new(0.0, 0.0, 80.0), Tuple3D::new(0.0, 0.0, 1.0)),
    ];

    let orders: [[usize; 4]; 4] = [
        [0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1],
    ];

    for (position, facing) in cameras.iter() {
        let projected = footprint(*position, facing.normalize(), &frustum);
        for node in nodes.iter() {
            let quad = node.corners();
            let reference = separated_on_any(&projected, &quad,
                &SEPARATING_AXES);

            for order in orders.iter() {
                let axes: Vec<Tuple2D> = order.iter()
                    .map(|&i| SEPARATING_AXES[i])
                    .collect();
                assert_eq!(separated_on_any(&projected, &quad, &axes),
                    reference);
            }
        }
    }
}

#[test]
fn degenerate_frustum_does_not_panic() {
    let node: QuadTreeNode<Tuple3D> = QuadTreeNode::new(
        Tuple2D::new(0.0, 0.0), 10.0, 10.0);
    let frustum = Frustum { height: 0.0, ..narrow_frustum() };

    // The answer is unspecified; only the absence of a panic is checked.
    let _ = node.intersect_frustum(Tuple3D::zero(),
        Tuple3D::new(0.0, 0.0, -1.0), &frustum);
}
