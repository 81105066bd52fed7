//! Hierarchical quad-partition of the canvas used as the collision broad phase.
//!
//! Nodes live in a flat arena addressed by index; node 0 is the root.  A node
//! holds items directly until it exceeds `max_objects`, then (below
//! `max_depth`) splits once into four equal children and pushes down every
//! item that fits fully inside one of them.  Items straddling a midline stay
//! at the node.  The tree is rebuilt from scratch every frame.
//!
//! Child order:
//!
//! ```text
//!      1  |  0
//!     ----+----
//!      2  |  3
//! ```

use tracing::warn;

use crate::entities::Rect;

pub const DEFAULT_MAX_OBJECTS: usize = 10;
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Anything with a rectangle can be stored in the tree.
pub trait Bounded {
    fn bounds(&self) -> Rect;
}

impl Bounded for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    TopRight = 0,
    TopLeft = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

/// The quadrant of `bounds` that `rect` lies in, judged against the two
/// midlines only.  `None` when `rect` touches or crosses either midline.
pub fn quadrant_of(bounds: &Rect, rect: &Rect) -> Option<Quadrant> {
    let vertical_mid = bounds.x + bounds.width / 2.0;
    let horizontal_mid = bounds.y + bounds.height / 2.0;

    let top = rect.y < horizontal_mid && rect.bottom() < horizontal_mid;
    let bottom = rect.y > horizontal_mid;

    if rect.x < vertical_mid && rect.right() < vertical_mid {
        if top {
            Some(Quadrant::TopLeft)
        } else if bottom {
            Some(Quadrant::BottomLeft)
        } else {
            None
        }
    } else if rect.x > vertical_mid {
        if top {
            Some(Quadrant::TopRight)
        } else if bottom {
            Some(Quadrant::BottomRight)
        } else {
            None
        }
    } else {
        None
    }
}

#[derive(Clone, Debug)]
struct Node<T> {
    bounds: Rect,
    depth: u32,
    items: Vec<T>,
    children: Option<[usize; 4]>,
}

impl<T> Node<T> {
    fn new(bounds: Rect, depth: u32) -> Self {
        Node {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuadTree<T> {
    nodes: Vec<Node<T>>,
    max_objects: usize,
    max_depth: u32,
}

impl<T: Bounded + Clone> QuadTree<T> {
    pub fn new(bounds: Rect) -> Self {
        Self::with_limits(bounds, DEFAULT_MAX_OBJECTS, DEFAULT_MAX_DEPTH)
    }

    pub fn with_limits(bounds: Rect, max_objects: usize, max_depth: u32) -> Self {
        QuadTree {
            nodes: vec![Node::new(bounds, 0)],
            max_objects,
            max_depth,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.nodes[0].bounds
    }

    /// Drop every item and every child, leaving a single empty root.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        let root = &mut self.nodes[0];
        root.items.clear();
        root.children = None;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of items held directly at the root.
    pub fn root_len(&self) -> usize {
        self.nodes[0].items.len()
    }

    /// Deepest level any node has reached.
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    pub fn insert(&mut self, item: T) {
        let rect = item.bounds();
        if !rect.is_well_formed() {
            warn!(?rect, "ignoring malformed quadtree insert");
            return;
        }
        self.insert_at(0, item);
    }

    /// Insert each item independently.  `Option<T>` works too, so a missing
    /// item is a no-op.
    pub fn insert_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.insert(item);
        }
    }

    fn insert_at(&mut self, id: usize, item: T) {
        let node = &self.nodes[id];
        let target = node
            .children
            .zip(quadrant_of(&node.bounds, &item.bounds()))
            .map(|(children, quadrant)| children[quadrant as usize]);
        if let Some(child) = target {
            self.insert_at(child, item);
            return;
        }

        self.nodes[id].items.push(item);

        let node = &self.nodes[id];
        if node.items.len() <= self.max_objects || node.depth >= self.max_depth {
            return;
        }
        let existing = node.children;
        let children = match existing {
            Some(children) => children,
            None => self.split(id),
        };
        let bounds = self.nodes[id].bounds;
        let mut i = 0;
        while i < self.nodes[id].items.len() {
            match quadrant_of(&bounds, &self.nodes[id].items[i].bounds()) {
                Some(quadrant) => {
                    let moved = self.nodes[id].items.remove(i);
                    self.insert_at(children[quadrant as usize], moved);
                }
                None => i += 1,
            }
        }
    }

    fn split(&mut self, id: usize) -> [usize; 4] {
        let (bounds, depth) = (self.nodes[id].bounds, self.nodes[id].depth);
        // Child sizes are truncated to whole units; midlines are not.
        let sub_width = (bounds.width / 2.0).trunc();
        let sub_height = (bounds.height / 2.0).trunc();
        let quads = [
            Rect::new(bounds.x + sub_width, bounds.y, sub_width, sub_height),
            Rect::new(bounds.x, bounds.y, sub_width, sub_height),
            Rect::new(bounds.x, bounds.y + sub_height, sub_width, sub_height),
            Rect::new(bounds.x + sub_width, bounds.y + sub_height, sub_width, sub_height),
        ];
        let first = self.nodes.len();
        self.nodes
            .extend(quads.into_iter().map(|quad| Node::new(quad, depth + 1)));
        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[id].children = Some(children);
        children
    }

    /// Candidates that `item` might collide with: everything along the single
    /// path of quadrants that would contain it, deepest first.  A superset of
    /// the true overlaps; exact testing is the caller's job.
    pub fn query(&self, item: &T) -> Vec<T> {
        let mut found = Vec::new();
        self.query_into(item, &mut found);
        found
    }

    pub fn query_into(&self, item: &T, found: &mut Vec<T>) {
        let rect = item.bounds();
        if !rect.is_well_formed() {
            warn!(?rect, "ignoring malformed quadtree query");
            return;
        }
        self.query_at(0, &rect, found);
    }

    fn query_at(&self, id: usize, rect: &Rect, found: &mut Vec<T>) {
        let node = &self.nodes[id];
        if let (Some(children), Some(quadrant)) = (node.children, quadrant_of(&node.bounds, rect)) {
            self.query_at(children[quadrant as usize], rect, found);
        }
        found.extend(node.items.iter().cloned());
    }

    /// Every stored item, children before parents.
    pub fn all(&self) -> Vec<T> {
        let mut found = Vec::new();
        self.all_at(0, &mut found);
        found
    }

    fn all_at(&self, id: usize, found: &mut Vec<T>) {
        let node = &self.nodes[id];
        if let Some(children) = node.children {
            for child in children {
                self.all_at(child, found);
            }
        }
        found.extend(node.items.iter().cloned());
    }
}
