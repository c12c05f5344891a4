//! Depth-bounded octree spatial index used by the self-intersection guard.
//!
//! Ported from `examples/original_source/ipoint/octree.h`'s `OcTree<T>`
//! template: a node subdivides its box into the 8 octants from
//! [`crate::geom::Rect3::octant`], pushes items that intersect more than one
//! octant into every matching child, and only stores items once a node
//! reaches the configured leaf depth. The root box is inflated 5% at
//! construction, same as the original's `scale_percent_ = (1.05, 1.05, 1.05)`,
//! so boundary-touching geometry never falls just outside it.

use std::collections::HashSet;
use std::hash::Hash;

use crate::geom::Rect3;

/// `ceil(log2(n) / 2)` clamped to `[1, 6]`, the original's rule of thumb for
/// picking a leaf depth from an expected element count.
pub fn depth_for_count(n: usize) -> u32 {
    if n <= 1 {
        return 1;
    }
    let log2 = (n as f64).log2();
    let depth = (log2 / 2.0).ceil() as i64;
    depth.clamp(1, 6) as u32
}

struct Node<T> {
    rect: Rect3,
    level: u32,
    leaf_depth: u32,
    children: Option<Box<[Option<Node<T>>; 8]>>,
    items: Vec<(Rect3, T)>,
}

impl<T: Clone + PartialEq> Node<T> {
    fn new(rect: Rect3, level: u32, leaf_depth: u32) -> Self {
        Self {
            rect,
            level,
            leaf_depth,
            children: None,
            items: Vec::new(),
        }
    }

    fn is_leaf(&self) -> bool {
        self.level >= self.leaf_depth
    }

    fn add(&mut self, item_rect: Rect3, item: T) {
        if self.is_leaf() {
            self.items.push((item_rect, item));
            return;
        }
        let children = self.children.get_or_insert_with(|| {
            Box::new(std::array::from_fn(|_| None::<Node<T>>))
        });
        for i in 0u8..8 {
            let octant = self.rect.octant(i);
            if !octant.intersects(&item_rect) {
                continue;
            }
            let child = children[i as usize]
                .get_or_insert_with(|| Node::new(octant, self.level + 1, self.leaf_depth));
            child.add(item_rect, item.clone());
        }
    }

    fn collect(&self, query: &Rect3, out: &mut HashSet<T>)
    where
        T: Eq + Hash,
    {
        if !self.rect.intersects(query) {
            return;
        }
        if self.is_leaf() {
            out.extend(
                self.items
                    .iter()
                    .filter(|(r, _)| r.intersects(query))
                    .map(|(_, t)| t.clone()),
            );
            return;
        }
        if let Some(children) = &self.children {
            for child in children.iter().flatten() {
                child.collect(query, out);
            }
        }
    }

    /// Removes `item` from every leaf its `item_rect` reaches, mirroring
    /// `add`'s fan-out into every octant the rect intersects. Returns
    /// whether it was found in at least one of them.
    fn remove(&mut self, item_rect: &Rect3, item: &T) -> bool {
        if !self.rect.intersects(item_rect) {
            return false;
        }
        if self.is_leaf() {
            if let Some(pos) = self.items.iter().position(|(_, t)| t == item) {
                self.items.remove(pos);
                return true;
            }
            return false;
        }
        let mut found = false;
        if let Some(children) = &mut self.children {
            for child in children.iter_mut().flatten() {
                found |= child.remove(item_rect, item);
            }
        }
        found
    }
}

/// Generic spatial index over items addressed only by an axis-aligned box —
/// the octree never inspects `T` itself, so it works equally for edge ids and
/// triangle ids as long as the caller tracks the bbox each was inserted with.
pub struct Octree<T> {
    root: Node<T>,
}

impl<T: Clone + PartialEq + Eq + Hash> Octree<T> {
    /// `bounds` should already contain every element that will be inserted;
    /// it is inflated by 5% about its center before use.
    pub fn new(bounds: Rect3, leaf_depth: u32) -> Self {
        let mut root_rect = bounds;
        root_rect.scale(crate::geom::Vec3::splat(1.05));
        Self {
            root: Node::new(root_rect, 0, leaf_depth.max(1)),
        }
    }

    pub fn add(&mut self, item_rect: Rect3, item: T) {
        self.root.add(item_rect, item);
    }

    pub fn remove(&mut self, item_rect: &Rect3, item: &T) -> bool {
        self.root.remove(item_rect, item)
    }

    pub fn collect(&self, query: &Rect3) -> HashSet<T> {
        let mut out = HashSet::new();
        self.root.collect(query, &mut out);
        out
    }
}
