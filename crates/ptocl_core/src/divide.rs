//! Group subdivision.
//!
//! Large flat groups are split into a binary hierarchy by a median cut on
//! child centroids, so each compiled group record only has to test a
//! handful of triangles after its bounding box passes.

use ptocl_math::{BoundingBox, Tuple4};

use crate::{CoreError, CoreResult, Scene, Shape, ShapeId};

/// Child groups a single group may hold once compiled.
pub const MAX_CHILD_GROUPS: usize = 2;

impl Scene {
    /// Recursively split `group` and its descendants.
    ///
    /// A group with at least two children is split in two when it holds
    /// more than `threshold` children, or more than [`MAX_CHILD_GROUPS`]
    /// child groups. Each half becomes a new untransformed group without an
    /// explicit material, so inherited materials are unchanged. Bounds of
    /// the split groups are refreshed as they are rebuilt.
    pub fn divide(&mut self, group: ShapeId, threshold: usize) -> CoreResult<()> {
        if !self.shape(group)?.is_group() {
            return Err(CoreError::NotAGroup(group));
        }
        self.divide_subtree(group, threshold);
        Ok(())
    }

    fn divide_subtree(&mut self, group: ShapeId, threshold: usize) {
        if self.needs_split(group, threshold) {
            self.split_in_two(group);
        }

        let children = self.children(group).to_vec();
        for child in children {
            if self[child].is_group() {
                self.divide_subtree(child, threshold);
            }
        }
    }

    fn needs_split(&self, group: ShapeId, threshold: usize) -> bool {
        let children = self.children(group);
        let child_groups = children.iter().filter(|&&c| self[c].is_group()).count();
        children.len() >= 2 && (children.len() > threshold || child_groups > MAX_CHILD_GROUPS)
    }

    /// Move the children of `group` into two new subgroups, split at the
    /// median centroid along the axis where centroids spread the most.
    fn split_in_two(&mut self, group: ShapeId) {
        let children = match self.group_mut(group) {
            Some(g) => {
                g.bounding_box = BoundingBox::EMPTY;
                std::mem::take(&mut g.children)
            }
            None => return,
        };

        let mut keyed: Vec<(ShapeId, Tuple4)> = children
            .iter()
            .map(|&c| (c, self.parent_space_bounds_of(c).centroid()))
            .collect();
        let centroids: Vec<Tuple4> = keyed.iter().map(|(_, c)| *c).collect();
        let axis = BoundingBox::from_points(&centroids).longest_axis();
        keyed.sort_by(|a, b| a.1[axis].total_cmp(&b.1[axis]));

        let (left, right) = keyed.split_at(keyed.len() / 2);
        log::debug!(
            "splitting group '{}' ({} children) on axis {axis}: {} + {}",
            self[group].label(),
            keyed.len(),
            left.len(),
            right.len()
        );

        for (i, half) in [left, right].into_iter().enumerate() {
            let label = format!("{}/{i}", self[group].label());
            let sub = self.insert(Shape::group(label));
            for &(child, _) in half {
                self.detach(child);
                self.attach(sub, child);
            }
            self.attach(group, sub);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Camera, Material};
    use ptocl_math::{point, translation};
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn strip(count: usize) -> (Scene, ShapeId) {
        let mut s = Scene::new(Camera::new(10, 10, PI / 3.0));
        let g = s.add_root(Shape::group("mesh").with_material(Material::diffuse(0.2, 0.8, 0.2)));
        for i in 0..count {
            let x = i as f64 * 1.5;
            s.insert_child(
                g,
                Shape::triangle(point(x, 0.0, 0.0), point(x + 1.0, 0.0, 0.0), point(x, 1.0, 0.0)),
            )
            .unwrap();
        }
        (s, g)
    }

    /// Leaves reachable from `id`, in traversal order.
    fn leaves(s: &Scene, id: ShapeId, out: &mut Vec<ShapeId>) {
        for &c in s.children(id) {
            if s[c].is_group() {
                leaves(s, c, out);
            } else {
                out.push(c);
            }
        }
    }

    fn check_tree(s: &Scene, id: ShapeId, threshold: usize) {
        let children = s.children(id);
        let groups = children.iter().filter(|&&c| s[c].is_group()).count();
        assert!(groups <= MAX_CHILD_GROUPS);
        assert!(children.len() < 2 || children.len() <= threshold || groups == children.len());
        for &c in children {
            assert_eq!(s[c].parent(), Some(id));
            if s[c].is_group() {
                check_tree(s, c, threshold);
            }
        }
    }

    #[test]
    fn test_divide_partitions_every_child_once() {
        let (mut s, g) = strip(9);
        let mut before = s.children(g).to_vec();
        let bounds = s.bounds_of(g);

        s.divide(g, 2).unwrap();

        let mut after = Vec::new();
        leaves(&s, g, &mut after);
        before.sort();
        after.sort();
        assert_eq!(before, after);
        assert_eq!(s.bounds_of(g), bounds);
        assert_eq!(s[g].local_bounds(), bounds);
        check_tree(&s, g, 2);
    }

    #[test]
    fn test_divide_splits_along_longest_axis() {
        let (mut s, g) = strip(4);
        s.divide(g, 2).unwrap();

        let halves = s.children(g).to_vec();
        assert_eq!(halves.len(), 2);
        assert_eq!(s[halves[0]].label(), "mesh/0");
        assert_eq!(s[halves[1]].label(), "mesh/1");
        assert!(s[halves[0]].local_bounds().max.x < s[halves[1]].local_bounds().min.x);
    }

    #[test]
    fn test_divide_below_threshold_is_noop() {
        let (mut s, g) = strip(3);
        let before = s.children(g).to_vec();
        s.divide(g, 8).unwrap();
        assert_eq!(s.children(g), before.as_slice());
    }

    #[test]
    fn test_divide_enforces_child_group_capacity() {
        let mut s = Scene::new(Camera::new(10, 10, PI / 3.0));
        let g = s.add_root(Shape::group("root"));
        for i in 0..5 {
            let inner = s.insert_child(g, Shape::group(format!("part{i}"))).unwrap();
            s.insert_child(inner, Shape::cube()).unwrap();
            s.set_transform(inner, translation(i as f64 * 3.0, 0.0, 0.0)).unwrap();
        }
        s.refresh_bounds(g).unwrap();

        s.divide(g, 100).unwrap();
        check_tree(&s, g, 100);
        let mut found = Vec::new();
        leaves(&s, g, &mut found);
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn test_divide_threshold_zero_terminates() {
        let (mut s, g) = strip(6);
        s.divide(g, 0).unwrap();
        check_tree(&s, g, 0);
    }

    #[test]
    fn test_divide_keeps_inherited_material() {
        let (mut s, g) = strip(5);
        s.divide(g, 1).unwrap();
        let mut found = Vec::new();
        leaves(&s, g, &mut found);
        for tri in found {
            assert_eq!(s.material_of(tri).color, Material::diffuse(0.2, 0.8, 0.2).color);
        }
    }

    #[test]
    fn test_divide_rejects_non_group() {
        let mut s = Scene::new(Camera::new(10, 10, PI / 3.0));
        let sphere = s.add_root(Shape::sphere());
        assert_eq!(s.divide(sphere, 1), Err(CoreError::NotAGroup(sphere)));
    }

    proptest! {
        #[test]
        fn prop_divide_preserves_leaves_and_bounds(count in 1usize..40, threshold in 0usize..8) {
            let (mut s, g) = strip(count);
            let bounds = s.bounds_of(g);
            s.divide(g, threshold).unwrap();

            let mut found = Vec::new();
            leaves(&s, g, &mut found);
            prop_assert_eq!(found.len(), count);
            prop_assert_eq!(s.bounds_of(g), bounds);
            check_tree(&s, g, threshold);
        }
    }
}
