//! Rooms linked through their exits, created lazily as the player explores.
//!
//! Rooms live in an arena and refer to one another by [`RoomId`]. A room
//! created by walking through an exit records the room it came from in
//! neighbour slot 0; that link does not own the parent. Every other filled
//! slot owns its child, so releasing a room releases everything explored
//! beyond it.

use log::{debug, info};
use rand::Rng;

use crate::generator::{self, Layout};
use crate::grid::{CellPos, Exit};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(usize);

impl RoomId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct Room {
    pub layout: Layout,
    parent: Option<RoomId>,
    /// One slot per exit, in exit order.
    neighbours: Vec<Option<RoomId>>,
}

impl Room {
    fn new(layout: Layout, parent: Option<RoomId>) -> Self {
        let mut neighbours = vec![None; layout.exits.len()];
        if let Some(slot) = neighbours.first_mut() {
            *slot = parent;
        }
        Self {
            layout,
            parent,
            neighbours,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<RoomId> {
        self.parent
    }

    #[inline]
    pub fn exits(&self) -> &[Exit] {
        &self.layout.exits
    }

    #[inline]
    pub fn neighbour(&self, exit_index: usize) -> Option<RoomId> {
        self.neighbours.get(exit_index).copied().flatten()
    }

    /// Neighbours this room owns, skipping the link back to its parent.
    pub fn children(&self) -> impl Iterator<Item = RoomId> + '_ {
        let skip = usize::from(self.parent.is_some());
        self.neighbours.iter().skip(skip).filter_map(|slot| *slot)
    }
}

/// Dimensions every room in a graph is generated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomLimits {
    pub max_width: i32,
    pub max_height: i32,
}

pub struct RoomGraph<R> {
    slots: Vec<Option<Room>>,
    free: Vec<RoomId>,
    root: RoomId,
    limits: RoomLimits,
    rng: R,
}

impl<R: Rng> RoomGraph<R> {
    /// New graph holding a single root room with no entrance.
    pub fn new(limits: RoomLimits, mut rng: R) -> Self {
        let layout = generator::generate(&mut rng, limits.max_width, limits.max_height, None);
        Self::with_root(layout, limits, rng)
    }

    /// New graph around an already generated root layout.
    pub fn with_root(layout: Layout, limits: RoomLimits, rng: R) -> Self {
        info!(
            "root room is {}x{} with {} exit(s)",
            layout.grid.width(),
            layout.grid.height(),
            layout.exits.len()
        );
        Self {
            slots: vec![Some(Room::new(layout, None))],
            free: Vec::new(),
            root: RoomId(0),
            limits,
            rng,
        }
    }

    #[inline]
    pub fn root(&self) -> RoomId {
        self.root
    }

    /// Panics if `id` has been released.
    #[inline]
    pub fn room(&self, id: RoomId) -> &Room {
        self.get(id).expect("room id refers to a released room")
    }

    #[inline]
    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Room behind exit `exit_index` of `id`, generating it on first use with
    /// its entrance on the side facing back through that exit.
    pub fn neighbour_or_create(&mut self, id: RoomId, exit_index: usize) -> RoomId {
        let room = self.room(id);
        if let Some(existing) = room.neighbour(exit_index) {
            return existing;
        }
        let entrance = room.exits()[exit_index].side.opposite();

        let layout = generator::generate(
            &mut self.rng,
            self.limits.max_width,
            self.limits.max_height,
            Some(entrance),
        );
        let child = self.insert(Room::new(layout, Some(id)));
        if let Some(room) = self.slots[id.0].as_mut() {
            room.neighbours[exit_index] = Some(child);
        }
        debug!(
            "created room {} behind exit {} of room {} (entrance {:?})",
            child.0, exit_index, id.0, entrance
        );
        child
    }

    fn insert(&mut self, room: Room) -> RoomId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(room);
                id
            }
            None => {
                self.slots.push(Some(room));
                RoomId(self.slots.len() - 1)
            }
        }
    }

    /// Where a player arriving in `to` from `from` enters: the exit of `to`
    /// leading back to `from`, and the cell just inside it.
    pub fn arrival(&self, from: RoomId, to: RoomId) -> Option<(Exit, CellPos)> {
        let room = self.room(to);
        let index = (0..room.exits().len()).find(|&i| room.neighbour(i) == Some(from))?;
        let exit = room.exits()[index];
        Some((exit, exit.cell.offset(exit.side.inward())))
    }

    /// Free `id` and every room it owns. The parent link is never followed,
    /// and the parent's slot pointing at `id` is cleared so the exit will
    /// generate a fresh room next time. Releasing the root is a no-op.
    pub fn release_subtree(&mut self, id: RoomId) -> usize {
        if id == self.root || self.get(id).is_none() {
            return 0;
        }
        if let Some(parent) = self.room(id).parent {
            if let Some(room) = self.slots[parent.0].as_mut() {
                let skip = usize::from(room.parent.is_some());
                for slot in room.neighbours.iter_mut().skip(skip) {
                    if *slot == Some(id) {
                        *slot = None;
                    }
                }
            }
        }
        let released = self.release_owned(id);
        debug!("released {released} room(s) starting at room {}", id.0);
        released
    }

    fn release_owned(&mut self, id: RoomId) -> usize {
        let Some(room) = self.slots[id.0].take() else {
            return 0;
        };
        self.free.push(id);
        1 + room
            .children()
            .map(|child| self.release_owned(child))
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const LIMITS: RoomLimits = RoomLimits {
        max_width: 12,
        max_height: 12,
    };

    fn graph(seed: u64) -> RoomGraph<ChaCha8Rng> {
        RoomGraph::new(LIMITS, ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn child_links_back_to_parent() {
        let mut rooms = graph(5);
        let root = rooms.root();
        let child = rooms.neighbour_or_create(root, 0);

        assert_ne!(child, root);
        assert_eq!(rooms.room(child).neighbour(0), Some(root));
        assert_eq!(rooms.room(child).parent(), Some(root));
        assert_eq!(
            rooms.room(child).exits()[0].side,
            rooms.room(root).exits()[0].side.opposite()
        );
        // second lookup reuses the room
        assert_eq!(rooms.neighbour_or_create(root, 0), child);
        assert_eq!(rooms.neighbour_or_create(child, 0), root);
        assert_eq!(rooms.len(), 2);
    }

    #[test]
    fn arrival_is_inside_the_linking_exit() {
        let mut rooms = graph(9);
        let root = rooms.root();
        let child = rooms.neighbour_or_create(root, 0);

        let (exit, cell) = rooms.arrival(root, child).unwrap();
        assert_eq!(exit, rooms.room(child).exits()[0]);
        assert!(rooms.room(child).layout.grid.is_empty(cell));

        let (back, cell) = rooms.arrival(child, root).unwrap();
        assert_eq!(back, rooms.room(root).exits()[0]);
        assert!(rooms.room(root).layout.grid.is_empty(cell));
    }

    #[test]
    fn release_follows_owning_links_only() {
        let mut rooms = graph(11);
        let root = rooms.root();
        let a = rooms.neighbour_or_create(root, 0);
        // a's exit 1 leads further away from the root
        let b = rooms.neighbour_or_create(a, 1);
        let c = rooms.neighbour_or_create(b, 1);
        assert_eq!(rooms.len(), 4);

        assert_eq!(rooms.release_subtree(b), 2);
        assert_eq!(rooms.len(), 2);
        assert!(rooms.get(b).is_none());
        assert!(rooms.get(c).is_none());
        assert!(rooms.get(a).is_some());
        assert_eq!(rooms.room(a).neighbour(1), None);
        assert_eq!(rooms.room(a).neighbour(0), Some(root));

        // freed slots are reused
        let again = rooms.neighbour_or_create(a, 1);
        assert!(again == b || again == c);
        assert_eq!(rooms.len(), 3);
    }

    #[test]
    fn releasing_a_root_child_clears_the_root_slot() {
        let mut rooms = graph(4);
        let root = rooms.root();
        let child = rooms.neighbour_or_create(root, 0);
        assert_eq!(rooms.release_subtree(child), 1);
        assert_eq!(rooms.room(root).neighbour(0), None);
        assert_ne!(rooms.neighbour_or_create(root, 0), root);
    }

    #[test]
    fn root_cannot_be_released() {
        let mut rooms = graph(2);
        let root = rooms.root();
        assert_eq!(rooms.release_subtree(root), 0);
        assert_eq!(rooms.len(), 1);
    }
}
