use std::collections::{HashMap, HashSet, VecDeque};

use isleweave_core::{CellPos, Layout};

/// Connectivity of the published layout as hosts will build it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Connectivity {
    pub(crate) reachable: usize,
    pub(crate) dangling_bridges: usize,
}

/// Walks bridges breadth-first from the resolved origin.
///
/// A bridge whose parent was dropped cannot be walked, so everything below a
/// dropped cell is unreachable even if it resolved. Without a resolved origin
/// nothing is reachable.
pub(crate) fn connectivity(layout: &Layout) -> Connectivity {
    let resolved: HashSet<CellPos> = layout.iter().map(|cell| cell.position).collect();
    let mut children: HashMap<CellPos, Vec<CellPos>> = HashMap::new();
    let mut dangling_bridges = 0;

    for bridge in layout.bridges() {
        if resolved.contains(&bridge.from) {
            children.entry(bridge.from).or_default().push(bridge.to);
        } else {
            dangling_bridges += 1;
        }
    }

    let Some(origin) = layout.origin() else {
        return Connectivity {
            reachable: 0,
            dangling_bridges,
        };
    };

    let mut frontier = VecDeque::from([origin.position]);
    let mut reachable = 0;
    while let Some(current) = frontier.pop_front() {
        reachable += 1;
        if let Some(next) = children.get(&current) {
            frontier.extend(next.iter().copied());
        }
    }

    Connectivity {
        reachable,
        dangling_bridges,
    }
}
