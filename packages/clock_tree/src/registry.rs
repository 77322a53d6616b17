//! Per-thread clock registry: the execution tree under construction.
//!
//! A registry owns the arena-allocated tree of clocks for one thread, the
//! index of nodes by clock name, and the stack of currently running clocks.
//! Usage errors are captured into the registry instead of being returned,
//! so the instrumented code never has to handle them; they surface when the
//! results are extracted.

use std::collections::HashMap;
use std::time::Duration;

use itertools::Itertools;

use crate::error::Result;
use crate::pal::PlatformFacade;
use crate::report::{ClockTree, SnapshotNode};
use crate::{Error, Stopwatch};

/// Index of a node in a registry's arena.
///
/// Nodes reference their parent and children by id rather than holding live
/// references, so discarding the registry discards the whole tree at once.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct NodeId(usize);

/// The sentinel root occupies the first arena slot of every registry.
const ROOT: NodeId = NodeId(0);

#[derive(Debug)]
struct Node {
    stopwatch: Stopwatch,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Clock tracking state of a single thread.
///
/// A registry is only ever touched by the thread it belongs to, so none of
/// its internals need synchronization. It is consumed by one of the two
/// extraction methods, after which the thread starts over with a fresh one.
#[derive(Debug)]
pub(crate) struct Registry {
    nodes: Vec<Node>,
    nodes_by_name: HashMap<String, Vec<NodeId>>,
    running: Vec<NodeId>,
    fatal: Option<Error>,
    log: Vec<String>,
    platform: PlatformFacade,
}

impl Registry {
    /// Creates a registry whose sentinel root carries the given label.
    ///
    /// The root's stopwatch starts immediately; its one and only check
    /// happens at extraction time, capturing the total session time.
    pub(crate) fn new(root_label: impl Into<String>, platform: PlatformFacade) -> Self {
        let root = Node {
            stopwatch: Stopwatch::with_platform(root_label, platform.clone()),
            parent: None,
            children: Vec::new(),
        };

        Self {
            nodes: vec![root],
            nodes_by_name: HashMap::new(),
            running: Vec::new(),
            fatal: None,
            log: Vec::new(),
            platform,
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.0)
            .expect("node ids are only ever minted by the arena that stores the node")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes
            .get_mut(id.0)
            .expect("node ids are only ever minted by the arena that stores the node")
    }

    fn name_of(&self, id: NodeId) -> &str {
        self.node(id).stopwatch.name()
    }

    /// Starts the clock with the given name.
    ///
    /// The clock becomes a child of the most recently started running clock
    /// (or of the root when none is running). Starting the same
    /// (name, parent) pair a second time resumes the existing node. Starting
    /// a name that is already running anywhere on this thread is a usage
    /// error, no matter which parent the running clock is nested under.
    pub(crate) fn start(&mut self, clock_name: &str) {
        if self
            .running
            .iter()
            .any(|id| self.name_of(*id) == clock_name)
        {
            self.record_fatal(Error::ClockAlreadyStarted {
                name: clock_name.to_string(),
            });
            return;
        }

        let id = self.resolve_node(clock_name);
        self.running.push(id);
        self.node_mut(id).stopwatch.restart();
    }

    /// Finds the child of the current parent with this name, or creates one.
    fn resolve_node(&mut self, clock_name: &str) -> NodeId {
        let parent = self.running.last().copied().unwrap_or(ROOT);

        // The same name under a different parent is a different node; only a
        // node under the current parent is resumed.
        if let Some(ids) = self.nodes_by_name.get(clock_name) {
            for id in ids {
                if self.node(*id).parent == Some(parent) {
                    return *id;
                }
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            stopwatch: Stopwatch::with_platform(clock_name, self.platform.clone()),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.node_mut(parent).children.push(id);
        self.nodes_by_name
            .entry(clock_name.to_string())
            .or_default()
            .push(id);

        id
    }

    /// Stops the running clock with the given name.
    ///
    /// The clock's elapsed time is accumulated even when the stop turns out
    /// to be out of order; in that case the clock stays on the running stack
    /// so that a later, correctly ordered stop can still unwind it.
    pub(crate) fn stop(&mut self, clock_name: &str) {
        let Some(id) = self.running_clock(clock_name) else {
            self.record_fatal(Error::NoClockToStop {
                name: clock_name.to_string(),
            });
            return;
        };

        self.node_mut(id).stopwatch.check();

        let top = *self
            .running
            .last()
            .expect("the stack cannot be empty when a running clock was just found on it");
        if top != id {
            self.record_fatal(Error::StopOutOfOrder {
                last_started: self.name_of(top).to_string(),
                stopping: clock_name.to_string(),
            });
            return;
        }

        self.running.pop();
    }

    /// Stops every running clock, most recently started first.
    ///
    /// Best-effort cleanup for error-handling paths; any failure is absorbed
    /// into the recorded-condition mechanism like everywhere else.
    pub(crate) fn stop_all(&mut self) {
        let mut remaining = self.running.len();
        while remaining > 0 {
            if let Some(top) = self.running.last() {
                let top_name = self.name_of(*top).to_string();
                self.stop(&top_name);
            }
            remaining = remaining.saturating_sub(1);
        }
    }

    /// Stops every running clock nested inside the named one, then the named
    /// clock itself when `inclusive` is set.
    pub(crate) fn stop_all_after(&mut self, clock_name: &str, inclusive: bool) {
        if self.running_clock(clock_name).is_none() {
            self.record_fatal(Error::NoClockToStop {
                name: clock_name.to_string(),
            });
            return;
        }

        while let Some(top) = self.running.last() {
            let top_name = self.name_of(*top).to_string();
            if inclusive || top_name != clock_name {
                self.stop(&top_name);
            }
            if top_name == clock_name {
                break;
            }
        }
    }

    fn running_clock(&self, clock_name: &str) -> Option<NodeId> {
        self.running
            .iter()
            .rev()
            .copied()
            .find(|id| self.name_of(*id) == clock_name)
    }

    /// Records a usage error without interrupting the caller.
    ///
    /// Only the first error of a session is kept as the fatal condition.
    /// The first recording also dumps the registry state into the log, since
    /// every measurement after this point is suspect.
    fn record_fatal(&mut self, error: Error) {
        self.log.push(format!("generating fatal condition: {error}"));

        if self.fatal.is_none() {
            let running = self
                .running
                .iter()
                .rev()
                .map(|id| self.name_of(*id))
                .join(", ");
            self.log
                .push(format!("running clocks (most recent first): [{running}]"));
            self.log
                .push(format!("tree so far:\n{}", self.snapshot().root().to_text()));

            self.fatal = Some(error);
        }
    }

    fn finalize_root(&mut self) {
        self.node_mut(ROOT).stopwatch.check();
    }

    fn check_no_clock_running(&self) -> Result<()> {
        if self.running.is_empty() {
            return Ok(());
        }

        let names = self
            .running
            .iter()
            .rev()
            .map(|id| self.name_of(*id))
            .join(", ");
        Err(Error::ClocksStillRunning { names })
    }

    fn check_total_times(&self) -> Result<()> {
        for node in self.nodes.iter().skip(1) {
            let children_total = self.children_total(node);
            if children_total > node.stopwatch.total_time() {
                return Err(Error::ChildrenExceedTotal {
                    name: node.stopwatch.name().to_string(),
                    total_millis: node.stopwatch.total_time().as_millis(),
                    children_millis: children_total.as_millis(),
                });
            }
        }
        Ok(())
    }

    fn children_total(&self, node: &Node) -> Duration {
        node.children
            .iter()
            .map(|child| self.node(*child).stopwatch.total_time())
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Verifies that the walk from the root reaches every node at most once.
    ///
    /// The arena makes cycles impossible through the public operations, but
    /// the rendering recursion depends on this holding, so it is validated
    /// rather than assumed.
    fn check_tree(&self) -> Result<()> {
        let mut visited = vec![false; self.nodes.len()];
        let mut pending = vec![ROOT];

        while let Some(id) = pending.pop() {
            let seen = visited
                .get_mut(id.0)
                .expect("node ids are only ever minted by the arena that stores the node");
            if *seen {
                return Err(Error::ClockRepeatedInTree {
                    name: self.name_of(id).to_string(),
                });
            }
            *seen = true;
            pending.extend(self.node(id).children.iter().copied());
        }

        Ok(())
    }

    /// Extracts the finished tree, raising the first inconsistency found.
    ///
    /// The registry is consumed either way; a reused thread starts clean.
    pub(crate) fn into_results(mut self) -> Result<ClockTree> {
        self.finalize_root();

        if let Some(error) = self.fatal.take() {
            return Err(error);
        }

        self.check_no_clock_running()?;
        self.check_total_times()?;
        self.check_tree()?;

        Ok(self.snapshot())
    }

    /// Extracts the results as text, mapping every inconsistency to text too.
    ///
    /// Fatal conditions and a corrupted tree structure are reported as a
    /// diagnostic block including the internal operation log. Clocks still
    /// running and suspicious totals are visible in the rendering itself
    /// (`*` and `!` markers), so they do not suppress it.
    pub(crate) fn into_text(mut self, clock_separator: &str, level_separator: &str) -> String {
        self.finalize_root();

        if let Some(error) = &self.fatal {
            return format!(
                "!!! There has been a fatal inconsistency while tracking clocks: {error}\n{}",
                self.log.join("\n")
            );
        }

        if let Err(error) = self.check_tree() {
            return format!(
                "!!! There has been an inconsistency while assembling the results: {error}\n{}",
                self.log.join("\n")
            );
        }

        let snapshot = self.snapshot();
        let root = snapshot.root();
        format!(
            "{}{}",
            root.to_text_with_separators(clock_separator, level_separator),
            root.statistics()
        )
    }

    /// Copies the current state into a self-contained [`ClockTree`].
    fn snapshot(&self) -> ClockTree {
        let mut nodes: Vec<SnapshotNode> = self
            .nodes
            .iter()
            .map(|node| SnapshotNode {
                name: node.stopwatch.name().to_string(),
                total: node.stopwatch.total_time(),
                check_count: node.stopwatch.check_count(),
                parent: node.parent.map(|id| id.0),
                children: node.children.iter().map(|id| id.0).collect(),
                running: false,
                duplicate_rank: None,
            })
            .collect();

        for id in &self.running {
            if let Some(node) = nodes.get_mut(id.0) {
                node.running = true;
            }
        }

        // Nodes sharing a name are disambiguated by their creation order rank.
        for ids in self.nodes_by_name.values() {
            if ids.len() < 2 {
                continue;
            }
            for (index, id) in ids.iter().enumerate() {
                if let Some(node) = nodes.get_mut(id.0) {
                    node.duplicate_rank = Some(index.saturating_add(1));
                }
            }
        }

        ClockTree::new(nodes)
    }
}
