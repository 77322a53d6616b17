//! The extracted clock tree and its text rendering.

use std::cmp::Reverse;
use std::fmt;
use std::fmt::Write;
use std::time::Duration;

/// Default separator between rendered clocks.
pub(crate) const DEFAULT_CLOCK_SEPARATOR: &str = "\n";

/// Default separator added once per tree level in front of nested clocks.
pub(crate) const DEFAULT_LEVEL_SEPARATOR: &str = "\t";

/// One node of an extracted tree, detached from any registry state.
#[derive(Debug)]
pub(crate) struct SnapshotNode {
    pub(crate) name: String,
    pub(crate) total: Duration,
    pub(crate) check_count: u64,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) running: bool,

    /// 1-based creation-order rank among same-named nodes, when the name is
    /// shared by more than one node in the tree.
    pub(crate) duplicate_rank: Option<usize>,
}

/// The finished execution tree of one thread's clocks.
///
/// Obtained from [`results()`](crate::results). The tree is a plain snapshot:
/// it holds no timers and no thread state, can be sent across threads, and
/// rendering it cannot fail.
///
/// The first child level below [`root()`](Self::root) holds the top-level
/// clocks; the root itself is a sentinel whose total time is the elapsed
/// wall time of the whole tracked session.
///
/// # Examples
///
/// ```
/// clock_tree::start("outer");
/// clock_tree::start("inner");
/// clock_tree::stop("inner");
/// clock_tree::stop("outer");
///
/// let tree = clock_tree::results().unwrap();
/// let outer = tree.root().children().next().unwrap();
/// assert_eq!(outer.name(), "outer");
/// assert_eq!(outer.children().next().unwrap().name(), "inner");
/// println!("{tree}");
/// ```
#[derive(Debug)]
pub struct ClockTree {
    nodes: Vec<SnapshotNode>,
}

impl ClockTree {
    pub(crate) fn new(nodes: Vec<SnapshotNode>) -> Self {
        debug_assert!(!nodes.is_empty(), "a tree always has at least its root");

        Self { nodes }
    }

    /// The sentinel root of the tree.
    #[must_use]
    pub fn root(&self) -> ClockNode<'_> {
        ClockNode {
            tree: self,
            index: 0,
        }
    }
}

impl fmt::Display for ClockTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.root();
        write!(f, "{}{}", root.to_text(), root.statistics())
    }
}

/// One clock of an extracted [`ClockTree`].
#[derive(Clone, Copy, Debug)]
pub struct ClockNode<'t> {
    tree: &'t ClockTree,
    index: usize,
}

impl<'t> ClockNode<'t> {
    fn snapshot(&self) -> &'t SnapshotNode {
        self.tree
            .nodes
            .get(self.index)
            .expect("nodes only ever reference indexes that exist in the same tree")
    }

    fn at(&self, index: usize) -> Self {
        Self {
            tree: self.tree,
            index,
        }
    }

    /// The name this clock was started with.
    ///
    /// For the root this is the label of the tracked thread.
    #[must_use]
    pub fn name(&self) -> &'t str {
        &self.snapshot().name
    }

    /// The name with a ` (k)` rank appended when several distinct clocks in
    /// this tree (under different parents) share the same name.
    #[must_use]
    pub fn display_name(&self) -> String {
        let snapshot = self.snapshot();
        snapshot.duplicate_rank.map_or_else(
            || snapshot.name.clone(),
            |rank| format!("{} ({rank})", snapshot.name),
        )
    }

    /// The time accumulated by this clock across all of its runs.
    #[must_use]
    pub fn total_time(&self) -> Duration {
        self.snapshot().total
    }

    /// How many completed start/stop pairs this clock accumulated.
    #[must_use]
    pub fn check_count(&self) -> u64 {
        self.snapshot().check_count
    }

    /// Whether this clock was still running when the results were extracted.
    ///
    /// Only possible in trees rendered by the lenient extraction path; the
    /// strict path refuses to produce a tree with running clocks.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.snapshot().running
    }

    /// The clock this clock ran inside of, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.snapshot().parent.map(|index| self.at(index))
    }

    /// The clocks that ran directly inside this clock, in creation order.
    pub fn children(&self) -> impl Iterator<Item = ClockNode<'t>> + '_ {
        self.snapshot().children.iter().map(|index| self.at(*index))
    }

    /// All clocks nested anywhere below this one, in depth-first pre-order.
    #[must_use]
    pub fn descendants(&self) -> Vec<Self> {
        let mut result = Vec::new();
        self.collect_descendants(&mut result);
        result
    }

    fn collect_descendants(&self, into: &mut Vec<Self>) {
        for child in self.children() {
            into.push(child);
            child.collect_descendants(into);
        }
    }

    /// The summed total time of this clock's direct children.
    #[must_use]
    pub fn children_total(&self) -> Duration {
        self.children()
            .map(|child| child.total_time())
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// The default single-clock text: `<millis>ms [<name>] {calls: <count>}`.
    ///
    /// Two advisory markers can follow the name: `*` when the clock was still
    /// running at extraction time and `!` when its children accumulated more
    /// time than the clock itself. Both flag results that cannot be trusted.
    fn default_text(&self) -> String {
        let mut label = self.display_name();
        if self.is_running() {
            label.push('*');
        }
        if self.children_total() > self.total_time() {
            label.push('!');
        }

        format!(
            "{}ms [{label}] {{calls: {}}}",
            self.total_time().as_millis(),
            self.check_count()
        )
    }

    /// Renders this clock and everything below it with default formatting
    /// and separators (one clock per line, one tab per tree level).
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_text_with_separators(DEFAULT_CLOCK_SEPARATOR, DEFAULT_LEVEL_SEPARATOR)
    }

    /// Renders this clock and everything below it with default formatting
    /// and the given separators.
    #[must_use]
    pub fn to_text_with_separators(&self, clock_separator: &str, level_separator: &str) -> String {
        self.to_text_with(Self::default_text, clock_separator, level_separator)
    }

    /// Renders this clock and everything below it, formatting each clock
    /// with the given function.
    ///
    /// Each child's rendered block is nested under its parent by inserting
    /// one additional `level_separator` after every `clock_separator` the
    /// block contains, so indentation grows with tree depth regardless of
    /// the separator width.
    pub fn to_text_with<F>(
        &self,
        format_clock: F,
        clock_separator: &str,
        level_separator: &str,
    ) -> String
    where
        F: Fn(&Self) -> String,
    {
        self.render(&format_clock, clock_separator, level_separator)
    }

    fn render<F>(&self, format_clock: &F, clock_separator: &str, level_separator: &str) -> String
    where
        F: Fn(&Self) -> String,
    {
        let mut result = format_clock(self);

        for child in self.children() {
            let block = child.render(format_clock, clock_separator, level_separator);
            let indented = block.replace(
                clock_separator,
                &format!("{clock_separator}{level_separator}"),
            );
            result.push_str(clock_separator);
            result.push_str(level_separator);
            result.push_str(&indented);
        }

        result
    }

    /// Derived statistics over all clocks below this one.
    ///
    /// Two sections: leaf clocks ordered by total time (with their share of
    /// this clock's total; 0% entries are left out, and the section is left
    /// out entirely when this clock's total is zero), and parent clocks
    /// whose own time dwarfs their children's sum, hinting at unmeasured
    /// work. Returns an empty string when there is nothing to report.
    #[must_use]
    #[expect(
        clippy::integer_division,
        reason = "time shares are reported as whole percentages"
    )]
    pub fn statistics(&self) -> String {
        let all = self.descendants();
        let total_millis = self.total_time().as_millis();
        let mut result = String::new();

        if total_millis > 0 {
            result.push_str("\n\nLeaf nodes ordered by total time:\n");

            let mut leaves: Vec<_> = all
                .iter()
                .copied()
                .filter(|node| node.snapshot().children.is_empty())
                .collect();
            leaves.sort_by_key(|node| Reverse(node.total_time()));

            for leaf in leaves {
                let leaf_millis = leaf.total_time().as_millis();
                let percentage = leaf_millis.saturating_mul(100) / total_millis;
                if percentage > 0 {
                    writeln!(result, "{}: {leaf_millis}ms ({percentage}%)", leaf.name())
                        .expect("writing to a String never fails");
                }
            }
        }

        let outsized: Vec<_> = all
            .iter()
            .copied()
            .filter(|node| !node.snapshot().children.is_empty())
            .filter(|node| node.total_time() > node.children_total().saturating_mul(2))
            .collect();

        if !outsized.is_empty() {
            result.push_str("\nParent nodes with total time way bigger than their children's sum:\n");

            for node in outsized {
                writeln!(
                    result,
                    "{}: {}ms >> {}ms",
                    node.name(),
                    node.total_time().as_millis(),
                    node.children_total().as_millis()
                )
                .expect("writing to a String never fails");
            }
        }

        result
    }
}
