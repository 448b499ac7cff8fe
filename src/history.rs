//! Navigation adapter: the bridge between the router's notion of "current
//! path" and the host's address representation.
//!
//! Outbound navigation ([`History::push`] / [`History::replace`]) rewrites
//! the visible address and emits a [`PathChange`]. External changes
//! (back/forward, a hand-edited fragment) funnel into the *same*
//! notification stream, so the router has exactly one place where paths
//! arrive.
//!
//! Every notification carries a monotonically increasing **epoch**. The
//! router stamps each navigation attempt with the epoch that started it and
//! refuses to commit an attempt whose epoch is no longer the newest — a
//! late-resolving chain cannot clobber a fresher navigation.

use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// How the route path is written into the address.
///
/// Fixed at construction for the lifetime of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// Hierarchical path + query (`/projects/42?tab=info`), one history
    /// entry per navigation.
    Path,
    /// Fragment-encoded path + query (`#/projects/42?tab=info`). The page
    /// itself never reloads; only the fragment moves.
    Hash,
}

/// A live snapshot of the address, recomputed on every read — never cached
/// across changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    /// Raw query including the leading `?`, or empty.
    pub search: String,
    /// Raw fragment including the leading `#`, or empty.
    pub hash: String,
}

/// One path-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    /// The route path now visible in the address.
    pub path: String,
    /// Generation token of this notification; strictly increasing.
    pub epoch: u64,
}

/// The host's address bar, as the router sees it.
///
/// Implementations own the mapping between route paths and whatever the
/// host displays, and they emit one [`PathChange`] per change regardless of
/// who caused it.
pub trait History: Send + Sync + 'static {
    /// Live snapshot of pathname, query and fragment.
    fn location(&self) -> Location;

    /// The route path under the configured address mode. An empty path or
    /// fragment reads as `/`.
    fn route_path(&self) -> String;

    /// The raw query string (no `?`) under the configured address mode.
    fn raw_query(&self) -> String;

    /// Navigates to `target`, creating a new history entry.
    fn push(&self, target: &str);

    /// Navigates to `target`, replacing the current entry. Guard redirects
    /// use this so "back" does not return to a blocked page.
    fn replace(&self, target: &str);

    /// Moves one entry back, if there is one.
    fn back(&self);

    /// Moves one entry forward, if there is one.
    fn forward(&self);

    /// Epoch of the newest emitted notification; `0` before the first.
    fn epoch(&self) -> u64;

    /// The notification stream. Single consumer: the router takes this when
    /// mounted. Calling it again replaces the previous stream.
    fn changes(&self) -> UnboundedReceiver<PathChange>;
}

// ── In-memory host ───────────────────────────────────────────────────────────

struct Stack {
    entries: Vec<String>,
    index: usize,
}

/// An in-memory address bar: a history stack plus a cursor.
///
/// This is the host used by tests and headless demos; a browser deployment
/// implements [`History`] against the real address bar instead. Entries are
/// stored as `path?query` targets; the [`AddressMode`] decides how
/// [`location`](History::location) presents them.
pub struct MemoryHistory {
    mode: AddressMode,
    stack: RwLock<Stack>,
    tx: Mutex<Option<UnboundedSender<PathChange>>>,
    epoch: AtomicU64,
}

impl MemoryHistory {
    /// Path-based addresses, starting at `/`.
    pub fn path_addresses() -> Self {
        Self::with_initial(AddressMode::Path, "/")
    }

    /// Fragment-based addresses, starting at `/`.
    pub fn hash_addresses() -> Self {
        Self::with_initial(AddressMode::Hash, "/")
    }

    /// An in-memory bar already showing `initial`.
    pub fn with_initial(mode: AddressMode, initial: &str) -> Self {
        Self {
            mode,
            stack: RwLock::new(Stack {
                entries: vec![normalize(initial)],
                index: 0,
            }),
            tx: Mutex::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    /// Number of entries currently on the stack.
    pub fn depth(&self) -> usize {
        self.stack.read().unwrap().entries.len()
    }

    fn current_target(&self) -> String {
        let stack = self.stack.read().unwrap();
        stack.entries[stack.index].clone()
    }

    fn emit(&self, path: String) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(tx) = &*self.tx.lock().unwrap() {
            let _ = tx.send(PathChange { path, epoch });
        }
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Location {
        let target = self.current_target();
        let (path, query) = split_target(&target);
        match self.mode {
            AddressMode::Path => Location {
                pathname: path,
                search: if query.is_empty() { String::new() } else { format!("?{query}") },
                hash: String::new(),
            },
            AddressMode::Hash => Location {
                pathname: "/".to_owned(),
                search: String::new(),
                hash: format!("#{target}"),
            },
        }
    }

    fn route_path(&self) -> String {
        split_target(&self.current_target()).0
    }

    fn raw_query(&self) -> String {
        split_target(&self.current_target()).1
    }

    fn push(&self, target: &str) {
        let target = normalize(target);
        {
            let mut stack = self.stack.write().unwrap();
            let index = stack.index;
            stack.entries.truncate(index + 1);
            stack.entries.push(target.clone());
            stack.index += 1;
        }
        self.emit(split_target(&target).0);
    }

    fn replace(&self, target: &str) {
        let target = normalize(target);
        {
            let mut stack = self.stack.write().unwrap();
            let index = stack.index;
            stack.entries[index] = target.clone();
        }
        self.emit(split_target(&target).0);
    }

    fn back(&self) {
        let path = {
            let mut stack = self.stack.write().unwrap();
            if stack.index == 0 {
                return;
            }
            stack.index -= 1;
            stack.entries[stack.index].clone()
        };
        self.emit(split_target(&path).0);
    }

    fn forward(&self) {
        let path = {
            let mut stack = self.stack.write().unwrap();
            if stack.index + 1 >= stack.entries.len() {
                return;
            }
            stack.index += 1;
            stack.entries[stack.index].clone()
        };
        self.emit(split_target(&path).0);
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn changes(&self) -> UnboundedReceiver<PathChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.tx.lock().unwrap() = Some(tx);
        rx
    }
}

/// A target may arrive as `#/path`, `/path?query`, or empty. Strips the
/// fragment marker and defaults the root.
fn normalize(target: &str) -> String {
    let target = target.strip_prefix('#').unwrap_or(target);
    if target.is_empty() { "/".to_owned() } else { target.to_owned() }
}

fn split_target(target: &str) -> (String, String) {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };
    let path = if path.is_empty() { "/" } else { path };
    (path.to_owned(), query.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_target_reads_as_root() {
        let history = MemoryHistory::with_initial(AddressMode::Hash, "");
        assert_eq!(history.route_path(), "/");
    }

    #[test]
    fn push_emits_with_increasing_epochs() {
        let history = MemoryHistory::path_addresses();
        let mut changes = history.changes();

        history.push("/a");
        history.push("/b?x=1");

        let first = changes.try_recv().unwrap();
        let second = changes.try_recv().unwrap();
        assert_eq!(first, PathChange { path: "/a".into(), epoch: 1 });
        assert_eq!(second, PathChange { path: "/b".into(), epoch: 2 });
        assert_eq!(history.epoch(), 2);
        assert_eq!(history.raw_query(), "x=1");
    }

    #[test]
    fn replace_does_not_grow_the_stack() {
        let history = MemoryHistory::path_addresses();
        history.push("/blocked");
        assert_eq!(history.depth(), 2);

        history.replace("/login");
        assert_eq!(history.depth(), 2);
        assert_eq!(history.route_path(), "/login");

        // Back skips the replaced entry entirely.
        history.back();
        assert_eq!(history.route_path(), "/");
    }

    #[test]
    fn push_truncates_the_forward_tail() {
        let history = MemoryHistory::path_addresses();
        history.push("/a");
        history.push("/b");
        history.back();
        history.push("/c");

        history.forward(); // nothing ahead of /c
        assert_eq!(history.route_path(), "/c");
        assert_eq!(history.depth(), 3);
    }

    #[test]
    fn hash_mode_presents_the_fragment() {
        let history = MemoryHistory::hash_addresses();
        history.push("/projects/2?tab=stack");

        let location = history.location();
        assert_eq!(location.pathname, "/");
        assert_eq!(location.hash, "#/projects/2?tab=stack");
        assert_eq!(history.route_path(), "/projects/2");
        assert_eq!(history.raw_query(), "tab=stack");
    }
}
