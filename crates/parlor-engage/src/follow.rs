use std::collections::{HashMap, HashSet};

use tracing::warn;
use uuid::Uuid;

/// Directed follow relation between users.
///
/// Stored as followee -> set of followers, so the query the facade serves
/// ("is X among Y's followers") is O(1).
#[derive(Debug, Default)]
pub struct FollowGraph {
    followers: HashMap<Uuid, HashSet<Uuid>>,
}

impl FollowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the (follower, followee) edge. Idempotent; returns true if the
    /// edge was newly added. Self-follow is rejected as a no-op.
    pub fn follow(&mut self, follower: Uuid, followee: Uuid) -> bool {
        if follower == followee {
            warn!(user_id = %follower, "ignoring self-follow");
            return false;
        }
        self.followers.entry(followee).or_default().insert(follower)
    }

    /// Remove the (follower, followee) edge. Idempotent; returns true if an
    /// edge was actually removed.
    pub fn unfollow(&mut self, follower: Uuid, followee: Uuid) -> bool {
        match self.followers.get_mut(&followee) {
            Some(set) => {
                let removed = set.remove(&follower);
                if set.is_empty() {
                    self.followers.remove(&followee);
                }
                removed
            }
            None => false,
        }
    }

    /// True iff `follower` is among `followee`'s followers.
    pub fn is_followed_by(&self, followee: Uuid, follower: Uuid) -> bool {
        self.followers
            .get(&followee)
            .map_or(false, |set| set.contains(&follower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_unfollow_round_trip() {
        let mut graph = FollowGraph::new();
        let follower = Uuid::new_v4();
        let leader = Uuid::new_v4();

        assert!(!graph.is_followed_by(leader, follower));

        assert!(graph.follow(follower, leader));
        assert!(graph.is_followed_by(leader, follower));
        // directed: the reverse edge does not exist
        assert!(!graph.is_followed_by(follower, leader));

        assert!(graph.unfollow(follower, leader));
        assert!(!graph.is_followed_by(leader, follower));
    }

    #[test]
    fn test_idempotent_edges() {
        let mut graph = FollowGraph::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(graph.follow(a, b));
        assert!(!graph.follow(a, b));
        assert!(graph.is_followed_by(b, a));

        assert!(graph.unfollow(a, b));
        assert!(!graph.unfollow(a, b));
    }

    #[test]
    fn test_self_follow_rejected() {
        let mut graph = FollowGraph::new();
        let a = Uuid::new_v4();
        assert!(!graph.follow(a, a));
        assert!(!graph.is_followed_by(a, a));
    }
}
