//! Review state: one card at a time, sorted into keep and unfollow buckets.
//!
//! Positions in `display_order` and both buckets are indices into the
//! scanned account list, so the scan index doubles as the "oldest" sort key.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Account, ReviewConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    /// Chronological by follow date, oldest first.
    Oldest,
    Random,
}

impl OrderMode {
    pub fn toggled(self) -> Self {
        match self {
            OrderMode::Oldest => OrderMode::Random,
            OrderMode::Random => OrderMode::Oldest,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderMode::Oldest => "Oldest first",
            OrderMode::Random => "Random",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oldest" | "chronological" => Some(OrderMode::Oldest),
            "random" | "shuffle" => Some(OrderMode::Random),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    /// Left rejects, right keeps.
    pub fn bucket(self) -> Bucket {
        match self {
            SwipeDirection::Left => Bucket::Unfollow,
            SwipeDirection::Right => Bucket::Keep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Keep,
    Unfollow,
}

impl Bucket {
    pub fn other(self) -> Self {
        match self {
            Bucket::Keep => Bucket::Unfollow,
            Bucket::Unfollow => Bucket::Keep,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Keep => "Keep",
            Bucket::Unfollow => "Unfollow",
        }
    }
}

/// Read-only copy of the review state for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSnapshot {
    pub display_order: Vec<Account>,
    pub current: Option<Account>,
    pub current_index: usize,
    pub total: usize,
    pub kept: Vec<Account>,
    pub unfollowed: Vec<Account>,
    pub order_mode: OrderMode,
    pub animating: bool,
}

impl ReviewSnapshot {
    pub fn remaining(&self) -> usize {
        self.total - self.current_index
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.total
    }
}

pub struct ReviewSession {
    all_accounts: Vec<Account>,
    display_order: Vec<usize>,
    current_index: usize,
    kept: Vec<usize>,
    unfollowed: Vec<usize>,
    order_mode: OrderMode,
    animate: bool,
    animating: bool,
    rng: fastrand::Rng,
}

impl ReviewSession {
    /// Start reviewing `accounts` (oldest-first) in the configured order.
    pub fn new(accounts: Vec<Account>, config: &ReviewConfig) -> Self {
        let len = accounts.len();
        let mut session = Self {
            all_accounts: accounts,
            display_order: (0..len).collect(),
            current_index: 0,
            kept: Vec::new(),
            unfollowed: Vec::new(),
            order_mode: config.default_order,
            animate: config.animate,
            animating: false,
            rng: config
                .seed
                .map(fastrand::Rng::with_seed)
                .unwrap_or_else(fastrand::Rng::new),
        };
        session.set_order(config.default_order);
        session
    }

    /// Start with an explicit presentation order. `order` must be a
    /// permutation of `0..accounts.len()`.
    pub fn with_display_order(
        accounts: Vec<Account>,
        order: Vec<usize>,
        config: &ReviewConfig,
    ) -> Option<Self> {
        let mut check = order.clone();
        check.sort_unstable();
        if check != (0..accounts.len()).collect::<Vec<_>>() {
            return None;
        }
        let mut session = Self::new(Vec::new(), config);
        session.all_accounts = accounts;
        session.display_order = order;
        Some(session)
    }

    /// Sort the current card into the bucket for `direction` and advance.
    ///
    /// Ignored while the previous card is still animating or once every
    /// card is reviewed.
    pub fn swipe(&mut self, direction: SwipeDirection) -> Option<&Account> {
        if self.animating || self.is_complete() {
            return None;
        }
        let idx = self.display_order[self.current_index];
        match direction.bucket() {
            Bucket::Keep => self.kept.push(idx),
            Bucket::Unfollow => self.unfollowed.push(idx),
        }
        self.current_index += 1;
        self.animating = self.animate;
        debug!(
            handle = %self.all_accounts[idx].handle,
            bucket = direction.bucket().label(),
            index = self.current_index,
            "swipe"
        );
        Some(&self.all_accounts[idx])
    }

    pub fn finish_animation(&mut self) {
        self.animating = false;
    }

    /// Step back one card, pulling it out of whichever bucket holds it.
    pub fn undo(&mut self) -> Option<&Account> {
        if self.animating || self.current_index == 0 {
            return None;
        }
        self.current_index -= 1;
        let idx = self.display_order[self.current_index];
        let handle = self.all_accounts[idx].handle.clone();
        let accounts = &self.all_accounts;
        for bucket in [&mut self.kept, &mut self.unfollowed] {
            bucket.retain(|&i| !accounts[i].same_handle(&handle));
        }
        debug!(handle = %handle, index = self.current_index, "undo");
        Some(&self.all_accounts[idx])
    }

    /// Reorder the unreviewed suffix. The reviewed prefix never moves.
    pub fn set_order(&mut self, mode: OrderMode) {
        self.order_mode = mode;
        let suffix = &mut self.display_order[self.current_index..];
        match mode {
            OrderMode::Oldest => suffix.sort_unstable(),
            OrderMode::Random => self.rng.shuffle(suffix),
        }
    }

    pub fn toggle_order(&mut self) -> OrderMode {
        let mode = self.order_mode.toggled();
        self.set_order(mode);
        mode
    }

    /// Flip an already-reviewed account into `to`, appending it there.
    ///
    /// Returns `false` when the handle is unknown, not yet reviewed, or
    /// already in `to`.
    pub fn move_decision(&mut self, handle: &str, to: Bucket) -> bool {
        let Some(idx) = self.index_of(handle) else {
            return false;
        };
        let (from, into) = match to {
            Bucket::Keep => (&mut self.unfollowed, &mut self.kept),
            Bucket::Unfollow => (&mut self.kept, &mut self.unfollowed),
        };
        let Some(pos) = from.iter().position(|&i| i == idx) else {
            return false;
        };
        from.remove(pos);
        into.push(idx);
        true
    }

    pub fn bucket_of(&self, handle: &str) -> Option<Bucket> {
        let idx = self.index_of(handle)?;
        if self.kept.contains(&idx) {
            Some(Bucket::Keep)
        } else if self.unfollowed.contains(&idx) {
            Some(Bucket::Unfollow)
        } else {
            None
        }
    }

    fn index_of(&self, handle: &str) -> Option<usize> {
        self.all_accounts.iter().position(|a| a.same_handle(handle))
    }

    pub fn current(&self) -> Option<&Account> {
        self.display_order
            .get(self.current_index)
            .map(|&i| &self.all_accounts[i])
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.display_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display_order.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.len() - self.current_index
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.len()
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn order_mode(&self) -> OrderMode {
        self.order_mode
    }

    /// Fraction of cards reviewed, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.is_empty() {
            1.0
        } else {
            self.current_index as f64 / self.len() as f64
        }
    }

    pub fn all_accounts(&self) -> &[Account] {
        &self.all_accounts
    }

    pub fn display_order(&self) -> impl Iterator<Item = &Account> {
        self.display_order.iter().map(|&i| &self.all_accounts[i])
    }

    pub fn kept_accounts(&self) -> impl Iterator<Item = &Account> {
        self.kept.iter().map(|&i| &self.all_accounts[i])
    }

    /// Rejected accounts in the order they were swiped, which is the order
    /// they will be unfollowed in.
    pub fn unfollowed_accounts(&self) -> impl Iterator<Item = &Account> {
        self.unfollowed.iter().map(|&i| &self.all_accounts[i])
    }

    pub fn kept_count(&self) -> usize {
        self.kept.len()
    }

    pub fn unfollowed_count(&self) -> usize {
        self.unfollowed.len()
    }

    pub fn snapshot(&self) -> ReviewSnapshot {
        ReviewSnapshot {
            display_order: self.display_order().cloned().collect(),
            current: self.current().cloned(),
            current_index: self.current_index,
            total: self.len(),
            kept: self.kept_accounts().cloned().collect(),
            unfollowed: self.unfollowed_accounts().cloned().collect(),
            order_mode: self.order_mode,
            animating: self.animating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts(handles: &[&str]) -> Vec<Account> {
        handles
            .iter()
            .map(|h| Account::new(*h, h.trim_start_matches('@')))
            .collect()
    }

    fn no_animation() -> ReviewConfig {
        ReviewConfig {
            default_order: OrderMode::Oldest,
            animate: false,
            seed: Some(42),
        }
    }

    fn handles<'a>(iter: impl Iterator<Item = &'a Account>) -> Vec<&'a str> {
        iter.map(|a| a.handle.as_str()).collect()
    }

    fn assert_invariants(s: &ReviewSession) {
        assert_eq!(s.kept_count() + s.unfollowed_count(), s.current_index());
        for k in s.kept_accounts() {
            assert!(!s.unfollowed_accounts().any(|u| u == k), "{} in both", k.handle);
        }
        let prefix: Vec<_> = s.display_order().take(s.current_index()).collect();
        for a in s.kept_accounts().chain(s.unfollowed_accounts()) {
            assert!(prefix.contains(&a));
        }
    }

    #[test]
    fn swipe_left_then_right_then_undo() {
        let list = accounts(&["@A", "@B", "@C"]);
        let mut s = ReviewSession::with_display_order(list, vec![1, 0, 2], &no_animation()).unwrap();

        assert_eq!(s.swipe(SwipeDirection::Left).unwrap().handle, "@B");
        assert_eq!(s.swipe(SwipeDirection::Right).unwrap().handle, "@A");
        assert_eq!(s.undo().unwrap().handle, "@A");

        assert_eq!(s.kept_count(), 0);
        assert_eq!(handles(s.unfollowed_accounts()), vec!["@B"]);
        assert_eq!(s.current_index(), 1);
        assert_invariants(&s);
    }

    #[test]
    fn undo_is_inverse_for_both_directions() {
        for dir in [SwipeDirection::Left, SwipeDirection::Right] {
            let mut s = ReviewSession::new(accounts(&["@a", "@b"]), &no_animation());
            let before = s.snapshot();
            s.swipe(dir);
            s.undo();
            assert_eq!(s.snapshot(), before);
        }
    }

    #[test]
    fn undo_at_start_is_ignored() {
        let mut s = ReviewSession::new(accounts(&["@a"]), &no_animation());
        assert!(s.undo().is_none());
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn swipe_after_completion_is_ignored() {
        let mut s = ReviewSession::new(accounts(&["@a"]), &no_animation());
        s.swipe(SwipeDirection::Right);
        assert!(s.is_complete());
        assert!(s.swipe(SwipeDirection::Left).is_none());
        assert_eq!(s.kept_count(), 1);
        assert_invariants(&s);
    }

    #[test]
    fn animation_locks_swipe_and_undo() {
        let config = ReviewConfig {
            animate: true,
            ..no_animation()
        };
        let mut s = ReviewSession::new(accounts(&["@a", "@b", "@c"]), &config);
        assert!(s.swipe(SwipeDirection::Left).is_some());
        assert!(s.is_animating());
        assert!(s.swipe(SwipeDirection::Left).is_none(), "swipe during animation is dropped");
        assert!(s.undo().is_none());
        assert_eq!(s.current_index(), 1);

        s.finish_animation();
        assert!(s.swipe(SwipeDirection::Right).is_some());
        assert_eq!(s.current_index(), 2);
    }

    #[test]
    fn oldest_order_follows_scan_index() {
        let s = ReviewSession::new(accounts(&["@a", "@b", "@c", "@d"]), &no_animation());
        assert_eq!(handles(s.display_order()), vec!["@a", "@b", "@c", "@d"]);
    }

    #[test]
    fn reorder_keeps_reviewed_prefix() {
        let list: Vec<String> = (0..40).map(|i| format!("@u{i}")).collect();
        let refs: Vec<&str> = list.iter().map(String::as_str).collect();
        let mut s = ReviewSession::new(accounts(&refs), &no_animation());
        for _ in 0..5 {
            s.swipe(SwipeDirection::Right);
        }
        let prefix: Vec<String> = s.display_order().take(5).map(|a| a.handle.clone()).collect();

        s.set_order(OrderMode::Random);
        let after: Vec<String> = s.display_order().take(5).map(|a| a.handle.clone()).collect();
        assert_eq!(prefix, after);
        assert_eq!(s.len(), 40);

        s.set_order(OrderMode::Oldest);
        let suffix: Vec<&str> = handles(s.display_order().skip(5));
        let expected: Vec<&str> = refs[5..].to_vec();
        assert_eq!(suffix, expected);
        assert_invariants(&s);
    }

    #[test]
    fn random_order_is_a_permutation() {
        let config = ReviewConfig {
            default_order: OrderMode::Random,
            ..no_animation()
        };
        let list: Vec<String> = (0..30).map(|i| format!("@u{i}")).collect();
        let refs: Vec<&str> = list.iter().map(String::as_str).collect();
        let s = ReviewSession::new(accounts(&refs), &config);
        let mut shown: Vec<&str> = handles(s.display_order());
        assert_ne!(shown, refs, "seeded shuffle of 30 should move something");
        shown.sort_unstable();
        let mut sorted = refs.clone();
        sorted.sort_unstable();
        assert_eq!(shown, sorted);
    }

    #[test]
    fn toggle_flips_mode() {
        let mut s = ReviewSession::new(accounts(&["@a", "@b"]), &no_animation());
        assert_eq!(s.order_mode(), OrderMode::Oldest);
        assert_eq!(s.toggle_order(), OrderMode::Random);
        assert_eq!(s.toggle_order(), OrderMode::Oldest);
        assert_eq!(handles(s.display_order()), vec!["@a", "@b"]);
    }

    #[test]
    fn move_decision_appends_to_target() {
        let mut s = ReviewSession::new(accounts(&["@a", "@b", "@c", "@d"]), &no_animation());
        s.swipe(SwipeDirection::Left); // a
        s.swipe(SwipeDirection::Right); // b
        s.swipe(SwipeDirection::Left); // c

        assert!(s.move_decision("@B", Bucket::Unfollow));
        assert_eq!(handles(s.unfollowed_accounts()), vec!["@a", "@c", "@b"]);
        assert_eq!(s.kept_count(), 0);
        assert_eq!(s.current_index(), 3);
        assert_invariants(&s);

        assert!(!s.move_decision("@b", Bucket::Unfollow), "already there");
        assert!(!s.move_decision("@d", Bucket::Keep), "not reviewed yet");
        assert!(!s.move_decision("@zzz", Bucket::Keep));
        assert_eq!(s.bucket_of("@A"), Some(Bucket::Unfollow));
        assert_eq!(s.bucket_of("@d"), None);
    }

    #[test]
    fn undo_after_move_removes_from_new_bucket() {
        let mut s = ReviewSession::new(accounts(&["@a", "@b"]), &no_animation());
        s.swipe(SwipeDirection::Left);
        s.swipe(SwipeDirection::Left);
        s.move_decision("@b", Bucket::Keep);
        s.undo();
        assert_eq!(s.kept_count(), 0);
        assert_eq!(handles(s.unfollowed_accounts()), vec!["@a"]);
        assert_invariants(&s);
    }

    #[test]
    fn mixed_sequence_keeps_invariants() {
        let list: Vec<String> = (0..12).map(|i| format!("@u{i}")).collect();
        let refs: Vec<&str> = list.iter().map(String::as_str).collect();
        let mut s = ReviewSession::new(accounts(&refs), &no_animation());
        let mut rng = fastrand::Rng::with_seed(9);
        for step in 0..200 {
            match rng.u8(0..5) {
                0 => {
                    s.swipe(SwipeDirection::Left);
                }
                1 => {
                    s.swipe(SwipeDirection::Right);
                }
                2 => {
                    s.undo();
                }
                3 => {
                    s.toggle_order();
                }
                _ => {
                    let h = format!("@u{}", rng.usize(0..12));
                    let to = if step % 2 == 0 { Bucket::Keep } else { Bucket::Unfollow };
                    s.move_decision(&h, to);
                }
            }
            assert_invariants(&s);
            assert_eq!(s.len(), 12);
        }
    }

    #[test]
    fn invalid_display_order_is_rejected() {
        let a = accounts(&["@a", "@b"]);
        assert!(ReviewSession::with_display_order(a.clone(), vec![0, 0], &no_animation()).is_none());
        assert!(ReviewSession::with_display_order(a, vec![0], &no_animation()).is_none());
    }

    #[test]
    fn empty_session_is_complete() {
        let s = ReviewSession::new(Vec::new(), &no_animation());
        assert!(s.is_complete());
        assert!(s.current().is_none());
        assert_eq!(s.progress(), 1.0);
    }
}
