use rustc_hash::FxHashMap;

use crate::flag::tristate::Tristate;
use crate::trust::TrustLevel;
use crate::world::{ClaimId, UserId};

/// A memoized verdict together with the trust level that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedVerdict {
    pub verdict: Tristate,
    pub matched_trust: Option<TrustLevel>,
}

#[derive(Debug, Default)]
struct ActorSlot {
    entries: FxHashMap<(ClaimId, &'static str), CachedVerdict>,
}

/// Intra-action memoization keyed by `(claim, flag name)` per actor.
///
/// One platform event often fans out into many per-block sub-checks (a
/// piston push, an explosion block list); all of them hit the same claim
/// and flag, so the first decisive verdict is reused. The slot is cleared
/// when the host starts the next logical action, never by time.
#[derive(Debug, Default)]
pub struct ResultCache {
    actors: FxHashMap<Option<UserId>, ActorSlot>,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every memoized verdict for the actor; called once per logical
    /// host event before its sub-checks run.
    pub fn begin_action(&mut self, actor: Option<UserId>) {
        if let Some(slot) = self.actors.get_mut(&actor) {
            slot.entries.clear();
        }
    }

    pub fn get(
        &mut self,
        actor: Option<UserId>,
        claim: ClaimId,
        flag: &'static str,
    ) -> Option<CachedVerdict> {
        let found = self
            .actors
            .get(&actor)
            .and_then(|slot| slot.entries.get(&(claim, flag)))
            .copied();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    pub fn put(
        &mut self,
        actor: Option<UserId>,
        claim: ClaimId,
        flag: &'static str,
        verdict: CachedVerdict,
    ) {
        self.actors
            .entry(actor)
            .or_default()
            .entries
            .insert((claim, flag), verdict);
    }

    /// Drop an actor's slot entirely, e.g. on disconnect.
    pub fn forget_actor(&mut self, actor: Option<UserId>) {
        self.actors.remove(&actor);
    }

    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
