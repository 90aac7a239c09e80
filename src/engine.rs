//! The engine facade: one explicitly wired instance per running host, no
//! global state. Holds the claim store, resolution pipeline, attribution
//! cache, configuration handle, and identity seam, and exposes the uniform
//! entry points the platform event layer calls.

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::attribution::{AttributionCache, AttributionKind, AttributionStore};
use crate::claim::{
    Claim, ClaimError, ClaimHint, ClaimStore, CreateClaim, NestingPolicy,
};
use crate::config::ConfigHandle;
use crate::flag::{ActionKind, FlagResolutionEngine, OptionValue, ResolveRequest, Tristate};
use crate::identity::IdentityProvider;
use crate::persist::PersistError;
use crate::trust::{TrustHierarchy, TrustLevel, TrustResolver, TrustSubject};
use crate::world::{BlockPos, ChunkPos, ClaimId, UserId, WorldId};

/// One action for the engine to judge, as mapped by the host's event layer.
#[derive(Debug, Clone)]
pub struct ActionRequest<'a> {
    pub world: WorldId,
    pub location: BlockPos,
    /// `None` when the proximate cause is not a player; the engine then
    /// derives a responsible actor from block attribution.
    pub actor: Option<UserId>,
    pub kind: ActionKind,
    /// Overrides the kind's default required trust when set.
    pub required_trust: Option<TrustLevel>,
    pub source: Option<&'a str>,
    pub target: Option<&'a str>,
}

impl<'a> ActionRequest<'a> {
    pub fn new(world: WorldId, location: BlockPos, actor: Option<UserId>, kind: ActionKind) -> Self {
        Self {
            world,
            location,
            actor,
            kind,
            required_trust: None,
            source: None,
            target: None,
        }
    }
}

/// The assembled access-control engine.
pub struct ClaimEngine {
    store: ClaimStore,
    config: ConfigHandle,
    identity: Box<dyn IdentityProvider>,
    flags: FlagResolutionEngine,
    attribution: AttributionCache,
    trust: TrustResolver,
    hints: FxHashMap<Option<UserId>, ClaimHint>,
    /// Actor slots already cleared for the current logical action.
    action_slots: FxHashSet<Option<UserId>>,
}

impl ClaimEngine {
    pub fn new(
        config: ConfigHandle,
        identity: Box<dyn IdentityProvider>,
        attribution_store: Box<dyn AttributionStore>,
    ) -> Self {
        let nesting = NestingPolicy::with_overrides(&config.read().settings.nesting_overrides);
        Self {
            store: ClaimStore::new(nesting),
            config,
            identity,
            flags: FlagResolutionEngine::new(),
            attribution: AttributionCache::new(attribution_store),
            trust: TrustResolver::new(),
            hints: FxHashMap::default(),
            action_slots: FxHashSet::default(),
        }
    }

    pub fn store(&self) -> &ClaimStore {
        &self.store
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Re-derive policies from the (possibly hot-swapped) configuration.
    pub fn reload_config(&mut self) {
        let nesting = NestingPolicy::with_overrides(&self.config.read().settings.nesting_overrides);
        self.store.set_nesting_policy(nesting);
    }

    pub fn add_world(&mut self, world: WorldId) {
        self.store.add_world(world);
    }

    // ---- claim management -------------------------------------------------

    pub fn create_claim(&mut self, req: CreateClaim) -> Result<ClaimId, ClaimError> {
        let rules = self.config.read().settings.claims.clone();
        self.store.create_claim(req, &rules)
    }

    pub fn resize_claim(
        &mut self,
        id: ClaimId,
        corner_a: BlockPos,
        corner_b: BlockPos,
    ) -> Result<(), ClaimError> {
        let rules = self.config.read().settings.claims.clone();
        self.store.resize_claim(id, corner_a, corner_b, &rules)
    }

    /// Remove a claim; child disposition comes from configuration.
    pub fn remove_claim(&mut self, id: ClaimId) -> Result<(), ClaimError> {
        let policy = self.config.read().settings.child_policy;
        self.store.remove_claim(id, policy)
    }

    pub fn set_trust(
        &mut self,
        claim: ClaimId,
        subject: TrustSubject,
        level: TrustLevel,
    ) -> Result<(), ClaimError> {
        self.store.set_trust(claim, subject, level)
    }

    pub fn remove_trust(&mut self, claim: ClaimId, subject: &TrustSubject) -> Result<(), ClaimError> {
        self.store.remove_trust(claim, subject)
    }

    pub fn claim_at(&self, world: WorldId, pos: BlockPos) -> &Claim {
        self.store.claim_at(world, pos)
    }

    pub fn find_overlapping(&self, id: ClaimId) -> Result<Vec<ClaimId>, ClaimError> {
        self.store.find_overlapping(id)
    }

    // ---- trust inspection -------------------------------------------------

    pub fn trust_level(&self, claim: &Claim, user: UserId) -> Option<TrustLevel> {
        self.trust
            .trust_level(&self.store, self.identity.as_ref(), claim, user)
    }

    pub fn is_trusted_at_least(
        &self,
        claim: &Claim,
        user: UserId,
        required: TrustLevel,
        hierarchy: &TrustHierarchy,
    ) -> bool {
        self.trust.is_trusted_at_least(
            &self.store,
            self.identity.as_ref(),
            claim,
            user,
            required,
            hierarchy,
        )
    }

    // ---- resolution -------------------------------------------------------

    /// Start a new logical action for the actor. One host event maps to one
    /// call here, followed by any number of `check_action` sub-checks that
    /// share memoized verdicts. Causeless events resolve against a derived
    /// actor; that actor's slot is cleared on its first sub-check of the
    /// action, so memoized verdicts never outlive the event they belong to.
    pub fn begin_action(&mut self, actor: Option<UserId>) {
        self.action_slots.clear();
        self.enter_action(actor);
    }

    fn enter_action(&mut self, actor: Option<UserId>) {
        if self.action_slots.insert(actor) {
            self.flags.begin_action(actor);
        }
    }

    /// The single call site the platform event layer uses: resolve the
    /// claim at the location, derive the responsible actor if none was
    /// supplied, and run the decision pipeline.
    pub fn check_action(&mut self, req: &ActionRequest<'_>) -> Tristate {
        self.store.add_world(req.world);

        let actor = req.actor.or_else(|| self.derive_actor(req.world, req.location));
        if let Some(user) = actor {
            if self.identity.ignores_claims(user) {
                debug!("{} ignores claims, allowing {:?}", user, req.kind);
                return Tristate::Allow;
            }
        }

        self.enter_action(actor);
        let hint = self.hints.get(&actor).copied();
        let (claim, new_hint) = self.store.claim_at_with_hint(req.world, req.location, hint);
        self.hints.insert(actor, new_hint);

        let resolve_req = ResolveRequest {
            actor,
            location: req.location,
            kind: req.kind,
            required_trust: req.required_trust,
            source: req.source,
            target: req.target,
        };
        let config = self.config.read();
        let _batch = self.store.batch();
        self.flags
            .resolve(&self.store, &config, self.identity.as_ref(), claim, &resolve_req)
    }

    /// Resolve by flag name (inspection/tooling path). Unknown names log a
    /// configuration warning and resolve to Undefined.
    pub fn check_flag(
        &mut self,
        world: WorldId,
        location: BlockPos,
        actor: Option<UserId>,
        flag_name: &str,
    ) -> Tristate {
        self.store.add_world(world);
        self.enter_action(actor);
        let hint = self.hints.get(&actor).copied();
        let (claim, new_hint) = self.store.claim_at_with_hint(world, location, hint);
        self.hints.insert(actor, new_hint);
        let req = ResolveRequest::new(actor, location, ActionKind::InteractBlock);
        let config = self.config.read();
        let _batch = self.store.batch();
        self.flags.resolve_named(
            &self.store,
            &config,
            self.identity.as_ref(),
            claim,
            flag_name,
            &req,
        )
    }

    /// Movement between two positions: decisive only when a claim boundary
    /// is crossed, combining the exit check on the old claim with the
    /// enter check on the new one.
    pub fn check_move(
        &mut self,
        world: WorldId,
        actor: UserId,
        from: BlockPos,
        to: BlockPos,
    ) -> Tristate {
        self.store.add_world(world);
        let from_claim_id = self.store.claim_at(world, from).id;
        let to_claim_id = self.store.claim_at(world, to).id;
        if from_claim_id == to_claim_id {
            return Tristate::Undefined;
        }

        let exit = self.check_action(&ActionRequest::new(world, from, Some(actor), ActionKind::Exit));
        let enter = self.check_action(&ActionRequest::new(world, to, Some(actor), ActionKind::Enter));
        if exit == Tristate::Deny || enter == Tristate::Deny {
            Tristate::Deny
        } else if exit == Tristate::Allow || enter == Tristate::Allow {
            Tristate::Allow
        } else {
            Tristate::Undefined
        }
    }

    /// Resolve a typed option for an actor in the claim at a location.
    pub fn option_value(
        &mut self,
        world: WorldId,
        location: BlockPos,
        actor: UserId,
        option: &str,
    ) -> Option<OptionValue> {
        self.store.add_world(world);
        let claim = self.store.claim_at(world, location);
        let config = self.config.read();
        self.flags
            .option_value(&config, self.identity.as_ref(), claim, actor, option)
    }

    /// Open a resolution batch explicitly, for hosts sweeping many blocks
    /// with intervening logic. Claim mutations fail until `end_batch`.
    pub fn begin_batch(&self) {
        self.store.begin_batch();
    }

    pub fn end_batch(&self) {
        self.store.end_batch();
    }

    // ---- attribution ------------------------------------------------------

    pub fn record_attribution(
        &mut self,
        world: WorldId,
        pos: BlockPos,
        user: UserId,
        kind: AttributionKind,
    ) {
        self.attribution.record(world, pos, user, kind);
    }

    pub fn attribution_owner(&self, world: WorldId, pos: BlockPos) -> Option<UserId> {
        self.attribution.owner_of(world, pos)
    }

    pub fn attribution_notifier(&self, world: WorldId, pos: BlockPos) -> Option<UserId> {
        self.attribution.notifier_of(world, pos)
    }

    pub fn on_chunk_load(&mut self, world: WorldId, chunk: ChunkPos) -> Result<(), PersistError> {
        self.attribution.load(world, chunk)
    }

    pub fn on_chunk_unload(&mut self, world: WorldId, chunk: ChunkPos) -> Result<(), PersistError> {
        self.attribution.unload(world, chunk)
    }

    /// Advance the game tick stamped onto attribution records.
    pub fn set_tick(&mut self, tick: u64) {
        self.attribution.set_tick(tick);
    }

    /// Drop per-actor caches (disconnect).
    pub fn forget_actor(&mut self, actor: UserId) {
        self.flags.forget_actor(actor);
        self.hints.remove(&Some(actor));
        self.action_slots.remove(&Some(actor));
    }

    /// The responsible actor for a causeless event: the last notifier at
    /// the position, falling back to the block's owner.
    fn derive_actor(&self, world: WorldId, pos: BlockPos) -> Option<UserId> {
        self.attribution
            .notifier_of(world, pos)
            .or_else(|| self.attribution.owner_of(world, pos))
    }
}
