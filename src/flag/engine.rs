use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::claim::{Claim, ClaimStore};
use crate::config::ConfigData;
use crate::flag::action::ActionKind;
use crate::flag::context::ContextSet;
use crate::flag::matcher;
use crate::flag::options::{resolve_option, OptionCache};
use crate::flag::result_cache::{CachedVerdict, ResultCache};
use crate::flag::rule::OptionValue;
use crate::flag::tristate::Tristate;
use crate::identity::IdentityProvider;
use crate::trust::{TrustLevel, TrustResolver};
use crate::world::{BlockPos, UserId};

/// One permission question for the pipeline.
#[derive(Debug, Clone)]
pub struct ResolveRequest<'a> {
    /// `None` when no responsible actor could be derived.
    pub actor: Option<UserId>,
    pub location: BlockPos,
    pub kind: ActionKind,
    /// Overrides the kind's default required trust when set.
    pub required_trust: Option<TrustLevel>,
    /// Type identifier of the proximate cause (entity/block/item id).
    pub source: Option<&'a str>,
    /// Type identifier of the affected object.
    pub target: Option<&'a str>,
}

impl<'a> ResolveRequest<'a> {
    pub fn new(actor: Option<UserId>, location: BlockPos, kind: ActionKind) -> Self {
        Self {
            actor,
            location,
            kind,
            required_trust: None,
            source: None,
            target: None,
        }
    }
}

/// The rule-ordered decision pipeline.
///
/// Resolution is a pure function of claim state, trust state,
/// configuration, and the blacklist; the only side effect is writing the
/// intra-action result cache.
#[derive(Debug, Default)]
pub struct FlagResolutionEngine {
    resolver: TrustResolver,
    results: ResultCache,
    option_caches: FxHashMap<UserId, OptionCache>,
}

impl FlagResolutionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new logical action for the actor, invalidating memoized
    /// verdicts from the previous one.
    pub fn begin_action(&mut self, actor: Option<UserId>) {
        self.results.begin_action(actor);
    }

    pub fn forget_actor(&mut self, actor: UserId) {
        self.results.forget_actor(Some(actor));
        self.option_caches.remove(&actor);
    }

    /// Resolve a permission check against a claim.
    ///
    /// Step order (first decisive step wins): blacklist, intra-action
    /// cache, wilderness fast path, ownership fast path, trust check,
    /// configured flag value, Undefined fallback.
    pub fn resolve(
        &mut self,
        store: &ClaimStore,
        config: &ConfigData,
        identity: &dyn IdentityProvider,
        claim: &Claim,
        req: &ResolveRequest<'_>,
    ) -> Tristate {
        let flag = req.kind.flag_name();

        // 1. Blacklisted source/target identifiers are never evaluated.
        for id in [req.source, req.target].into_iter().flatten() {
            if config.blacklist.is_blacklisted(claim.world, flag, id) {
                debug!(
                    "{} blacklisted for {} at {:?}, skipping check",
                    id, flag, req.location
                );
                return Tristate::Undefined;
            }
        }

        // 2. Identical sub-check earlier in the same action.
        if let Some(hit) = self.results.get(req.actor, claim.id, flag) {
            return hit.verdict;
        }

        let groups = req
            .actor
            .map(|u| identity.groups_of(u))
            .unwrap_or_default();
        let request_ctx = ContextSet::for_request(claim, &groups);

        // 3. Wilderness defaults to Allow unless a rule explicitly scoped
        //    to wilderness denies; rules written for claims do not leak
        //    out here. Boundary-crossing checks still go through the full
        //    pipeline.
        if claim.is_wilderness() && !matches!(req.kind, ActionKind::Enter | ActionKind::Exit) {
            let wilderness_rules: Vec<_> = config
                .rules
                .flag_rules(flag)
                .iter()
                .filter(|r| {
                    r.contexts.iter().any(|c| {
                        *c == crate::flag::context::Context::claim_type(claim.claim_type)
                            || *c == crate::flag::context::Context::claim(claim.id)
                    })
                })
                .cloned()
                .collect();
            let verdict = match matcher::select(&wilderness_rules, &request_ctx) {
                Some(rule) if rule.value == Tristate::Deny => Tristate::Deny,
                _ => Tristate::Allow,
            };
            self.remember(req.actor, claim, flag, verdict, None);
            return verdict;
        }

        // 4. Owners pass build-gated checks without a trust lookup.
        if req.kind.is_build_like() {
            if let Some(actor) = req.actor {
                if store.effective_owner(claim) == Some(actor) {
                    self.remember(req.actor, claim, flag, Tristate::Allow, None);
                    return Tristate::Allow;
                }
            }
        }

        // 5. Trust lists.
        let required = req.required_trust.or(req.kind.default_required_trust());
        if let (Some(actor), Some(required)) = (req.actor, required) {
            if self.resolver.is_trusted_at_least(
                store,
                identity,
                claim,
                actor,
                required,
                &req.kind.trust_hierarchy(),
            ) {
                self.remember(req.actor, claim, flag, Tristate::Allow, Some(required));
                return Tristate::Allow;
            }
        }

        // 6. Configured flag value, most specific context wins.
        if let Some(rule) = matcher::select(config.rules.flag_rules(flag), &request_ctx) {
            if rule.value.is_decisive() {
                self.remember(req.actor, claim, flag, rule.value, None);
                return rule.value;
            }
        }

        // 7. No opinion.
        Tristate::Undefined
    }

    /// Resolve by flag name. Unknown names are a configuration anomaly:
    /// logged, never fatal, resolved to Undefined.
    pub fn resolve_named(
        &mut self,
        store: &ClaimStore,
        config: &ConfigData,
        identity: &dyn IdentityProvider,
        claim: &Claim,
        flag_name: &str,
        req: &ResolveRequest<'_>,
    ) -> Tristate {
        match ActionKind::from_flag_name(flag_name) {
            Some(kind) => {
                let req = ResolveRequest { kind, ..req.clone() };
                self.resolve(store, config, identity, claim, &req)
            }
            None => {
                warn!("unknown flag '{}', resolving to Undefined", flag_name);
                Tristate::Undefined
            }
        }
    }

    /// Resolve a typed option for an actor standing in a claim, through
    /// the per-actor cache.
    pub fn option_value(
        &mut self,
        config: &ConfigData,
        identity: &dyn IdentityProvider,
        claim: &Claim,
        actor: UserId,
        option: &str,
    ) -> Option<OptionValue> {
        let cache = self.option_caches.entry(actor).or_default();
        cache.on_claim_transition(claim.id);
        if let Some(value) = cache.get(claim.id, option) {
            return Some(value.clone());
        }
        let groups = identity.groups_of(actor);
        let request_ctx = ContextSet::for_request(claim, &groups);
        let value = resolve_option(&config.rules, option, &request_ctx)?;
        self.option_caches
            .entry(actor)
            .or_default()
            .put(claim.id, option, value.clone());
        Some(value)
    }

    /// Cache hit/miss counters for diagnostics.
    pub fn cache_stats(&self) -> (u64, u64) {
        self.results.stats()
    }

    fn remember(
        &mut self,
        actor: Option<UserId>,
        claim: &Claim,
        flag: &'static str,
        verdict: Tristate,
        matched_trust: Option<TrustLevel>,
    ) {
        self.results.put(
            actor,
            claim.id,
            flag,
            CachedVerdict {
                verdict,
                matched_trust,
            },
        );
    }
}
