use crate::claim::claim::Claim;
use crate::claim::store::ClaimStore;
use crate::identity::IdentityProvider;
use crate::trust::level::{TrustHierarchy, TrustLevel, TrustSubject};
use crate::world::UserId;

/// Computes the effective trust level a user holds in a claim.
///
/// Stateless: all state lives in the claim store and the identity
/// provider, so the resolver can be shared freely.
#[derive(Debug, Default, Clone)]
pub struct TrustResolver;

impl TrustResolver {
    pub fn new() -> Self {
        Self
    }

    /// Effective trust level, checked in order: explicit user entry, then
    /// group entries (highest wins), then the parent claim when the claim
    /// inherits parent trust. `None` means no entry anywhere, which is
    /// distinct from holding a low level: absence falls back to
    /// wilderness/default rules.
    pub fn trust_level(
        &self,
        store: &ClaimStore,
        identity: &dyn IdentityProvider,
        claim: &Claim,
        user: UserId,
    ) -> Option<TrustLevel> {
        if let Some(level) = claim.trust_entry(&TrustSubject::User(user)) {
            return Some(level);
        }

        let group_level = identity
            .groups_of(user)
            .into_iter()
            .filter_map(|g| claim.trust_entry(&TrustSubject::Group(g)))
            .max();
        if group_level.is_some() {
            return group_level;
        }

        if claim.inherit_parent_trust {
            if let Some(parent) = store.parent_of(claim) {
                return self.trust_level(store, identity, parent, user);
            }
        }
        None
    }

    /// True if the user is the claim's (effective) owner, or holds a trust
    /// level that covers `required` under the given hierarchy.
    pub fn is_trusted_at_least(
        &self,
        store: &ClaimStore,
        identity: &dyn IdentityProvider,
        claim: &Claim,
        user: UserId,
        required: TrustLevel,
        hierarchy: &TrustHierarchy,
    ) -> bool {
        if store.effective_owner(claim) == Some(user) {
            return true;
        }
        match self.trust_level(store, identity, claim, user) {
            Some(held) => hierarchy.covers(held, required),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::store::{ClaimRules, CreateClaim};
    use crate::claim::ClaimType;
    use crate::identity::StaticIdentity;
    use crate::world::{BlockPos, WorldId};

    fn fixture() -> (ClaimStore, WorldId, crate::world::ClaimId, UserId) {
        let mut store = ClaimStore::default();
        let world = WorldId::new();
        store.add_world(world);
        let owner = UserId::new();
        let id = store
            .create_claim(
                CreateClaim {
                    world,
                    corner_a: BlockPos::new(0, 0, 0),
                    corner_b: BlockPos::new(63, 63, 63),
                    claim_type: ClaimType::Basic,
                    owner: Some(owner),
                    cuboid: false,
                    parent: None,
                },
                &ClaimRules::default(),
            )
            .unwrap();
        (store, world, id, owner)
    }

    #[test]
    fn explicit_user_entry_wins_over_group() {
        let (mut store, _, id, _) = fixture();
        let user = UserId::new();
        let mut identity = StaticIdentity::new();
        identity.add_to_group(user, "crew");
        store
            .set_trust(id, TrustSubject::Group("crew".into()), TrustLevel::Builder)
            .unwrap();
        store
            .set_trust(id, TrustSubject::User(user), TrustLevel::Accessor)
            .unwrap();

        let resolver = TrustResolver::new();
        let claim = store.get(id).unwrap();
        assert_eq!(
            resolver.trust_level(&store, &identity, claim, user),
            Some(TrustLevel::Accessor)
        );
    }

    #[test]
    fn highest_group_entry_applies() {
        let (mut store, _, id, _) = fixture();
        let user = UserId::new();
        let mut identity = StaticIdentity::new();
        identity.add_to_group(user, "guests");
        identity.add_to_group(user, "crew");
        store
            .set_trust(id, TrustSubject::Group("guests".into()), TrustLevel::Accessor)
            .unwrap();
        store
            .set_trust(id, TrustSubject::Group("crew".into()), TrustLevel::Container)
            .unwrap();

        let resolver = TrustResolver::new();
        let claim = store.get(id).unwrap();
        assert_eq!(
            resolver.trust_level(&store, &identity, claim, user),
            Some(TrustLevel::Container)
        );
    }

    #[test]
    fn subdivision_inherits_parent_trust() {
        let (mut store, world, parent_id, _) = fixture();
        let sub_id = store
            .create_claim(
                CreateClaim {
                    world,
                    corner_a: BlockPos::new(10, 10, 10),
                    corner_b: BlockPos::new(20, 20, 20),
                    claim_type: ClaimType::Subdivision,
                    owner: None,
                    cuboid: true,
                    parent: Some(parent_id),
                },
                &ClaimRules::default(),
            )
            .unwrap();

        let user = UserId::new();
        store
            .set_trust(parent_id, TrustSubject::User(user), TrustLevel::Builder)
            .unwrap();

        let resolver = TrustResolver::new();
        let identity = StaticIdentity::new();
        let sub = store.get(sub_id).unwrap();
        assert_eq!(
            resolver.trust_level(&store, &identity, sub, user),
            Some(TrustLevel::Builder)
        );

        // An explicit entry on the subdivision overrides the parent's.
        store
            .set_trust(sub_id, TrustSubject::User(user), TrustLevel::Accessor)
            .unwrap();
        let sub = store.get(sub_id).unwrap();
        assert_eq!(
            resolver.trust_level(&store, &identity, sub, user),
            Some(TrustLevel::Accessor)
        );
    }

    #[test]
    fn owner_is_always_trusted() {
        let (store, _, id, owner) = fixture();
        let resolver = TrustResolver::new();
        let identity = StaticIdentity::new();
        let claim = store.get(id).unwrap();
        assert!(resolver.is_trusted_at_least(
            &store,
            &identity,
            claim,
            owner,
            TrustLevel::Manager,
            &TrustHierarchy::standard(),
        ));
    }

    #[test]
    fn stranger_is_not_trusted() {
        let (store, _, id, _) = fixture();
        let resolver = TrustResolver::new();
        let identity = StaticIdentity::new();
        let claim = store.get(id).unwrap();
        assert!(!resolver.is_trusted_at_least(
            &store,
            &identity,
            claim,
            UserId::new(),
            TrustLevel::Accessor,
            &TrustHierarchy::standard(),
        ));
    }

    #[test]
    fn removal_takes_effect_immediately() {
        let (mut store, _, id, _) = fixture();
        let user = UserId::new();
        store
            .set_trust(id, TrustSubject::User(user), TrustLevel::Builder)
            .unwrap();
        store.remove_trust(id, &TrustSubject::User(user)).unwrap();

        let resolver = TrustResolver::new();
        let identity = StaticIdentity::new();
        let claim = store.get(id).unwrap();
        assert_eq!(resolver.trust_level(&store, &identity, claim, user), None);
    }
}
