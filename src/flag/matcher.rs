//! Most-specific-wins selection among context-tagged rules.

use crate::flag::context::ContextSet;

/// Anything carrying a context set the matcher can score.
pub trait ContextualRule {
    fn contexts(&self) -> &ContextSet;
}

/// Pick the applicable rule for a request context.
///
/// A rule applies when every one of its tags is present in the request.
/// Among applicable rules the one with the most tags wins; ties break on
/// the fixed key precedence (claim > claim-type > world > group) via the
/// rank sum, then on the context set ordering itself so the result is
/// fully deterministic for a fixed rule set. The same flag is queried
/// many times per tick with identical inputs and must not flap.
pub fn select<'a, R: ContextualRule>(rules: &'a [R], request: &ContextSet) -> Option<&'a R> {
    rules
        .iter()
        .filter(|r| r.contexts().is_subset_of(request))
        .max_by(|a, b| {
            let ka = (a.contexts().len(), a.contexts().rank_sum());
            let kb = (b.contexts().len(), b.contexts().rank_sum());
            ka.cmp(&kb).then_with(|| a.contexts().cmp(b.contexts()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::context::{Context, ContextKey};

    struct TestRule {
        name: &'static str,
        contexts: ContextSet,
    }

    impl ContextualRule for TestRule {
        fn contexts(&self) -> &ContextSet {
            &self.contexts
        }
    }

    fn rule(name: &'static str, tags: &[(ContextKey, &str)]) -> TestRule {
        TestRule {
            name,
            contexts: tags
                .iter()
                .map(|(k, v)| Context::new(*k, *v))
                .collect(),
        }
    }

    #[test]
    fn most_specific_rule_wins() {
        let rules = vec![
            rule("global", &[]),
            rule("world", &[(ContextKey::World, "w1")]),
            rule(
                "world-and-type",
                &[(ContextKey::World, "w1"), (ContextKey::ClaimType, "basic")],
            ),
        ];
        let request = ContextSet::new()
            .with(Context::new(ContextKey::World, "w1"))
            .with(Context::new(ContextKey::ClaimType, "basic"));
        assert_eq!(select(&rules, &request).unwrap().name, "world-and-type");
    }

    #[test]
    fn claim_tag_beats_equal_sized_type_tag() {
        let rules = vec![
            rule("by-type", &[(ContextKey::ClaimType, "basic")]),
            rule("by-claim", &[(ContextKey::Claim, "c1")]),
        ];
        let request = ContextSet::new()
            .with(Context::new(ContextKey::ClaimType, "basic"))
            .with(Context::new(ContextKey::Claim, "c1"));
        assert_eq!(select(&rules, &request).unwrap().name, "by-claim");
    }

    #[test]
    fn inapplicable_rules_are_skipped() {
        let rules = vec![rule("other-world", &[(ContextKey::World, "w2")])];
        let request = ContextSet::new().with(Context::new(ContextKey::World, "w1"));
        assert!(select(&rules, &request).is_none());
    }

    #[test]
    fn selection_is_deterministic() {
        let rules = vec![
            rule("a", &[(ContextKey::Group, "g1")]),
            rule("b", &[(ContextKey::Group, "g2")]),
        ];
        let request = ContextSet::new()
            .with(Context::new(ContextKey::Group, "g1"))
            .with(Context::new(ContextKey::Group, "g2"));
        let first = select(&rules, &request).unwrap().name;
        for _ in 0..16 {
            assert_eq!(select(&rules, &request).unwrap().name, first);
        }
    }
}
