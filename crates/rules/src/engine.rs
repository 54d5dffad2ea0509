//! A minimal, extensible rule pipeline (spec §4.2): an ordered sequence of
//! rules over a shared typed context. Each rule exposes `priority`,
//! `should_apply`, and `execute`. The engine sorts by priority (stable),
//! iterates, and lets a rule short-circuit later rules by setting a flag on
//! the context.
//!
//! Used both by [`crate::policy`]'s three match rules and by the catalog
//! compiler's admission rules (`sa-catalog`).

/// Context shared across a single pass of the rule pipeline. Implementors
/// decide what "matched" / "should skip" mean for their pipeline.
pub trait RuleContext {
    /// Whether a prior rule already produced a conclusive result.
    fn is_settled(&self) -> bool;
}

/// A single rule in the pipeline.
pub trait Rule<C: RuleContext> {
    /// Stable sort key; lower runs first.
    fn priority(&self) -> i32;

    /// Whether this rule wants to inspect `ctx` at all.
    fn should_apply(&self, ctx: &C) -> bool;

    /// Inspect (and possibly mutate) `ctx`. Rules that conclude the
    /// pipeline should settle can call `ctx`'s own mutator methods.
    fn execute(&self, ctx: &mut C);
}

/// Runs `rules` (stable-sorted by `priority`) against `ctx` until a rule
/// settles the context or the list is exhausted.
pub fn run<C: RuleContext>(rules: &[Box<dyn Rule<C>>], ctx: &mut C) {
    let mut indices: Vec<usize> = (0..rules.len()).collect();
    indices.sort_by_key(|&i| rules[i].priority());

    for i in indices {
        if ctx.is_settled() {
            break;
        }
        let rule = &rules[i];
        if rule.should_apply(ctx) {
            rule.execute(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ctx {
        total: i32,
        matched: bool,
    }

    impl RuleContext for Ctx {
        fn is_settled(&self) -> bool {
            self.matched
        }
    }

    struct AddRule(i32, i32);
    impl Rule<Ctx> for AddRule {
        fn priority(&self) -> i32 {
            self.1
        }
        fn should_apply(&self, _ctx: &Ctx) -> bool {
            true
        }
        fn execute(&self, ctx: &mut Ctx) {
            ctx.total += self.0;
        }
    }

    struct StopRule;
    impl Rule<Ctx> for StopRule {
        fn priority(&self) -> i32 {
            0
        }
        fn should_apply(&self, _ctx: &Ctx) -> bool {
            true
        }
        fn execute(&self, ctx: &mut Ctx) {
            ctx.matched = true;
        }
    }

    #[test]
    fn runs_rules_in_priority_order() {
        let rules: Vec<Box<dyn Rule<Ctx>>> =
            vec![Box::new(AddRule(10, 5)), Box::new(AddRule(1, 1))];
        let mut ctx = Ctx {
            total: 0,
            matched: false,
        };
        run(&rules, &mut ctx);
        assert_eq!(ctx.total, 11);
    }

    #[test]
    fn stops_once_settled() {
        let rules: Vec<Box<dyn Rule<Ctx>>> = vec![
            Box::new(StopRule),
            Box::new(AddRule(100, 10)),
        ];
        let mut ctx = Ctx {
            total: 0,
            matched: false,
        };
        run(&rules, &mut ctx);
        assert_eq!(ctx.total, 0);
        assert!(ctx.matched);
    }
}
