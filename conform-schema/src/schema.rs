// Schema trait and the shared rule-chain machinery

use crate::when::{Condition, Matcher};
use crate::value::is_absent;
use crate::{Context, ErrorKind, ValidationError};
use conform_log::{TARGET_ENGINE, TARGET_WHEN, debug, trace};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A single validation or transformation step.
///
/// Rules may read and overwrite the context value, or stop the chain with
/// [`Context::abort`] / [`Context::skip`].
pub type Rule = Arc<dyn Fn(&mut Context<'_>) + Send + Sync>;

/// Shared handle to a type-erased schema.
pub type SchemaRef = Arc<dyn Schema>;

/// Anything that can validate a [`Context`].
///
/// Schemas are immutable once built and can be shared across threads and
/// concurrent validation runs.
pub trait Schema: Send + Sync {
    /// Caller-defined ordering metadata. The engine never reorders by it.
    fn priority(&self) -> i32;

    /// Validate the context in place. Success leaves no error behind.
    fn validate(&self, ctx: &mut Context<'_>);

    /// Validate a standalone value, returning it with defaults and
    /// transforms applied.
    fn check_value(&self, value: Value) -> Result<Value, ValidationError> {
        let mut ctx = Context::new(value);
        self.validate(&mut ctx);
        ctx.into_result()
    }

    /// Whether a copy of `value` validates. Errors are discarded.
    fn matches(&self, value: &Value) -> bool {
        let mut probe = Context::new(value.clone());
        self.validate(&mut probe);
        probe.error().is_none()
    }
}

impl fmt::Debug for dyn Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema(priority = {})", self.priority())
    }
}

impl<S: Schema + ?Sized> Schema for Arc<S> {
    fn priority(&self) -> i32 {
        (**self).priority()
    }

    fn validate(&self, ctx: &mut Context<'_>) {
        (**self).validate(ctx)
    }
}

/// What to do when the value is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Presence {
    /// Abort with [`ErrorKind::MissingRequired`]
    Required,
    /// End the chain successfully
    #[default]
    Optional,
    /// Substitute the value and continue
    Default(Value),
}

impl Presence {
    /// Apply the policy. Returns whether the chain should continue.
    fn apply(&self, ctx: &mut Context<'_>) -> bool {
        if !is_absent(ctx.value()) {
            return true;
        }

        match self {
            Presence::Required => {
                ctx.fail(ErrorKind::MissingRequired, "is required");
                false
            }
            Presence::Optional => {
                ctx.skip();
                false
            }
            Presence::Default(value) => {
                ctx.set_value(value.clone());
                true
            }
        }
    }
}

/// Run rules in order until one aborts the context.
pub fn run_rules(rules: &[Rule], ctx: &mut Context<'_>) {
    for rule in rules {
        if ctx.is_aborted() {
            return;
        }
        rule(ctx);
    }
}

/// State every concrete schema embeds: priority, presence policy, the
/// ordered rule chain and `when` conditions.
#[derive(Clone, Default)]
pub struct Base {
    priority: i32,
    presence: Presence,
    rules: Vec<Rule>,
    conditions: Vec<Condition>,
}

impl Base {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base whose chain starts with `rule` (typically a type check).
    pub(crate) fn with_rule<F>(rule: F) -> Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        let mut base = Self::new();
        base.append(Arc::new(rule));
        base
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn set_presence(&mut self, presence: Presence) {
        self.presence = presence;
    }

    pub fn append(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn prepend(&mut self, rule: Rule) {
        self.rules.insert(0, rule);
    }

    pub fn add_condition(&mut self, field: String, matcher: Matcher, then: SchemaRef) {
        self.conditions.push(Condition::new(field, matcher, then));
    }

    /// Run the node lifecycle: conditional selection, presence policy, the
    /// rule chain, then `descend` for structural checks.
    ///
    /// A matching `when` condition hands the whole node to its alternate
    /// schema, including that schema's presence policy.
    pub fn evaluate<F>(&self, ctx: &mut Context<'_>, descend: F)
    where
        F: FnOnce(&mut Context<'_>),
    {
        if ctx.is_aborted() {
            return;
        }
        trace!(target: TARGET_ENGINE, "validating {}", ctx.path());

        if let Some((index, condition)) = self.select(ctx) {
            debug!(
                target: TARGET_WHEN,
                "{}: condition #{} on `{}` selected",
                ctx.path(),
                index,
                condition.field()
            );
            condition.then().validate(ctx);
            return;
        }

        if !self.presence.apply(ctx) {
            log_outcome(ctx);
            return;
        }

        run_rules(&self.rules, ctx);
        if !ctx.is_aborted() {
            descend(ctx);
        }
        log_outcome(ctx);
    }

    fn select(&self, ctx: &Context<'_>) -> Option<(usize, &Condition)> {
        self.conditions
            .iter()
            .enumerate()
            .find(|(_, condition)| condition.is_met(ctx))
    }
}

fn log_outcome(ctx: &Context<'_>) {
    if let Some(err) = ctx.error() {
        debug!(target: TARGET_ENGINE, "aborted: {} ({})", err, err.kind);
    } else if ctx.is_skipped() {
        trace!(target: TARGET_ENGINE, "{}: absent, skipped", ctx.path());
    }
}

/// Builder methods shared by every schema that embeds a [`Base`] in a
/// field named `base`.
#[macro_export]
#[doc(hidden)]
macro_rules! impl_base_builders {
    ($schema:ty) => {
        impl $schema {
            /// Set caller-defined ordering metadata
            pub fn set_priority(mut self, priority: i32) -> Self {
                self.base.set_priority(priority);
                self
            }

            /// Fail with `MissingRequired` when the value is absent
            pub fn required(mut self) -> Self {
                self.base.set_presence($crate::Presence::Required);
                self
            }

            /// Skip all remaining rules when the value is absent
            pub fn optional(mut self) -> Self {
                self.base.set_presence($crate::Presence::Optional);
                self
            }

            /// Substitute `value` when the value is absent
            #[allow(clippy::should_implement_trait)]
            pub fn default(mut self, value: impl Into<::serde_json::Value>) -> Self {
                self.base
                    .set_presence($crate::Presence::Default(value.into()));
                self
            }

            /// Append a rule to the end of the chain
            pub fn transform<F>(mut self, rule: F) -> Self
            where
                F: Fn(&mut $crate::Context<'_>) + Send + Sync + 'static,
            {
                self.base.append(::std::sync::Arc::new(rule));
                self
            }

            /// Insert a rule before every rule added so far
            pub fn prepend_transform<F>(mut self, rule: F) -> Self
            where
                F: Fn(&mut $crate::Context<'_>) + Send + Sync + 'static,
            {
                self.base.prepend(::std::sync::Arc::new(rule));
                self
            }

            /// Append a predicate; an `Err` aborts with `CustomCheckFailed`
            pub fn check<F, E>(self, predicate: F) -> Self
            where
                F: Fn(&::serde_json::Value) -> Result<(), E> + Send + Sync + 'static,
                E: ::std::fmt::Display,
            {
                self.transform(move |ctx: &mut $crate::Context<'_>| {
                    if let Err(err) = predicate(ctx.value()) {
                        ctx.fail($crate::ErrorKind::CustomCheckFailed, err.to_string());
                    }
                })
            }

            /// Validate with `alternate` instead when the sibling `field`
            /// matches. Conditions are tried in registration order.
            pub fn when<S>(
                mut self,
                field: impl Into<String>,
                matcher: impl Into<$crate::Matcher>,
                alternate: S,
            ) -> Self
            where
                S: $crate::Schema + 'static,
            {
                self.base.add_condition(
                    field.into(),
                    matcher.into(),
                    ::std::sync::Arc::new(alternate),
                );
                self
            }

            pub fn base(&self) -> &$crate::Base {
                &self.base
            }
        }

        impl Default for $schema {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, mark: &'static str) -> Rule {
        let log = Arc::clone(log);
        Arc::new(move |_ctx: &mut Context<'_>| log.lock().unwrap().push(mark))
    }

    #[test]
    fn test_run_rules_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rules = vec![recorder(&log, "a"), recorder(&log, "b")];

        run_rules(&rules, &mut Context::new(json!(1)));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_run_rules_stops_after_abort() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rules: Vec<Rule> = vec![
            recorder(&log, "a"),
            Arc::new(|ctx: &mut Context<'_>| ctx.fail(ErrorKind::CustomCheckFailed, "stop")),
            recorder(&log, "c"),
        ];

        let mut ctx = Context::new(json!(1));
        run_rules(&rules, &mut ctx);
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
        assert_eq!(ctx.error().unwrap().message, "stop");
    }

    #[test]
    fn test_prepend_and_append() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut base = Base::new();
        base.prepend(recorder(&log, "a"));
        base.append(recorder(&log, "b"));
        base.prepend(recorder(&log, "c"));

        base.evaluate(&mut Context::new(json!(0)), |_| {});
        assert_eq!(*log.lock().unwrap(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_presence_policies() {
        let mut base = Base::new();

        let mut ctx = Context::new(Value::Null);
        base.evaluate(&mut ctx, |_| panic!("optional must not descend"));
        assert!(ctx.is_skipped());
        assert!(ctx.error().is_none());

        base.set_presence(Presence::Required);
        let mut ctx = Context::new(Value::Null);
        base.evaluate(&mut ctx, |_| {});
        assert_eq!(ctx.error().unwrap().kind, ErrorKind::MissingRequired);

        base.set_presence(Presence::Default(json!([1, 2])));
        let mut ctx = Context::new(Value::Null);
        let mut descended = false;
        base.evaluate(&mut ctx, |_| descended = true);
        assert!(descended);
        assert_eq!(ctx.into_result().unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_evaluate_skips_aborted_context() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut base = Base::new();
        base.append(recorder(&log, "a"));

        let mut ctx = Context::new(json!(1));
        ctx.fail(ErrorKind::TypeMismatch, "earlier");
        base.evaluate(&mut ctx, |_| {});
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_descend_not_called_after_rule_failure() {
        let mut base = Base::new();
        base.append(Arc::new(|ctx: &mut Context<'_>| {
            ctx.fail(ErrorKind::BoundViolation, "bad")
        }));

        let mut ctx = Context::new(json!(1));
        base.evaluate(&mut ctx, |_| panic!("must not descend"));
        assert!(ctx.error().is_some());
    }
}
