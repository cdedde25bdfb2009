//! Ordered line-matching rules.
//!
//! A [`PatternDispatcher`] is built once from a static table of [`RuleSpec`]
//! rows. Rules are tried top to bottom and the first pattern that matches
//! decides the outcome for that line.

use std::fmt::{Display, Formatter};

use regex::{Captures, Regex};

/// Handler bound to a rule. Returns `Ok(false)` to report the line as not
/// handled even though the pattern matched.
pub type Handler<C, E> = fn(&mut C, &Captures<'_>) -> Result<bool, E>;

/// One row of a rule table.
pub struct RuleSpec<C, E> {
    pub name: &'static str,
    pub pattern: &'static str,
    pub handler: Handler<C, E>,
}

#[derive(Debug)]
pub struct GrammarError {
    pub rule: &'static str,
    pub error: regex::Error,
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid pattern for rule `{}`: {}", self.rule, self.error)
    }
}

impl std::error::Error for GrammarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

struct Rule<C, E> {
    name: &'static str,
    pattern: Regex,
    handler: Handler<C, E>,
}

pub struct PatternDispatcher<C, E> {
    rules: Vec<Rule<C, E>>,
}

impl<C, E> PatternDispatcher<C, E> {
    pub fn new(table: &[RuleSpec<C, E>]) -> Result<Self, GrammarError> {
        let rules = table
            .iter()
            .map(|spec| {
                Regex::new(spec.pattern)
                    .map(|pattern| Rule {
                        name: spec.name,
                        pattern,
                        handler: spec.handler,
                    })
                    .map_err(|error| GrammarError {
                        rule: spec.name,
                        error,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name)
    }

    /// Applies the first matching rule to `line` and returns its verdict.
    /// `Ok(false)` when no rule matches.
    pub fn process(&self, ctx: &mut C, line: &str) -> Result<bool, E> {
        for rule in &self.rules {
            let Some(captures) = rule.pattern.captures(line) else {
                continue;
            };
            log::trace!("line matched rule `{}`", rule.name);
            return (rule.handler)(ctx, &captures);
        }
        Ok(false)
    }
}
