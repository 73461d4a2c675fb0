//! Config types for data-driven rule construction.
//!
//! [`RuleConfig`] mirrors the [`rules`](crate::rules) factory but is serde
//! (de)serializable, so a rule can be written in JSON or YAML and compiled to
//! a runtime [`Rule`] via [`RuleConfig::compile`].
//!
//! # Format
//!
//! Uses `#[serde(tag = "type")]` for discriminated union deserialization:
//!
//! ```json
//! { "type": "eof", "rule": {
//!     "type": "sequence", "rules": [
//!       { "type": "one_or_more", "rule": { "type": "one_of", "set": "0123456789" } },
//!       { "type": "val", "value": "px" }
//!     ] } }
//! ```
//!
//! Compilation validates nesting depth, composite width, literal length,
//! non-empty composites and the size of the compiled rule.

use crate::rules::{self, Literal};
use crate::{
    Rule, RuleError, MAX_DEPTH, MAX_LITERAL_LENGTH, MAX_RULES_PER_COMPOSITE, MAX_RULE_NODES,
};
use serde::{Deserialize, Serialize};

/// Configuration for a [`Rule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleConfig {
    /// Any single char.
    Any,

    /// One char from a literal set (no range syntax).
    OneOf {
        /// Member chars.
        set: String,
    },

    /// A literal string (a single char is a one-char literal).
    Val {
        /// The literal to match.
        value: String,
    },

    /// Consumes nothing.
    Empty,

    /// End of input.
    End,

    /// Zero or one of the inner rule.
    Optional {
        /// The inner rule.
        rule: Box<RuleConfig>,
    },

    /// Zero or more of the inner rule.
    Many {
        /// The repeated rule.
        rule: Box<RuleConfig>,
    },

    /// One or more of the inner rule.
    OneOrMore {
        /// The repeated rule.
        rule: Box<RuleConfig>,
    },

    /// The inner rule, then end of input.
    Eof {
        /// The rule that must consume everything.
        rule: Box<RuleConfig>,
    },

    /// Rules in order (at least one).
    Sequence {
        /// Children, matched left to right.
        rules: Vec<RuleConfig>,
    },

    /// Rules in priority order (at least one).
    Alternative {
        /// Children, tried left to right.
        rules: Vec<RuleConfig>,
    },
}

impl RuleConfig {
    /// Parse a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidConfig`] if the JSON does not describe a rule.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        serde_json::from_str(json).map_err(|e| RuleError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Validate this config and build the runtime [`Rule`].
    ///
    /// # Errors
    ///
    /// - [`RuleError::DepthExceeded`] if nesting exceeds [`MAX_DEPTH`]
    /// - [`RuleError::TooManyRules`] if a composite exceeds [`MAX_RULES_PER_COMPOSITE`]
    /// - [`RuleError::LiteralTooLong`] if a literal or set exceeds [`MAX_LITERAL_LENGTH`]
    /// - [`RuleError::EmptyComposite`] if a `sequence` or `alternative` has no rules
    /// - [`RuleError::TooManyNodes`] if the rule would exceed [`MAX_RULE_NODES`]
    pub fn compile(&self) -> Result<Rule, RuleError> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            tracing::debug!(depth, max = MAX_DEPTH, "rejected rule config: too deep");
            return Err(RuleError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        let rule = self.build()?;
        let nodes = self.node_count();
        if nodes > MAX_RULE_NODES {
            tracing::debug!(nodes, max = MAX_RULE_NODES, "rejected rule config: too large");
            return Err(RuleError::TooManyNodes {
                nodes,
                max: MAX_RULE_NODES,
            });
        }
        tracing::debug!(depth, nodes, rule = %rule, "compiled rule config");
        Ok(rule)
    }

    /// Number of [`Rule`] nodes this config compiles to, saturating at
    /// `usize::MAX`.
    ///
    /// Counts every occurrence: a literal of `n` chars is `2n - 1` nodes and
    /// `one_or_more(r)` holds `r` twice.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Any | Self::OneOf { .. } | Self::Empty | Self::End => 1,
            Self::Val { value } => match value.chars().count() {
                0 => 1,
                n => n.saturating_mul(2) - 1,
            },
            Self::Optional { rule } | Self::Many { rule } => rule.node_count().saturating_add(1),
            Self::OneOrMore { rule } => rule.node_count().saturating_mul(2).saturating_add(2),
            Self::Eof { rule } => rule.node_count().saturating_add(2),
            Self::Sequence { rules: children } | Self::Alternative { rules: children } => children
                .iter()
                .map(Self::node_count)
                .fold(children.len().saturating_sub(1), usize::saturating_add),
        }
    }

    /// Depth of the config tree. Leaves are depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Any | Self::OneOf { .. } | Self::Val { .. } | Self::Empty | Self::End => 1,
            Self::Optional { rule }
            | Self::Many { rule }
            | Self::OneOrMore { rule }
            | Self::Eof { rule } => 1 + rule.depth(),
            Self::Sequence { rules: children } | Self::Alternative { rules: children } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    fn build(&self) -> Result<Rule, RuleError> {
        Ok(match self {
            Self::Any => rules::any(),
            Self::OneOf { set } => {
                check_literal(set)?;
                rules::one_of(set.as_str())
            }
            Self::Val { value } => {
                check_literal(value)?;
                value.into_rule()
            }
            Self::Empty => rules::empty(),
            Self::End => rules::end(),
            Self::Optional { rule } => rules::optional(rule.build()?),
            Self::Many { rule } => rules::many(rule.build()?),
            Self::OneOrMore { rule } => rules::one_or_more(rule.build()?),
            Self::Eof { rule } => rules::eof(rule.build()?),
            Self::Sequence { rules: children } => rules::try_sequence(build_all(children)?)?,
            Self::Alternative { rules: children } => {
                rules::try_alternative(build_all(children)?)?
            }
        })
    }
}

impl TryFrom<&RuleConfig> for Rule {
    type Error = RuleError;

    fn try_from(config: &RuleConfig) -> Result<Self, Self::Error> {
        config.compile()
    }
}

fn check_literal(literal: &str) -> Result<(), RuleError> {
    let len = literal.chars().count();
    if len > MAX_LITERAL_LENGTH {
        return Err(RuleError::LiteralTooLong {
            len,
            max: MAX_LITERAL_LENGTH,
        });
    }
    Ok(())
}

fn build_all(configs: &[RuleConfig]) -> Result<Vec<Rule>, RuleError> {
    if configs.len() > MAX_RULES_PER_COMPOSITE {
        return Err(RuleError::TooManyRules {
            count: configs.len(),
            max: MAX_RULES_PER_COMPOSITE,
        });
    }
    configs.iter().map(RuleConfig::build).collect()
}
