//! Integer helpers: in-place arithmetic and comparisons.

use std::cmp::Ordering;

use serde_json::Value;

use ruleflow_syntax::{FieldPath, Parameter};

use super::{HelperDefinition, check_lifter};
use crate::error::{BuildError, Result};
use crate::event::Event;
use crate::lifter::Lifter;
use crate::registry::Registry;
use crate::tracer::Tracer;

/// An integer operand: fixed at build time or read per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntOperand {
    Literal(i64),
    Reference(FieldPath),
}

impl IntOperand {
    fn parse(token: &str, helper: &str) -> Result<Self> {
        match Parameter::parse(token)? {
            Parameter::Reference(path) => Ok(IntOperand::Reference(path)),
            Parameter::Value(raw) => raw.parse::<i64>().map(IntOperand::Literal).map_err(|_| {
                BuildError::parameter(helper, format!("'{raw}' is not a base-10 integer"))
            }),
        }
    }

    /// `None` if a reference is missing or not an integer.
    pub fn resolve(&self, event: &Event) -> Option<i64> {
        match self {
            IntOperand::Literal(v) => Some(*v),
            IntOperand::Reference(path) => event.get_i64(path).ok(),
        }
    }
}

// =============================================================================
// i_calc
// =============================================================================

/// Arithmetic applied by [`Calc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcOp {
    Sum,
    Sub,
    Mul,
    Div,
}

impl CalcOp {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "sum" => Some(CalcOp::Sum),
            "sub" => Some(CalcOp::Sub),
            "mul" => Some(CalcOp::Mul),
            "div" => Some(CalcOp::Div),
            _ => None,
        }
    }

    /// `None` on overflow or division by zero.
    fn eval(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            CalcOp::Sum => lhs.checked_add(rhs),
            CalcOp::Sub => lhs.checked_sub(rhs),
            CalcOp::Mul => lhs.checked_mul(rhs),
            CalcOp::Div => lhs.checked_div(rhs),
        }
    }
}

/// `target: +i_calc/[sum|sub|mul|div]/<int>|$<ref>`.
#[derive(Debug, Clone)]
pub struct Calc {
    pub target: FieldPath,
    pub op: CalcOp,
    pub operand: IntOperand,
}

impl Calc {
    /// Overwrite the integer target with `target <op> operand`.
    ///
    /// No-op if the target or operand is not an integer, on a zero divisor,
    /// or when the result would overflow.
    pub fn apply(&self, event: &mut Event) {
        let Ok(lhs) = event.get_i64(&self.target) else {
            return;
        };
        let Some(rhs) = self.operand.resolve(event) else {
            return;
        };
        if let Some(result) = self.op.eval(lhs, rhs) {
            event.set(&self.target, Value::from(result));
        }
    }
}

pub(crate) fn build_calc(definition: &Value, _: &Registry, _: &Tracer) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, "i_calc")?;
    def.expect_tokens(3)?;

    let op = CalcOp::parse(def.arg(0)).ok_or_else(|| {
        BuildError::parameter("i_calc", format!("invalid operation '{}'", def.arg(0)))
    })?;
    let operand = IntOperand::parse(def.arg(1), "i_calc")?;
    if op == CalcOp::Div && operand == IntOperand::Literal(0) {
        return Err(BuildError::DivisionByZero("i_calc".to_string()));
    }

    let calc = Calc {
        target: def.target,
        op,
        operand,
    };
    Ok(Lifter::map(move |e| calc.apply(e)))
}

// =============================================================================
// i_eq / i_ne / i_lt / i_le / i_gt / i_ge
// =============================================================================

/// `field: +i_<cmp>/<int>|$<ref>`.
#[derive(Debug, Clone)]
pub struct IntCompare {
    pub field: FieldPath,
    pub operand: IntOperand,
    accepts: fn(Ordering) -> bool,
}

impl IntCompare {
    /// False whenever the field or the resolved operand is not an integer.
    pub fn matches(&self, event: &Event) -> bool {
        let (Ok(value), Some(operand)) = (event.get_i64(&self.field), self.operand.resolve(event))
        else {
            return false;
        };
        (self.accepts)(value.cmp(&operand))
    }
}

fn build_compare(
    definition: &Value,
    helper: &str,
    accepts: fn(Ordering) -> bool,
    tracer: &Tracer,
) -> Result<Lifter> {
    let def = HelperDefinition::parse(definition, helper)?;
    def.expect_tokens(2)?;
    let cmp = IntCompare {
        operand: IntOperand::parse(def.arg(0), helper)?,
        field: def.target,
        accepts,
    };
    Ok(check_lifter(move |e| cmp.matches(e), def.traces, tracer))
}

pub(crate) fn build_eq(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_compare(definition, "i_eq", Ordering::is_eq, tracer)
}

pub(crate) fn build_ne(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_compare(definition, "i_ne", Ordering::is_ne, tracer)
}

pub(crate) fn build_lt(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_compare(definition, "i_lt", Ordering::is_lt, tracer)
}

pub(crate) fn build_le(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_compare(definition, "i_le", Ordering::is_le, tracer)
}

pub(crate) fn build_gt(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_compare(definition, "i_gt", Ordering::is_gt, tracer)
}

pub(crate) fn build_ge(definition: &Value, _: &Registry, tracer: &Tracer) -> Result<Lifter> {
    build_compare(definition, "i_ge", Ordering::is_ge, tracer)
}
