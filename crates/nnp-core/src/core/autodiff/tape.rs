use super::scalar::{Scalar, Vec3};
use nalgebra::Point3;
use std::cell::RefCell;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Leaf,
    Constant,
    Add(usize, usize),
    Sub(usize, usize),
    Mul(usize, usize),
    Div(usize, usize),
    Neg(usize),
    Sqrt(usize),
    Exp(usize),
    Ln(usize),
    Sin(usize),
    Cos(usize),
    Powi(usize, i32),
}

#[derive(Debug, Clone, Copy)]
struct Node {
    op: Op,
    value: f64,
}

/// Append-only record of every operation performed on its [`Var`]s.
///
/// Nodes are never removed, so a gradient can be taken any number of times from the
/// same graph. [`Tape::gradient`] records the backward pass itself, which makes the
/// returned derivatives differentiable again.
#[derive(Debug, Default)]
pub struct Tape {
    nodes: RefCell<Vec<Node>>,
}

/// A scalar value tracked on a [`Tape`].
///
/// A `Var` created by [`Scalar::constant`] belongs to no tape. It is recorded on the tape
/// of the first tracked value it is combined with.
#[derive(Clone, Copy)]
pub struct Var<'t> {
    tape: Option<&'t Tape>,
    index: usize,
    value: f64,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Registers an independent variable.
    pub fn variable(&self, value: f64) -> Var<'_> {
        self.push(Op::Leaf, value)
    }

    pub fn constant(&self, value: f64) -> Var<'_> {
        self.push(Op::Constant, value)
    }

    pub fn point(&self, position: &Point3<f64>) -> Vec3<Var<'_>> {
        [
            self.variable(position.x),
            self.variable(position.y),
            self.variable(position.z),
        ]
    }

    pub fn points(&self, positions: &[Point3<f64>]) -> Vec<Vec3<Var<'_>>> {
        positions.iter().map(|p| self.point(p)).collect()
    }

    /// Derivatives of `output` with respect to each of `wrt`, recorded on this tape.
    ///
    /// Variables that `output` does not depend on get a derivative of zero.
    pub fn gradient<'t>(&'t self, output: Var<'t>, wrt: &[Var<'t>]) -> Vec<Var<'t>> {
        let adjoints = self.backward(output, self.constant(1.0), |i| self.var_at(i));
        wrt.iter()
            .map(|w| self.lookup(&adjoints, w).unwrap_or_else(|| self.constant(0.0)))
            .collect()
    }

    /// Plain-valued derivatives of `output` with respect to each of `wrt`.
    ///
    /// Unlike [`Tape::gradient`], nothing is recorded.
    pub fn gradient_values(&self, output: Var<'_>, wrt: &[Var<'_>]) -> Vec<f64> {
        let adjoints = self.backward(output, 1.0, |i| self.node(i).value);
        wrt.iter()
            .map(|w| self.lookup(&adjoints, w).unwrap_or(0.0))
            .collect()
    }

    fn lookup<S: Copy>(&self, adjoints: &[Option<S>], var: &Var<'_>) -> Option<S> {
        if !var.is_on(self) {
            return None;
        }
        adjoints.get(var.index).copied().flatten()
    }

    fn backward<S, F>(&self, output: Var<'_>, seed: S, load: F) -> Vec<Option<S>>
    where
        S: Scalar,
        F: Fn(usize) -> S,
    {
        if !output.is_on(self) {
            return Vec::new();
        }

        let mut adjoints: Vec<Option<S>> = vec![None; output.index + 1];
        adjoints[output.index] = Some(seed);

        for i in (0..=output.index).rev() {
            let Some(adj) = adjoints[i] else {
                continue;
            };
            match self.node(i).op {
                Op::Leaf | Op::Constant => {}
                Op::Add(a, b) => {
                    accumulate(&mut adjoints, a, adj);
                    accumulate(&mut adjoints, b, adj);
                }
                Op::Sub(a, b) => {
                    accumulate(&mut adjoints, a, adj);
                    accumulate(&mut adjoints, b, -adj);
                }
                Op::Mul(a, b) => {
                    accumulate(&mut adjoints, a, adj * load(b));
                    accumulate(&mut adjoints, b, adj * load(a));
                }
                Op::Div(a, b) => {
                    let divisor = load(b);
                    accumulate(&mut adjoints, a, adj / divisor);
                    accumulate(&mut adjoints, b, -(adj * load(i)) / divisor);
                }
                Op::Neg(a) => accumulate(&mut adjoints, a, -adj),
                Op::Sqrt(a) => accumulate(&mut adjoints, a, adj / (load(i) * 2.0)),
                Op::Exp(a) => accumulate(&mut adjoints, a, adj * load(i)),
                Op::Ln(a) => accumulate(&mut adjoints, a, adj / load(a)),
                Op::Sin(a) => accumulate(&mut adjoints, a, adj * load(a).cos()),
                Op::Cos(a) => accumulate(&mut adjoints, a, -(adj * load(a).sin())),
                Op::Powi(_, 0) => {}
                Op::Powi(a, n) => {
                    accumulate(&mut adjoints, a, adj * load(a).powi(n - 1) * f64::from(n))
                }
            }
        }
        adjoints
    }

    fn push(&self, op: Op, value: f64) -> Var<'_> {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node { op, value });
        Var {
            tape: Some(self),
            index: nodes.len() - 1,
            value,
        }
    }

    fn node(&self, index: usize) -> Node {
        self.nodes.borrow()[index]
    }

    fn var_at(&self, index: usize) -> Var<'_> {
        Var {
            tape: Some(self),
            index,
            value: self.node(index).value,
        }
    }
}

fn accumulate<S: Scalar>(adjoints: &mut [Option<S>], target: usize, contribution: S) {
    adjoints[target] = Some(match adjoints[target] {
        Some(existing) => existing + contribution,
        None => contribution,
    });
}

impl<'t> Var<'t> {
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The tape this value is recorded on, `None` for an untracked constant.
    pub fn tape(&self) -> Option<&'t Tape> {
        self.tape
    }

    pub fn is_tracked(&self) -> bool {
        self.tape.is_some()
    }

    pub fn is_on(&self, tape: &Tape) -> bool {
        self.tape.is_some_and(|own| std::ptr::eq(own, tape))
    }

    fn untracked(value: f64) -> Self {
        Self {
            tape: None,
            index: 0,
            value,
        }
    }

    fn unary(self, op: Op, value: f64) -> Self {
        match self.tape {
            Some(tape) => tape.push(op, value),
            None => Self::untracked(value),
        }
    }

    fn binary(self, rhs: Self, op: fn(usize, usize) -> Op, value: f64) -> Self {
        match (self.tape, rhs.tape) {
            (Some(tape), Some(other)) => {
                debug_assert!(std::ptr::eq(tape, other), "operands must share a tape");
                tape.push(op(self.index, rhs.index), value)
            }
            (Some(tape), None) => {
                let rhs = tape.constant(rhs.value);
                tape.push(op(self.index, rhs.index), value)
            }
            (None, Some(tape)) => {
                let lhs = tape.constant(self.value);
                tape.push(op(lhs.index, rhs.index), value)
            }
            (None, None) => Self::untracked(value),
        }
    }
}

impl fmt::Debug for Var<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("index", &self.index)
            .field("value", &self.value)
            .finish()
    }
}

impl<'t> Add for Var<'t> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.binary(rhs, Op::Add, self.value + rhs.value)
    }
}

impl<'t> Sub for Var<'t> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.binary(rhs, Op::Sub, self.value - rhs.value)
    }
}

impl<'t> Mul for Var<'t> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.binary(rhs, Op::Mul, self.value * rhs.value)
    }
}

impl<'t> Div for Var<'t> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        self.binary(rhs, Op::Div, self.value / rhs.value)
    }
}

impl<'t> Neg for Var<'t> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.unary(Op::Neg(self.index), -self.value)
    }
}

impl<'t> Add<f64> for Var<'t> {
    type Output = Self;

    fn add(self, rhs: f64) -> Self::Output {
        self + self.lift(rhs)
    }
}

impl<'t> Sub<f64> for Var<'t> {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self::Output {
        self - self.lift(rhs)
    }
}

impl<'t> Mul<f64> for Var<'t> {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self * self.lift(rhs)
    }
}

impl<'t> Div<f64> for Var<'t> {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        self / self.lift(rhs)
    }
}

impl<'t> Scalar for Var<'t> {
    #[inline]
    fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    fn constant(value: f64) -> Self {
        Self::untracked(value)
    }

    #[inline]
    fn lift(&self, constant: f64) -> Self {
        match self.tape {
            Some(tape) => tape.constant(constant),
            None => Self::untracked(constant),
        }
    }

    fn sqrt(self) -> Self {
        self.unary(Op::Sqrt(self.index), self.value.sqrt())
    }

    fn exp(self) -> Self {
        self.unary(Op::Exp(self.index), self.value.exp())
    }

    fn ln(self) -> Self {
        self.unary(Op::Ln(self.index), self.value.ln())
    }

    fn sin(self) -> Self {
        self.unary(Op::Sin(self.index), self.value.sin())
    }

    fn cos(self) -> Self {
        self.unary(Op::Cos(self.index), self.value.cos())
    }

    fn powi(self, n: i32) -> Self {
        self.unary(Op::Powi(self.index, n), self.value.powi(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn forward_values_follow_plain_arithmetic() {
        let tape = Tape::new();
        let x = tape.variable(2.0);
        let y = tape.variable(3.0);
        let z = (x * y + x / y - y) * 2.0;
        assert!(approx_equal(z.value(), (6.0 + 2.0 / 3.0 - 3.0) * 2.0));
    }

    #[test]
    fn gradient_of_product_returns_swapped_factors() {
        let tape = Tape::new();
        let x = tape.variable(2.0);
        let y = tape.variable(-4.0);
        let grad = tape.gradient_values(x * y, &[x, y]);
        assert_eq!(grad, vec![-4.0, 2.0]);
    }

    #[test]
    fn gradient_of_unrelated_variable_is_zero() {
        let tape = Tape::new();
        let x = tape.variable(1.5);
        let y = tape.variable(7.0);
        let grad = tape.gradient_values(x.sin(), &[x, y]);
        assert!(approx_equal(grad[0], 1.5f64.cos()));
        assert_eq!(grad[1], 0.0);
    }

    #[test]
    fn variable_created_after_output_gets_zero_derivative() {
        let tape = Tape::new();
        let x = tape.variable(1.0);
        let out = x * x;
        let late = tape.variable(3.0);
        assert_eq!(tape.gradient_values(out, &[late]), vec![0.0]);
    }

    #[test]
    fn elementary_functions_have_correct_first_derivatives() {
        let tape = Tape::new();
        let x = tape.variable(0.8);
        let cases: Vec<(Var, f64)> = vec![
            (x.sqrt(), 0.5 / 0.8f64.sqrt()),
            (x.exp(), 0.8f64.exp()),
            (x.ln(), 1.0 / 0.8),
            (x.sin(), 0.8f64.cos()),
            (x.cos(), -0.8f64.sin()),
            (x.powi(3), 3.0 * 0.8 * 0.8),
            (x.powi(-2), -2.0 / 0.8f64.powi(3)),
            (x.powi(0), 0.0),
            (-x, -1.0),
            (x / (x + 1.0), 1.0 / 1.8f64.powi(2)),
        ];
        for (output, expected) in cases {
            let grad = tape.gradient_values(output, &[x]);
            assert!(
                approx_equal(grad[0], expected),
                "got {} expected {}",
                grad[0],
                expected
            );
        }
    }

    #[test]
    fn repeated_operand_accumulates_both_paths() {
        let tape = Tape::new();
        let x = tape.variable(3.0);
        let grad = tape.gradient_values(x * x * x, &[x]);
        assert!(approx_equal(grad[0], 27.0));
    }

    #[test]
    fn recorded_gradient_can_be_differentiated_again() {
        let tape = Tape::new();
        let x = tape.variable(0.3);
        let y = tape.variable(1.2);
        let f = x * x * y + y.sin();

        let grad = tape.gradient(f, &[x, y]);
        assert!(approx_equal(grad[0].value(), 2.0 * 0.3 * 1.2));
        assert!(approx_equal(grad[1].value(), 0.09 + 1.2f64.cos()));

        let dfx = tape.gradient_values(grad[0], &[x, y]);
        let dfy = tape.gradient_values(grad[1], &[x, y]);
        assert!(approx_equal(dfx[0], 2.0 * 1.2));
        assert!(approx_equal(dfx[1], 2.0 * 0.3));
        assert!(approx_equal(dfy[0], 2.0 * 0.3));
        assert!(approx_equal(dfy[1], -1.2f64.sin()));
    }

    #[test]
    fn gradient_can_be_taken_repeatedly_from_the_same_graph() {
        let tape = Tape::new();
        let x = tape.variable(2.0);
        let f = x.exp() * x;
        let first = tape.gradient_values(f, &[x]);
        let second = tape.gradient_values(f, &[x]);
        assert_eq!(first, second);
    }

    #[test]
    fn variables_from_another_tape_are_ignored() {
        let tape = Tape::new();
        let other = Tape::new();
        let x = tape.variable(2.0);
        let foreign = other.variable(2.0);
        let grad = tape.gradient_values(x * x, &[foreign]);
        assert_eq!(grad, vec![0.0]);
    }

    #[test]
    fn untracked_constants_join_the_tape_they_are_combined_with() {
        let tape = Tape::new();
        let x = tape.variable(3.0);
        let zero = Var::constant(0.0);
        assert!(!zero.is_tracked());

        let sum = zero + x * x;
        assert!(sum.is_on(&tape));
        assert_eq!(sum.value(), 9.0);
        assert_eq!(tape.gradient_values(sum, &[x]), vec![6.0]);
    }

    #[test]
    fn arithmetic_on_untracked_constants_records_nothing() {
        let tape = Tape::new();
        let x = tape.variable(1.0);
        let recorded = tape.len();

        let c = (Var::constant(2.0) * 3.0).exp() - Var::constant(1.0);

        assert!(!c.is_tracked());
        assert!(approx_equal(c.value(), 6f64.exp() - 1.0));
        assert_eq!(tape.len(), recorded);
        assert_eq!(tape.gradient_values(c, &[x]), vec![0.0]);
    }

    #[test]
    fn points_registers_three_leaves_per_position() {
        let tape = Tape::new();
        let coords = tape.points(&[Point3::new(1.0, 2.0, 3.0), Point3::origin()]);
        assert_eq!(coords.len(), 2);
        assert_eq!(tape.len(), 6);
        assert_eq!(coords[0][2].value(), 3.0);
    }
}
