use std::collections::BTreeSet;

use num_integer::Integer;
use num_traits::Zero;
use rustc_hash::FxHashMap;

use crate::error::InternError;

/// Index of a ref in its [`Store`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(pub u32);

/// Operator tokens that may appear between refs in a flattened sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    LParen,
    RParen,
}

impl OpKind {
    pub fn as_char(self) -> char {
        match self {
            OpKind::Add => '+',
            OpKind::Sub => '-',
            OpKind::Mul => '*',
            OpKind::Div => '/',
            OpKind::Pow => '^',
            OpKind::LParen => '(',
            OpKind::RParen => ')',
        }
    }

    /// Operators that bind tighter than `+` and therefore keep their
    /// operands out of additive pairing.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, OpKind::Mul | OpKind::Div | OpKind::Pow)
    }
}

/// How a composite materializes its integer value once every operand has
/// a defined value of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compute {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Compute {
    pub fn from_op(op: OpKind) -> Option<Compute> {
        match op {
            OpKind::Add => Some(Compute::Add),
            OpKind::Sub => Some(Compute::Sub),
            OpKind::Mul => Some(Compute::Mul),
            OpKind::Div => Some(Compute::Div),
            OpKind::Pow => Some(Compute::Pow),
            OpKind::LParen | OpKind::RParen => None,
        }
    }
}

/// A node of the shared expression DAG.
///
/// `Number` and `Variable` are atoms; `Op` refs carry no value and no
/// children; a `Composite` holds the exact flattened token list of a
/// sub-expression plus an optional compute tag for lazy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ref {
    Number(i64),
    Variable(String),
    Op(OpKind),
    Composite {
        /// Ordinal of the cache-assigned `?k` name.
        name: u32,
        children: Vec<RefId>,
        compute: Option<Compute>,
    },
}

/// Arena and symbol cache in one.
///
/// Atoms are interned by value, composites by their child-id sequence;
/// a composite key seen twice returns the same ref and the same `?k`
/// name, which is what lets the search deduplicate states structurally.
/// Composite values are evaluated lazily and memoized set-once.
#[derive(Debug, Default, Clone)]
pub struct Store {
    nodes: Vec<Ref>,
    /// Memoized composite values; a slot transitions `None -> Some` at
    /// most once and is never cleared.
    values: Vec<Option<i64>>,
    numbers: FxHashMap<i64, RefId>,
    variables: FxHashMap<String, RefId>,
    operators: FxHashMap<OpKind, RefId>,
    composites: FxHashMap<Vec<RefId>, RefId>,
    next_name: u32,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: RefId) -> &Ref {
        &self.nodes[id.0 as usize]
    }

    fn push(&mut self, node: Ref) -> RefId {
        debug_assert!(self.nodes.len() < u32::MAX as usize);
        let id = RefId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.values.push(None);
        id
    }

    /// Interned integer atom.
    pub fn num(&mut self, value: i64) -> RefId {
        if let Some(&id) = self.numbers.get(&value) {
            return id;
        }
        let id = self.push(Ref::Number(value));
        self.numbers.insert(value, id);
        id
    }

    /// Interned named variable.
    pub fn var(&mut self, name: &str) -> RefId {
        if let Some(&id) = self.variables.get(name) {
            return id;
        }
        let id = self.push(Ref::Variable(name.to_string()));
        self.variables.insert(name.to_string(), id);
        id
    }

    /// Interned operator token.
    pub fn op(&mut self, op: OpKind) -> RefId {
        if let Some(&id) = self.operators.get(&op) {
            return id;
        }
        let id = self.push(Ref::Op(op));
        self.operators.insert(op, id);
        id
    }

    /// Intern a composite by its child sequence.
    ///
    /// Children must already live in this store, which makes cycles
    /// impossible: every child id is strictly smaller than the id of the
    /// composite that refers to it. Re-interning an existing key returns
    /// the existing ref (the `compute` argument of the first caller
    /// wins; callers derive it from the children, so it never differs).
    pub fn intern(
        &mut self,
        children: Vec<RefId>,
        compute: Option<Compute>,
    ) -> Result<RefId, InternError> {
        debug_assert!(children.iter().all(|c| (c.0 as usize) < self.nodes.len()));
        if let Some(&id) = self.composites.get(&children) {
            return Ok(id);
        }
        let name = self.next_name;
        self.next_name = self
            .next_name
            .checked_add(1)
            .ok_or(InternError::CacheExhausted)?;
        let id = self.push(Ref::Composite {
            name,
            children: children.clone(),
            compute,
        });
        self.composites.insert(children, id);
        Ok(id)
    }

    /// Lazy value of a ref.
    ///
    /// Numbers are always defined; variables and operators never are. A
    /// composite is defined once every non-operator child is, at which
    /// point its compute tag is applied (checked arithmetic, exact
    /// division only) and the result memoized.
    pub fn value(&mut self, id: RefId) -> Option<i64> {
        match self.get(id) {
            Ref::Number(n) => Some(*n),
            Ref::Variable(_) | Ref::Op(_) => None,
            Ref::Composite {
                children, compute, ..
            } => {
                if let Some(v) = self.values[id.0 as usize] {
                    return Some(v);
                }
                let compute = (*compute)?;
                let children = children.clone();
                let mut operands = Vec::with_capacity(2);
                for child in children {
                    if matches!(self.get(child), Ref::Op(_)) {
                        continue;
                    }
                    operands.push(self.value(child)?);
                }
                if operands.len() != 2 {
                    return None;
                }
                let v = apply_compute(compute, operands[0], operands[1])?;
                self.values[id.0 as usize] = Some(v);
                Some(v)
            }
        }
    }

    /// Canonical short name of a ref: decimal for numbers, the name for
    /// variables, the operator character for ops, `?k` for composites.
    pub fn symbol(&self, id: RefId) -> String {
        match self.get(id) {
            Ref::Number(n) => n.to_string(),
            Ref::Variable(name) => name.clone(),
            Ref::Op(op) => op.as_char().to_string(),
            Ref::Composite { name, .. } => format!("?{name}"),
        }
    }

    pub fn as_number(&self, id: RefId) -> Option<i64> {
        match self.get(id) {
            Ref::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn op_kind(&self, id: RefId) -> Option<OpKind> {
        match self.get(id) {
            Ref::Op(op) => Some(*op),
            _ => None,
        }
    }

    pub fn is_op(&self, id: RefId) -> bool {
        matches!(self.get(id), Ref::Op(_))
    }

    pub fn children(&self, id: RefId) -> Option<&[RefId]> {
        match self.get(id) {
            Ref::Composite { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Names of all variables reachable from `id`, in sorted order.
    pub fn variables(&self, id: RefId) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_variables(id, &mut out);
        out
    }

    fn collect_variables<'a>(&'a self, id: RefId, out: &mut BTreeSet<&'a str>) {
        match self.get(id) {
            Ref::Number(_) | Ref::Op(_) => {}
            Ref::Variable(name) => {
                out.insert(name.as_str());
            }
            Ref::Composite { children, .. } => {
                for &child in children {
                    self.collect_variables(child, out);
                }
            }
        }
    }
}

fn apply_compute(compute: Compute, a: i64, b: i64) -> Option<i64> {
    match compute {
        Compute::Add => a.checked_add(b),
        Compute::Sub => a.checked_sub(b),
        Compute::Mul => a.checked_mul(b),
        Compute::Div => {
            if b.is_zero() || !a.is_multiple_of(&b) {
                return None;
            }
            a.checked_div(b)
        }
        Compute::Pow => {
            let exp = u32::try_from(b).ok()?;
            a.checked_pow(exp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atoms_are_interned() {
        let mut store = Store::new();
        assert_eq!(store.num(7), store.num(7));
        assert_eq!(store.var("x"), store.var("x"));
        assert_eq!(store.op(OpKind::Add), store.op(OpKind::Add));
        assert_ne!(store.num(7), store.num(8));
        assert_ne!(store.var("x"), store.var("y"));
    }

    #[test]
    fn test_intern_is_idempotent() {
        let mut store = Store::new();
        let three = store.num(3);
        let mul = store.op(OpKind::Mul);
        let x = store.var("x");
        let a = store.intern(vec![three, mul, x], Some(Compute::Mul)).unwrap();
        let b = store.intern(vec![three, mul, x], Some(Compute::Mul)).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.symbol(a), "?0");
    }

    #[test]
    fn test_distinct_keys_get_distinct_names() {
        let mut store = Store::new();
        let three = store.num(3);
        let four = store.num(4);
        let mul = store.op(OpKind::Mul);
        let a = store.intern(vec![three, mul, four], Some(Compute::Mul)).unwrap();
        let b = store.intern(vec![four, mul, three], Some(Compute::Mul)).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.symbol(a), "?0");
        assert_eq!(store.symbol(b), "?1");
    }

    #[test]
    fn test_lazy_value_of_product() {
        let mut store = Store::new();
        let three = store.num(3);
        let four = store.num(4);
        let mul = store.op(OpKind::Mul);
        let prod = store.intern(vec![three, mul, four], Some(Compute::Mul)).unwrap();
        assert_eq!(store.value(prod), Some(12));
        // Memoized on the second read.
        assert_eq!(store.value(prod), Some(12));
    }

    #[test]
    fn test_value_undefined_while_a_variable_is_involved() {
        let mut store = Store::new();
        let five = store.num(5);
        let mul = store.op(OpKind::Mul);
        let y = store.var("y");
        let scaled = store.intern(vec![five, mul, y], Some(Compute::Mul)).unwrap();
        assert_eq!(store.value(scaled), None);
    }

    #[test]
    fn test_nested_values_resolve_bottom_up() {
        let mut store = Store::new();
        let three = store.num(3);
        let four = store.num(4);
        let mul = store.op(OpKind::Mul);
        let add = store.op(OpKind::Add);
        let prod = store.intern(vec![three, mul, four], Some(Compute::Mul)).unwrap();
        let sum = store.intern(vec![four, add, prod], Some(Compute::Add)).unwrap();
        assert_eq!(store.value(sum), Some(16));
    }

    #[test]
    fn test_division_must_be_exact() {
        let mut store = Store::new();
        let twelve = store.num(12);
        let four = store.num(4);
        let seven = store.num(7);
        let zero = store.num(0);
        let div = store.op(OpKind::Div);
        let exact = store.intern(vec![twelve, div, four], Some(Compute::Div)).unwrap();
        let inexact = store.intern(vec![twelve, div, seven], Some(Compute::Div)).unwrap();
        let by_zero = store.intern(vec![twelve, div, zero], Some(Compute::Div)).unwrap();
        assert_eq!(store.value(exact), Some(3));
        assert_eq!(store.value(inexact), None);
        assert_eq!(store.value(by_zero), None);
    }

    #[test]
    fn test_overflow_leaves_value_undefined() {
        let mut store = Store::new();
        let big = store.num(i64::MAX);
        let two = store.num(2);
        let mul = store.op(OpKind::Mul);
        let prod = store.intern(vec![big, mul, two], Some(Compute::Mul)).unwrap();
        assert_eq!(store.value(prod), None);
    }

    #[test]
    fn test_children_always_precede_their_composite() {
        let mut store = Store::new();
        let x = store.var("x");
        let pow = store.op(OpKind::Pow);
        let two = store.num(2);
        let sq = store.intern(vec![x, pow, two], None).unwrap();
        let children = store.children(sq).unwrap();
        assert!(children.iter().all(|c| c.0 < sq.0));
    }

    #[test]
    fn test_variable_collection() {
        let mut store = Store::new();
        let five = store.num(5);
        let mul = store.op(OpKind::Mul);
        let y = store.var("y");
        let scaled = store.intern(vec![five, mul, y], Some(Compute::Mul)).unwrap();
        assert!(store.variables(five).is_empty());
        assert_eq!(store.variables(scaled).into_iter().collect::<Vec<_>>(), vec!["y"]);
    }
}
