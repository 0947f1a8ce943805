use abacus_ast::{Compute, OpKind, RefId, Store};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, digit1, multispace0},
    combinator::{map, map_res, opt},
    multi::{fold_many0, many0},
    sequence::{delimited, pair, preceded},
    IResult,
};

use crate::error::ParseError;

// Surface tree produced by the nom combinators. It mirrors the flat shape
// of the output: products keep their factor/op lists, sums keep their
// signed term list, and only powers and parens nest.

#[derive(Debug, Clone, PartialEq)]
enum Factor {
    Num(i64),
    Var(String),
    Paren(Box<SurfaceExpr>),
    Pow(Box<Factor>, Box<Factor>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MulOp {
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
struct Product {
    first: Factor,
    rest: Vec<(MulOp, Factor)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sign {
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq)]
struct SurfaceExpr {
    leading: Option<Sign>,
    first: Product,
    rest: Vec<(Sign, Product)>,
}

fn parse_i64(input: &str) -> IResult<&str, i64> {
    map_res(digit1, |s: &str| s.parse::<i64>())(input)
}

fn parse_number(input: &str) -> IResult<&str, Factor> {
    map(parse_i64, Factor::Num)(input)
}

fn parse_variable(input: &str) -> IResult<&str, Factor> {
    map(alpha1, |s: &str| Factor::Var(s.to_string()))(input)
}

fn parse_parens(input: &str) -> IResult<&str, Factor> {
    map(
        delimited(tag("("), parse_expr, preceded(multispace0, tag(")"))),
        |e| Factor::Paren(Box::new(e)),
    )(input)
}

fn parse_atom(input: &str) -> IResult<&str, Factor> {
    preceded(multispace0, alt((parse_number, parse_variable, parse_parens)))(input)
}

fn parse_pow_tail(input: &str, init: Factor) -> IResult<&str, Factor> {
    fold_many0(
        preceded(preceded(multispace0, tag("^")), parse_atom),
        move || init.clone(),
        |acc, val| Factor::Pow(Box::new(acc), Box::new(val)),
    )(input)
}

fn parse_power(input: &str) -> IResult<&str, Factor> {
    let (input, init) = parse_atom(input)?;
    parse_pow_tail(input, init)
}

// Implicit multiplication requires adjacency: `5y`, `2(x + 1)`. No
// leading whitespace here, otherwise `5 y` would silently become `5 * y`.
fn parse_implicit_power(input: &str) -> IResult<&str, Factor> {
    let (input, init) = alt((parse_variable, parse_parens))(input)?;
    parse_pow_tail(input, init)
}

fn parse_mul_op(input: &str) -> IResult<&str, MulOp> {
    preceded(
        multispace0,
        alt((
            map(tag("*"), |_| MulOp::Mul),
            map(tag("/"), |_| MulOp::Div),
        )),
    )(input)
}

fn parse_product(input: &str) -> IResult<&str, Product> {
    let (input, first) = parse_power(input)?;
    let (input, rest) = many0(alt((
        pair(parse_mul_op, parse_power),
        map(parse_implicit_power, |f| (MulOp::Mul, f)),
    )))(input)?;
    Ok((input, Product { first, rest }))
}

fn parse_sign(input: &str) -> IResult<&str, Sign> {
    preceded(
        multispace0,
        alt((
            map(tag("+"), |_| Sign::Plus),
            map(tag("-"), |_| Sign::Minus),
        )),
    )(input)
}

fn parse_expr(input: &str) -> IResult<&str, SurfaceExpr> {
    let (input, leading) = opt(parse_sign)(input)?;
    let (input, first) = parse_product(input)?;
    let (input, rest) = many0(pair(parse_sign, parse_product))(input)?;
    Ok((
        input,
        SurfaceExpr {
            leading,
            first,
            rest,
        },
    ))
}

/// Parse expression text into the flattened top-level ref sequence.
///
/// Infix subtraction is eliminated here: `a - T` becomes `a + (-1 * T)`
/// with a lazy-negation composite (in a product the leading factor is the
/// one negated). A leading minus in front of an integer literal is the
/// exception — it stays as raw `- n` tokens so that sign cleanup remains
/// a visible, costed search step.
pub fn parse(store: &mut Store, input: &str) -> Result<Vec<RefId>, ParseError> {
    let (remaining, surface) =
        parse_expr(input).map_err(|e| ParseError::Syntax(e.to_string()))?;
    if !remaining.trim().is_empty() {
        return Err(ParseError::Unconsumed(remaining.trim().to_string()));
    }
    lower_expr(store, &surface)
}

fn lower_expr(store: &mut Store, expr: &SurfaceExpr) -> Result<Vec<RefId>, ParseError> {
    let mut refs = Vec::new();
    match expr.leading {
        Some(Sign::Minus) => {
            if matches!(expr.first.first, Factor::Num(_)) {
                refs.push(store.op(OpKind::Sub));
                emit_product(store, &mut refs, &expr.first, false)?;
            } else {
                emit_product(store, &mut refs, &expr.first, true)?;
            }
        }
        Some(Sign::Plus) => {
            refs.push(store.op(OpKind::Add));
            emit_product(store, &mut refs, &expr.first, false)?;
        }
        None => emit_product(store, &mut refs, &expr.first, false)?,
    }
    for (sign, product) in &expr.rest {
        refs.push(store.op(OpKind::Add));
        emit_product(store, &mut refs, product, *sign == Sign::Minus)?;
    }
    Ok(refs)
}

fn emit_product(
    store: &mut Store,
    refs: &mut Vec<RefId>,
    product: &Product,
    negate_first: bool,
) -> Result<(), ParseError> {
    let mut first = lower_factor(store, &product.first)?;
    if negate_first {
        let minus_one = store.num(-1);
        let mul = store.op(OpKind::Mul);
        first = store.intern(vec![minus_one, mul, first], Some(Compute::Mul))?;
    }
    refs.push(first);
    for (op, factor) in &product.rest {
        let op = match op {
            MulOp::Mul => OpKind::Mul,
            MulOp::Div => OpKind::Div,
        };
        refs.push(store.op(op));
        let factor = lower_factor(store, factor)?;
        refs.push(factor);
    }
    Ok(())
}

fn lower_factor(store: &mut Store, factor: &Factor) -> Result<RefId, ParseError> {
    match factor {
        Factor::Num(n) => Ok(store.num(*n)),
        Factor::Var(name) => Ok(store.var(name)),
        Factor::Pow(base, exp) => {
            let base = lower_factor(store, base)?;
            let exp = lower_factor(store, exp)?;
            let compute = (store.as_number(base).is_some() && store.as_number(exp).is_some())
                .then_some(Compute::Pow);
            let pow = store.op(OpKind::Pow);
            Ok(store.intern(vec![base, pow, exp], compute)?)
        }
        Factor::Paren(inner) => {
            let inner_refs = lower_expr(store, inner)?;
            // A two-operand group gets the matching compute tag so phase B
            // can lift it to a number once the operands are defined.
            let compute = match inner_refs.as_slice() {
                &[a, op, b] if !store.is_op(a) && !store.is_op(b) => {
                    store.op_kind(op).and_then(Compute::from_op)
                }
                _ => None,
            };
            let mut children = Vec::with_capacity(inner_refs.len() + 2);
            children.push(store.op(OpKind::LParen));
            children.extend(inner_refs);
            children.push(store.op(OpKind::RParen));
            Ok(store.intern(children, compute)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abacus_ast::{DisplaySeq, Ref};

    fn render(store: &Store, refs: &[RefId]) -> String {
        format!("{}", DisplaySeq { store, refs })
    }

    #[test]
    fn test_parse_number() {
        let mut store = Store::new();
        let refs = parse(&mut store, "123").unwrap();
        assert_eq!(render(&store, &refs), "123");
    }

    #[test]
    fn test_parse_sum_stays_flat() {
        let mut store = Store::new();
        let refs = parse(&mut store, "2 + 3 + 4").unwrap();
        assert_eq!(refs.len(), 5);
        assert_eq!(render(&store, &refs), "2 + 3 + 4");
    }

    #[test]
    fn test_product_keeps_operator_refs() {
        let mut store = Store::new();
        let refs = parse(&mut store, "4 + 3 * 4").unwrap();
        assert_eq!(render(&store, &refs), "4 + 3 * 4");
        assert_eq!(store.op_kind(refs[3]), Some(OpKind::Mul));
    }

    #[test]
    fn test_subtraction_becomes_negation_composite() {
        let mut store = Store::new();
        let refs = parse(&mut store, "x - x + 5").unwrap();
        // x + (-1 * x) + 5
        assert_eq!(refs.len(), 5);
        assert_eq!(store.op_kind(refs[1]), Some(OpKind::Add));
        let children = store.children(refs[2]).expect("negation composite");
        assert_eq!(store.as_number(children[0]), Some(-1));
        assert_eq!(children[2], refs[0]);
        assert_eq!(render(&store, &refs), "x + -1 * x + 5");
    }

    #[test]
    fn test_leading_minus_on_number_stays_raw() {
        let mut store = Store::new();
        let refs = parse(&mut store, "-4 + x").unwrap();
        assert_eq!(store.op_kind(refs[0]), Some(OpKind::Sub));
        assert_eq!(store.as_number(refs[1]), Some(4));
    }

    #[test]
    fn test_leading_minus_on_variable_is_normalized() {
        let mut store = Store::new();
        let refs = parse(&mut store, "-x + 5").unwrap();
        let children = store.children(refs[0]).expect("negation composite");
        assert_eq!(store.as_number(children[0]), Some(-1));
        assert!(matches!(store.get(children[2]), Ref::Variable(v) if v == "x"));
    }

    #[test]
    fn test_implicit_multiplication() {
        let mut store = Store::new();
        let refs = parse(&mut store, "y + 5y").unwrap();
        assert_eq!(render(&store, &refs), "y + 5 * y");
    }

    #[test]
    fn test_power_folds_into_composite() {
        let mut store = Store::new();
        let refs = parse(&mut store, "x^2 * x^3").unwrap();
        assert_eq!(refs.len(), 3);
        assert!(store.children(refs[0]).is_some());
        assert_eq!(store.op_kind(refs[1]), Some(OpKind::Mul));
        assert_eq!(render(&store, &refs), "x^2 * x^3");
    }

    #[test]
    fn test_numeric_power_is_computable() {
        let mut store = Store::new();
        let refs = parse(&mut store, "2^3").unwrap();
        assert_eq!(store.value(refs[0]), Some(8));
    }

    #[test]
    fn test_parens_fold_with_compute() {
        let mut store = Store::new();
        let refs = parse(&mut store, "(1 + 2) * x").unwrap();
        assert_eq!(refs.len(), 3);
        assert_eq!(store.value(refs[0]), Some(3));
        assert_eq!(render(&store, &refs), "(1 + 2) * x");
    }

    #[test]
    fn test_unconsumed_input_is_rejected() {
        let mut store = Store::new();
        let err = parse(&mut store, "1 + 2 )").unwrap_err();
        assert!(matches!(err, ParseError::Unconsumed(_)));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let mut store = Store::new();
        assert!(matches!(parse(&mut store, ""), Err(ParseError::Syntax(_))));
    }

    #[test]
    fn test_shared_subterms_intern_to_one_ref() {
        let mut store = Store::new();
        let refs = parse(&mut store, "x^2 + x^2").unwrap();
        assert_eq!(refs[0], refs[2]);
    }
}
