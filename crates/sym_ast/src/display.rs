use crate::context::Context;
use crate::expression::{Expr, ExprId};
use num_traits::Signed;
use std::fmt;

/// Precedence-aware infix rendering of an interned expression.
///
/// ```
/// # use sym_ast::{Context, Expr, DisplayExpr};
/// let mut ctx = Context::new();
/// let x = ctx.var("x");
/// let two = ctx.num(2);
/// let e = ctx.add(Expr::Add(two, x));
/// assert_eq!(format!("{}", DisplayExpr { context: &ctx, id: e }), "2 + x");
/// ```
pub struct DisplayExpr<'a> {
    pub context: &'a Context,
    pub id: ExprId,
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(_, _) | Expr::Sub(_, _) => 1,
        Expr::Mul(_, _) | Expr::Div(_, _) => 2,
        Expr::Pow(_, _) => 3,
        Expr::Neg(_) => 4,
        // Fractions and negatives render with an operator of their own,
        // so they parenthesize like one.
        Expr::Number(n) if !n.is_integer() => 2,
        Expr::Number(n) if n.is_negative() => 4,
        Expr::Number(_)
        | Expr::Constant(_)
        | Expr::Variable(_)
        | Expr::Function(_, _)
        | Expr::Matrix { .. } => 5,
    }
}

fn write_operand(
    f: &mut fmt::Formatter<'_>,
    ctx: &Context,
    id: ExprId,
    parent_prec: u8,
    needs_parens_on_tie: bool,
) -> fmt::Result {
    let prec = precedence(ctx.get(id));
    let parens = prec < parent_prec || (needs_parens_on_tie && prec == parent_prec);
    if parens {
        write!(f, "({})", DisplayExpr { context: ctx, id })
    } else {
        write!(f, "{}", DisplayExpr { context: ctx, id })
    }
}

impl fmt::Display for DisplayExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = self.context;
        let expr = ctx.get(self.id);
        let my_prec = precedence(expr);
        match expr {
            Expr::Number(n) => {
                if n.is_integer() {
                    write!(f, "{}", n.numer())
                } else {
                    write!(f, "{}/{}", n.numer(), n.denom())
                }
            }
            Expr::Constant(c) => write!(f, "{}", c),
            Expr::Variable(v) => write!(f, "{}", v),
            Expr::Add(l, r) => {
                write_operand(f, ctx, *l, my_prec, false)?;
                write!(f, " + ")?;
                write_operand(f, ctx, *r, my_prec, false)
            }
            Expr::Sub(l, r) => {
                write_operand(f, ctx, *l, my_prec, false)?;
                write!(f, " - ")?;
                // a - (b - c) and a - (b + c) both need parens on the right
                write_operand(f, ctx, *r, my_prec, true)
            }
            Expr::Mul(l, r) => {
                write_operand(f, ctx, *l, my_prec, false)?;
                write!(f, " * ")?;
                write_operand(f, ctx, *r, my_prec, false)
            }
            Expr::Div(l, r) => {
                write_operand(f, ctx, *l, my_prec, false)?;
                write!(f, " / ")?;
                write_operand(f, ctx, *r, my_prec, true)
            }
            Expr::Pow(b, e) => {
                write_operand(f, ctx, *b, my_prec, true)?;
                write!(f, "^")?;
                write_operand(f, ctx, *e, my_prec, false)
            }
            Expr::Neg(e) => {
                write!(f, "-")?;
                write_operand(f, ctx, *e, my_prec, false)
            }
            Expr::Function(name, args) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", DisplayExpr { context: ctx, id: *arg })?;
                }
                write!(f, ")")
            }
            Expr::Matrix { rows, cols, data } => {
                write!(f, "[")?;
                for r in 0..*rows {
                    if r > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[")?;
                    for c in 0..*cols {
                        if c > 0 {
                            write!(f, ", ")?;
                        }
                        let cell = data[r * cols + c];
                        write!(f, "{}", DisplayExpr { context: ctx, id: cell })?;
                    }
                    write!(f, "]")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(ctx: &Context, id: ExprId) -> String {
        format!("{}", DisplayExpr { context: ctx, id })
    }

    #[test]
    fn parenthesizes_by_precedence() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let two = ctx.num(2);
        let sum = ctx.add(Expr::Add(a, b));
        let pow = ctx.add(Expr::Pow(sum, two));
        assert_eq!(render(&ctx, pow), "(a + b)^2");
    }

    #[test]
    fn right_sub_keeps_parens() {
        let mut ctx = Context::new();
        let a = ctx.var("a");
        let b = ctx.var("b");
        let c = ctx.var("c");
        let inner = ctx.add(Expr::Sub(b, c));
        let outer = ctx.add(Expr::Sub(a, inner));
        assert_eq!(render(&ctx, outer), "a - (b - c)");
    }

    #[test]
    fn fractions_and_matrices() {
        let mut ctx = Context::new();
        let half = ctx.frac(1, 2);
        assert_eq!(render(&ctx, half), "1/2");

        let cells = vec![ctx.num(1), ctx.num(2), ctx.num(3), ctx.num(4)];
        let m = ctx.matrix(2, 2, cells).unwrap();
        assert_eq!(render(&ctx, m), "[[1, 2], [3, 4]]");
    }
}
