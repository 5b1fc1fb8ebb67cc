//! Canonical rendering of expression trees.
//!
//! The output is the *canonical form*: whitespace-free, references in
//! upper-case `A1` notation, numbers in their shortest round-tripping
//! decimal form, and only the parentheses the tree shape requires. Parsing
//! the rendered text yields a structurally identical tree, which is what
//! makes a cell's text a fixed point under re-edit.

use crate::parser::{ASTNode, ASTNodeType};

const ATOM_PRECEDENCE: u8 = u8::MAX;

/// Render an expression tree to its canonical text.
pub fn pretty_print(node: &ASTNode) -> String {
    let mut out = String::new();
    render(node, &mut out);
    out
}

fn precedence(node: &ASTNode) -> u8 {
    match &node.node_type {
        ASTNodeType::Literal(_) | ASTNodeType::Reference { .. } => ATOM_PRECEDENCE,
        ASTNodeType::UnaryOp { .. } => 3,
        ASTNodeType::BinaryOp { op, .. } => match op.as_str() {
            "*" | "/" => 2,
            _ => 1,
        },
    }
}

fn render(node: &ASTNode, out: &mut String) {
    match &node.node_type {
        ASTNodeType::Literal(value) => {
            out.push_str(&value.to_string());
        }
        ASTNodeType::Reference { original, position } => {
            if position.is_valid() {
                out.push_str(&position.to_string());
            } else {
                out.push_str(original);
            }
        }
        ASTNodeType::UnaryOp { op, expr } => {
            out.push_str(op);
            render_child(expr, precedence(node), false, out);
        }
        ASTNodeType::BinaryOp { op, left, right } => {
            let prec = precedence(node);
            render_child(left, prec, false, out);
            out.push_str(op);
            render_child(right, prec, true, out);
        }
    }
}

/// Parenthesize a child whose precedence is lower than its parent's, or
/// equal on the right-hand side: operators are left-associative, so an
/// equal-precedence right child only exists because the source had parens.
fn render_child(child: &ASTNode, parent_precedence: u8, right_side: bool, out: &mut String) {
    let child_precedence = precedence(child);
    let needs_parens = if right_side {
        child_precedence <= parent_precedence
    } else {
        child_precedence < parent_precedence
    };

    if needs_parens {
        out.push('(');
        render(child, out);
        out.push(')');
    } else {
        render(child, out);
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;

    fn canonical(expr: &str) -> String {
        super::pretty_print(&parse(expr).unwrap())
    }

    #[test]
    fn drops_redundant_parentheses() {
        assert_eq!(canonical("(1+2)*3"), "(1+2)*3");
        assert_eq!(canonical("((1+2))*((3))"), "(1+2)*3");
        assert_eq!(canonical("1+(2*3)"), "1+2*3");
        assert_eq!(canonical("(A1)"), "A1");
    }

    #[test]
    fn keeps_structural_parentheses() {
        assert_eq!(canonical("1-(2+3)"), "1-(2+3)");
        assert_eq!(canonical("1/(2*3)"), "1/(2*3)");
        assert_eq!(canonical("-(1+2)"), "-(1+2)");
        assert_eq!(canonical("(1+2)-3"), "1+2-3");
    }

    #[test]
    fn numbers_render_shortest_form() {
        assert_eq!(canonical("1.0"), "1");
        assert_eq!(canonical("0.50"), "0.5");
        assert_eq!(canonical("1e2"), "100");
    }

    #[test]
    fn parse_print_is_a_fixed_point() {
        for expr in [
            "1+2*3",
            "(1+2)*3",
            "-(A1+B2)/C3",
            "1-(2-3)",
            "--2",
            "A1*(B1+C1)*D1",
        ] {
            let once = canonical(expr);
            assert_eq!(canonical(&once), once, "{expr}");
            assert_eq!(parse(&once).unwrap(), parse(expr).unwrap(), "{expr}");
        }
    }
}
