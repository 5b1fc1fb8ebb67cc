use quadrille_common::{FormulaErrorKind, Position};
use quadrille_parse::{parse, parse_formula, pretty_print};

#[test]
fn integration_parse_print_reparse_is_identity() {
    let formulas = [
        "1",
        "A1",
        "1+2+3",
        "1-(2-3)",
        "2*(B2+C3)/D4",
        "-(A1)",
        "-A1*-B1",
        "0.5+.5",
        "((((Z9))))",
    ];

    for formula in formulas {
        let ast = parse(formula).unwrap();
        let printed = pretty_print(&ast);
        let reparsed = parse(&printed).unwrap();
        assert_eq!(reparsed, ast, "{formula} -> {printed}");
        assert_eq!(pretty_print(&reparsed), printed, "{formula}");
    }
}

#[test]
fn integration_rejected_inputs() {
    let bad = [
        "", "+", "1+", "+*1", "1++", "(1", "1)", "A", "1A", "a1", "A1:B1", "SUM(A1)", "\"x\"",
        "1 2",
    ];
    for formula in bad {
        assert!(parse(formula).is_err(), "{formula:?} should fail to parse");
    }
}

#[test]
fn integration_whitespace_is_insignificant() {
    let spaced = parse(" 1 + A1 * ( B2 - 3 ) ").unwrap();
    let dense = parse("1+A1*(B2-3)").unwrap();
    assert_eq!(pretty_print(&spaced), pretty_print(&dense));
}

#[test]
fn integration_formula_evaluates_against_lookup() {
    let formula = parse_formula("A1*B1+C1").unwrap();
    let values = |pos: Position| {
        Ok(match pos.to_string().as_str() {
            "A1" => 2.0,
            "B1" => 3.0,
            _ => 4.0,
        })
    };
    assert_eq!(formula.evaluate(&values), Ok(10.0));
}

#[test]
fn integration_out_of_grid_reference_prints_back_and_errors() {
    // Syntactically fine, semantically outside the grid: keeps its text,
    // reports no referenced cells, evaluates to #REF!.
    let formula = parse_formula("A20000+1").unwrap();
    assert_eq!(formula.expression(), "A20000+1");
    assert!(formula.referenced_cells().is_empty());
    assert_eq!(
        formula.evaluate(&|_| Ok(0.0)).map_err(|e| e.kind),
        Err(FormulaErrorKind::Ref)
    );
}
