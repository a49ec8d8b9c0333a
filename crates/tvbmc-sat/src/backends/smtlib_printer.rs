use crate::formula::Formula;

/// Print a formula as an SMT-LIB2 term.
pub fn to_smtlib(formula: &Formula) -> String {
    match formula {
        Formula::Const(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        Formula::Lit(lit) => {
            let name = quote_symbol(lit.name());
            if lit.polarity() {
                name
            } else {
                format!("(not {name})")
            }
        }
        Formula::And(parts) => {
            if parts.is_empty() {
                "true".to_string()
            } else if parts.len() == 1 {
                to_smtlib(&parts[0])
            } else {
                let inner: Vec<String> = parts.iter().map(to_smtlib).collect();
                format!("(and {})", inner.join(" "))
            }
        }
        Formula::Or(parts) => {
            if parts.is_empty() {
                "false".to_string()
            } else if parts.len() == 1 {
                to_smtlib(&parts[0])
            } else {
                let inner: Vec<String> = parts.iter().map(to_smtlib).collect();
                format!("(or {})", inner.join(" "))
            }
        }
        Formula::Not(inner) => format!("(not {})", to_smtlib(inner)),
        Formula::Implies(lhs, rhs) => format!("(=> {} {})", to_smtlib(lhs), to_smtlib(rhs)),
    }
}

/// A complete SMT-LIB2 script: declarations for every variable, one
/// assertion and a `check-sat`.
pub fn to_smtlib_script(formula: &Formula) -> String {
    let mut out = String::new();
    out.push_str("(set-logic QF_UF)\n");
    for name in formula.variables() {
        out.push_str(&format!("(declare-const {} Bool)\n", quote_symbol(&name)));
    }
    out.push_str(&format!("(assert {})\n", to_smtlib(formula)));
    out.push_str("(check-sat)\n");
    out
}

// Predicate literals start with a digit (`3_0_t`), which is not a simple
// SMT-LIB symbol.
fn quote_symbol(name: &str) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("|{name}|")
    } else {
        name.to_string()
    }
}
