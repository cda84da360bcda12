//! CPLEX LP writer
//!
//! CBC, GLPK and SCIP all read this format, so it is the single exchange
//! format with external solver processes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::optimizer::model::{Direction, LinearExpr, LinearModel, VarKind};

/// Terms per line before wrapping; continuation lines start with a space
const TERMS_PER_LINE: usize = 8;

pub fn write_lp<W: Write>(model: &LinearModel, mut w: W) -> io::Result<()> {
    writeln!(w, "\\ Problem: {}", model.name())?;
    match model.direction() {
        Direction::Minimize => writeln!(w, "Minimize")?,
        Direction::Maximize => writeln!(w, "Maximize")?,
    }

    // The objective constant is added back by the caller from the variable values
    write!(w, " obj:")?;
    if model.objective().terms.is_empty() {
        if let Some(first) = model.variables().first() {
            write!(w, " 0 {}", first.name)?;
        }
    } else {
        write_terms(&mut w, model, model.objective())?;
    }
    writeln!(w)?;

    writeln!(w, "Subject To")?;
    for c in model.constraints() {
        write!(w, " {}:", c.name)?;
        write_terms(&mut w, model, &c.expr)?;
        writeln!(w, " {} {}", c.sense, c.rhs)?;
    }

    writeln!(w, "Bounds")?;
    for var in model.variables().iter().filter(|v| v.kind == VarKind::Continuous) {
        match (var.lower.is_finite(), var.upper.is_finite()) {
            (true, true) => writeln!(w, " {} <= {} <= {}", var.lower, var.name, var.upper)?,
            (true, false) => writeln!(w, " {} >= {}", var.name, var.lower)?,
            (false, true) => writeln!(w, " -inf <= {} <= {}", var.name, var.upper)?,
            (false, false) => writeln!(w, " {} free", var.name)?,
        }
    }

    let binaries: Vec<&str> = model
        .variables()
        .iter()
        .filter(|v| v.kind == VarKind::Binary)
        .map(|v| v.name.as_str())
        .collect();
    if !binaries.is_empty() {
        writeln!(w, "Binaries")?;
        for chunk in binaries.chunks(TERMS_PER_LINE) {
            writeln!(w, " {}", chunk.join(" "))?;
        }
    }

    writeln!(w, "End")?;
    Ok(())
}

fn write_terms<W: Write>(w: &mut W, model: &LinearModel, expr: &LinearExpr) -> io::Result<()> {
    if expr.terms.is_empty() {
        // LP rows need at least one variable
        if let Some(first) = model.variables().first() {
            write!(w, " 0 {}", first.name)?;
        }
        return Ok(());
    }

    for (i, (var, coef)) in expr.terms.iter().enumerate() {
        if i > 0 && i % TERMS_PER_LINE == 0 {
            write!(w, "\n ")?;
        }
        let name = &model.variable(*var).name;
        let sign = if *coef < 0.0 { "-" } else { "+" };
        if i == 0 && *coef >= 0.0 {
            write!(w, " {} {}", coef, name)?;
        } else {
            write!(w, " {} {} {}", sign, coef.abs(), name)?;
        }
    }
    Ok(())
}

pub fn write_lp_file(model: &LinearModel, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_lp(model, &mut writer)?;
    writer.flush()
}

pub fn to_lp_string(model: &LinearModel) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_lp(model, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
