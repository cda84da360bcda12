//! Readers for the solution files written by external solvers.
//!
//! Values are mapped back onto the model by variable name; variables a
//! solver leaves out (SCIP omits zeros) stay at 0.

use super::error::{SolverError, SolverResult};
use super::status::SolutionStatus;
use crate::optimizer::model::LinearModel;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSolution {
    pub status: SolutionStatus,
    pub values: Vec<f64>,
}

fn assign(model: &LinearModel, values: &mut [f64], name: &str, value: f64) {
    if let Some(id) = model.find_variable(name) {
        values[id.index()] = value;
    }
}

/// CBC `solu` file: a status line followed by `index name value reduced_cost` rows
pub fn parse_cbc(text: &str, model: &LinearModel) -> SolverResult<ParsedSolution> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| SolverError::Parse("empty CBC solution file".to_string()))?;
    let status = cbc_status(header);

    let mut values = vec![0.0; model.variables().len()];
    for line in lines {
        // Infeasible rows are flagged with a leading `**`
        let line = line.trim_start().trim_start_matches("**");
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 || tokens[0].parse::<usize>().is_err() {
            continue;
        }
        let value = tokens[2]
            .parse::<f64>()
            .map_err(|_| SolverError::Parse(format!("bad CBC value in line `{line}`")))?;
        assign(model, &mut values, tokens[1], value);
    }

    Ok(ParsedSolution { status, values })
}

fn cbc_status(header: &str) -> SolutionStatus {
    let lower = header.trim().to_lowercase();
    if lower.starts_with("optimal") {
        SolutionStatus::Optimal
    } else if lower.contains("infeasible") {
        SolutionStatus::Infeasible
    } else if lower.contains("unbounded") {
        SolutionStatus::Unbounded
    } else if lower.starts_with("stopped on time") || lower.starts_with("stopped on iterations") {
        SolutionStatus::Timeout
    } else if lower.starts_with("stopped") {
        SolutionStatus::Error
    } else {
        SolutionStatus::Unknown
    }
}

/// `glpsol -o` printable report
pub fn parse_glpk(text: &str, model: &LinearModel) -> SolverResult<ParsedSolution> {
    let status_line = text
        .lines()
        .find(|l| l.trim_start().starts_with("Status:"))
        .ok_or_else(|| SolverError::Parse("GLPK report has no Status line".to_string()))?;
    let status = glpk_status(status_line.trim_start().trim_start_matches("Status:"));

    let mut values = vec![0.0; model.variables().len()];
    let mut in_columns = false;
    let mut pending_name: Option<String> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("No.") && trimmed.contains("Column name") {
            in_columns = true;
            continue;
        }
        if !in_columns || trimmed.starts_with("---") {
            continue;
        }
        if trimmed.is_empty() {
            if pending_name.is_none() {
                break;
            }
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let (name, rest) = match pending_name.take() {
            // Long names push the numbers onto the next line
            Some(name) => (name, &tokens[..]),
            None => {
                if tokens.first().and_then(|t| t.parse::<usize>().ok()).is_none() {
                    break;
                }
                if tokens.len() == 2 {
                    pending_name = Some(tokens[1].to_string());
                    continue;
                }
                match tokens.get(1) {
                    Some(name) => (name.to_string(), &tokens[2..]),
                    None => continue,
                }
            }
        };

        // Activity is the first number after the name; `*` and B/NL/NU/NF/NS markers are skipped
        let activity = rest
            .iter()
            .find_map(|t| t.parse::<f64>().ok())
            .ok_or_else(|| SolverError::Parse(format!("no activity for GLPK column `{name}`")))?;
        assign(model, &mut values, &name, activity);
    }

    Ok(ParsedSolution { status, values })
}

fn glpk_status(raw: &str) -> SolutionStatus {
    let upper = raw.trim().to_uppercase();
    if upper.contains("NON-OPTIMAL") {
        SolutionStatus::Timeout
    } else if upper.contains("OPTIMAL") {
        SolutionStatus::Optimal
    } else if upper.contains("EMPTY") || upper.contains("INFEASIBLE") {
        SolutionStatus::Infeasible
    } else if upper.contains("UNBOUNDED") {
        SolutionStatus::Unbounded
    } else {
        SolutionStatus::Unknown
    }
}

/// SCIP `write solution` file
pub fn parse_scip(text: &str, model: &LinearModel) -> SolverResult<ParsedSolution> {
    let status_line = text
        .lines()
        .find(|l| l.starts_with("solution status:"))
        .ok_or_else(|| SolverError::Parse("SCIP solution has no status line".to_string()))?;
    let status = scip_status(status_line.trim_start_matches("solution status:"));

    let mut values = vec![0.0; model.variables().len()];
    for line in text.lines() {
        if line.starts_with("solution status:") || line.starts_with("objective value:") {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            continue;
        }
        if let Ok(value) = tokens[1].parse::<f64>() {
            assign(model, &mut values, tokens[0], value);
        }
    }

    Ok(ParsedSolution { status, values })
}

fn scip_status(raw: &str) -> SolutionStatus {
    let lower = raw.trim().to_lowercase();
    if lower.contains("optimal") {
        SolutionStatus::Optimal
    } else if lower.contains("infeasible") {
        SolutionStatus::Infeasible
    } else if lower.contains("unbounded") {
        SolutionStatus::Unbounded
    } else if lower.contains("time limit") || lower.contains("limit reached") {
        SolutionStatus::Timeout
    } else {
        SolutionStatus::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::model::Direction;
    use rstest::rstest;

    fn model() -> LinearModel {
        let mut model = LinearModel::new("m", Direction::Minimize);
        model.add_variable("charge_0", 0.0, 0.8);
        model.add_variable("discharge_0", -0.8, 0.0);
        model.add_variable("a_rather_long_variable_name", 0.0, 10.0);
        model.add_binary("mode_0");
        model
    }

    #[test]
    fn test_cbc_optimal() {
        let text = "Optimal - objective value -0.42000000\n\
                    \x20     0 charge_0                0.3                       0\n\
                    \x20     1 discharge_0            -0.2                     0.5\n\
                    \x20     3 mode_0                   1                       0\n";
        let parsed = parse_cbc(text, &model()).unwrap();
        assert_eq!(parsed.status, SolutionStatus::Optimal);
        assert_eq!(parsed.values, vec![0.3, -0.2, 0.0, 1.0]);
    }

    #[test]
    fn test_cbc_flagged_rows() {
        let text = "Infeasible - objective value 0.00000000\n\
                    ** 0 charge_0 1.2 0\n";
        let parsed = parse_cbc(text, &model()).unwrap();
        assert_eq!(parsed.status, SolutionStatus::Infeasible);
        assert_eq!(parsed.values[0], 1.2);
    }

    #[rstest]
    #[case("Optimal - objective value 1", SolutionStatus::Optimal)]
    #[case("Integer infeasible - objective value 0", SolutionStatus::Infeasible)]
    #[case("Unbounded - objective value 0", SolutionStatus::Unbounded)]
    #[case("Stopped on time - objective value 3", SolutionStatus::Timeout)]
    #[case("Stopped on difficulties - objective value 3", SolutionStatus::Error)]
    #[case("something else", SolutionStatus::Unknown)]
    fn test_cbc_status_lines(#[case] header: &str, #[case] expected: SolutionStatus) {
        assert_eq!(cbc_status(header), expected);
    }

    #[test]
    fn test_glpk_mip_report() {
        let text = "Problem:    \n\
                    Rows:       2\n\
                    Columns:    4 (1 integer, 1 binary)\n\
                    Non-zeros:  4\n\
                    Status:     INTEGER OPTIMAL\n\
                    Objective:  obj = -0.42 (MINimum)\n\
                    \n\
                    \x20  No.   Row name        Activity     Lower bound   Upper bound\n\
                    ------ ------------    ------------- ------------- -------------\n\
                    \x20     1 c1                         0                          -0\n\
                    \n\
                    \x20  No. Column name       Activity     Lower bound   Upper bound\n\
                    ------ ------------    ------------- ------------- -------------\n\
                    \x20     1 charge_0                   0.3             0           0.8\n\
                    \x20     2 discharge_0                  0          -0.8            -0\n\
                    \x20     3 a_rather_long_variable_name\n\
                    \x20                                   7.5             0            10\n\
                    \x20     4 mode_0       *              1             0             1\n\
                    \n\
                    Integer feasibility conditions:\n";
        let parsed = parse_glpk(text, &model()).unwrap();
        assert_eq!(parsed.status, SolutionStatus::Optimal);
        assert_eq!(parsed.values, vec![0.3, 0.0, 7.5, 1.0]);
    }

    #[test]
    fn test_glpk_lp_report_skips_status_markers() {
        let text = "Status:     OPTIMAL\n\
                    \x20  No. Column name  St  Activity  Lower bound  Upper bound  Marginal\n\
                    ------ ------------ -- --------- ----------- ----------- ---------\n\
                    \x20     1 charge_0     B        0.25           0         0.8\n\
                    \x20     2 discharge_0  NU          0        -0.8          -0       0.5\n\
                    \n";
        let parsed = parse_glpk(text, &model()).unwrap();
        assert_eq!(parsed.values[0], 0.25);
        assert_eq!(parsed.values[1], 0.0);
    }

    #[rstest]
    #[case("INTEGER OPTIMAL", SolutionStatus::Optimal)]
    #[case("INTEGER NON-OPTIMAL", SolutionStatus::Timeout)]
    #[case("INTEGER EMPTY", SolutionStatus::Infeasible)]
    #[case("INFEASIBLE (FINAL)", SolutionStatus::Infeasible)]
    #[case("UNBOUNDED", SolutionStatus::Unbounded)]
    #[case("UNDEFINED", SolutionStatus::Unknown)]
    fn test_glpk_status(#[case] raw: &str, #[case] expected: SolutionStatus) {
        assert_eq!(glpk_status(raw), expected);
    }

    #[test]
    fn test_glpk_missing_status() {
        assert!(parse_glpk("nothing here", &model()).is_err());
    }

    #[test]
    fn test_scip_solution_omits_zeros() {
        let text = "solution status: optimal solution found\n\
                    objective value:                                -0.42\n\
                    charge_0                                          0.3 \t(obj:0.5)\n\
                    mode_0                                              1 \t(obj:0)\n";
        let parsed = parse_scip(text, &model()).unwrap();
        assert_eq!(parsed.status, SolutionStatus::Optimal);
        assert_eq!(parsed.values, vec![0.3, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_scip_infeasible() {
        let text = "solution status: infeasible\nno solution available\n";
        let parsed = parse_scip(text, &model()).unwrap();
        assert_eq!(parsed.status, SolutionStatus::Infeasible);
    }
}
