use crate::domain::model::Requirements;
use serde_json::Value;

const NONE_IDENTIFIED: &str = "None identified.";

/// Renders the text shown in the result display after a successful analysis.
///
/// Lists and the priority mapping are emitted in the order received.
pub fn format_summary(requirements: &Requirements) -> String {
    let mut lines: Vec<String> = vec![
        "Analysis Complete!".to_string(),
        "Functional Requirements:".to_string(),
    ];
    push_list(&mut lines, &requirements.functional);

    lines.push("Non-Functional Requirements:".to_string());
    push_list(&mut lines, &requirements.non_functional);

    lines.push("Priority (MoSCoW Method):".to_string());
    for (label, score) in &requirements.priority {
        lines.push(format!("{}: {}", label, display_score(score)));
    }

    if let Some(clarifications) = requirements
        .clarifications
        .as_ref()
        .filter(|c| !c.is_empty())
    {
        lines.push(String::new());
        lines.push("Clarifications Needed:".to_string());
        lines.extend(clarifications.iter().cloned());
    }

    lines.join("\n")
}

fn push_list(lines: &mut Vec<String>, items: &[String]) {
    if items.is_empty() {
        lines.push(NONE_IDENTIFIED.to_string());
    } else {
        lines.extend(items.iter().cloned());
    }
}

/// Integral scores print without a fractional part, strings print bare.
fn display_score(score: &Value) -> String {
    match score {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
            }
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
