//! Per-entity label fallback chains, generated as SPARQL.
//!
//! A chain binds one variable per preferred language, then (only when none of
//! those matched) any label, and finally the raw identifier. The chain is
//! emitted next to each sub-entity pattern so that every genre, producer,
//! award, or artist picks its own best language.

fn language_alternatives(
    subject_var: &str,
    predicate: &str,
    stem: &str,
    languages: &[String],
) -> (String, Vec<String>) {
    let mut clause = String::new();
    let mut vars = Vec::with_capacity(languages.len() + 1);
    for (index, language) in languages.iter().enumerate() {
        let var = format!("{stem}_{index}");
        clause.push_str(&format!(
            "OPTIONAL {{ ?{subject_var} {predicate} ?{var} . FILTER(LANG(?{var}) = \"{language}\") }}\n"
        ));
        vars.push(format!("?{var}"));
    }
    (clause, vars)
}

/// Binds `output_var` to the best label of `subject_var`:
/// preferred languages in order, then any label, then `STR(?subject_var)`.
pub fn label_chain_clause(subject_var: &str, output_var: &str, languages: &[String]) -> String {
    let stem = format!("{subject_var}Lbl");
    let (mut clause, mut vars) =
        language_alternatives(subject_var, "rdfs:label", &stem, languages);

    let any_var = format!("{stem}_any");
    let preferred_unbound = vars
        .iter()
        .map(|var| format!("!BOUND({var})"))
        .collect::<Vec<_>>()
        .join(" && ");
    if preferred_unbound.is_empty() {
        clause.push_str(&format!(
            "OPTIONAL {{ ?{subject_var} rdfs:label ?{any_var} . }}\n"
        ));
    } else {
        clause.push_str(&format!(
            "OPTIONAL {{ ?{subject_var} rdfs:label ?{any_var} . FILTER({preferred_unbound}) }}\n"
        ));
    }
    vars.push(format!("?{any_var}"));
    vars.push(format!("STR(?{subject_var})"));

    clause.push_str(&format!(
        "BIND(COALESCE({}) AS ?{output_var})\n",
        vars.join(", ")
    ));
    clause
}

/// Binds `output_var` to the entity description in the first available preferred language.
/// Stays unbound when no preferred language has one.
pub fn description_chain_clause(
    subject_var: &str,
    output_var: &str,
    languages: &[String],
) -> String {
    let stem = format!("{subject_var}Desc");
    let (mut clause, vars) =
        language_alternatives(subject_var, "schema:description", &stem, languages);
    if !vars.is_empty() {
        clause.push_str(&format!(
            "BIND(COALESCE({}) AS ?{output_var})\n",
            vars.join(", ")
        ));
    }
    clause
}
