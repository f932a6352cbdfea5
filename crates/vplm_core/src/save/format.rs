//! Session text format
//!
//! Sections, in file order:
//!
//! | #  | content                                   |
//! |----|-------------------------------------------|
//! | 0  | parameter table rows                      |
//! | 1  | simple Buckingham area                    |
//! | 2  | forced Buckingham area                    |
//! | 3  | automatic Buckingham candidates           |
//! | 4  | Buckingham tab checkboxes (`#` separated) |
//! | 5  | physical parameter set                    |
//! | 6  | pi set triple                             |
//! | 7  | chosen pi set                             |
//! | 8  | pi list triple                            |
//! | 9  | chosen pi list                            |
//! | 10 | physical / pi constraints                 |
//! | 11 | DOE type / scale / anticipated order      |
//! | 12 | DOE arrays                                |
//! | 13 | imported result                           |
//! | 14 | dependency checkboxes / threshold         |
//! | 15 | regression pi list                        |
//! | 16 | regression tab state                      |
//! | 17 | regression models                         |
//!
//! Every section is followed by a `---` line.

use std::collections::BTreeMap;

use super::array::{decode_bundle, encode_bundle};
use super::codec::{
    decode_parameter_set, decode_pi_list, encode_parameter_set, encode_pi_list, ensure_clean,
    fmt_bool, fmt_float, fmt_list, fmt_str_list, parse_bool, parse_float, parse_int, parse_list,
    parse_str_list, record_lines, split_fields, FIELD_RESERVED, LINE_RESERVED, TEXT_RESERVED,
};
use super::error::{FieldError, InSection, SaveError};
use super::{GROUP_SEP, NONE_TOKEN, RECORD_SEP, SECTION_COUNT, SECTION_SEP};
use crate::config::ArrayLayout;
use crate::doe::{DoeConstraints, DoeParams};
use crate::parameter::{ParameterRecord, ParameterSet};
use crate::pi::{PiListTriple, PiSetTriple, Tab2State};
use crate::regression::{
    ErrorCurves, ErrorMetrics, ModelCollection, RegressionModel, RegressionTabState, SeriesPair,
};
use crate::result::{DependencyState, ImportedResult, MEASURE_KEY};
use crate::session::SessionState;

/// Serialize a session snapshot.
///
/// Free text is checked for reserved delimiters and values are checked against
/// the rules the decoder enforces; nothing is produced if the result could not
/// be loaded again.
pub fn encode_session(state: &SessionState, layout: ArrayLayout) -> Result<String, SaveError> {
    check_reserved(state)?;
    check_values(state)?;

    let sections = [
        encode_records(&state.parameters),
        state.buckingham_text.clone(),
        state.forced_text.clone(),
        state.auto_candidates.join("\n"),
        encode_tab2(&state.tab2),
        encode_parameter_set(state.physical_params.as_ref()),
        encode_pi_sets(&state.pi_sets),
        encode_parameter_set(state.chosen_pi_set.as_ref()),
        encode_pi_lists(&state.pi_lists),
        encode_pi_list(&state.chosen_pi_list),
        join_groups([state.constraints.physical.clone(), state.constraints.pi.clone()]),
        join_groups([
            state.doe_params.kind.as_str().to_string(),
            state.doe_params.scale.as_str().to_string(),
            state.doe_params.anticipated_model_order.to_string(),
        ]),
        encode_bundle(&state.doe, layout),
        encode_result(&state.result).in_section(13)?,
        encode_dependency(&state.dependency),
        encode_regression_pi_list(&state.regression_pi_list),
        encode_regression_tab(&state.regression_tab),
        encode_models(&state.models),
    ];
    debug_assert_eq!(sections.len(), SECTION_COUNT);

    let separator = format!("\n{}\n", SECTION_SEP);
    let mut out = sections.join(&separator);
    out.push_str(&separator);
    Ok(out)
}

/// Rebuild a session snapshot. Any malformed section aborts the whole load.
pub fn decode_session(text: &str) -> Result<SessionState, SaveError> {
    let sections = split_sections(text)?;

    let parameters = decode_records(sections[0]).in_section(0)?;
    let buckingham_text = sections[1].trim().to_string();
    let forced_text = sections[2].trim().to_string();
    let auto_candidates = record_lines(sections[3]).map(str::to_string).collect();
    let tab2 = decode_tab2(sections[4]).in_section(4)?;
    let physical_params = decode_parameter_set(sections[5]).in_section(5)?;
    let pi_sets = decode_pi_sets(sections[6]).in_section(6)?;
    let chosen_pi_set = decode_parameter_set(sections[7]).in_section(7)?;
    let pi_lists = decode_pi_lists(sections[8]).in_section(8)?;
    let chosen_pi_list = decode_pi_list(sections[9]);
    let [physical, pi] = split_groups::<2>(sections[10]).in_section(10)?;
    let doe_params = decode_doe_params(sections[11]).in_section(11)?;
    let doe = decode_bundle(sections[12]).in_section(12)?;
    let result = decode_result(sections[13]).in_section(13)?;
    let dependency = decode_dependency(sections[14]).in_section(14)?;
    let regression_pi_list = decode_regression_pi_list(sections[15]);
    let regression_tab = decode_regression_tab(sections[16]).in_section(16)?;
    let models = decode_models(sections[17]).in_section(17)?;

    let state = SessionState {
        parameters,
        buckingham_text,
        forced_text,
        auto_candidates,
        tab2,
        physical_params,
        pi_sets,
        chosen_pi_set,
        pi_lists,
        chosen_pi_list,
        constraints: DoeConstraints { physical: physical.to_string(), pi: pi.to_string() },
        doe_params,
        doe,
        result,
        dependency,
        regression_pi_list,
        regression_tab,
        models,
    };
    log::debug!(
        "Decoded session: {} parameters ({} outputs), {} DOE arrays, {} models",
        state.parameters.len(),
        state.output_count(),
        state.doe.len(),
        state.models.len()
    );
    Ok(state)
}

fn split_sections(text: &str) -> Result<Vec<&str>, SaveError> {
    let mut sections: Vec<&str> = text.split(SECTION_SEP).collect();
    // The terminal separator leaves a blank remainder
    if sections.len() > 1 && sections.last().is_some_and(|s| s.trim().is_empty()) {
        sections.pop();
    }
    if sections.len() != SECTION_COUNT {
        return Err(SaveError::InvalidFile { expected: SECTION_COUNT, found: sections.len() });
    }
    Ok(sections)
}

fn join_groups<const N: usize>(groups: [String; N]) -> String {
    groups.join(&format!("\n{}\n", GROUP_SEP))
}

/// Split on `+++` into exactly `N` trimmed groups
fn split_groups<const N: usize>(text: &str) -> Result<[&str; N], FieldError> {
    let groups: Vec<&str> = text.split(GROUP_SEP).map(str::trim).collect();
    let found = groups.len();
    groups.try_into().map_err(|_| FieldError::Malformed(format!(
        "expected {} groups separated by {:?}, found {}",
        N, GROUP_SEP, found
    )))
}

// ========== Section 0: parameter table ==========

fn encode_records(records: &[ParameterRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let lower = r.lower_bound.map(fmt_float).unwrap_or_default();
            format!(
                "{}|{}|{}|{}|{}|{}",
                r.name,
                r.description,
                r.unit,
                lower,
                fmt_float(r.upper_bound),
                r.role.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_records(text: &str) -> Result<Vec<ParameterRecord>, FieldError> {
    record_lines(text)
        .map(|line| -> Result<ParameterRecord, FieldError> {
            let fields = split_fields(line, 6)?;
            let lower_bound = match fields[3].trim() {
                "" | NONE_TOKEN => None,
                value => Some(parse_float(value)?),
            };
            let role = fields[5].trim().parse().map_err(FieldError::Malformed)?;
            Ok(ParameterRecord::new(
                fields[0],
                fields[1],
                fields[2],
                lower_bound,
                parse_float(fields[4])?,
                role,
            )?)
        })
        .collect()
}

// ========== Section 4: Buckingham tab ==========

fn encode_tab2(state: &Tab2State) -> String {
    [
        fmt_bool(state.simple_selected).to_string(),
        fmt_bool(state.forced_selected).to_string(),
        fmt_bool(state.auto_selected).to_string(),
        fmt_bool(state.forced_locked).to_string(),
        state.auto_chosen_index.to_string(),
    ]
    .join("#")
}

fn decode_tab2(text: &str) -> Result<Tab2State, FieldError> {
    let fields: Vec<&str> = text.trim().split('#').collect();
    let [simple, forced, auto, locked, index] = fields.as_slice() else {
        return Err(FieldError::FieldCount {
            expected: 5,
            found: fields.len(),
            text: text.trim().to_string(),
        });
    };
    Ok(Tab2State {
        simple_selected: parse_bool(simple)?,
        forced_selected: parse_bool(forced)?,
        auto_selected: parse_bool(auto)?,
        forced_locked: parse_bool(locked)?,
        auto_chosen_index: parse_int(index)?,
    })
}

// ========== Sections 6 and 8: pi triples ==========

fn encode_pi_sets(sets: &PiSetTriple) -> String {
    if sets.is_empty() {
        return format!("{}\n{}\n{}", NONE_TOKEN, GROUP_SEP, NONE_TOKEN);
    }
    let mut groups = vec![
        encode_parameter_set(sets.simple.as_ref()),
        encode_parameter_set(sets.forced.as_ref()),
    ];
    groups.extend(sets.automatic.iter().map(|set| encode_parameter_set(Some(set))));
    groups.join(&format!("\n{}\n", GROUP_SEP))
}

fn decode_pi_sets(text: &str) -> Result<PiSetTriple, FieldError> {
    let groups: Vec<&str> = text.split(GROUP_SEP).collect();
    if groups.len() < 2 {
        return Err(FieldError::Malformed(format!(
            "pi sets need at least 2 groups, found {}",
            groups.len()
        )));
    }
    let automatic = groups[2..]
        .iter()
        .map(|group| -> Result<ParameterSet, FieldError> {
            decode_parameter_set(group)?.ok_or_else(|| {
                FieldError::Malformed("automatic pi set cannot be None".to_string())
            })
        })
        .collect::<Result<Vec<ParameterSet>, _>>()?;
    Ok(PiSetTriple {
        simple: decode_parameter_set(groups[0])?,
        forced: decode_parameter_set(groups[1])?,
        automatic,
    })
}

fn encode_pi_lists(lists: &PiListTriple) -> String {
    if lists.is_empty() {
        return format!("{}\n{}\n{}", NONE_TOKEN, GROUP_SEP, NONE_TOKEN);
    }
    let mut groups = vec![encode_pi_list(&lists.simple), encode_pi_list(&lists.forced)];
    groups.extend(lists.automatic.iter().map(|list| encode_pi_list(list)));
    groups.join(&format!("\n{}\n", GROUP_SEP))
}

fn decode_pi_lists(text: &str) -> Result<PiListTriple, FieldError> {
    let groups: Vec<&str> = text.split(GROUP_SEP).collect();
    if groups.len() < 2 {
        return Err(FieldError::Malformed(format!(
            "pi lists need at least 2 groups, found {}",
            groups.len()
        )));
    }
    Ok(PiListTriple {
        simple: decode_pi_list(groups[0]),
        forced: decode_pi_list(groups[1]),
        automatic: groups[2..].iter().map(|group| decode_pi_list(group)).collect(),
    })
}

// ========== Section 11: DOE inputs ==========

fn decode_doe_params(text: &str) -> Result<DoeParams, FieldError> {
    let [kind, scale, order] = split_groups::<3>(text)?;
    Ok(DoeParams {
        kind: kind.parse().map_err(FieldError::Malformed)?,
        scale: scale.parse().map_err(FieldError::Malformed)?,
        anticipated_model_order: parse_int(order)?,
    })
}

// ========== Section 13: imported result ==========

fn encode_result(result: &ImportedResult) -> Result<String, FieldError> {
    if result.is_empty() {
        return Ok(format!("{}\n{}\n{}", NONE_TOKEN, GROUP_SEP, NONE_TOKEN));
    }
    let mut lines = Vec::with_capacity(result.rows.len());
    for row in &result.rows {
        let mut values = Vec::new();
        for header in std::iter::once(MEASURE_KEY).chain(result.data_headers()) {
            let value = row.get(header).ok_or_else(|| {
                FieldError::Malformed(format!("result row has no value for {:?}", header))
            })?;
            values.push(value.as_str());
        }
        lines.push(values.join("|"));
    }
    Ok(format!("{}\n{}\n{}", fmt_str_list(&result.headers), GROUP_SEP, lines.join("\n")))
}

fn decode_result(text: &str) -> Result<ImportedResult, FieldError> {
    let groups: Vec<&str> = text.split(GROUP_SEP).collect();
    if groups[0].trim() == NONE_TOKEN {
        return Ok(ImportedResult::default());
    }
    let [headers, rows] = groups.as_slice() else {
        return Err(FieldError::Malformed(format!(
            "result needs 2 groups, found {}",
            groups.len()
        )));
    };
    let headers = parse_str_list(headers);
    let data_headers: Vec<&String> = headers.iter().filter(|h| *h != MEASURE_KEY).collect();

    let mut items = Vec::new();
    for line in record_lines(rows) {
        let values = split_fields(line, data_headers.len() + 1)?;
        let mut item = BTreeMap::new();
        item.insert(MEASURE_KEY.to_string(), values[0].to_string());
        for (header, value) in data_headers.iter().zip(&values[1..]) {
            item.insert((*header).clone(), value.to_string());
        }
        items.push(item);
    }
    Ok(ImportedResult { headers, rows: items })
}

// ========== Section 14: dependency tab ==========

fn encode_dependency(state: &DependencyState) -> String {
    let checks: Vec<&str> = state.checks.iter().map(|c| fmt_bool(*c)).collect();
    join_groups([checks.join("|"), fmt_float(state.threshold)])
}

fn decode_dependency(text: &str) -> Result<DependencyState, FieldError> {
    let [checks, threshold] = split_groups::<2>(text)?;
    let checks = if checks.is_empty() {
        Vec::new()
    } else {
        checks.split('|').map(parse_bool).collect::<Result<Vec<_>, _>>()?
    };
    Ok(DependencyState::new(checks, parse_float(threshold)?)?)
}

// ========== Sections 15 and 16: regression tab ==========

fn encode_regression_pi_list(list: &[Option<String>]) -> String {
    list.iter().map(|pi| pi.as_deref().unwrap_or(NONE_TOKEN)).collect::<Vec<_>>().join("|")
}

fn decode_regression_pi_list(text: &str) -> Vec<Option<String>> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    text.split('|')
        .map(|pi| match pi.trim() {
            NONE_TOKEN => None,
            name => Some(name.to_string()),
        })
        .collect()
}

fn encode_regression_tab(state: &RegressionTabState) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        state.selected_output_pi,
        state.criterion,
        state.model_order,
        state.regression_kind,
        state.chosen_term_count
    )
}

fn decode_regression_tab(text: &str) -> Result<RegressionTabState, FieldError> {
    let fields = split_fields(text.trim(), 5)?;
    Ok(RegressionTabState {
        selected_output_pi: fields[0].trim().to_string(),
        criterion: fields[1].trim().to_string(),
        model_order: parse_int(fields[2])?,
        regression_kind: fields[3].trim().to_string(),
        chosen_term_count: parse_int(fields[4])?,
    })
}

// ========== Section 17: regression models ==========

fn encode_models(collection: &ModelCollection) -> String {
    if collection.is_empty() {
        return String::new();
    }
    let records: Vec<String> = collection
        .models
        .iter()
        .map(|model| {
            format!(
                "{}\n{}\n{}\n{}",
                model.expression,
                fmt_list(&model.coefficients),
                fmt_list(&model.train_errors.to_array()),
                fmt_list(&model.test_errors.to_array())
            )
        })
        .collect();

    let mut groups = vec![records.join(&format!("\n{}\n", RECORD_SEP))];
    for pair in collection.curves.pairs() {
        groups.push(fmt_list(&pair.train));
        groups.push(fmt_list(&pair.test));
    }
    groups.join(&format!("\n{}\n", GROUP_SEP))
}

fn decode_models(text: &str) -> Result<ModelCollection, FieldError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(ModelCollection::default());
    }
    let groups = split_groups::<9>(text)?;

    let models = groups[0]
        .split(RECORD_SEP)
        .map(decode_model)
        .collect::<Result<Vec<_>, _>>()?;

    let pair = |i: usize| -> Result<SeriesPair, FieldError> {
        Ok(SeriesPair { train: parse_list(groups[i])?, test: parse_list(groups[i + 1])? })
    };
    let curves =
        ErrorCurves { max_abs: pair(1)?, mean_abs: pair(3)?, mean: pair(5)?, sigma: pair(7)? };

    Ok(ModelCollection { models, curves })
}

fn decode_model(record: &str) -> Result<RegressionModel, FieldError> {
    let lines: Vec<&str> = record_lines(record).collect();
    let [expression, coefficients, train, test] = lines.as_slice() else {
        return Err(FieldError::Malformed(format!(
            "model record needs 4 lines, found {}",
            lines.len()
        )));
    };
    let metrics = |line: &str| -> Result<ErrorMetrics, FieldError> {
        ErrorMetrics::from_slice(&parse_list(line)?).ok_or_else(|| {
            FieldError::Malformed(format!("expected 4 error metrics in {:?}", line))
        })
    };
    Ok(RegressionModel {
        expression: expression.to_string(),
        coefficients: parse_list(coefficients)?,
        train_errors: metrics(*train)?,
        test_errors: metrics(*test)?,
    })
}

// ========== Reserved delimiter checks ==========

fn check_reserved(state: &SessionState) -> Result<(), SaveError> {
    for record in &state.parameters {
        let what = format!("parameter '{}'", record.name);
        ensure_clean(&format!("{} name", what), &record.name, FIELD_RESERVED)?;
        ensure_clean(&format!("{} description", what), &record.description, FIELD_RESERVED)?;
        ensure_clean(&format!("{} unit", what), &record.unit, FIELD_RESERVED)?;
    }
    ensure_clean("simple Buckingham area", &state.buckingham_text, TEXT_RESERVED)?;
    ensure_clean("forced Buckingham area", &state.forced_text, TEXT_RESERVED)?;
    for (i, expressions) in state.auto_candidates.iter().enumerate() {
        ensure_clean("automatic Buckingham candidate", expressions, LINE_RESERVED)?;
        // Blank lines are skipped on load, which would renumber the candidates
        if expressions.trim().is_empty() {
            let source = FieldError::Malformed(format!("automatic candidate {} is blank", i + 1));
            return Err(SaveError::InvalidField { section: 3, source });
        }
    }

    let sets = [state.physical_params.as_ref(), state.pi_sets.simple.as_ref()]
        .into_iter()
        .chain([state.pi_sets.forced.as_ref(), state.chosen_pi_set.as_ref()])
        .flatten()
        .chain(&state.pi_sets.automatic);
    for set in sets {
        for param in set {
            let what = format!("parameter '{}'", param.name);
            ensure_clean(&format!("{} name", what), &param.name, FIELD_RESERVED)?;
            ensure_clean(&format!("{} description", what), &param.description, FIELD_RESERVED)?;
            ensure_clean(&format!("{} units", what), &param.units, FIELD_RESERVED)?;
        }
    }

    let lists = [&state.pi_lists.simple, &state.pi_lists.forced, &state.chosen_pi_list]
        .into_iter()
        .chain(&state.pi_lists.automatic);
    for list in lists {
        for expression in list {
            ensure_clean("pi expression", expression, LINE_RESERVED)?;
        }
    }

    ensure_clean("physical constraints", &state.constraints.physical, TEXT_RESERVED)?;
    ensure_clean("pi constraints", &state.constraints.pi, TEXT_RESERVED)?;

    for header in &state.result.headers {
        ensure_clean("result header", header, FIELD_RESERVED)?;
        ensure_clean("result header", header, &["'", ","])?;
    }
    for value in state.result.rows.iter().flat_map(|row| row.values()) {
        ensure_clean("result value", value, FIELD_RESERVED)?;
    }

    for name in state.regression_pi_list.iter().flatten() {
        ensure_clean("regression pi name", name, FIELD_RESERVED)?;
    }
    let tab = &state.regression_tab;
    ensure_clean("selected output pi", &tab.selected_output_pi, FIELD_RESERVED)?;
    ensure_clean("regression criterion", &tab.criterion, FIELD_RESERVED)?;
    ensure_clean("regression type", &tab.regression_kind, FIELD_RESERVED)?;

    for (i, model) in state.models.models.iter().enumerate() {
        let field = format!("expression of model {}", i + 1);
        ensure_clean(&field, &model.expression, LINE_RESERVED)?;
        ensure_clean(&field, &model.expression, &[RECORD_SEP])?;
        if model.expression.trim().is_empty() {
            let source = FieldError::Malformed(format!("{} is blank", field));
            return Err(SaveError::InvalidField { section: 17, source });
        }
    }
    Ok(())
}

// ========== Value checks ==========

fn check_values(state: &SessionState) -> Result<(), SaveError> {
    for record in &state.parameters {
        record.validate().map_err(FieldError::from).in_section(0)?;
    }
    DependencyState::new(Vec::new(), state.dependency.threshold)
        .map_err(FieldError::from)
        .in_section(14)?;
    Ok(())
}
