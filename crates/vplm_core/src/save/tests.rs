//! End-to-end scenarios for the session format

use nalgebra::DMatrix;
use tempfile::TempDir;

use super::*;
use crate::config::ArrayLayout;
use crate::doe::{DoeBundle, DoeConstraints, DoeKind, DoeParams, DoeScale};
use crate::parameter::{Bounds, Parameter, ParameterRecord, ParameterSet, Role};
use crate::pi::{PiListTriple, PiSetTriple, Tab2State};
use crate::regression::{
    ErrorCurves, ErrorMetrics, ModelCollection, RegressionModel, RegressionTabState, SeriesPair,
};
use crate::result::{DependencyState, ImportedResult};
use crate::session::SessionState;

fn pi_set(names: &[&str]) -> ParameterSet {
    let params = names
        .iter()
        .enumerate()
        .map(|(i, name)| Parameter::ranged(*name, 0.1 * (i + 1) as f64, 10.0, "", "x/y").unwrap());
    ParameterSet::from_parameters(params).unwrap()
}

fn model(terms: usize) -> RegressionModel {
    let t = terms as f64;
    RegressionModel {
        expression: format!("log(pi1) = {}", vec!["0.25*log(pi2)"; terms].join(" + ")),
        coefficients: (0..terms).map(|i| 0.25 + i as f64).collect(),
        train_errors: ErrorMetrics { max_abs: 10.0 / t, mean_abs: 5.0 / t, mean: -0.5, sigma: 2.0 / t },
        test_errors: ErrorMetrics { max_abs: 12.0 / t, mean_abs: 6.0 / t, mean: 0.5, sigma: 3.0 / t },
    }
}

fn three_term_models() -> ModelCollection {
    let pair = |train: [f64; 3], test: [f64; 3]| SeriesPair { train: train.to_vec(), test: test.to_vec() };
    ModelCollection {
        models: (1..=3).map(model).collect(),
        curves: ErrorCurves {
            max_abs: pair([10.0, 5.0, 3.3], [12.0, 6.0, 4.0]),
            mean_abs: pair([5.0, 2.5, 1.6], [6.0, 3.0, 2.0]),
            mean: pair([-0.5, -0.4, -0.1], [0.5, 0.4, 0.1]),
            sigma: pair([2.0, 1.0, 0.6], [3.0, 1.5, 1.0]),
        },
    }
}

fn full_state() -> SessionState {
    let physical = ParameterSet::from_parameters(vec![
        Parameter::ranged("x", 0.1, 1.0, "m", "length").unwrap(),
        Parameter::constant("g", 9.81, "m/s**2", "gravity").unwrap(),
        Parameter::ranged("y", 0.5, 2.0, "m", "height").unwrap(),
    ])
    .unwrap();

    SessionState {
        parameters: vec![
            ParameterRecord::new("x", "length", "m", Some(0.1), 1.0, Role::Input).unwrap(),
            ParameterRecord::new("g", "gravity, at sea level", "m/s**2", None, 9.81, Role::Input)
                .unwrap(),
            ParameterRecord::new("y", "height", "m", Some(0.5), 2.0, Role::Output).unwrap(),
        ],
        buckingham_text: "pi1 = x/y\npi2 = g*x**2".to_string(),
        forced_text: "pi1 = x/y".to_string(),
        auto_candidates: vec![
            "pi1 = x/y | pi2 = g*x**2".to_string(),
            "pi1 = y/x | pi2 = g*y**2".to_string(),
        ],
        tab2: Tab2State {
            simple_selected: false,
            forced_selected: false,
            auto_selected: true,
            forced_locked: true,
            auto_chosen_index: 2,
        },
        physical_params: Some(physical),
        pi_sets: PiSetTriple {
            simple: Some(pi_set(&["pi1", "pi2"])),
            forced: None,
            automatic: vec![pi_set(&["pi1", "pi2"]), pi_set(&["pi1", "pi2"])],
        },
        chosen_pi_set: Some(pi_set(&["pi1", "pi2"])),
        pi_lists: PiListTriple {
            simple: vec!["x/y".to_string(), "g*x**2".to_string()],
            forced: Vec::new(),
            automatic: vec![
                vec!["x/y".to_string(), "g*x**2".to_string()],
                vec!["y/x".to_string(), "g*y**2".to_string()],
            ],
        },
        chosen_pi_list: vec!["y/x".to_string(), "g*y**2".to_string()],
        constraints: DoeConstraints {
            physical: "x < y".to_string(),
            pi: "pi1 > 0.5\npi2 < 2".to_string(),
        },
        doe_params: DoeParams {
            kind: DoeKind::Latin,
            scale: DoeScale::Linear,
            anticipated_model_order: 2,
        },
        doe: DoeBundle::new(vec![
            DMatrix::from_row_slice(2, 3, &[0.1, 9.81, 0.5, 1.0, 9.81, 2.0]),
            DMatrix::from_row_slice(2, 2, &[0.2, 0.1, 2.0, 1.0 / 3.0]),
        ]),
        result: ImportedResult::from_rows(
            vec!["pi1".to_string(), "pi2".to_string()],
            vec![
                vec!["0.5".to_string(), "1.5".to_string()],
                vec!["0.7".to_string(), "2.5e-3".to_string()],
            ],
        ),
        dependency: DependencyState::new(vec![true, false], 0.75).unwrap(),
        regression_pi_list: vec![Some("pi1".to_string()), None, Some("pi2".to_string())],
        regression_tab: RegressionTabState {
            selected_output_pi: "pi1".to_string(),
            criterion: "sigma(error)".to_string(),
            model_order: 3,
            regression_kind: "Polynomial".to_string(),
            chosen_term_count: 2,
        },
        models: three_term_models(),
    }
}

fn sections(text: &str) -> Vec<String> {
    let mut parts: Vec<String> = text.split("\n---\n").map(str::to_string).collect();
    parts.pop();
    parts
}

fn rejoin(parts: &[String]) -> String {
    format!("{}\n---\n", parts.join("\n---\n"))
}

#[test]
fn test_full_round_trip() {
    let state = full_state();
    for layout in [ArrayLayout::Shaped, ArrayLayout::Legacy] {
        let text = encode_session(&state, layout).unwrap();
        let decoded = decode_session(&text).unwrap();
        assert_eq!(decoded, state);
    }
}

#[test]
fn test_round_trip_through_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = SessionStore::with_work_dir(temp_dir.path());

    let path = store.save_as(&full_state(), "session").unwrap();
    let loaded = store.load(&path).unwrap();

    assert_eq!(loaded, full_state());
    assert_eq!(loaded.output_count(), 1);
    assert_eq!(loaded.auto_candidate_rows()[1].pi_set_number, 2);
    assert_eq!(loaded.parameters[1].lower_bound, None);
}

#[test]
fn test_encoded_layout() {
    let text = encode_session(&full_state(), ArrayLayout::Shaped).unwrap();
    assert!(text.ends_with("\n---\n"));

    let parts = sections(&text);
    assert_eq!(parts.len(), SECTION_COUNT);
    assert_eq!(parts[0].lines().nth(1), Some("g|gravity, at sea level|m/s**2||9.81|Input"));
    assert_eq!(parts[4], "False#False#True#True#2");
    assert_eq!(parts[5].lines().nth(1), Some("g|gravity|m/s**2|#|9.81"));
    assert_eq!(parts[6].matches("+++").count(), 3);
    assert!(parts[6].contains("\n+++\nNone\n+++\n"));
    assert_eq!(parts[11], "Latin\n+++\nLinear\n+++\n2");
    assert!(parts[12].starts_with("shape 2 3\n0.1 9.81 0.5\n"));
    assert!(parts[13].starts_with("['Measure', 'pi1', 'pi2']\n+++\n1|0.5|1.5\n"));
    assert_eq!(parts[14], "True|False\n+++\n0.75");
    assert_eq!(parts[15], "pi1|None|pi2");
    assert_eq!(parts[16], "pi1|sigma(error)|3|Polynomial|2");
    assert_eq!(parts[17].matches("|||").count(), 2);
}

#[test]
fn test_empty_state_round_trip() {
    let text = encode_session(&SessionState::new(), ArrayLayout::Shaped).unwrap();
    let parts = sections(&text);
    assert_eq!(parts[6], "None\n+++\nNone");
    assert_eq!(parts[13], "None\n+++\nNone");
    assert_eq!(parts[17], "");

    let decoded = decode_session(&text).unwrap();
    assert_eq!(decoded.output_count(), 0);
    assert_eq!(decoded.physical_params, None);
    assert!(decoded.pi_sets.is_empty());
    assert!(decoded.doe.is_empty());
    assert!(decoded.models.is_empty());
    assert_eq!(decoded.result.headers, vec!["Measure", "Parameters"]);
    assert_eq!(decoded, SessionState::new());
}

#[test]
fn test_three_term_model_collection() {
    let mut state = SessionState::new();
    state.models = three_term_models();

    let decoded = decode_session(&encode_session(&state, ArrayLayout::Shaped).unwrap()).unwrap();

    assert_eq!(decoded.models.term_counts(), 1..=3);
    for terms in 1..=3 {
        let (got, want) = (decoded.models.model(terms).unwrap(), &state.models.models[terms - 1]);
        assert_eq!(got.expression, want.expression);
        assert_eq!(got.coefficients, want.coefficients);
        assert_eq!(got.test_errors, want.test_errors);
    }
    assert_eq!(decoded.models.curves, state.models.curves);
}

#[test]
fn test_wrong_section_count_rejected() {
    let parts = sections(&encode_session(&full_state(), ArrayLayout::Shaped).unwrap());

    let short = rejoin(&parts[..17]);
    let err = decode_session(&short).unwrap_err();
    assert!(matches!(err, SaveError::InvalidFile { expected: 18, found: 17 }));

    let long = format!("{}extra\n---\n", rejoin(&parts));
    let err = decode_session(&long).unwrap_err();
    assert!(matches!(err, SaveError::InvalidFile { found: 19, .. }));

    assert!(matches!(decode_session(""), Err(SaveError::InvalidFile { found: 1, .. })));
}

#[test]
fn test_bad_field_aborts_load() {
    let mut parts = sections(&encode_session(&full_state(), ArrayLayout::Shaped).unwrap());
    parts[14] = "True|False\n+++\nabc".to_string();

    let err = decode_session(&rejoin(&parts)).unwrap_err();
    assert!(matches!(err, SaveError::InvalidField { section: 14, .. }));
    assert_eq!(err.user_message(), "Failed to load, invalid file");
}

#[test]
fn test_parameter_without_bounds_or_value_aborts_load() {
    let mut parts = sections(&encode_session(&full_state(), ArrayLayout::Shaped).unwrap());
    parts[5] = "x|length|m|#|#".to_string();

    let err = decode_session(&rejoin(&parts)).unwrap_err();
    match err {
        SaveError::InvalidField { section: 5, source: FieldError::MissingBoundsAndValue(line) } => {
            assert_eq!(line, "x|length|m|#|#")
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_legacy_file_from_older_tool() {
    let parts = [
        "x|length|m|0.1|1.0|Input\ng|gravity|m/s**2|None|9.81|Input\ny|height|m|0.5|2.0|Output",
        "pi1 = x/y",
        "",
        "",
        "True#False#False#False#0",
        "x|length|m|0.1, 1.0|#\ng|gravity|m/s**2|#|9.81",
        "None\n+++\nNone",
        "None",
        "None\n+++\nNone",
        "None",
        "\n+++\n",
        "Full Fact\n+++\nLog\n+++\n1",
        "[0.1        9.81       0.5       ]\n[1.         9.81       2.        ]",
        "None\n+++\nNone",
        "\n+++\n0.9",
        "",
        "|max(error)|1|Power Law|0",
        "",
    ];
    let text = format!("{}\n---\n", parts.join("\n---\n"));

    let state = decode_session(&text).unwrap();
    assert_eq!(state.output_count(), 1);
    assert!(state.parameters[1].is_constant());
    let physical = state.physical_params.unwrap();
    assert_eq!(physical.get("g").unwrap().bounds, Bounds::Constant(9.81));
    assert_eq!(
        state.doe.arrays,
        vec![DMatrix::from_row_slice(2, 3, &[0.1, 9.81, 0.5, 1.0, 9.81, 2.0])]
    );
    assert_eq!(state.doe_params, DoeParams::default());
    assert_eq!(state.dependency, DependencyState::default());
    assert!(state.regression_pi_list.is_empty());
    assert!(state.models.is_empty());
}

#[test]
fn test_allocator_never_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("study.txt");
    std::fs::write(&target, "keep me").unwrap();

    let written = save_session(&target, &full_state(), ArrayLayout::Shaped).unwrap();

    assert_ne!(written, target);
    assert_eq!(written, temp_dir.path().join("study(1).txt"));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "keep me");
    assert_eq!(load_session(&written).unwrap(), full_state());
}

#[test]
fn test_reserved_delimiter_refused_before_writing() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("bad.txt");

    let mut state = full_state();
    state.parameters[0].description = "length | width".to_string();
    let err = save_session(&target, &state, ArrayLayout::Shaped).unwrap_err();
    assert!(matches!(err, SaveError::ReservedDelimiter { delimiter: "|", .. }));

    let mut state = full_state();
    state.constraints.pi = "pi1 > 1\n---\n".to_string();
    assert!(save_session(&target, &state, ArrayLayout::Shaped).is_err());

    let mut state = full_state();
    state.models.models[0].expression = "pi1 = a ||| b".to_string();
    assert!(save_session(&target, &state, ArrayLayout::Shaped).is_err());

    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_unloadable_values_refused_before_writing() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("bad.txt");

    let mut state = full_state();
    state.dependency.threshold = 1.5;
    let err = save_session(&target, &state, ArrayLayout::Shaped).unwrap_err();
    assert!(matches!(err, SaveError::InvalidField { section: 14, .. }));

    let mut state = full_state();
    state.parameters[0].upper_bound = 0.0;
    let err = save_session(&target, &state, ArrayLayout::Shaped).unwrap_err();
    assert!(matches!(err, SaveError::InvalidField { section: 0, .. }));

    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_result_row_missing_a_header() {
    let mut state = full_state();
    state.result.rows[0].remove("pi2");
    let err = encode_session(&state, ArrayLayout::Shaped).unwrap_err();
    assert!(matches!(err, SaveError::InvalidField { section: 13, .. }));
}

#[cfg(feature = "proptest")]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: table rows and dependency state survive a save
        #[test]
        fn prop_records_round_trip(
            rows in prop::collection::vec(
                ("[a-z][a-z0-9_]{0,6}", "[a-zA-Z ,.()*/]{0,12}", proptest::option::of(1e-6f64..1.0), 1.0f64..1e6, any::<bool>()),
                0..8
            ),
            checks in prop::collection::vec(any::<bool>(), 0..6),
            threshold in 0.0f64..=1.0
        ) {
            let mut state = SessionState::new();
            state.parameters = rows
                .into_iter()
                .map(|(name, desc, lower, upper, output)| {
                    let role = if output { Role::Output } else { Role::Input };
                    ParameterRecord::new(name, desc.trim(), "m", lower, upper, role).unwrap()
                })
                .collect();
            state.dependency = DependencyState::new(checks, threshold).unwrap();

            let text = encode_session(&state, ArrayLayout::Shaped).unwrap();
            prop_assert_eq!(decode_session(&text).unwrap(), state);
        }
    }
}
