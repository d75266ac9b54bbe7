use props_terminal::state::{apply_delta, AppState, Delta};

fn state() -> AppState {
    AppState::new("http://127.0.0.1:5000".to_string())
}

#[test]
fn league_options_match_list_and_start_unchecked() {
    let mut state = state();
    apply_delta(
        &mut state,
        Delta::SetLeagues(vec!["NBA".into(), "NFL".into(), "MLB".into()]),
    );

    let options = state.league_options();
    assert_eq!(options.len(), 3);
    assert!(options.iter().all(|(_, checked)| !checked));
    assert_eq!(options[0].0, "NBA");
    assert_eq!(options[2].0, "MLB");
}

#[test]
fn first_statistic_is_checked_by_default() {
    let mut state = state();
    apply_delta(
        &mut state,
        Delta::SetStatistics(vec!["points".into(), "rebounds".into(), "assists".into()]),
    );

    let options = state.statistic_options();
    assert_eq!(options.len(), 3);
    assert_eq!(options[0], ("points", true));
    assert!(options[1..].iter().all(|(_, checked)| !checked));
}

#[test]
fn empty_statistic_list_checks_nothing() {
    let mut state = state();
    apply_delta(&mut state, Delta::SetStatistics(Vec::new()));
    assert!(state.statistic_options().is_empty());
    assert_eq!(state.selected_statistic, None);
}

#[test]
fn toggling_a_league_twice_unchecks_it() {
    let mut state = state();
    apply_delta(
        &mut state,
        Delta::SetLeagues(vec!["NBA".into(), "NFL".into()]),
    );

    state.league_cursor = 1;
    state.toggle_league();
    assert_eq!(state.selected_league_values(), vec!["NFL".to_string()]);

    state.toggle_league();
    assert!(state.selected_league_values().is_empty());
}

#[test]
fn submission_without_leagues_is_rejected() {
    let mut state = state();
    apply_delta(&mut state, Delta::SetLeagues(vec!["NBA".into()]));
    apply_delta(&mut state, Delta::SetStatistics(vec!["points".into()]));

    assert_eq!(state.submission(), Err("Please select at least one league"));
}

#[test]
fn submission_without_statistic_is_rejected() {
    let mut state = state();
    apply_delta(&mut state, Delta::SetLeagues(vec!["NBA".into()]));
    apply_delta(&mut state, Delta::SetStatistics(Vec::new()));

    state.league_cursor = 0;
    state.toggle_league();

    assert_eq!(state.submission(), Err("Please select a statistic"));
}

#[test]
fn submission_collects_checked_leagues_in_list_order() {
    let mut state = state();
    apply_delta(
        &mut state,
        Delta::SetLeagues(vec!["NBA".into(), "NFL".into(), "MLB".into()]),
    );
    apply_delta(
        &mut state,
        Delta::SetStatistics(vec!["points".into(), "rebounds".into()]),
    );

    // Check MLB first, then NBA; the request still follows list order.
    state.league_cursor = 2;
    state.toggle_league();
    state.league_cursor = 0;
    state.toggle_league();

    let request = state.submission().expect("selection should be valid");
    assert_eq!(request.leagues, vec!["NBA".to_string(), "MLB".to_string()]);
    assert_eq!(request.statistic, "points");
}

#[test]
fn choosing_a_statistic_moves_the_radio_selection() {
    let mut state = state();
    apply_delta(
        &mut state,
        Delta::SetStatistics(vec!["points".into(), "rebounds".into()]),
    );

    state.statistic_cursor = 1;
    state.choose_statistic();

    let options = state.statistic_options();
    assert_eq!(options[0], ("points", false));
    assert_eq!(options[1], ("rebounds", true));
}
