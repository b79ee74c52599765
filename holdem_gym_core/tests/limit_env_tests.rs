use holdem_gym_core::*;

fn random_agents(n: usize, seed: u64) -> AgentRegistry {
    (0..n).fold(AgentRegistry::new(), |r, i| r.with(i, RandomAgent::seeded(seed + i as u64)))
}

fn limit_env(n: usize, seed: u64) -> Environment<LimitHoldem> {
    let config = EngineConfig { seed: Some(seed), ..EngineConfig::with_players(n) };
    Environment::new(config).unwrap()
}

#[test]
fn heads_up_call_passes_turn_and_game_is_zero_sum() {
    let mut env = limit_env(2, 17);
    let (_, first) = env.reset(random_agents(2, 1)).unwrap();
    assert_eq!(first, 0);
    assert!(env.legal_actions(0).unwrap().contains(&ActionKind::Call));

    env.apply(0, ActionKind::Call, None).unwrap();
    assert_eq!(env.current_player(), Some(1));

    while !env.is_terminal() {
        let player = env.current_player().unwrap();
        let legal = env.legal_actions(player).unwrap();
        let kind = if legal.contains(&ActionKind::Check) { ActionKind::Check } else { ActionKind::Call };
        env.apply(player, kind, None).unwrap();
    }
    let total = env.reward(0).unwrap() + env.reward(1).unwrap();
    assert!(total.abs() < 1e-9);
}

#[test]
fn imperfect_mode_never_leaks_opponent_cards() {
    let mut env = limit_env(2, 3);
    env.enable_imperfect_information();
    env.reset(random_agents(2, 5)).unwrap();

    while !env.is_terminal() {
        let hidden = env.state_for(0, false).unwrap();
        assert!(hidden.hands[0].is_some());
        assert!(hidden.hands[1].is_none());
        assert!(env.state(true).unwrap().hands.iter().all(Option::is_some));

        let actor = env.current_player().unwrap();
        let action = env.decide(DecisionMode::Train).unwrap();
        let t = env.step(action).unwrap();
        assert_eq!(t.state.visible_hands(), 1);
        assert_eq!(t.next_state.visible_hands(), 1);
        env.record(actor, t).unwrap();
    }
}

#[test]
fn random_games_stay_zero_sum_for_many_table_sizes() {
    for n in 2..=6 {
        let mut env = limit_env(n, 40 + n as u64);
        env.reset(random_agents(n, 100)).unwrap();
        for _ in 0..5 {
            env.restart().unwrap();
            let episode = play_episode(&mut env, DecisionMode::Train).unwrap();
            assert_eq!(episode.payoffs.len(), n);
            assert!(episode.payoffs.iter().sum::<f64>().abs() < 1e-9);

            let recorded: usize = env.history().iter().map(Vec::len).sum();
            assert_eq!(recorded, episode.plies);
            for (p, trajectory) in env.history().iter().enumerate() {
                for t in trajectory {
                    assert!(t.state.hand_of(p).is_some());
                }
            }
        }
    }
}

#[test]
fn legal_actions_are_within_action_space() {
    let mut env = limit_env(4, 8);
    env.reset(random_agents(4, 2)).unwrap();
    let space = env.action_space().unwrap();
    assert!(!space.contains(&ActionKind::AllIn));
    while !env.is_terminal() {
        for p in 0..4 {
            assert!(env.legal_actions(p).unwrap().is_subset(&space));
        }
        let action = env.decide(DecisionMode::Eval).unwrap();
        env.step(action).unwrap();
    }
}

#[test]
fn wrong_raise_amount_is_rejected_without_advancing() {
    let mut env = limit_env(2, 1);
    env.reset(random_agents(2, 1)).unwrap();
    let err = env.apply(0, ActionKind::Raise, Some(99)).unwrap_err();
    assert!(matches!(err, EnvError::Engine(EngineError::Rejected { .. })));
    assert_eq!(env.current_player(), Some(0));
    assert_eq!(env.phase(), Phase::AwaitingAction(0));

    let raise_to = env.state(true).unwrap().raise_to;
    assert_eq!(raise_to, Some(4));
    env.apply(0, ActionKind::Raise, raise_to).unwrap();
    assert_eq!(env.current_player(), Some(1));
}

#[test]
fn trajectories_serialize_as_json() {
    let mut env = limit_env(3, 21);
    env.reset(random_agents(3, 9)).unwrap();
    play_episode(&mut env, DecisionMode::Train).unwrap();
    let json = serde_json::to_string(env.history()).unwrap();
    let parsed: Vec<Vec<Transition>> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 3);
}
