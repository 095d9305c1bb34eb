use log::{debug, trace};
use rand::Rng;

use crate::{
    Position,
    action::Action,
    config::TagConfig,
    distance::DistanceMatrix,
    distribution::Categorical,
    error::TagError,
    map::MapGraph,
    observation::{Observation, ObservationSpace},
    opponent::opponent_transition,
    state::{StateSpace, TagState},
};

/// Result of sampling one step from the generative model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub next_state: TagState,
    pub observation: Observation,
    pub reward: f64,
}

/// The Tag POMDP: map, opponent model, rewards and observations.
///
/// Everything is computed at construction and the model is read-only
/// afterwards, so a single instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct TagPomdp {
    config: TagConfig,
    graph: MapGraph,
    distances: DistanceMatrix,
    states: StateSpace,
    observations: ObservationSpace,
}

impl TagPomdp {
    /// Validates the configuration, parses the map and precomputes distances.
    pub fn new(config: TagConfig) -> Result<Self, TagError> {
        config.validate()?;
        let graph = MapGraph::build(&config.map_str)?;
        let distances = DistanceMatrix::from_graph(&graph);
        let states = StateSpace::new(graph.num_cells());
        let observations = ObservationSpace::new(graph.num_cells());

        debug!(
            "Built Tag model: {} cells, {} states, {} observations, {:?} transitions",
            graph.num_cells(),
            states.len(),
            observations.len(),
            config.transition_option
        );

        Ok(TagPomdp {
            config,
            graph,
            distances,
            states,
            observations,
        })
    }

    pub fn config(&self) -> &TagConfig {
        &self.config
    }

    pub fn graph(&self) -> &MapGraph {
        &self.graph
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    pub fn state_space(&self) -> &StateSpace {
        &self.states
    }

    pub fn observation_space(&self) -> &ObservationSpace {
        &self.observations
    }

    #[inline]
    pub fn discount(&self) -> f64 {
        self.config.discount_factor
    }

    /// Every state in index order, terminal last.
    pub fn states(&self) -> impl Iterator<Item = TagState> + use<> {
        self.states.iter()
    }

    /// Every action in index order.
    pub fn actions(&self) -> &'static [Action] {
        &Action::ALL
    }

    /// Every observation in index order.
    pub fn observations(&self) -> impl Iterator<Item = Observation> + use<> {
        self.observations.iter()
    }

    #[inline]
    pub fn is_terminal(&self, state: &TagState) -> bool {
        state.is_terminal()
    }

    pub fn state_index(&self, state: &TagState) -> Result<usize, TagError> {
        self.states.index_of(state)
    }

    pub fn state_from_index(&self, index: usize) -> Result<TagState, TagError> {
        self.states.state_of(index)
    }

    pub fn observation_index(&self, observation: &Observation) -> Result<usize, TagError> {
        self.observations.index_of(observation)
    }

    pub fn observation_from_index(&self, index: usize) -> Result<Observation, TagError> {
        self.observations.observation_of(index)
    }

    /// Uniform over every non-terminal placement of agent and opponent.
    pub fn initial_state_distribution(&self) -> Categorical<TagState> {
        Categorical::uniform(self.states().filter(|s| !s.is_terminal()).collect())
    }

    /// Distribution over the next state.
    ///
    /// The agent moves first and deterministically; the opponent then reacts to
    /// the agent's new cell. Tagging while co-located ends the episode, and the
    /// terminal state is absorbing.
    pub fn transition(
        &self,
        state: &TagState,
        action: Action,
    ) -> Result<Categorical<TagState>, TagError> {
        let (agent, opponent) = match *state {
            TagState::Terminal => return Ok(Categorical::point(TagState::Terminal)),
            TagState::Active { agent, opponent } => (agent, opponent),
        };
        self.graph.check_cell(agent)?;
        self.graph.check_cell(opponent)?;

        if action == Action::Tag && agent == opponent {
            trace!("Tag succeeded at cell {}", agent);
            return Ok(Categorical::point(TagState::Terminal));
        }

        let next_agent = self.graph.move_from(agent, action);
        let opponent_moves = opponent_transition(
            &self.graph,
            &self.distances,
            next_agent,
            opponent,
            self.config.move_away_probability,
            self.config.transition_option,
        )?;
        Ok(opponent_moves.map(|&next_opponent| TagState::new(next_agent, next_opponent)))
    }

    /// Immediate reward for taking `action` in `state`.
    pub fn reward(&self, state: &TagState, action: Action) -> f64 {
        match (state, action) {
            (TagState::Terminal, _) => 0.0,
            (state, Action::Tag) if state.is_colocated() => self.config.tag_reward,
            (_, Action::Tag) => self.config.tag_penalty,
            _ => self.config.step_penalty,
        }
    }

    /// The observation emitted on arriving in `next_state`.
    pub fn observe(&self, next_state: &TagState) -> Observation {
        Observation::of(next_state)
    }

    /// Observation model as a distribution. Observations are deterministic, so
    /// this is always a point mass and the action does not matter.
    pub fn observation_distribution(
        &self,
        _action: Action,
        next_state: &TagState,
    ) -> Categorical<Observation> {
        Categorical::point(self.observe(next_state))
    }

    /// Samples a next state, its observation and the reward for one step.
    pub fn step<R: Rng>(
        &self,
        state: &TagState,
        action: Action,
        rng: &mut R,
    ) -> Result<Step, TagError> {
        let next_state = *self.transition(state, action)?.sample(rng);
        Ok(Step {
            next_state,
            observation: self.observe(&next_state),
            reward: self.reward(state, action),
        })
    }

    /// Draws a text frame of the map with both players and an optional action.
    ///
    /// Walls are `x`, open cells `.`, the agent `A`, the opponent `T`, and a
    /// shared cell `*`.
    pub fn render_state(&self, state: &TagState, action: Option<Action>) -> String {
        let rows = self.graph.rows();
        let cols = self.graph.cols();
        let mut out = String::with_capacity(rows * (cols + 1) + 32);

        for row in 0..rows {
            for col in 0..cols {
                let tile = match self.graph.index_at(Position { row, col }) {
                    None => 'x',
                    Some(cell) => match (state.agent() == Some(cell), state.opponent() == Some(cell)) {
                        (true, true) => '*',
                        (true, false) => 'A',
                        (false, true) => 'T',
                        (false, false) => '.',
                    },
                };
                out.push(tile);
            }
            out.push('\n');
        }

        if state.is_terminal() {
            out.push_str("state: terminal\n");
        }
        if let Some(action) = action {
            out.push_str("action: ");
            out.push_str(action.name());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{config::TransitionOption, distribution::PROB_TOLERANCE};

    fn default_pomdp() -> TagPomdp {
        TagPomdp::new(TagConfig::default()).unwrap()
    }

    fn at(pomdp: &TagPomdp, row: usize, col: usize) -> usize {
        pomdp.graph().index_at(Position { row, col }).unwrap()
    }

    #[test]
    fn default_problem_dimensions() {
        let pomdp = default_pomdp();
        assert_eq!(pomdp.states().count(), 29 * 29 + 1);
        assert_eq!(pomdp.actions().len(), 5);
        assert_eq!(pomdp.observations().count(), 59);
        assert_eq!(pomdp.discount(), 0.95);
    }

    #[test]
    fn successful_tag_ends_episode() {
        let pomdp = default_pomdp();
        let cell = at(&pomdp, 3, 4);
        let state = TagState::new(cell, cell);
        assert_eq!(pomdp.reward(&state, Action::Tag), 10.0);
        let d = pomdp.transition(&state, Action::Tag).unwrap();
        assert_eq!(d.probability(&TagState::Terminal), 1.0);
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn missed_tag_keeps_agent_and_moves_opponent() {
        let pomdp = default_pomdp();
        let (agent, opponent) = (at(&pomdp, 4, 1), at(&pomdp, 4, 0));
        let state = TagState::new(agent, opponent);
        assert_eq!(pomdp.reward(&state, Action::Tag), -10.0);

        let d = pomdp.transition(&state, Action::Tag).unwrap();
        let north = at(&pomdp, 3, 0);
        assert!((d.probability(&TagState::new(agent, north)) - 0.8).abs() < PROB_TOLERANCE);
        assert!((d.probability(&TagState::new(agent, opponent)) - 0.2).abs() < PROB_TOLERANCE);
    }

    #[test]
    fn opponent_reacts_to_new_agent_position() {
        let pomdp = default_pomdp();
        let state = TagState::new(at(&pomdp, 4, 2), at(&pomdp, 4, 0));
        // Moving west puts the agent next to the opponent, whose only away move is north.
        let d = pomdp.transition(&state, Action::West).unwrap();
        let agent = at(&pomdp, 4, 1);
        assert!(d.support().all(|s| s.agent() == Some(agent)));
        assert!(
            (d.probability(&TagState::new(agent, at(&pomdp, 3, 0))) - 0.8).abs() < PROB_TOLERANCE
        );
    }

    #[test]
    fn blocked_move_costs_a_step() {
        let pomdp = default_pomdp();
        let corner = at(&pomdp, 4, 0);
        let state = TagState::new(corner, at(&pomdp, 3, 9));
        assert_eq!(pomdp.reward(&state, Action::South), -1.0);
        let d = pomdp.transition(&state, Action::South).unwrap();
        assert!(d.support().all(|s| s.agent() == Some(corner)));
    }

    #[test]
    fn terminal_is_absorbing() {
        let pomdp = default_pomdp();
        for &action in pomdp.actions() {
            let d = pomdp.transition(&TagState::Terminal, action).unwrap();
            assert_eq!(d.probability(&TagState::Terminal), 1.0);
            assert_eq!(pomdp.reward(&TagState::Terminal, action), 0.0);
        }
        assert_eq!(pomdp.observe(&TagState::Terminal), Observation::Terminal);
    }

    #[test]
    fn transition_rejects_unknown_cells() {
        let pomdp = default_pomdp();
        assert!(pomdp.transition(&TagState::new(30, 1), Action::North).is_err());
        assert!(pomdp.transition(&TagState::new(1, 0), Action::Tag).is_err());
    }

    #[test]
    fn initial_distribution_is_uniform() {
        let pomdp = default_pomdp();
        let d = pomdp.initial_state_distribution();
        assert_eq!(d.len(), 29 * 29);
        assert_eq!(d.probability(&TagState::Terminal), 0.0);
        assert!((d.total() - 1.0).abs() < PROB_TOLERANCE);
    }

    #[test]
    fn step_samples_consistent_outcomes() {
        let pomdp = TagPomdp::new(
            TagConfig::default().with_transition_option(TransitionOption::Original),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = TagState::new(at(&pomdp, 3, 0), at(&pomdp, 4, 9));
        for _ in 0..50 {
            let step = pomdp.step(&state, Action::East, &mut rng).unwrap();
            assert_eq!(step.reward, -1.0);
            assert_eq!(step.observation, pomdp.observe(&step.next_state));
            let d = pomdp.transition(&state, Action::East).unwrap();
            assert!(d.probability(&step.next_state) > 0.0);
            state = step.next_state;
        }
    }

    #[test]
    fn observation_distribution_is_point_mass() {
        let pomdp = default_pomdp();
        let state = TagState::new(5, 5);
        let d = pomdp.observation_distribution(Action::North, &state);
        assert_eq!(
            d.probability(&Observation::Position {
                agent: 5,
                opponent: Some(5)
            }),
            1.0
        );
        let index = pomdp.observation_index(&pomdp.observe(&state)).unwrap();
        assert_eq!(index, 29 + 5);
        assert_eq!(
            pomdp.observation_from_index(index),
            Ok(pomdp.observe(&state))
        );
    }

    #[test]
    fn render_marks_players() {
        let pomdp = TagPomdp::new(TagConfig::default().with_map("oox\nooo")).unwrap();
        let frame = pomdp.render_state(&TagState::new(1, 5), Some(Action::Tag));
        assert_eq!(frame, "A.x\n..T\naction: tag\n");
        let frame = pomdp.render_state(&TagState::new(3, 3), None);
        assert_eq!(frame, "..x\n*..\n");
        let frame = pomdp.render_state(&TagState::Terminal, None);
        assert_eq!(frame, "..x\n...\nstate: terminal\n");
    }

    #[test]
    fn construction_errors_propagate() {
        assert!(matches!(
            TagPomdp::new(TagConfig::default().with_map("xx\nxx")),
            Err(TagError::EmptyMap)
        ));
        assert!(
            TagPomdp::new(TagConfig::default().with_map("oo\no"))
                .unwrap_err()
                .is_malformed_map()
        );
        assert!(matches!(
            TagPomdp::new(TagConfig::default().with_move_away_probability(2.0)),
            Err(TagError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn model_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TagPomdp>();

        let pomdp = default_pomdp();
        let totals: Vec<f64> = std::thread::scope(|scope| {
            let handles: Vec<_> = pomdp
                .actions()
                .iter()
                .map(|&action| {
                    let pomdp = &pomdp;
                    scope.spawn(move || {
                        pomdp
                            .states()
                            .map(|s| pomdp.transition(&s, action).unwrap().total())
                            .sum::<f64>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for total in totals {
            assert!((total - 842.0).abs() < 1e-6);
        }
    }
}
