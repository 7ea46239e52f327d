//! Panel domain entities

use std::collections::HashMap;

use crate::agent::entities::{Agent, AgentKey};
use crate::agent::moderator::Moderator;
use crate::core::task::Task;
use crate::prompt::combine::combine;

use super::run_state::RunState;
use super::topology::{Edge, Topology, TopologyError};
use super::value_objects::AgentResponse;

/// Information-sharing layout of a panel
#[derive(Debug, Clone)]
pub enum Layout {
    /// All agents run independently against the task; no information sharing
    Ensemble,
    /// Agents run one after another, each seeing earlier outputs
    Chain {
        /// Number of passes over the whole chain
        rounds: usize,
        /// How many of the most recent outputs an agent sees; `None` = all
        window: Option<usize>,
    },
    /// Agents run per an explicit DAG of directed edges
    Graph { topology: Topology },
}

/// A group of agents deliberating one task under a declared layout (Entity)
///
/// The panel owns its agents (arena + index, addressed by declaration
/// index), the task, an optional moderator, and the artifacts of the current
/// run: per-agent histories, the execution transcript, and the final
/// response. Construction validates the layout; a `Panel` in hand always has
/// a runnable topology.
#[derive(Debug, Clone)]
pub struct Panel {
    agents: Vec<Agent>,
    index: HashMap<AgentKey, usize>,
    task: Task,
    layout: Layout,
    moderator: Option<Moderator>,
    state: RunState,
    transcript: Vec<AgentResponse>,
    final_response: Option<String>,
}

impl Panel {
    // ==================== Construction ====================

    /// A panel whose agents all answer the task independently
    pub fn ensemble(agents: Vec<Agent>, task: Task) -> Result<Self, TopologyError> {
        Self::with_layout(agents, task, Layout::Ensemble)
    }

    /// A panel whose agents answer in declaration order, each seeing the
    /// outputs recorded before it
    pub fn chain(agents: Vec<Agent>, task: Task) -> Result<Self, TopologyError> {
        Self::with_layout(
            agents,
            task,
            Layout::Chain {
                rounds: 1,
                window: None,
            },
        )
    }

    /// A panel whose information flow follows an explicit DAG
    ///
    /// Fails with [`TopologyError::UnknownAgent`] or [`TopologyError::Cycle`]
    /// before any agent can ever be invoked.
    pub fn graph(agents: Vec<Agent>, edges: Vec<Edge>, task: Task) -> Result<Self, TopologyError> {
        let index = Self::index_agents(&agents)?;
        let keys: Vec<AgentKey> = agents.iter().map(|a| a.key().clone()).collect();
        let topology = Topology::build(&keys, &edges)?;
        Ok(Self::assemble(agents, index, task, Layout::Graph { topology }))
    }

    fn with_layout(agents: Vec<Agent>, task: Task, layout: Layout) -> Result<Self, TopologyError> {
        let index = Self::index_agents(&agents)?;
        Ok(Self::assemble(agents, index, task, layout))
    }

    fn index_agents(agents: &[Agent]) -> Result<HashMap<AgentKey, usize>, TopologyError> {
        if agents.is_empty() {
            return Err(TopologyError::Empty);
        }
        let mut index = HashMap::with_capacity(agents.len());
        for (i, agent) in agents.iter().enumerate() {
            if index.insert(agent.key().clone(), i).is_some() {
                return Err(TopologyError::DuplicateAgent(agent.key().clone()));
            }
        }
        Ok(index)
    }

    fn assemble(
        agents: Vec<Agent>,
        index: HashMap<AgentKey, usize>,
        task: Task,
        layout: Layout,
    ) -> Self {
        Self {
            agents,
            index,
            task,
            layout,
            moderator: None,
            state: RunState::Unstarted,
            transcript: Vec::new(),
            final_response: None,
        }
    }

    // ==================== Builder Methods ====================

    /// Attach a moderator that reduces the sink outputs into one final
    /// response
    pub fn with_moderator(mut self, moderator: Moderator) -> Self {
        self.moderator = Some(moderator);
        self
    }

    /// Number of passes over the whole chain (chain panels only; minimum 1)
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        if let Layout::Chain { rounds: r, .. } = &mut self.layout {
            *r = rounds.max(1);
        }
        self
    }

    /// Limit how many of the most recent outputs a chain agent sees (chain
    /// panels only; minimum 1)
    pub fn with_window(mut self, window: usize) -> Self {
        if let Layout::Chain { window: w, .. } = &mut self.layout {
            *w = Some(window.max(1));
        }
        self
    }

    // ==================== Accessors ====================

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn moderator(&self) -> Option<&Moderator> {
        self.moderator.as_ref()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn set_state(&mut self, state: RunState) {
        self.state = state;
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// The agent at the given declaration index
    pub fn agent(&self, node: usize) -> &Agent {
        &self.agents[node]
    }

    pub fn agent_by_key(&self, key: &AgentKey) -> Option<&Agent> {
        self.index.get(key).map(|&i| &self.agents[i])
    }

    // ==================== Scheduling ====================

    /// Execution plan: layers of agent indices in invocation order
    ///
    /// Ensemble: one layer with every agent. Chain: one agent per layer in
    /// declaration order, the whole sequence repeated `rounds` times. Graph:
    /// topological layers with declaration-order tie-breaks.
    pub fn layer_plan(&self) -> Vec<Vec<usize>> {
        match &self.layout {
            Layout::Ensemble => vec![(0..self.agents.len()).collect()],
            Layout::Chain { rounds, .. } => (0..*rounds)
                .flat_map(|_| (0..self.agents.len()).map(|i| vec![i]))
                .collect(),
            Layout::Graph { topology } => topology.layers(),
        }
    }

    /// Upstream outputs for `node` at the current point of the run
    ///
    /// Meaningful once every agent scheduled before `node` has had its
    /// response recorded; processing layers in plan order guarantees that.
    /// Graph nodes see their direct predecessors' outputs in producer order,
    /// chain agents see the tail of the transcript limited by `window`, and
    /// ensemble agents see nothing.
    pub fn upstream_outputs(&self, node: usize) -> Vec<String> {
        match &self.layout {
            Layout::Ensemble => Vec::new(),
            Layout::Chain { window, .. } => {
                let responses = &self.transcript;
                let start = window.map_or(0, |w| responses.len().saturating_sub(w));
                responses[start..].iter().map(|r| r.content.clone()).collect()
            }
            Layout::Graph { topology } => {
                let predecessors = topology.predecessors(node);
                topology
                    .layers()
                    .into_iter()
                    .flatten()
                    .filter(|i| predecessors.contains(i))
                    .filter_map(|i| self.agents[i].last_response().map(str::to_string))
                    .collect()
            }
        }
    }

    /// Rendered prompt for one invocation of `node`
    ///
    /// With no upstream outputs this is the task text alone; otherwise the
    /// agent's combination template folds the upstream outputs in.
    pub fn render_input(&self, node: usize) -> String {
        let agent = &self.agents[node];
        combine(
            agent.combination_template(),
            &self.task,
            &self.upstream_outputs(node),
        )
    }

    // ==================== Run Bookkeeping ====================

    /// Record one agent invocation in the agent's history and the transcript
    pub fn record_response(
        &mut self,
        node: usize,
        layer: usize,
        prompt: impl Into<String>,
        response: impl Into<String>,
    ) {
        let prompt = prompt.into();
        let response = response.into();
        self.transcript.push(AgentResponse::new(
            self.agents[node].key().clone(),
            layer,
            response.clone(),
        ));
        self.agents[node].record(prompt, response);
    }

    /// Record the moderator's reduction
    pub fn record_final_response(&mut self, response: impl Into<String>) {
        self.final_response = Some(response.into());
    }

    /// Clear every run artifact so the next run starts fresh
    ///
    /// Histories, transcript, final response, and state all reset; runs on
    /// the same panel never contaminate each other.
    pub fn reset(&mut self) {
        for agent in &mut self.agents {
            agent.reset();
        }
        self.transcript.clear();
        self.final_response = None;
        self.state = RunState::Unstarted;
    }

    // ==================== Results ====================

    /// The agents whose outputs are the panel's result, in declaration order
    ///
    /// Ensemble: every agent. Chain: the last agent. Graph: the nodes with
    /// no outgoing edges.
    pub fn sink_indices(&self) -> Vec<usize> {
        match &self.layout {
            Layout::Ensemble => (0..self.agents.len()).collect(),
            Layout::Chain { .. } => vec![self.agents.len() - 1],
            Layout::Graph { topology } => topology.sinks(),
        }
    }

    /// Sink outputs after a run, in declaration order
    pub fn responses(&self) -> Vec<String> {
        self.sink_indices()
            .into_iter()
            .filter_map(|i| self.agents[i].last_response().map(str::to_string))
            .collect()
    }

    /// The moderator's reduction, once one has run
    pub fn final_response(&self) -> Option<&str> {
        self.final_response.as_deref()
    }

    /// Every response of the current run, in execution order
    pub fn transcript(&self) -> &[AgentResponse] {
        &self.transcript
    }
}
