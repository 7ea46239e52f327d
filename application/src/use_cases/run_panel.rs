//! Run Panel use case
//!
//! Drives a panel through its execution plan: layer by layer, every agent in
//! a layer invoked concurrently, results merged back in declaration order,
//! and finally the optional moderator reduction over the sink outputs.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use caucus_domain::{AgentKey, DeliberationResult, Panel, RunState, combine};

use crate::ports::model_gateway::{GatewayError, ModelGateway};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};

/// Errors that can occur while running a panel
///
/// Topology and template problems cannot appear here: both are rejected when
/// the panel and its agents are constructed, before any run exists.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Agent '{agent}' failed: {source}")]
    Invocation {
        /// The agent whose invocation failed
        agent: AgentKey,
        /// The rendered input the agent was invoked with
        input: String,
        #[source]
        source: GatewayError,
    },

    #[error("Moderator failed: {source}")]
    Moderation {
        /// The rendered input the moderator was invoked with
        input: String,
        #[source]
        source: GatewayError,
    },

    #[error("Run cancelled")]
    Cancelled,
}

/// Use case for running a panel deliberation
///
/// The panel is borrowed mutably for the whole run, so two runs of the same
/// panel can never overlap. Each run starts by resetting the panel; run
/// artifacts from a failed run stay inspectable on the panel until the next
/// run begins.
pub struct RunPanelUseCase {
    gateway: Arc<dyn ModelGateway>,
    transcript_logger: Arc<dyn TranscriptLogger>,
}

impl RunPanelUseCase {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            gateway,
            transcript_logger: Arc::new(NoTranscriptLogger),
        }
    }

    /// Create with a transcript logger.
    pub fn with_transcript_logger(mut self, logger: Arc<dyn TranscriptLogger>) -> Self {
        self.transcript_logger = logger;
        self
    }

    /// Run the panel with no progress callbacks and no cancellation
    pub async fn execute(&self, panel: &mut Panel) -> Result<DeliberationResult, ProcessError> {
        self.execute_with_progress(panel, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Run the panel with progress callbacks and a cancellation token
    ///
    /// Cancellation is observed between layers: the layer in flight finishes,
    /// no later layer starts.
    pub async fn execute_with_progress(
        &self,
        panel: &mut Panel,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<DeliberationResult, ProcessError> {
        panel.reset();
        panel.set_state(RunState::Validating);

        // Topology was validated at construction; the plan always exists.
        let plan = panel.layer_plan();
        info!(
            agents = panel.agent_count(),
            layers = plan.len(),
            "starting panel run"
        );
        let keys: Vec<&str> = (0..panel.agent_count())
            .map(|i| panel.agent(i).key().as_str())
            .collect();
        self.transcript_logger.log(TranscriptEvent::new(
            "run_started",
            json!({
                "task": panel.task().content(),
                "agents": keys,
                "layers": plan.len(),
            }),
        ));

        if let Err(error) = self.run_layers(panel, &plan, progress, cancel).await {
            return Err(self.fail(panel, error));
        }

        if cancel.is_cancelled() {
            return Err(self.fail(panel, ProcessError::Cancelled));
        }

        panel.set_state(RunState::Reducing);
        if let Err(error) = self.reduce(panel, progress).await {
            return Err(self.fail(panel, error));
        }

        panel.set_state(RunState::Complete);
        let mut result = DeliberationResult::new(
            panel.task().clone(),
            panel.responses(),
            panel.transcript().to_vec(),
        );
        if let Some(final_response) = panel.final_response() {
            result = result.with_final_response(final_response);
        }

        info!(responses = result.responses.len(), "panel run complete");
        self.transcript_logger.log(TranscriptEvent::new(
            "run_completed",
            json!({
                "responses": result.responses.len(),
                "moderated": result.final_response.is_some(),
            }),
        ));
        Ok(result)
    }

    /// Invoke every layer of the plan in order
    async fn run_layers(
        &self,
        panel: &mut Panel,
        plan: &[Vec<usize>],
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessError> {
        for (layer_index, layer) in plan.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(layer = layer_index, "panel run cancelled");
                return Err(ProcessError::Cancelled);
            }

            panel.set_state(RunState::Running(layer_index));
            progress.on_layer_start(layer_index, layer.len());
            debug!(layer = layer_index, agents = layer.len(), "running layer");

            // Render every input before any invocation so the whole layer
            // sees the same upstream snapshot.
            let inputs: Vec<(usize, String)> = layer
                .iter()
                .map(|&node| (node, panel.render_input(node)))
                .collect();

            let mut join_set = JoinSet::new();
            for (node, input) in &inputs {
                let gateway = Arc::clone(&self.gateway);
                let node = *node;
                let input = input.clone();
                let agent = panel.agent(node);
                let model = agent.model().clone();
                let params = agent.params().clone();
                let system = agent.system_instructions().map(str::to_string);

                join_set.spawn(async move {
                    let result = gateway
                        .complete(&model, system.as_deref(), &input, &params)
                        .await;
                    (node, input, result)
                });
            }

            // Collect unordered, then merge in declaration order so histories
            // and the transcript stay reproducible.
            let mut results: Vec<(usize, String, Result<String, GatewayError>)> =
                Vec::with_capacity(inputs.len());
            let mut join_failure: Option<String> = None;
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok(entry) => results.push(entry),
                    Err(e) => {
                        warn!("invocation task join error: {e}");
                        join_failure.get_or_insert_with(|| e.to_string());
                    }
                }
            }
            results.sort_by_key(|(node, _, _)| *node);
            let completed: Vec<usize> = results.iter().map(|(node, _, _)| *node).collect();

            let mut first_error: Option<ProcessError> = None;
            for (node, input, result) in results {
                let key = panel.agent(node).key().clone();
                match result {
                    Ok(response) => {
                        debug!(agent = %key, layer = layer_index, "agent responded");
                        progress.on_agent_complete(layer_index, &key, true);
                        self.transcript_logger.log(TranscriptEvent::new(
                            "agent_response",
                            json!({
                                "agent": key.as_str(),
                                "layer": layer_index,
                                "prompt": input,
                                "response": response,
                            }),
                        ));
                        panel.record_response(node, layer_index, input, response);
                    }
                    Err(source) => {
                        warn!(agent = %key, "agent invocation failed: {source}");
                        progress.on_agent_complete(layer_index, &key, false);
                        if first_error.is_none() {
                            first_error = Some(ProcessError::Invocation {
                                agent: key,
                                input,
                                source,
                            });
                        }
                    }
                }
            }

            if first_error.is_none()
                && join_failure.is_some()
                && let Some((node, input)) = inputs
                    .iter()
                    .find(|(node, _)| !completed.contains(node))
                    .cloned()
            {
                // A task vanished without reporting; attribute the loss to
                // the first node left without a result.
                let message = join_failure.unwrap_or_default();
                first_error = Some(ProcessError::Invocation {
                    agent: panel.agent(node).key().clone(),
                    input,
                    source: GatewayError::Other(format!("Invocation task aborted: {message}")),
                });
            }

            if let Some(error) = first_error {
                return Err(error);
            }
            progress.on_layer_complete(layer_index);
        }
        Ok(())
    }

    /// Reduce the sink outputs through the moderator, when one is attached
    async fn reduce(
        &self,
        panel: &mut Panel,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), ProcessError> {
        let Some(moderator) = panel.moderator() else {
            debug!("no moderator attached; sink outputs are the result");
            return Ok(());
        };

        let responses = panel.responses();
        let input = combine(moderator.instructions_template(), panel.task(), &responses);
        let system = moderator.system_instructions(panel.task());
        let model = moderator.model().clone();
        let params = moderator.params().clone();

        progress.on_reduce_start();
        info!(sinks = responses.len(), "reducing sink outputs through the moderator");

        match self
            .gateway
            .complete(&model, Some(&system), &input, &params)
            .await
        {
            Ok(response) => {
                progress.on_reduce_complete(true);
                self.transcript_logger.log(TranscriptEvent::new(
                    "moderator_response",
                    json!({
                        "prompt": input,
                        "response": response,
                    }),
                ));
                panel.record_final_response(response);
                Ok(())
            }
            Err(source) => {
                warn!("moderator invocation failed: {source}");
                progress.on_reduce_complete(false);
                Err(ProcessError::Moderation { input, source })
            }
        }
    }

    fn fail(&self, panel: &mut Panel, error: ProcessError) -> ProcessError {
        panel.set_state(RunState::Failed);
        self.transcript_logger.log(TranscriptEvent::new(
            "run_failed",
            json!({ "error": error.to_string() }),
        ));
        error
    }
}
