use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::capture::domain::frame_source::FrameSource;
use crate::pipeline::loop_state::LoopState;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::pipeline::result_sink::{LoopOutcome, ResultSink};
use crate::pipeline::retry_policy::{ConstantDelay, RetryPolicy};
use crate::recognition::domain::detected_face::{DetectedFace, FaceAttribute};
use crate::recognition::domain::identify_candidate::IdentifyCandidate;
use crate::recognition::domain::recognition_client::{RecognitionClient, RecognitionError};
use crate::shared::frame::Frame;

/// Orchestrates the continuous capture → detect → identify → resolve
/// loop until a person is matched, a stage faults, or the stream stops.
///
/// Stages run strictly sequentially: one frame and at most one remote
/// call in flight per instance. Cancellation is cooperative — polled at
/// each iteration boundary, never interrupting a call already underway.
/// Empty results (no face, no candidate, no profile) schedule a retry
/// after the policy's delay; any capture or service fault aborts the
/// loop immediately.
///
/// This is a single-use struct: `execute` consumes the owned components,
/// so calling it twice will fail. Restarting means building a new
/// instance.
pub struct IdentifyPersonUseCase {
    source: Option<Box<dyn FrameSource>>,
    client: Option<Box<dyn RecognitionClient>>,
    sink: Option<Box<dyn ResultSink>>,
    logger: Box<dyn PipelineLogger>,
    retry: Box<dyn RetryPolicy>,
    group_id: String,
    attributes: Vec<FaceAttribute>,
    cancelled: Arc<AtomicBool>,
    state: LoopState,
}

impl IdentifyPersonUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        client: Box<dyn RecognitionClient>,
        sink: Box<dyn ResultSink>,
        group_id: &str,
        retry: Option<Box<dyn RetryPolicy>>,
        logger: Option<Box<dyn PipelineLogger>>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source: Some(source),
            client: Some(client),
            sink: Some(sink),
            logger: logger.unwrap_or_else(|| Box::new(NullPipelineLogger)),
            retry: retry.unwrap_or_else(|| Box::new(ConstantDelay::default())),
            group_id: group_id.to_string(),
            attributes: vec![FaceAttribute::Age],
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            state: LoopState::Idle,
        }
    }

    /// State the loop was last observed in; terminal once `execute`
    /// returns.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs the loop to its terminal state, delivers the outcome to the
    /// sink exactly once, and returns it.
    pub fn execute(&mut self) -> Result<LoopOutcome, Box<dyn std::error::Error>> {
        let mut source = self.source.take().ok_or("Loop already executed")?;
        let client = self.client.take().ok_or("Loop already executed")?;
        let mut sink = self.sink.take().ok_or("Loop already executed")?;

        let outcome = self.run(source.as_mut(), client.as_ref());
        source.close();
        self.logger.summary();
        sink.deliver(outcome.clone());
        Ok(outcome)
    }

    fn run(
        &mut self,
        source: &mut dyn FrameSource,
        client: &dyn RecognitionClient,
    ) -> LoopOutcome {
        let mut attempt = 0usize;

        loop {
            // Iteration boundary: the only place cancellation is observed.
            if self.cancelled.load(Ordering::Relaxed) || !source.is_streaming() {
                self.state = LoopState::Cancelled;
                return LoopOutcome::Cancelled;
            }

            attempt += 1;
            self.logger.attempt(attempt);

            self.state = LoopState::Capturing;
            let started = Instant::now();
            let frame = match source.acquire_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    self.state = LoopState::Failed;
                    return LoopOutcome::Failed {
                        code: None,
                        message: e.to_string(),
                    };
                }
            };
            self.logger.timing("capture", elapsed_ms(started));

            let step = self.process_frame(client, &frame);
            // The frame's life ends with its iteration.
            drop(frame);

            match step {
                Ok(Some(outcome)) => {
                    self.state = LoopState::Matched;
                    return outcome;
                }
                Ok(None) => {
                    // Nothing conclusive in this frame; throttle, then
                    // try again with the next one.
                }
                Err(e) => {
                    self.state = LoopState::Failed;
                    let code = e.status();
                    let message = match e {
                        RecognitionError::Service { message, .. } => message,
                        RecognitionError::Transport(message) => message,
                    };
                    return LoopOutcome::Failed { code, message };
                }
            }

            let delay = self.retry.delay_for(attempt);
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
    }

    /// Runs the three remote stages for one frame. `Ok(None)` means the
    /// frame produced nothing conclusive and the loop should capture
    /// again; any stage fault propagates and aborts the loop.
    fn process_frame(
        &mut self,
        client: &dyn RecognitionClient,
        frame: &Frame,
    ) -> Result<Option<LoopOutcome>, RecognitionError> {
        self.state = LoopState::Detecting;
        let started = Instant::now();
        let faces = client.detect_faces(frame, &self.attributes)?;
        self.logger.timing("detect", elapsed_ms(started));
        self.logger.metric("faces_detected", faces.len() as f64);
        if faces.is_empty() {
            return Ok(None);
        }

        self.state = LoopState::Identifying;
        let started = Instant::now();
        let candidates = client.identify(&self.group_id, &DetectedFace::ids(&faces))?;
        self.logger.timing("identify", elapsed_ms(started));
        self.logger.metric("candidates", candidates.len() as f64);
        let Some(best) = IdentifyCandidate::best(&candidates) else {
            return Ok(None);
        };

        self.state = LoopState::ResolvingProfile;
        let started = Instant::now();
        let profile = client.fetch_profile(&self.group_id, &best.person_id)?;
        self.logger.timing("profile", elapsed_ms(started));
        let Some(profile) = profile else {
            return Ok(None);
        };

        let age = faces
            .iter()
            .find(|f| f.face_id == best.face_id)
            .and_then(|f| f.attributes.age);

        self.logger.info(&format!(
            "identified {} (confidence {:.3})",
            profile.name, best.confidence
        ));
        Ok(Some(LoopOutcome::Matched {
            name: profile.name,
            age,
            confidence: best.confidence,
        }))
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
